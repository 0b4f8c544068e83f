use anyhow::{Context, Result};
use branch_triage::{
    discover_input, extract_issue_ref, init_telemetry, parse_issues, BranchMemory, Git2History, Reconciler,
    ReconciliationOutcome, TriageConfig,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "branch-triage")]
#[command(about = "Reconcile local git branches with tracker issues")]
#[command(long_about = "branch-triage compares local branches with a snapshot of tracker issues, \
                       finds stale, duplicate, orphaned and unlinked branches, and prints ranked \
                       cleanup commands. It never modifies the repository.")]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the repository and print recommendations
    Analyze {
        /// Path inside the git repository to analyze
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// JSON array of issues fetched from the tracker
        #[arg(long)]
        issues: PathBuf,
        /// JSON object mapping branch names to confirmed issue links
        #[arg(long)]
        memory: Option<PathBuf>,
        /// Configuration file (JSON, `//` comment lines allowed)
        #[arg(long, env = "BRANCH_TRIAGE_CONFIG")]
        config: Option<PathBuf>,
        /// Treat this branch as the current one instead of HEAD
        #[arg(long)]
        current: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the issue reference found in each branch name
    Extract {
        #[arg(required = true)]
        branches: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(cli.log_json)?;

    match cli.command {
        Commands::Analyze {
            repo,
            issues,
            memory,
            config,
            current,
            format,
        } => analyze_command(&repo, &issues, memory.as_deref(), config.as_deref(), current, format),
        Commands::Extract { branches } => {
            extract_command(&branches);
            Ok(())
        }
    }
}

fn analyze_command(
    repo: &Path,
    issues_path: &Path,
    memory_path: Option<&Path>,
    config_path: Option<&Path>,
    current: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let config = match config_path {
        Some(path) => TriageConfig::load_or_default(path),
        None => TriageConfig::default(),
    };

    let raw_issues = fs::read_to_string(issues_path)
        .with_context(|| format!("Failed to read {}", issues_path.display()))?;
    let issues = parse_issues(&raw_issues).context("Failed to load issues")?;
    let memory: BranchMemory = match memory_path {
        Some(path) => read_json(path).context("Failed to load branch memory")?,
        None => BranchMemory::new(),
    };

    let history = Git2History::discover(repo)?;
    let mut input = discover_input(&history, issues, memory).context("Failed to list branches")?;
    if current.is_some() {
        input.current_branch = current;
    }

    let outcome = Reconciler::new(&history, &config).run(&input);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => print_text_report(&outcome),
    }
    Ok(())
}

fn print_text_report(outcome: &ReconciliationOutcome) {
    let report = &outcome.report;
    println!("🌿 Branch triage against {}", outcome.base_branch);
    println!(
        "   {} branches: {} verified, {} detected, {} unlinked, {} orphaned",
        report.total_branches(),
        report.verified.len(),
        report.detected.len(),
        report.unlinked.len(),
        report.orphaned.len()
    );
    if let Some(current) = &outcome.analysis.current {
        println!(
            "   Current: {} ({}){}",
            current.branch,
            current.status,
            current
                .linked_issue
                .as_deref()
                .map(|issue| format!(" → {issue}"))
                .unwrap_or_default()
        );
    }
    if !outcome.analysis.unassigned_issues.is_empty() {
        println!("   Unassigned issues: {}", outcome.analysis.unassigned_issues.join(", "));
    }
    println!();
    print!("{}", outcome.recommendations.formatted);
}

fn extract_command(branches: &[String]) {
    for branch in branches {
        match extract_issue_ref(branch) {
            Some(issue) => println!("{branch}\t{issue}"),
            None => println!("{branch}\t-"),
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
