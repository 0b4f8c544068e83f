// Smoke tests for the branch-triage binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("branch-triage").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("extract"));
}

#[test]
fn test_analyze_help_documents_inputs() {
    let mut cmd = Command::cargo_bin("branch-triage").unwrap();

    cmd.args(["analyze", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--issues"))
        .stdout(predicate::str::contains("--memory"))
        .stdout(predicate::str::contains("BRANCH_TRIAGE_CONFIG"));
}

#[test]
fn test_extract_prints_issue_refs() {
    let mut cmd = Command::cargo_bin("branch-triage").unwrap();

    cmd.args(["extract", "feature/issue-42-login", "PROJ-17-api", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("feature/issue-42-login\t#42"))
        .stdout(predicate::str::contains("PROJ-17-api\t#17"))
        .stdout(predicate::str::contains("docs\t-"));
}

#[test]
fn test_analyze_outside_repository_fails() {
    let temp_dir = TempDir::new().unwrap();
    let issues = temp_dir.path().join("issues.json");
    fs::write(&issues, "[]").unwrap();

    let mut cmd = Command::cargo_bin("branch-triage").unwrap();
    cmd.env_remove("BRANCH_TRIAGE_CONFIG")
        .args(["analyze", "--repo"])
        .arg(temp_dir.path())
        .arg("--issues")
        .arg(&issues)
        .assert()
        .failure();
}

#[test]
fn test_analyze_reports_on_fresh_repository() {
    let temp_dir = TempDir::new().unwrap();
    let mut opts = git2::RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = git2::Repository::init_opts(temp_dir.path(), &opts).unwrap();
    let signature = git2::Signature::now("Test", "test@example.com").unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    repo.commit(Some("HEAD"), &signature, &signature, "init", &tree, &[]).unwrap();

    let issues = temp_dir.path().join("issues.json");
    fs::write(&issues, r#"[{"id": 1, "title": "First", "state": "open", "priority": "low"}]"#).unwrap();

    let mut cmd = Command::cargo_bin("branch-triage").unwrap();
    cmd.env_remove("BRANCH_TRIAGE_CONFIG")
        .args(["analyze", "--format", "json", "--repo"])
        .arg(temp_dir.path())
        .arg("--issues")
        .arg(&issues)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"baseBranch\": \"main\""))
        .stdout(predicate::str::contains("\"unassignedIssues\""));
}

#[test]
fn test_analyze_tolerates_unknown_and_broken_issue_records() {
    let temp_dir = TempDir::new().unwrap();
    let mut opts = git2::RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = git2::Repository::init_opts(temp_dir.path(), &opts).unwrap();
    let signature = git2::Signature::now("Test", "test@example.com").unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    repo.commit(Some("HEAD"), &signature, &signature, "init", &tree, &[]).unwrap();

    let issues = temp_dir.path().join("issues.json");
    fs::write(
        &issues,
        r#"[
            {"id": 1, "title": "Urgent", "state": "open", "priority": "urgent"},
            {"id": 2, "title": "Nulls", "state": null, "priority": null},
            {"id": 3, "title": 5}
        ]"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("branch-triage").unwrap();
    cmd.env_remove("BRANCH_TRIAGE_CONFIG")
        .args(["analyze", "--format", "json", "--repo"])
        .arg(temp_dir.path())
        .arg("--issues")
        .arg(&issues)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"#1\""))
        .stdout(predicate::str::contains("\"#2\""))
        .stdout(predicate::str::contains("\"#3\"").not());
}
