use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Initialize tracing on stderr.
///
/// `RUST_LOG` drives the filter and defaults to `info`. With `json` set every
/// event is emitted as one JSON object carrying the current span fields, so
/// the correlation id of a run travels with each line.
pub fn init_telemetry(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    tracing::debug!("Telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the events of one run
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn create_reconciliation_span(correlation_id: &str, branch_count: usize, current_branch: Option<&str>) -> tracing::Span {
    tracing::info_span!(
        "branch_reconciliation",
        correlation.id = correlation_id,
        branch.count = branch_count,
        branch.current = current_branch,
    )
}
