//! `import-csv` and `fetch-trends`: preview query lines without analyzing them.

use std::path::Path;

use bingetrend_agent::AgentClient;
use bingetrend_core::{extract_trends, AppConfig};

use crate::analyze::read_text;

/// Prints the `Trend breakdown` value of every data row, one per line.
///
/// # Errors
///
/// Returns an error if the file cannot be read, lacks the column, or has no
/// usable rows.
pub(crate) fn run_import_csv(path: &Path) -> anyhow::Result<()> {
    let trends = extract_trends(&read_text(path)?)?;
    tracing::info!(path = %path.display(), count = trends.len(), "imported trends");
    for trend in &trends {
        println!("{trend}");
    }
    Ok(())
}

/// Prints the query line derived from each of the top `count` trends.
///
/// # Errors
///
/// Returns an error if `count` is outside 1..=100 (before any request) or the
/// service fails or rejects the fetch.
pub(crate) async fn run_fetch_trends(config: &AppConfig, count: u32) -> anyhow::Result<()> {
    let client = AgentClient::new(config)?;
    let trends = client.fetch_trends(count).await?;
    if trends.is_empty() {
        println!("no trends returned");
        return Ok(());
    }
    for trend in &trends {
        println!("{}", trend.query_text());
    }
    Ok(())
}
