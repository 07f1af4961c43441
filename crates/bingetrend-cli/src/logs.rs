//! `logs view` and `logs tail`: the log viewer over saved or live buffers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bingetrend_agent::LogRelay;
use bingetrend_core::{export_text, AppConfig, CorrelationId, LogEntry, LogFilter};
use clap::{Args, Subcommand};

use crate::analyze::read_text;

const TAIL_POLL: Duration = Duration::from_millis(250);

/// Sub-commands available under `logs`.
#[derive(Debug, Subcommand)]
pub enum LogsCommands {
    /// Filter a log buffer saved by `analyze --logs-dir`
    View {
        file: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Attach to the live log stream for a correlation id until Ctrl-C
    Tail {
        correlation_id: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Case-insensitive text matched against message and category
    #[arg(long)]
    pub search: Option<String>,
    /// DEBUG, INFO, WARN, ERROR or ALL
    #[arg(long, default_value = "ALL")]
    pub level: String,
    /// AGENT, ANALYSIS, SEARCH, ANALYZE, VALIDATE, MATCH, RESULT, ERROR or ALL
    #[arg(long, default_value = "ALL")]
    pub category: String,
}

impl FilterArgs {
    fn to_filter(&self) -> anyhow::Result<LogFilter> {
        LogFilter::from_args(
            self.search.as_deref(),
            Some(self.level.as_str()),
            Some(self.category.as_str()),
        )
        .map_err(|e| anyhow::anyhow!(e))
    }
}

/// # Errors
///
/// Returns an error for an unknown level, an unreadable buffer file, or a
/// log stream that cannot be attached.
pub(crate) async fn run_logs(config: &AppConfig, command: LogsCommands) -> anyhow::Result<()> {
    match command {
        LogsCommands::View { file, filter } => run_logs_view(&file, &filter.to_filter()?),
        LogsCommands::Tail {
            correlation_id,
            filter,
        } => {
            let filter = filter.to_filter()?;
            run_logs_tail(config, CorrelationId::from(correlation_id), &filter).await
        }
    }
}

fn load_saved(path: &Path) -> anyhow::Result<Vec<LogEntry>> {
    serde_json::from_str(&read_text(path)?)
        .map_err(|e| anyhow::anyhow!("{} is not a saved log buffer: {e}", path.display()))
}

fn run_logs_view(path: &Path, filter: &LogFilter) -> anyhow::Result<()> {
    let entries = load_saved(path)?;
    let matched = filter.apply(&entries);
    if !matched.is_empty() {
        println!("{}", export_text(matched.iter().copied()));
    }
    eprintln!("{} of {} entries", matched.len(), entries.len());
    Ok(())
}

/// Prints entries past `seen` that pass `filter`; returns the new high-water mark.
fn print_new(entries: &[LogEntry], seen: usize, filter: &LogFilter) -> usize {
    let fresh = entries.get(seen..).unwrap_or_default();
    let matched: Vec<&LogEntry> = fresh.iter().filter(|e| filter.matches(e)).collect();
    if !matched.is_empty() {
        println!("{}", export_text(matched));
    }
    entries.len()
}

async fn run_logs_tail(
    config: &AppConfig,
    correlation_id: CorrelationId,
    filter: &LogFilter,
) -> anyhow::Result<()> {
    let relay = LogRelay::new(&config.logs_ws_url)?;
    let subscription = relay.subscribe(&correlation_id).await?;
    tracing::info!(%correlation_id, "attached to log stream; Ctrl-C to stop");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ticker = tokio::time::interval(TAIL_POLL);
    let mut seen = 0;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                seen = print_new(&subscription.snapshot(), seen, filter);
            }
        }
    }

    let entries = subscription.close().await;
    print_new(&entries, seen, filter);
    eprintln!("{} entries received", entries.len());
    Ok(())
}
