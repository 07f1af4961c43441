//! `analyze`: run a batch of queries through the agent, one at a time.
//!
//! Per-row failures are reported in the row and never abort the run; only
//! bad input or an unreachable trend-fetch service stops before the batch.

use std::io::Read;
use std::path::{Path, PathBuf};

use bingetrend_agent::{AgentClient, BatchRun, LogRelay};
use bingetrend_core::{extract_trends, AppConfig, TrendQuery, TrendResult};
use bingetrend_tmdb::{enrich_program, TmdbClient};

use crate::output::{format_enriched, format_row, format_summary};

/// Where the batch's query lines come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QuerySource {
    Stdin,
    File(PathBuf),
    Csv(PathBuf),
    Fetch(u32),
}

impl QuerySource {
    /// clap's `source` group guarantees at most one flag is set.
    pub(crate) fn from_flags(
        input: Option<PathBuf>,
        csv: Option<PathBuf>,
        fetch: Option<u32>,
    ) -> Self {
        match (input, csv, fetch) {
            (Some(path), _, _) => Self::File(path),
            (_, Some(path), _) => Self::Csv(path),
            (_, _, Some(count)) => Self::Fetch(count),
            _ => Self::Stdin,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AnalyzeOptions {
    pub attach_logs: bool,
    pub enrich: bool,
    pub logs_dir: Option<PathBuf>,
}

pub(crate) fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))
}

/// Builds the run for `source`. Only `Fetch` carries side-channel data.
async fn prepare_run(client: &AgentClient, source: &QuerySource) -> anyhow::Result<BatchRun> {
    let run = match source {
        QuerySource::Stdin => {
            let mut block = String::new();
            std::io::stdin()
                .read_to_string(&mut block)
                .map_err(|e| anyhow::anyhow!("failed to read queries from stdin: {e}"))?;
            BatchRun::from_block(&block, Vec::new())?
        }
        QuerySource::File(path) => BatchRun::from_block(&read_text(path)?, Vec::new())?,
        QuerySource::Csv(path) => {
            let trends = extract_trends(&read_text(path)?)?;
            println!("imported {} trends from {}", trends.len(), path.display());
            BatchRun::from_block(&trends.join("\n"), Vec::new())?
        }
        QuerySource::Fetch(count) => {
            let trends = client.fetch_trends(*count).await?;
            if trends.is_empty() {
                anyhow::bail!("trend fetch returned no trends");
            }
            let queries = trends.iter().map(|t| TrendQuery(t.query_text())).collect();
            println!("fetched {} trends", trends.len());
            BatchRun::prepare(queries, trends)
        }
    };
    Ok(run)
}

fn write_logs(dir: &Path, row: &TrendResult) -> anyhow::Result<PathBuf> {
    let path = dir.join(format!("{}.json", row.correlation_id));
    let body = serde_json::to_string_pretty(&row.logs)?;
    std::fs::write(&path, body)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
    Ok(path)
}

/// Runs the whole batch, printing each row as it resolves.
///
/// # Errors
///
/// Returns an error for unreadable or empty input, a CSV without the trend
/// column, a rejected trend fetch, or an unwritable logs directory. Analysis
/// failures are recorded per row instead.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    source: QuerySource,
    options: &AnalyzeOptions,
) -> anyhow::Result<()> {
    let client = AgentClient::new(config)?;
    let relay = if options.attach_logs {
        Some(LogRelay::new(&config.logs_ws_url)?)
    } else {
        None
    };
    if let Some(dir) = &options.logs_dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| anyhow::anyhow!("failed to create {}: {e}", dir.display()))?;
    }

    let mut run = prepare_run(&client, &source).await?;
    let total = run.len();
    println!("analyzing {total} queries (run {})", run.run_id());

    let mut position = 0;
    run.run_to_completion(&client, relay.as_ref(), |row| {
        position += 1;
        println!("{}", format_row(position, total, row));
    })
    .await;

    if let Some(dir) = &options.logs_dir {
        for row in run.results().filter(|r| !r.logs.is_empty()) {
            match write_logs(dir, row) {
                Ok(path) => tracing::debug!(path = %path.display(), "wrote log buffer"),
                Err(e) => tracing::warn!(
                    correlation_id = %row.correlation_id,
                    error = %e,
                    "could not save logs"
                ),
            }
        }
    }

    if options.enrich {
        let tmdb = TmdbClient::from_config(config)?;
        if tmdb.is_none() {
            tracing::info!("TMDB_API_KEY not set; enrichment will use agent data only");
        }
        for program in run
            .results()
            .filter_map(|r| r.outcome.as_ref())
            .filter_map(|o| o.program.as_ref())
        {
            let enriched = enrich_program(tmdb.as_ref(), program).await;
            println!();
            println!("{}", format_enriched(&enriched, &config.tmdb_image_base_url));
        }
    }

    println!();
    println!("{}", format_summary(&run.summary()));
    Ok(())
}
