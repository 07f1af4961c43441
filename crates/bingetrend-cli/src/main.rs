mod analyze;
mod enrich;
mod logs;
mod output;
mod trends;

use std::path::PathBuf;

use bingetrend_core::ProgramKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::logs::LogsCommands;

#[derive(Debug, Parser)]
#[command(name = "bingetrend")]
#[command(about = "Trend-to-program analysis from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a batch of trend queries, one per line
    Analyze {
        /// Read queries from a text file (default: stdin)
        #[arg(long, group = "source")]
        input: Option<PathBuf>,
        /// Read queries from the `Trend breakdown` column of a trends CSV export
        #[arg(long, group = "source")]
        csv: Option<PathBuf>,
        /// Fetch the current top N trends and analyze those
        #[arg(long, group = "source", value_name = "N")]
        fetch: Option<u32>,
        /// Do not attach to the agent log stream
        #[arg(long)]
        no_logs: bool,
        /// Enrich every matched program with TMDB metadata
        #[arg(long)]
        enrich: bool,
        /// Write each row's log buffer to DIR/{correlation_id}.json
        #[arg(long, value_name = "DIR")]
        logs_dir: Option<PathBuf>,
    },
    /// Print the trends found in a trends CSV export
    ImportCsv {
        file: PathBuf,
    },
    /// Print query lines for the current top trends
    FetchTrends {
        /// Number of trends to fetch (1-100)
        #[arg(long, default_value = "10")]
        count: u32,
    },
    /// Enrich one program with TMDB metadata
    Enrich {
        /// IMDb id (e.g. tt15239678)
        #[arg(long)]
        imdb_id: String,
        /// movie or show
        #[arg(long, default_value = "movie")]
        kind: ProgramKind,
        /// Title to fall back on
        #[arg(long)]
        title: String,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Browse saved or live agent logs
    Logs {
        #[command(subcommand)]
        command: LogsCommands,
    },
    /// Check that the agent service is up
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = bingetrend_core::load_app_config()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Analyze {
            input,
            csv,
            fetch,
            no_logs,
            enrich,
            logs_dir,
        }) => {
            let source = analyze::QuerySource::from_flags(input, csv, fetch);
            let options = analyze::AnalyzeOptions {
                attach_logs: !no_logs,
                enrich,
                logs_dir,
            };
            analyze::run_analyze(&config, source, &options).await?;
        }
        Some(Commands::ImportCsv { file }) => trends::run_import_csv(&file)?,
        Some(Commands::FetchTrends { count }) => trends::run_fetch_trends(&config, count).await?,
        Some(Commands::Enrich {
            imdb_id,
            kind,
            title,
            year,
            description,
        }) => {
            let request = enrich::EnrichRequest {
                imdb_id,
                kind,
                title,
                year,
                description,
            };
            enrich::run_enrich(&config, request).await?;
        }
        Some(Commands::Logs { command }) => logs::run_logs(&config, command).await?,
        Some(Commands::Health) => run_health(&config).await?,
        None => println!("bingetrend ready; run `bingetrend --help` for commands"),
    }

    Ok(())
}

async fn run_health(config: &bingetrend_core::AppConfig) -> anyhow::Result<()> {
    let client = bingetrend_agent::AgentClient::new(config)?;
    let health = client.health_check().await.map_err(|e| {
        anyhow::anyhow!("agent service at {} is unreachable: {e}", config.api_url)
    })?;
    if health.message.is_empty() {
        println!("{}", health.status);
    } else {
        println!("{}: {}", health.status, health.message);
    }
    Ok(())
}
