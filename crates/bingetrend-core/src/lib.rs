//! Domain types, configuration, and pure input handling for bingetrend.
//!
//! Nothing in this crate performs network I/O. The agent and metadata
//! clients live in `bingetrend-agent` and `bingetrend-tmdb`.

pub mod app_config;
pub mod config;
pub mod csv_import;
pub mod error;
pub mod keywords;
pub mod log_view;
pub mod types;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use csv_import::{extract_trends, parse_csv_line, TREND_BREAKDOWN_COLUMN};
pub use error::{ConfigError, CsvError, InputError};
pub use keywords::{parse_query_block, validate_trend_count, MAX_TREND_COUNT, MIN_TREND_COUNT};
pub use log_view::{export_text, LogFilter, KNOWN_CATEGORIES};
pub use types::{
    AnalysisOutcome, BreakdownField, CastMember, CorrelationId, CrewMember, EnrichedProgram,
    EnrichmentSource, LogEntry, LogLevel, OutcomeKind, Program, ProgramKind, RowStatus,
    TrendBreakdown, TrendQuery, TrendResult,
};
pub use types::null_as_default;
