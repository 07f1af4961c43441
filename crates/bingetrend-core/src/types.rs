//! Domain records exchanged between the agent service, the orchestrator, and
//! the enrichment step.
//!
//! Wire-facing types mirror the JSON shapes of the agent service and the log
//! stream; everything else is built locally.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Reads an explicit JSON `null` as `T::default()`.
///
/// `#[serde(default)]` only covers a missing key; upstream services also
/// send `null` for empty lists.
///
/// # Errors
///
/// Propagates the deserializer's error for any non-null value that is not a `T`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ---------------------------------------------------------------------------
// Queries and rows
// ---------------------------------------------------------------------------

/// One user-submitted line of trend keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrendQuery(pub String);

impl TrendQuery {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrendQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier tying a batch row to its log stream.
///
/// Built once per row from the run id and the row's position; it never
/// changes afterwards, so it doubles as the row's stable key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    #[must_use]
    pub fn for_row(run_id: impl std::fmt::Display, index: usize) -> Self {
        Self(format!("{run_id}-{index}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CorrelationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Processing,
    Completed,
    Errored,
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowStatus::Processing => write!(f, "processing"),
            RowStatus::Completed => write!(f, "completed"),
            RowStatus::Errored => write!(f, "error"),
        }
    }
}

/// Per-query result slot, mutated in place as the batch advances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendResult {
    pub query: TrendQuery,
    pub correlation_id: CorrelationId,
    pub status: RowStatus,
    pub outcome: Option<AnalysisOutcome>,
    pub processed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub logs: Vec<LogEntry>,
}

impl TrendResult {
    /// A slot in the `processing` state with nothing resolved yet.
    #[must_use]
    pub fn pending(query: TrendQuery, correlation_id: CorrelationId) -> Self {
        Self {
            query,
            correlation_id,
            status: RowStatus::Processing,
            outcome: None,
            processed_at: None,
            error: None,
            logs: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Agent analysis
// ---------------------------------------------------------------------------

/// Result of one agent analysis call (`TrendResponse` on the wire).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub success: bool,
    #[serde(default)]
    pub program_is_trending: Option<bool>,
    #[serde(default)]
    pub program: Option<Program>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    TrendingFound,
    NotTrending,
    NoProgramFound,
    AgentError,
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeKind::TrendingFound => write!(f, "Trending Found"),
            OutcomeKind::NotTrending => write!(f, "Not Trending"),
            OutcomeKind::NoProgramFound => write!(f, "No Program Found"),
            OutcomeKind::AgentError => write!(f, "Agent Error"),
        }
    }
}

impl AnalysisOutcome {
    /// Buckets the outcome the way results are reported to the user.
    #[must_use]
    pub fn classify(&self) -> OutcomeKind {
        if !self.success {
            OutcomeKind::AgentError
        } else if self.program_is_trending == Some(true) {
            OutcomeKind::TrendingFound
        } else if self.program.is_some() {
            OutcomeKind::NotTrending
        } else {
            OutcomeKind::NoProgramFound
        }
    }
}

/// Movie or show. Anything the agent labels other than `movie` is a show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ProgramKind {
    #[default]
    Movie,
    Show,
}

impl From<String> for ProgramKind {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("movie") {
            ProgramKind::Movie
        } else {
            ProgramKind::Show
        }
    }
}

impl std::str::FromStr for ProgramKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" => Ok(ProgramKind::Movie),
            "show" | "tv" => Ok(ProgramKind::Show),
            other => Err(format!("unknown program kind \"{other}\" (expected movie or show)")),
        }
    }
}

impl std::fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgramKind::Movie => write!(f, "Movie"),
            ProgramKind::Show => write!(f, "TV Show"),
        }
    }
}

/// A program identified by the agent, before enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub program_type: ProgramKind,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cast: Vec<String>,
    #[serde(default)]
    pub explanation_of_trend: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl Program {
    /// The IMDb id, or `None` when absent or blank (the agent sends `""`).
    #[must_use]
    pub fn external_id(&self) -> Option<&str> {
        self.imdb_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// `"{year}-01-01"` when a release year is known.
    #[must_use]
    pub fn release_date_from_year(&self) -> Option<String> {
        self.release_year.map(|y| format!("{y}-01-01"))
    }
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentSource {
    /// Merged with a successful metadata lookup.
    Tmdb,
    /// Built from the agent's program alone.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
}

/// Display-ready program record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedProgram {
    pub title: String,
    pub overview: String,
    pub tagline: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub runtime: Option<u32>,
    pub genres: Vec<String>,
    pub production_companies: Vec<String>,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
    pub tmdb_id: Option<i64>,
    pub source: EnrichmentSource,
}

impl EnrichedProgram {
    #[must_use]
    pub fn top_cast(&self, limit: usize) -> &[CastMember] {
        &self.cast[..self.cast.len().min(limit)]
    }

    /// First `limit` crew members credited with `job`.
    #[must_use]
    pub fn crew_with_job(&self, job: &str, limit: usize) -> Vec<&CrewMember> {
        self.crew
            .iter()
            .filter(|c| c.job.as_deref() == Some(job))
            .take(limit)
            .collect()
    }

    /// Year part of `release_date`, if any.
    #[must_use]
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .filter(|y| !y.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    #[serde(rename = "DEBUG", alias = "debug")]
    Debug,
    #[serde(rename = "INFO", alias = "info")]
    Info,
    #[serde(rename = "WARN", alias = "warn", alias = "WARNING", alias = "warning")]
    Warn,
    #[serde(rename = "ERROR", alias = "error")]
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level \"{other}\"")),
        }
    }
}

/// One structured record from the agent's log stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl LogEntry {
    /// Parses one text frame from the log stream.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the frame is not a log record.
    pub fn parse(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }

    /// `HH:MM:SS` for RFC 3339 or naive ISO timestamps; the raw text otherwise.
    #[must_use]
    pub fn time_of_day(&self) -> String {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return ts.format("%H:%M:%S").to_string();
        }
        if let Ok(ts) = NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
            return ts.format("%H:%M:%S").to_string();
        }
        self.timestamp.clone()
    }
}

// ---------------------------------------------------------------------------
// Trend fetch side channel
// ---------------------------------------------------------------------------

/// `trend_breakdown` arrives either as a list of terms or as one string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BreakdownField {
    List(Vec<String>),
    Text(String),
}

/// One trending-topic record from the trend-fetch service.
///
/// Unknown fields are kept so the record can be forwarded to the agent
/// unchanged alongside its query line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trends: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_breakdown: Option<BreakdownField>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TrendBreakdown {
    /// The query line submitted for this trend.
    #[must_use]
    pub fn query_text(&self) -> String {
        let breakdown = match &self.trend_breakdown {
            Some(BreakdownField::List(terms)) => terms
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            Some(BreakdownField::Text(text)) => text.trim().to_string(),
            None => String::new(),
        };
        if !breakdown.is_empty() {
            return breakdown;
        }
        match self.trends.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => "Unknown trend".to_string(),
        }
    }
}
