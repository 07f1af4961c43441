use thiserror::Error;

/// Failures loading [`crate::AppConfig`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Failures extracting trend queries from uploaded CSV text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsvError {
    /// The header row has no column matching the expected label.
    #[error("CSV file must have a \"{expected}\" column")]
    MissingColumn { expected: String },

    /// The header matched but no row carried a usable value.
    #[error("no trend data found in the \"{column}\" column")]
    EmptyResult { column: String },
}

/// User input rejected before any network activity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("please enter some trending keywords")]
    EmptyQueryBlock,

    #[error("trend count {count} is out of range (expected {min}..={max})")]
    CountOutOfRange { count: u32, min: u32, max: u32 },
}
