use bingetrend_core::InputError;
use thiserror::Error;

/// Errors from the agent analysis service. Any of these marks a batch row
/// as errored; none of them stops the batch.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Network failure, timeout or TLS error from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. `detail` comes from the `{"detail": ..}` body when present.
    #[error("agent service returned HTTP {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The service answered 2xx but reported `success: false`.
    #[error("agent service rejected the request: {0}")]
    Rejected(String),

    #[error("invalid agent base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error(transparent)]
    Input(#[from] InputError),
}

/// Errors from attaching to the log stream. Never fatal to analysis.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid log stream URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to connect to log stream {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: Box<tokio_tungstenite::tungstenite::Error>,
    },
}
