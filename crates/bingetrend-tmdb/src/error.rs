use thiserror::Error;

/// Errors returned by the TMDB client.
///
/// None of these reach the user directly: [`crate::enrich_program`] turns
/// every failure into a fallback record.
#[derive(Debug, Error)]
pub enum TmdbError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API key was rejected (HTTP 401).
    #[error("TMDB rejected the API key")]
    Unauthorized,

    /// No record exists for the requested resource.
    #[error("TMDB has no record for {resource}")]
    NotFound { resource: String },

    /// HTTP 429 from the API.
    #[error("TMDB rate limit hit (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Any other non-2xx status, with TMDB's `status_message` when present.
    #[error("TMDB returned HTTP {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TMDB base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
