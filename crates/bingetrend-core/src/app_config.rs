#[derive(Clone)]
pub struct AppConfig {
    /// Base URL of the agent analysis service (`http`/`https`).
    pub api_url: String,
    /// Base URL of the per-correlation-id log stream (`ws`/`wss`).
    pub logs_ws_url: String,
    pub agent_timeout_secs: u64,
    pub user_agent: String,
    pub log_level: String,
    /// TMDB v3 credential. Enrichment falls back to agent data when unset.
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub tmdb_timeout_secs: u64,
    pub tmdb_max_retries: u32,
    pub tmdb_retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_url", &self.api_url)
            .field("logs_ws_url", &self.logs_ws_url)
            .field("agent_timeout_secs", &self.agent_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("log_level", &self.log_level)
            .field(
                "tmdb_api_key",
                &self.tmdb_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("tmdb_base_url", &self.tmdb_base_url)
            .field("tmdb_image_base_url", &self.tmdb_image_base_url)
            .field("tmdb_timeout_secs", &self.tmdb_timeout_secs)
            .field("tmdb_max_retries", &self.tmdb_max_retries)
            .field(
                "tmdb_retry_backoff_base_ms",
                &self.tmdb_retry_backoff_base_ms,
            )
            .finish()
    }
}
