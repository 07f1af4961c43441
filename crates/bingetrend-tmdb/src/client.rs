//! HTTP client for the TMDB v3 REST API.
//!
//! Wraps `reqwest` with TMDB status mapping, API key handling, retry on
//! transient failures and typed response deserialization.

use std::time::Duration;

use bingetrend_core::{AppConfig, ProgramKind};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::TmdbError;
use crate::retry::retry_with_backoff;
use crate::types::{FindResponse, TmdbDetails};

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const USER_AGENT: &str = "bingetrend/0.1 (metadata-enrichment)";
const DETAIL_APPENDS: &str = "credits,videos,images";

/// Client for the TMDB v3 API.
///
/// Use [`TmdbClient::new`] for production or [`TmdbClient::with_base_url`]
/// to point at a mock server in tests.
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl TmdbClient {
    /// Creates a client pointed at the production TMDB API.
    ///
    /// # Errors
    ///
    /// Returns [`TmdbError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, TmdbError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL. Retries are off until
    /// [`TmdbClient::with_retry`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`TmdbError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`TmdbError::InvalidBaseUrl`] if `base_url` is not an http(s) URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, TmdbError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        // Exactly one trailing slash so path segments append under `/3/`.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| TmdbError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(TmdbError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "expected an http or https URL".to_owned(),
            });
        }

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: parsed,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Builds a client from the application config, or `None` when no API
    /// key is configured.
    ///
    /// # Errors
    ///
    /// Same as [`TmdbClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, TmdbError> {
        let Some(api_key) = config.tmdb_api_key.as_deref() else {
            return Ok(None);
        };
        let client = Self::with_base_url(api_key, config.tmdb_timeout_secs, &config.tmdb_base_url)?
            .with_retry(config.tmdb_max_retries, config.tmdb_retry_backoff_base_ms);
        Ok(Some(client))
    }

    /// Looks up TMDB ids for an IMDb id.
    ///
    /// # Errors
    ///
    /// Any [`TmdbError`] from the request.
    pub async fn find_by_imdb_id(&self, imdb_id: &str) -> Result<FindResponse, TmdbError> {
        let url = self.build_url(&["find", imdb_id], &[("external_source", "imdb_id")]);
        self.get_json(&url, &format!("find({imdb_id})")).await
    }

    /// Fetches movie details with credits, videos and images appended.
    ///
    /// # Errors
    ///
    /// Any [`TmdbError`] from the request.
    pub async fn movie_details(&self, id: i64) -> Result<TmdbDetails, TmdbError> {
        let id = id.to_string();
        let url = self.build_url(&["movie", &id], &[("append_to_response", DETAIL_APPENDS)]);
        self.get_json(&url, &format!("movie {id}")).await
    }

    /// Fetches TV show details with credits, videos and images appended.
    ///
    /// # Errors
    ///
    /// Any [`TmdbError`] from the request.
    pub async fn tv_details(&self, id: i64) -> Result<TmdbDetails, TmdbError> {
        let id = id.to_string();
        let url = self.build_url(&["tv", &id], &[("append_to_response", DETAIL_APPENDS)]);
        self.get_json(&url, &format!("tv {id}")).await
    }

    /// Resolves an IMDb id to full details for the given program kind.
    ///
    /// Takes the first `movie_results` entry for movies and the first
    /// `tv_results` entry for shows.
    ///
    /// # Errors
    ///
    /// - [`TmdbError::NotFound`] if the find step has no match of that kind.
    /// - Any other [`TmdbError`] from either request.
    pub async fn lookup(&self, kind: ProgramKind, imdb_id: &str) -> Result<TmdbDetails, TmdbError> {
        let found = self.find_by_imdb_id(imdb_id).await?;
        let hit = match kind {
            ProgramKind::Movie => found.movie_results.first(),
            ProgramKind::Show => found.tv_results.first(),
        }
        .ok_or_else(|| TmdbError::NotFound {
            resource: format!("{kind} {imdb_id}"),
        })?;

        tracing::debug!(imdb_id, tmdb_id = hit.id, %kind, "resolved TMDB id");
        match kind {
            ProgramKind::Movie => self.movie_details(hit.id).await,
            ProgramKind::Show => self.tv_details(hit.id).await,
        }
    }

    /// Appends percent-encoded path segments and query parameters to the base
    /// URL. The API key always goes first.
    fn build_url(&self, segments: &[&str], extra: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, TmdbError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.get_once(url, context)
        })
        .await
    }

    /// Sends one GET and maps the HTTP status onto [`TmdbError`].
    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, TmdbError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            return serde_json::from_str(&body).map_err(|e| TmdbError::Deserialize {
                context: context.to_owned(),
                source: e,
            });
        }

        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();

        Err(match status {
            StatusCode::UNAUTHORIZED => TmdbError::Unauthorized,
            StatusCode::NOT_FOUND => TmdbError::NotFound {
                resource: context.to_owned(),
            },
            StatusCode::TOO_MANY_REQUESTS => TmdbError::RateLimited { retry_after_secs },
            other => TmdbError::UnexpectedStatus {
                status: other.as_u16(),
                message: status_message(&body),
            },
        })
    }
}

/// TMDB error bodies carry `{"status_message": "..."}`.
fn status_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("status_message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.trim().to_owned())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
