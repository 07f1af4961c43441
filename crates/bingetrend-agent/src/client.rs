//! HTTP client for the agent analysis service.

use std::time::Duration;

use bingetrend_core::{validate_trend_count, AnalysisOutcome, AppConfig, TrendBreakdown};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::batch::{AnalysisRequest, TrendAnalyzer};
use crate::error::AgentError;

/// Client for the agent service's REST endpoints.
pub struct AgentClient {
    client: Client,
    base_url: Url,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize)]
struct AnalyzeBody<'a> {
    keywords: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    trend_data: Option<&'a TrendBreakdown>,
}

#[derive(Serialize)]
struct FetchTrendsBody {
    top_n: u32,
}

#[derive(Deserialize)]
struct FetchTrendsResponse {
    success: bool,
    #[serde(default)]
    trends: Vec<TrendBreakdown>,
    #[serde(default)]
    error: Option<String>,
}

impl AgentClient {
    /// Builds a client from the application config.
    ///
    /// # Errors
    ///
    /// Same as [`AgentClient::with_base_url`].
    pub fn new(config: &AppConfig) -> Result<Self, AgentError> {
        Self::with_base_url(&config.api_url, config.agent_timeout_secs, &config.user_agent)
    }

    /// # Errors
    ///
    /// Returns [`AgentError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`AgentError::InvalidBaseUrl`] if `base_url` does not parse as an
    /// http(s) URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| AgentError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(AgentError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "expected an http or https URL".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Submits one query for analysis, tagged with its correlation id.
    ///
    /// A 2xx response with `success: false` is returned as an outcome, not an
    /// error; the caller classifies it.
    ///
    /// # Errors
    ///
    /// - [`AgentError::Api`] on a non-2xx status.
    /// - [`AgentError::Http`] on network failure or timeout.
    /// - [`AgentError::Deserialize`] if the body is not a trend response.
    pub async fn analyze_trends(
        &self,
        request: &AnalysisRequest<'_>,
    ) -> Result<AnalysisOutcome, AgentError> {
        let mut url = self.endpoint(&["api", "analyze-trends"]);
        url.query_pairs_mut()
            .append_pair("client_id", request.correlation_id.as_str());

        let body = AnalyzeBody {
            keywords: [request.query.as_str()],
            trend_data: request.trend_datum,
        };

        tracing::debug!(
            correlation_id = %request.correlation_id,
            with_trend_data = request.trend_datum.is_some(),
            "posting analysis request"
        );
        let response = self.client.post(url).json(&body).send().await?;
        Self::decode(response, "analyze-trends").await
    }

    /// # Errors
    ///
    /// Returns [`AgentError`] when the service is unreachable or unhealthy.
    pub async fn health_check(&self) -> Result<HealthStatus, AgentError> {
        let response = self.client.get(self.endpoint(&["health"])).send().await?;
        Self::decode(response, "health").await
    }

    /// Asks the service for the current top `count` trends.
    ///
    /// # Errors
    ///
    /// - [`AgentError::Input`] if `count` is outside `1..=100`; no request is sent.
    /// - [`AgentError::Rejected`] if the service reports `success: false`.
    /// - Any other [`AgentError`] from the request.
    pub async fn fetch_trends(&self, count: u32) -> Result<Vec<TrendBreakdown>, AgentError> {
        let top_n = validate_trend_count(count)?;
        let url = self.endpoint(&["api", "fetch-google-trends"]);
        let response = self
            .client
            .post(url)
            .json(&FetchTrendsBody { top_n })
            .send()
            .await?;
        let parsed: FetchTrendsResponse = Self::decode(response, "fetch-google-trends").await?;

        if !parsed.success {
            return Err(AgentError::Rejected(
                parsed
                    .error
                    .unwrap_or_else(|| "trend fetch failed".to_owned()),
            ));
        }
        tracing::info!(requested = top_n, received = parsed.trends.len(), "fetched trends");
        Ok(parsed.trends)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Maps non-2xx to [`AgentError::Api`] and parses 2xx bodies as `T`.
    async fn decode<T: DeserializeOwned>(
        response: Response,
        context: &str,
    ) -> Result<T, AgentError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AgentError::Api {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| AgentError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

impl TrendAnalyzer for AgentClient {
    async fn analyze(&self, request: &AnalysisRequest<'_>) -> Result<AnalysisOutcome, AgentError> {
        self.analyze_trends(request).await
    }
}

/// FastAPI-style `{"detail": ".."}`, else the raw body, else a placeholder.
fn error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| match v.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        });
    match detail {
        Some(d) => d,
        None if body.trim().is_empty() => "no error detail".to_owned(),
        None => body.trim().to_owned(),
    }
}
