//! SpaceX v4 API client
//!
//! Two read-only endpoints: the launch history and the payload catalogue.
//! One request per call; no retry, no caching.

use landing_common::config::ApiConfig;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// SpaceX client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Payload entry from the payloads endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPayload {
    /// Payload id referenced by launch records
    pub id: String,
    /// Mass in kilograms
    #[serde(default)]
    pub mass_kg: Option<f64>,
    /// Orbit code (LEO, GTO, ISS, ...)
    #[serde(default)]
    pub orbit: Option<String>,
}

/// SpaceX API client
pub struct SpaceXClient {
    http_client: reqwest::Client,
    launches_url: String,
    payloads_url: String,
}

impl SpaceXClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            launches_url: config.launches_url.clone(),
            payloads_url: config.payloads_url.clone(),
        })
    }

    pub fn launches_url(&self) -> &str {
        &self.launches_url
    }

    pub fn payloads_url(&self) -> &str {
        &self.payloads_url
    }

    /// Fetch the full launch history as untyped JSON records
    pub async fn fetch_launches(&self) -> Result<Vec<serde_json::Value>, ClientError> {
        let launches: Vec<serde_json::Value> = self.get_json(&self.launches_url).await?;
        tracing::info!(count = launches.len(), "Retrieved launches from SpaceX API");
        Ok(launches)
    }

    /// Fetch every payload entry
    pub async fn fetch_payloads(&self) -> Result<Vec<RawPayload>, ClientError> {
        let payloads: Vec<RawPayload> = self.get_json(&self.payloads_url).await?;
        tracing::debug!(count = payloads.len(), "Retrieved payloads from SpaceX API");
        Ok(payloads)
    }

    async fn get_json<T>(&self, url: &str) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        tracing::debug!(url = %url, "Querying SpaceX API");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }
}
