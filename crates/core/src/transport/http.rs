//! # HTTP Transport
//!
//! `reqwest`-backed client for the analysis service.

use async_trait::async_trait;
use serde_json::Value;

use super::{AnalysisTransport, AnalyzeBody, TransportError};
use crate::config::ClientConfig;

/// Talks to a live analysis service over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    analyze_url: String,
    health_url: String,
}

impl HttpTransport {
    /// Build a transport with the configured timeout
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("founderslens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            analyze_url: config.analyze_url(),
            health_url: config.health_url(),
        })
    }

    /// Call the service's health check and return whatever JSON it answers with
    pub async fn health(&self) -> Result<Value, TransportError> {
        let response = self
            .client
            .get(&self.health_url)
            .send()
            .await
            .map_err(network_error)?;
        read_json(response).await
    }
}

#[async_trait]
impl AnalysisTransport for HttpTransport {
    #[tracing::instrument(skip(self, body), fields(url = %self.analyze_url, with_key = body.custom_api_key.is_some()))]
    async fn analyze(&self, body: &AnalyzeBody) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(&self.analyze_url)
            .json(body)
            .send()
            .await
            .map_err(network_error)?;
        read_json(response).await
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, TransportError> {
    let status = response.status();
    if !status.is_success() {
        // 429 bodies are not guaranteed to be JSON; keep them as text for logs only
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "Analysis service returned an error status");
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await.map_err(network_error)?;
    serde_json::from_slice(&bytes).map_err(|e| TransportError::InvalidBody(e.to_string()))
}

fn network_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Network(format!("request timed out: {}", e))
    } else {
        TransportError::Network(e.to_string())
    }
}
