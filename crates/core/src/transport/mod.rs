//! # Transport
//!
//! The wire boundary between the controller and the analysis service.
//!
//! The controller only depends on [`AnalysisTransport`]; [`HttpTransport`]
//! is the production implementation over `reqwest`.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::controller::{classify, FailureCategory};

/// JSON body of `POST /analyze`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeBody {
    pub idea: String,
    pub industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_api_key: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The service answered with a non-success status
    #[error("analysis service returned HTTP {status}")]
    Status { status: u16, body: String },
    /// No response was received (connect failure, timeout, reset)
    #[error("network: {0}")]
    Network(String),
    /// A success status carried a body that is not JSON
    #[error("invalid response body: {0}")]
    InvalidBody(String),
    /// The HTTP client could not be built
    #[error("client: {0}")]
    Client(String),
}

impl TransportError {
    /// Whether the failure is transport-level rather than an HTTP status
    pub fn is_transport_level(&self) -> bool {
        !matches!(self, TransportError::Status { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn category(&self) -> FailureCategory {
        classify(self.status().unwrap_or(0), self.is_transport_level())
    }
}

/// Something that can carry one analysis request to the service
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Send the request and return the raw JSON payload of a success response
    async fn analyze(&self, body: &AnalyzeBody) -> Result<serde_json::Value, TransportError>;
}
