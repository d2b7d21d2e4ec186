//! # Request State
//!
//! The lifecycle of one analysis request and the values it carries.

use serde::{Deserialize, Serialize};

use super::classify::FailureCategory;
use super::Refusal;
use crate::report::Report;

/// One submission: an idea, its industry and an optional credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub idea: String,
    pub industry: String,
    pub credential: Option<String>,
}

impl AnalysisRequest {
    pub fn new(idea: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            idea: idea.into(),
            industry: industry.into(),
            credential: None,
        }
    }

    /// Attach an explicit credential; blank keys are ignored
    pub fn with_credential(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.credential = (!key.trim().is_empty()).then(|| key.trim().to_string());
        self
    }

    /// Trim both fields and refuse the request if either ends up empty
    pub(crate) fn validated(self) -> Result<Self, Refusal> {
        let idea = self.idea.trim().to_string();
        let industry = self.industry.trim().to_string();

        if idea.is_empty() {
            return Err(Refusal::EmptyIdea);
        }
        if industry.is_empty() {
            return Err(Refusal::EmptyIndustry);
        }

        Ok(Self {
            idea,
            industry,
            credential: self.credential,
        })
    }
}

/// Category plus the message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureInfo {
    pub category: FailureCategory,
    pub message: String,
}

impl From<FailureCategory> for FailureInfo {
    fn from(category: FailureCategory) -> Self {
        Self {
            category,
            message: category.user_message().to_string(),
        }
    }
}

/// Where the controller is in the request lifecycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum RequestState {
    /// Waiting for a submission
    #[default]
    Idle,
    /// A request has been issued and not yet resolved
    InFlight,
    /// The last attempt produced a report
    Succeeded(Report),
    /// The last attempt failed
    Failed(FailureInfo),
}

impl RequestState {
    pub fn name(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::InFlight => "in_flight",
            RequestState::Succeeded(_) => "succeeded",
            RequestState::Failed(_) => "failed",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, RequestState::Idle)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestState::InFlight)
    }

    /// The report, when the last attempt succeeded
    pub fn report(&self) -> Option<&Report> {
        match self {
            RequestState::Succeeded(report) => Some(report),
            _ => None,
        }
    }

    /// The failure, when the last attempt failed
    pub fn failure(&self) -> Option<&FailureInfo> {
        match self {
            RequestState::Failed(info) => Some(info),
            _ => None,
        }
    }

    /// Whether retry-with-credential is currently allowed
    pub fn can_retry_with_credential(&self) -> bool {
        self.failure()
            .map(|info| info.category.allows_credential_retry())
            .unwrap_or(false)
    }
}
