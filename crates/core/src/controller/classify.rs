//! # Failure Classification
//!
//! Maps a failed attempt to the category that drives UI branching and
//! retry eligibility. Only the status code and the shape of the failure are
//! considered, never message text.

use serde::{Deserialize, Serialize};

/// Status the analysis service uses for rate limiting
pub const QUOTA_STATUS: u16 = 429;

/// Why an analysis attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Rate limited; recoverable with an alternate credential or by waiting
    QuotaExhausted,
    /// Anything else: non-success status, network failure, unreadable body
    TransportOrServerError,
}

impl FailureCategory {
    /// Message shown to the user for this category
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureCategory::QuotaExhausted => "Daily API Quota Exceeded",
            FailureCategory::TransportOrServerError => {
                "Failed to connect to the analysis engine. Please try again."
            }
        }
    }

    /// Whether retry-with-credential is offered for this category
    pub fn allows_credential_retry(&self) -> bool {
        matches!(self, FailureCategory::QuotaExhausted)
    }
}

/// Classify a failed attempt.
///
/// `threw_before_response` covers network errors, timeouts and unreadable
/// bodies; those never count as quota exhaustion whatever `http_status` says.
pub fn classify(http_status: u16, threw_before_response: bool) -> FailureCategory {
    if !threw_before_response && http_status == QUOTA_STATUS {
        FailureCategory::QuotaExhausted
    } else {
        FailureCategory::TransportOrServerError
    }
}
