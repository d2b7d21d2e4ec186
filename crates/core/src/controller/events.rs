//! # Controller Events
//!
//! Timestamped notifications of state transitions, for consumers that would
//! rather be told than poll.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classify::FailureCategory;

/// Kind of controller event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ControllerEventKind {
    /// A fresh submission entered InFlight
    Submitted,
    /// A quota failure is being retried with an alternate credential
    RetryRequested,
    /// The attempt produced a report
    Succeeded,
    /// The attempt failed
    Failed,
    /// A finished attempt was dismissed back to Idle
    Dismissed,
}

/// A transition of the request controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerEvent {
    /// Attempt number this event belongs to (1-based, per controller)
    pub attempt: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: ControllerEventKind,
    /// Set on `Failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<FailureCategory>,
}

impl ControllerEvent {
    pub fn new(kind: ControllerEventKind, attempt: u64) -> Self {
        Self {
            attempt,
            timestamp: Utc::now(),
            kind,
            category: None,
        }
    }

    /// Attach the failure category
    pub fn with_category(mut self, category: FailureCategory) -> Self {
        self.category = Some(category);
        self
    }
}
