//! # Request Controller
//!
//! Owns the analysis-request lifecycle.
//!
//! ```text
//! Idle --submit--> InFlight --ok--> Succeeded --dismiss--> Idle
//!                     |
//!                     +--err--> Failed --dismiss--> Idle
//!                                 |
//!                                 +--retry_with_credential (quota only)--> InFlight
//! ```

pub mod classify;
pub mod events;
mod request_controller;
pub mod state;

pub use classify::{classify, FailureCategory};
pub use events::{ControllerEvent, ControllerEventKind};
pub use request_controller::RequestController;
pub use state::{AnalysisRequest, FailureInfo, RequestState};

/// Why the controller refused to act. A refusal never changes state and
/// never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Refusal {
    #[error("idea must not be empty")]
    EmptyIdea,
    #[error("industry must not be empty")]
    EmptyIndustry,
    #[error("an analysis request is already in flight")]
    InFlight,
    #[error("retrying with a credential is only possible after a quota failure")]
    NotQuotaFailure,
    #[error("credential must not be empty")]
    EmptyCredential,
}
