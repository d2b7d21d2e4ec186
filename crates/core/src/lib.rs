//! # FoundersLens Core
//!
//! Client-side core of FoundersLens: submits a business idea to the remote
//! analysis service, tracks the request lifecycle and turns the loosely-typed
//! reply into a report that presentation layers can render without checks.
//!
//! ## Architecture
//!
//! - `report/` - Normalized report types and the payload normalizer
//! - `controller/` - Request state machine, failure classification, events
//! - `transport/` - Wire boundary to the analysis service (`POST /analyze`)
//! - `config` - Service endpoint, timeout and default credential
//!
//! ## Usage
//!
//! ```rust,ignore
//! use founderslens_core::config::ClientConfig;
//! use founderslens_core::controller::{AnalysisRequest, RequestController, RequestState};
//!
//! let controller = RequestController::from_config(&ClientConfig::from_env()?)?;
//! controller.submit(AnalysisRequest::new("Meal kits for climbers", "Food")).await?;
//!
//! match controller.state().await {
//!     RequestState::Succeeded(report) => println!("{}", report.opportunity),
//!     RequestState::Failed(info) if info.category.allows_credential_retry() => {
//!         controller.retry_with_credential("sk-...").await?;
//!     }
//!     _ => {}
//! }
//! ```

pub mod config;
pub mod controller;
pub mod report;
pub mod transport;

pub use config::ClientConfig;
pub use controller::{
    AnalysisRequest, FailureCategory, FailureInfo, Refusal, RequestController, RequestState,
};
pub use report::Report;
