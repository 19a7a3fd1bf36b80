//! # aira-classifier — Risk Tier Classification
//!
//! Maps the collected assessment answers to one of four risk tiers with a
//! rationale. The decision procedure is a fixed priority order with
//! short-circuit evaluation (see [`engine`]); it is a pure function of its
//! input and the supplied evaluation time, so it can be called from any
//! number of threads.
//!
//! ## Modules
//!
//! - [`input`]: typed projection of the answers the rules read.
//! - [`engine`]: the rule evaluation.
//! - [`result`]: [`ClassificationResult`], rule identifiers, and
//!   validation of results received from a remote registry.
//! - [`report`]: the exported report with checklist and timeline.
//!
//! ## Crate Policy
//!
//! - Depends only on `aira-core` within the workspace.
//! - Every `match` on a taxonomy enum is exhaustive.

pub mod engine;
pub mod error;
pub mod input;
pub mod report;
pub mod result;

pub use engine::classify;
pub use error::ClassificationError;
pub use input::ClassificationInput;
pub use report::{ComplianceReport, Milestone, ReadinessSummary, ReportError, Urgency};
pub use result::{ClassificationResult, RemoteClassification, ReportedFlags, RuleId};
