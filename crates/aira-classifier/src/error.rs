//! Classification failures.

use aira_core::StepIndex;
use thiserror::Error;

/// Errors raised by the classification engine and by validation of
/// classification results received from a remote registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// A field the rules depend on was never answered. This is distinct
    /// from a field answered negatively.
    #[error(
        "classification incomplete: complete step(s) {} first (missing: {})",
        join_steps(.missing_steps),
        .missing_fields.join(", ")
    )]
    Incomplete {
        /// Unanswered field names, in rule order.
        missing_fields: Vec<String>,
        /// Steps owning the missing fields, ascending.
        missing_steps: Vec<StepIndex>,
    },

    /// A field was answered with a value outside its option list.
    #[error("invalid answer for {field}: {value:?}")]
    InvalidAnswer { field: String, value: String },

    /// A remote classification lacked a required field or carried an
    /// unrecognised value.
    #[error("malformed classification result: {0}")]
    MalformedClassificationResult(String),
}

fn join_steps(steps: &[StepIndex]) -> String {
    steps
        .iter()
        .map(StepIndex::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
