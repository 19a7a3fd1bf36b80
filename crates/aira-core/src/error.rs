//! # Error Types
//!
//! Errors raised while constructing the foundational types. Higher crates
//! define their own enums (`ClassificationError`, `WizardError`) and wrap
//! this one where a core constructor can fail.

use thiserror::Error;

/// Top-level error type for `aira-core` constructors and parsers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiraError {
    /// Step index outside the fixed 1..=10 range.
    #[error("step index {0} is outside 1..={max}", max = crate::step::STEP_COUNT)]
    StepOutOfRange(i64),

    /// An identifier string could not be parsed.
    #[error("invalid system identifier {0:?}")]
    InvalidSystemId(String),

    /// A timestamp string could not be parsed.
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// A taxonomy identifier (tier, practice, category…) was not recognised.
    #[error("unknown {kind} identifier {value:?}")]
    UnknownIdentifier {
        /// Which vocabulary was being parsed (e.g. "risk tier").
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}
