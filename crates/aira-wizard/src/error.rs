//! Step controller errors.
//!
//! Validation failures are not errors: they come back as
//! [`crate::controller::StepOutcome::Rejected`] and never escape the step.

use aira_classifier::ClassificationError;
use aira_core::{StepIndex, SystemId};
use thiserror::Error;

use crate::gateway::PersistenceError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// No session has been loaded yet.
    #[error("no assessment session loaded")]
    NotHydrated,

    /// An operation named a system other than the loaded one.
    #[error("session belongs to system {loaded}, not {requested}")]
    SessionMismatch { loaded: SystemId, requested: SystemId },

    /// A step beyond the current step was submitted.
    #[error("step {step} cannot be submitted before step {current}")]
    StepOutOfOrder { step: StepIndex, current: StepIndex },

    /// `go_back` at the first step.
    #[error("already at the first step")]
    AtFirstStep,

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),
}
