//! # Persistence Gateway
//!
//! The contract the step controller consumes for remote storage. The wizard
//! never implements storage itself; it calls three operations and treats
//! each as fallible:
//!
//! | Operation | Purpose |
//! |-----------|---------|
//! | [`AssessmentGateway::fetch`] | Load the stored session snapshot |
//! | [`AssessmentGateway::save`] | Write one step's answers, final or draft |
//! | [`AssessmentGateway::classify`] | Ask the remote side to classify |
//!
//! Nothing here retries. A failed call surfaces as [`PersistenceError`] and
//! the caller decides whether to issue it again.
//!
//! Snapshots are loose by nature: registries report completed steps as a
//! list, as a count, or as `step_<n>_completed` flags. [`CompletedSteps`]
//! absorbs all three.

use std::collections::BTreeSet;
use std::future::Future;

use aira_classifier::RemoteClassification;
use aira_core::{AnswerRecord, StepIndex, SystemId, Timestamp, STEP_COUNT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// ─── Errors ─────────────────────────────────────────────────────────────

/// Transport or storage failure reported by a gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The system is not known to the store.
    #[error("system {0} not found")]
    NotFound(SystemId),

    /// The request did not complete (connection, timeout, I/O).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The store answered with a rejection.
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The store answered with something that is not a valid response.
    #[error("unexpected response: {0}")]
    Protocol(String),
}

impl PersistenceError {
    /// Message safe to show to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "The assessment could not be found.",
            _ => "The assessment could not be saved or loaded. Please try again.",
        }
    }
}

// ─── Snapshot ───────────────────────────────────────────────────────────

/// Completed steps as reported by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompletedSteps {
    /// Explicit step indices.
    List(BTreeSet<StepIndex>),
    /// A count `n` meaning steps `1..=n`.
    Count(u8),
}

impl Default for CompletedSteps {
    fn default() -> Self {
        Self::List(BTreeSet::new())
    }
}

impl CompletedSteps {
    /// Resolve to explicit step indices. Counts above ten are clamped.
    pub fn resolve(&self) -> BTreeSet<StepIndex> {
        match self {
            Self::List(steps) => steps.clone(),
            Self::Count(n) => StepIndex::all().take(usize::from((*n).min(STEP_COUNT))).collect(),
        }
    }

    /// Derive from `step_<n>_completed` boolean flags in a flat record.
    pub fn from_flags(record: &Map<String, Value>) -> Self {
        Self::List(
            StepIndex::all()
                .filter(|s| record.get(&format!("step_{s}_completed")) == Some(&Value::Bool(true)))
                .collect(),
        )
    }
}

/// A session as stored remotely, before hydration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub system_id: Option<SystemId>,
    #[serde(default)]
    pub current_step: Option<StepIndex>,
    #[serde(default)]
    pub completed_steps: CompletedSteps,
    #[serde(default)]
    pub draft_steps: BTreeSet<StepIndex>,
    /// Flattened raw answers across all steps.
    #[serde(default)]
    pub answers: Map<String, Value>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

// ─── Writes ─────────────────────────────────────────────────────────────

/// One step's answers to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepWrite {
    pub step: StepIndex,
    pub data: AnswerRecord,
    pub is_draft: bool,
}

/// Acknowledgement of a [`StepWrite`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveAck {
    /// Store-side modification time, when reported.
    pub updated_at: Option<Timestamp>,
}

// ─── Trait ──────────────────────────────────────────────────────────────

/// Remote storage for assessment sessions.
///
/// Returned futures are `Send` so controllers can run on a multi-threaded
/// runtime. Implementations may use `async fn`.
pub trait AssessmentGateway {
    /// Load the stored session of `system_id`.
    fn fetch(
        &self,
        system_id: SystemId,
    ) -> impl Future<Output = Result<SessionSnapshot, PersistenceError>> + Send;

    /// Persist one step's answers.
    fn save(
        &self,
        system_id: SystemId,
        write: &StepWrite,
    ) -> impl Future<Output = Result<SaveAck, PersistenceError>> + Send;

    /// Classify remotely. The result is unvalidated.
    fn classify(
        &self,
        system_id: SystemId,
    ) -> impl Future<Output = Result<RemoteClassification, PersistenceError>> + Send;
}
