//! # Assessment Session
//!
//! The in-memory state of one assessment, keyed by [`SystemId`]. A session
//! is built once from a [`SessionSnapshot`] (hydration) and afterwards
//! changed only by the step controller, and only after the gateway has
//! acknowledged the corresponding write.
//!
//! Hydration is the normalization boundary: raw snapshot answers are folded
//! into canonical shapes here and nowhere else.

use std::collections::BTreeSet;

use aira_classifier::ClassificationResult;
use aira_core::catalog::CLASSIFICATION_STEPS;
use aira_core::{normalize_flat, AnswerRecord, AnswerSet, StepIndex, SystemId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::gateway::SessionSnapshot;

/// One assessment in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSession {
    pub system_id: SystemId,
    pub current_step: StepIndex,
    pub completed_steps: BTreeSet<StepIndex>,
    /// Steps whose stored answers come from a draft save.
    pub draft_steps: BTreeSet<StepIndex>,
    pub answers: AnswerSet,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    /// Most recent classification; replaced by the next run.
    pub last_classification: Option<ClassificationResult>,
}

impl AssessmentSession {
    /// A fresh session at step 1.
    pub fn new(system_id: SystemId) -> Self {
        Self {
            system_id,
            current_step: StepIndex::FIRST,
            completed_steps: BTreeSet::new(),
            draft_steps: BTreeSet::new(),
            answers: AnswerSet::new(),
            created_at: None,
            updated_at: None,
            last_classification: None,
        }
    }

    /// Hydrate from a stored snapshot.
    ///
    /// When the snapshot omits `current_step`, the session resumes after the
    /// highest completed step. A step reported as both complete and draft
    /// counts as draft.
    pub fn hydrate(system_id: SystemId, snapshot: SessionSnapshot) -> Self {
        let completed_steps: BTreeSet<StepIndex> = snapshot
            .completed_steps
            .resolve()
            .difference(&snapshot.draft_steps)
            .copied()
            .collect();
        let current_step = snapshot.current_step.unwrap_or_else(|| {
            completed_steps
                .iter()
                .next_back()
                .map(|s| s.next().unwrap_or(StepIndex::LAST))
                .unwrap_or(StepIndex::FIRST)
        });
        Self {
            system_id,
            current_step,
            completed_steps,
            draft_steps: snapshot.draft_steps,
            answers: normalize_flat(&snapshot.answers),
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            last_classification: None,
        }
    }

    pub fn is_complete(&self, step: StepIndex) -> bool {
        self.completed_steps.contains(&step)
    }

    pub fn is_draft(&self, step: StepIndex) -> bool {
        self.draft_steps.contains(&step)
    }

    /// Answers of one step, empty if none were saved.
    pub fn step_answers(&self, step: StepIndex) -> AnswerRecord {
        self.answers.step(step).cloned().unwrap_or_default()
    }

    /// Classification prerequisites that are not yet complete.
    pub fn missing_classification_steps(&self) -> Vec<StepIndex> {
        CLASSIFICATION_STEPS
            .iter()
            .copied()
            .filter(|s| !self.is_complete(*s))
            .collect()
    }

    /// Record an acknowledged final write of `step`.
    pub(crate) fn apply_final(&mut self, step: StepIndex, record: AnswerRecord, at: Option<Timestamp>) {
        self.answers.replace_step(step, record);
        self.completed_steps.insert(step);
        self.draft_steps.remove(&step);
        let next = step.next().unwrap_or(StepIndex::LAST);
        self.current_step = self.current_step.max(next);
        self.touch(at);
    }

    /// Record an acknowledged draft write of `step`.
    ///
    /// Draft answers are unvalidated, so the step is no longer complete until
    /// it is submitted again.
    pub(crate) fn apply_draft(&mut self, step: StepIndex, record: AnswerRecord, at: Option<Timestamp>) {
        self.answers.replace_step(step, record);
        self.draft_steps.insert(step);
        self.completed_steps.remove(&step);
        self.touch(at);
    }

    fn touch(&mut self, at: Option<Timestamp>) {
        if at.is_some() {
            self.updated_at = at;
        }
    }
}
