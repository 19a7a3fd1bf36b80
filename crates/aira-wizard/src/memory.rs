//! # In-Memory Gateway
//!
//! An [`AssessmentGateway`] backed by a process-local map. It mirrors the
//! storage semantics of the remote registry closely enough to drive the
//! controller in tests and offline runs:
//!
//! - answers are stored flattened, as raw JSON;
//! - a final write marks the step complete, clears its draft marker and
//!   advances `current_step` to `max(current, step + 1)` capped at 10;
//! - a draft write stores the answers, sets the draft marker and withdraws
//!   the step from the completed set until it is submitted again.
//!
//! [`MemoryGateway::fail_next`] makes the next call fail, whatever it is.

use std::collections::{BTreeSet, HashMap};

use parking_lot::{Mutex, MutexGuard};

use aira_classifier::{classify, ClassificationInput, RemoteClassification};
use aira_core::{catalog, normalize_flat, StepIndex, SystemId, Timestamp};
use serde_json::{Map, Value};

use crate::gateway::{
    AssessmentGateway, CompletedSteps, PersistenceError, SaveAck, SessionSnapshot, StepWrite,
};

#[derive(Debug, Clone)]
struct StoredSession {
    current_step: StepIndex,
    completed: BTreeSet<StepIndex>,
    drafts: BTreeSet<StepIndex>,
    answers: Map<String, Value>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl StoredSession {
    fn new(now: Timestamp) -> Self {
        Self {
            current_step: StepIndex::FIRST,
            completed: BTreeSet::new(),
            drafts: BTreeSet::new(),
            answers: Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn snapshot(&self, system_id: SystemId) -> SessionSnapshot {
        SessionSnapshot {
            system_id: Some(system_id),
            current_step: Some(self.current_step),
            completed_steps: CompletedSteps::List(self.completed.clone()),
            draft_steps: self.drafts.clone(),
            answers: self.answers.clone(),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

#[derive(Debug, Default)]
struct Store {
    sessions: HashMap<SystemId, StoredSession>,
    classifications: HashMap<SystemId, RemoteClassification>,
    writes: Vec<(SystemId, StepWrite)>,
    fail_next: Option<PersistenceError>,
}

/// Process-local assessment store.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    store: Mutex<Store>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new system with an empty session at step 1.
    pub fn register(&self) -> SystemId {
        let id = SystemId::new();
        self.store.lock().sessions.insert(id, StoredSession::new(Timestamp::now()));
        id
    }

    /// Seed a session from a snapshot, replacing any existing one.
    pub fn insert_snapshot(&self, system_id: SystemId, snapshot: SessionSnapshot) {
        let now = Timestamp::now();
        let stored = StoredSession {
            current_step: snapshot.current_step.unwrap_or(StepIndex::FIRST),
            completed: snapshot.completed_steps.resolve(),
            drafts: snapshot.draft_steps,
            answers: snapshot.answers,
            created_at: snapshot.created_at.unwrap_or(now),
            updated_at: snapshot.updated_at.unwrap_or(now),
        };
        self.store.lock().sessions.insert(system_id, stored);
    }

    /// Make the next gateway call fail with `error`.
    pub fn fail_next(&self, error: PersistenceError) {
        self.store.lock().fail_next = Some(error);
    }

    /// Answer `classify` for `system_id` with a fixed remote record.
    pub fn set_classification(&self, system_id: SystemId, classification: RemoteClassification) {
        self.store.lock().classifications.insert(system_id, classification);
    }

    /// Every acknowledged write, oldest first.
    pub fn writes(&self) -> Vec<(SystemId, StepWrite)> {
        self.store.lock().writes.clone()
    }

    /// Lock and consume a pending injected failure.
    fn begin(&self) -> Result<MutexGuard<'_, Store>, PersistenceError> {
        let mut store = self.store.lock();
        match store.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(store),
        }
    }
}

impl AssessmentGateway for MemoryGateway {
    async fn fetch(&self, system_id: SystemId) -> Result<SessionSnapshot, PersistenceError> {
        let store = self.begin()?;
        store
            .sessions
            .get(&system_id)
            .map(|s| s.snapshot(system_id))
            .ok_or(PersistenceError::NotFound(system_id))
    }

    async fn save(&self, system_id: SystemId, write: &StepWrite) -> Result<SaveAck, PersistenceError> {
        let mut store = self.begin()?;
        let now = Timestamp::now();
        let session = store
            .sessions
            .get_mut(&system_id)
            .ok_or(PersistenceError::NotFound(system_id))?;

        for spec in catalog::step(write.step).fields {
            session.answers.remove(spec.name);
        }
        session.answers.extend(write.data.to_json_map());
        if write.is_draft {
            session.drafts.insert(write.step);
            session.completed.remove(&write.step);
        } else {
            session.completed.insert(write.step);
            session.drafts.remove(&write.step);
            let next = write.step.next().unwrap_or(StepIndex::LAST);
            session.current_step = session.current_step.max(next);
        }
        session.updated_at = now;
        store.writes.push((system_id, write.clone()));
        Ok(SaveAck { updated_at: Some(now) })
    }

    async fn classify(&self, system_id: SystemId) -> Result<RemoteClassification, PersistenceError> {
        let store = self.begin()?;
        if let Some(fixed) = store.classifications.get(&system_id) {
            return Ok(fixed.clone());
        }
        let session = store
            .sessions
            .get(&system_id)
            .ok_or(PersistenceError::NotFound(system_id))?;
        let answers = normalize_flat(&session.answers);
        let rejected = |e: aira_classifier::ClassificationError| PersistenceError::Rejected {
            status: 422,
            message: e.to_string(),
        };
        let input = ClassificationInput::from_answers(&answers).map_err(rejected)?;
        let result = classify(&input, Timestamp::now()).map_err(rejected)?;
        Ok(RemoteClassification {
            risk_level: Some(result.risk_tier.to_string()),
            primary_reason: Some(result.primary_reason.to_string()),
            confidence_level: Some(result.confidence_level.to_string()),
            prohibited_practice_violation: Some(result.prohibited_practice_violation()),
            category_match: Some(result.category_match()),
            has_exceptions: Some(result.has_exceptions),
            violated_practices: Some(result.violated_practices.iter().map(|p| p.to_string()).collect()),
            matched_categories: Some(result.matched_categories.iter().map(|c| c.to_string()).collect()),
            computed_at: Some(result.computed_at.to_iso8601()),
        })
    }
}
