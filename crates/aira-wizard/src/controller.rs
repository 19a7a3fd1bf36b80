//! # Step Controller
//!
//! Drives one assessment session through the ten steps.
//!
//! ## States
//!
//! ```text
//! Pending ──load_session──▶ Ready(session)
//!                              │
//!                              ├─ go_next(step, raw)     validate, save, complete, advance
//!                              ├─ go_back()              current_step - 1, no write
//!                              ├─ save_draft(step, raw)  save as draft, no advance
//!                              └─ request_classification(id)
//! ```
//!
//! Every operation other than `load_session` fails with
//! [`WizardError::NotHydrated`] while pending.
//!
//! ## Acknowledged writes only
//!
//! The session changes only after the gateway call returns `Ok`. A gateway
//! failure, or a future dropped before completion, leaves the session at
//! its last acknowledged state: the step is not marked complete and
//! `current_step` does not move.
//!
//! ## Navigation
//!
//! `go_next` accepts any step up to `current_step`, so a user who went back
//! can resubmit an earlier step. `current_step` never decreases on a
//! submission: it becomes `max(current_step, step + 1)`, capped at 10.

use aira_classifier::{classify, ClassificationError, ClassificationInput, ClassificationResult};
use aira_core::catalog;
use aira_core::{normalize_step, StepIndex, SystemId, Timestamp};
use serde_json::{Map, Value};

use crate::derived::{banners, Banner};
use crate::error::WizardError;
use crate::gateway::{AssessmentGateway, StepWrite};
use crate::session::AssessmentSession;
use crate::validation::{validate_step, FieldErrors};

/// Hydration state of a controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Hydration {
    Pending,
    Ready(AssessmentSession),
}

/// Where classification runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassificationMode {
    /// Evaluate the engine over the session's answers.
    #[default]
    Local,
    /// Ask the gateway and validate its answer.
    Remote,
}

/// Result of submitting a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Saved, marked complete; the session now sits at `current_step`.
    Advanced { current_step: StepIndex },
    /// Validation failed; nothing was saved.
    Rejected(FieldErrors),
}

/// Orchestrates a single assessment session against a gateway.
#[derive(Debug)]
pub struct StepController<G> {
    gateway: G,
    mode: ClassificationMode,
    state: Hydration,
}

impl<G: AssessmentGateway> StepController<G> {
    pub fn new(gateway: G, mode: ClassificationMode) -> Self {
        Self {
            gateway,
            mode,
            state: Hydration::Pending,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }

    pub fn mode(&self) -> ClassificationMode {
        self.mode
    }

    pub fn hydration(&self) -> &Hydration {
        &self.state
    }

    pub fn is_hydrated(&self) -> bool {
        matches!(self.state, Hydration::Ready(_))
    }

    /// The loaded session.
    pub fn session(&self) -> Result<&AssessmentSession, WizardError> {
        match &self.state {
            Hydration::Ready(session) => Ok(session),
            Hydration::Pending => Err(WizardError::NotHydrated),
        }
    }

    fn session_mut(&mut self) -> Result<&mut AssessmentSession, WizardError> {
        match &mut self.state {
            Hydration::Ready(session) => Ok(session),
            Hydration::Pending => Err(WizardError::NotHydrated),
        }
    }

    /// Fetch and hydrate the session of `system_id`, replacing any loaded one.
    ///
    /// On failure the previous state is kept.
    pub async fn load_session(&mut self, system_id: SystemId) -> Result<&AssessmentSession, WizardError> {
        let snapshot = self.gateway.fetch(system_id).await.map_err(|e| {
            tracing::warn!(%system_id, error = %e, "session fetch failed");
            e
        })?;
        if let Some(reported) = snapshot.system_id.filter(|id| *id != system_id) {
            tracing::warn!(%system_id, %reported, "snapshot reports a different system id");
        }
        let session = AssessmentSession::hydrate(system_id, snapshot);
        tracing::info!(
            %system_id,
            current_step = session.current_step.get(),
            completed = session.completed_steps.len(),
            "session hydrated"
        );
        self.state = Hydration::Ready(session);
        self.session()
    }

    /// Normalize, validate and save `step`, then advance.
    pub async fn go_next(&mut self, step: StepIndex, raw: &Map<String, Value>) -> Result<StepOutcome, WizardError> {
        let session = self.session()?;
        let system_id = session.system_id;
        if step > session.current_step {
            return Err(WizardError::StepOutOfOrder {
                step,
                current: session.current_step,
            });
        }

        let record = normalize_step(step, raw);
        let errors = validate_step(step, &record);
        if !errors.is_empty() {
            tracing::debug!(%system_id, step = step.get(), fields = ?errors.keys().collect::<Vec<_>>(), "step rejected");
            return Ok(StepOutcome::Rejected(errors));
        }

        let write = StepWrite { step, data: record, is_draft: false };
        let ack = self.gateway.save(system_id, &write).await.map_err(|e| {
            tracing::warn!(%system_id, step = step.get(), error = %e, "step save failed");
            e
        })?;

        let session = self.session_mut()?;
        session.apply_final(step, write.data, ack.updated_at);
        tracing::info!(%system_id, step = step.get(), current_step = session.current_step.get(), "step completed");
        Ok(StepOutcome::Advanced { current_step: session.current_step })
    }

    /// Move back one step. No validation, no write.
    pub fn go_back(&mut self) -> Result<StepIndex, WizardError> {
        let session = self.session_mut()?;
        let prev = session.current_step.prev().ok_or(WizardError::AtFirstStep)?;
        session.current_step = prev;
        Ok(prev)
    }

    /// Save `step` as a draft. Validity is not required and `current_step`
    /// does not move. A completed step saved as draft must be submitted again
    /// before it counts toward classification.
    pub async fn save_draft(&mut self, step: StepIndex, raw: &Map<String, Value>) -> Result<(), WizardError> {
        let system_id = self.session()?.system_id;
        let write = StepWrite {
            step,
            data: normalize_step(step, raw),
            is_draft: true,
        };
        let ack = self.gateway.save(system_id, &write).await.map_err(|e| {
            tracing::warn!(%system_id, step = step.get(), error = %e, "draft save failed");
            e
        })?;
        self.session_mut()?.apply_draft(step, write.data, ack.updated_at);
        tracing::info!(%system_id, step = step.get(), "draft saved");
        Ok(())
    }

    /// Classify the loaded session, replacing any earlier result.
    ///
    /// Steps 4 to 7 must be complete first.
    pub async fn request_classification(
        &mut self,
        system_id: SystemId,
    ) -> Result<&ClassificationResult, WizardError> {
        let session = self.session()?;
        if session.system_id != system_id {
            return Err(WizardError::SessionMismatch {
                loaded: session.system_id,
                requested: system_id,
            });
        }
        let missing_steps = session.missing_classification_steps();
        if !missing_steps.is_empty() {
            let missing_fields = missing_steps
                .iter()
                .flat_map(|step| {
                    let answers = session.step_answers(*step);
                    catalog::step(*step)
                        .fields
                        .iter()
                        .filter(move |f| f.is_required_in(&answers) && !answers.contains(f.name))
                        .map(|f| f.name.to_string())
                        .collect::<Vec<_>>()
                })
                .collect();
            return Err(ClassificationError::Incomplete {
                missing_fields,
                missing_steps,
            }
            .into());
        }

        let result = match self.mode {
            ClassificationMode::Local => {
                let input = ClassificationInput::from_answers(&session.answers)?;
                classify(&input, Timestamp::now())?
            }
            ClassificationMode::Remote => {
                let remote = self.gateway.classify(system_id).await.map_err(|e| {
                    tracing::warn!(%system_id, error = %e, "remote classification failed");
                    e
                })?;
                remote.validate(Timestamp::now()).map_err(|e| {
                    tracing::warn!(%system_id, error = %e, "remote classification rejected");
                    e
                })?
            }
        };
        tracing::info!(%system_id, tier = %result.risk_tier, reason = %result.primary_reason, "classified");

        let session = self.session_mut()?;
        Ok(session.last_classification.insert(result))
    }

    /// Banners for the current answers.
    pub fn banners(&self) -> Result<Vec<Banner>, WizardError> {
        Ok(banners(&self.session()?.answers))
    }
}
