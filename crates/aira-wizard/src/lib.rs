//! # aira-wizard — Step Controller and Persistence Contract
//!
//! Walks a user through the ten assessment steps for one AI system. The
//! controller validates each step against the catalog, writes it through an
//! [`AssessmentGateway`], and only then records it as complete. Sessions can
//! be resumed from any store that can produce a [`SessionSnapshot`].
//!
//! ## Modules
//!
//! - [`validation`]: catalog-driven per-step validators.
//! - [`session`]: the in-memory session and hydration.
//! - [`controller`]: the [`StepController`] state machine.
//! - [`gateway`]: the persistence contract and snapshot shapes.
//! - [`memory`]: a process-local gateway for tests and offline runs.
//! - [`derived`]: banners computed from the answers on read.

pub mod controller;
pub mod derived;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod session;
pub mod validation;

pub use controller::{ClassificationMode, Hydration, StepController, StepOutcome};
pub use derived::{banners, Banner};
pub use error::WizardError;
pub use gateway::{AssessmentGateway, CompletedSteps, PersistenceError, SaveAck, SessionSnapshot, StepWrite};
pub use memory::MemoryGateway;
pub use session::AssessmentSession;
pub use validation::{validate_all, validate_step, FieldErrors};
