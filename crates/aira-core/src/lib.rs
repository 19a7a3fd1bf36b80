//! # aira-core — Foundational Types for the Risk Assessment Pipeline
//!
//! This crate is the leaf of the workspace DAG. It defines the vocabulary
//! every other crate speaks: the identifier of a regulated system, UTC
//! timestamps, the fixed regulatory taxonomy (prohibited practices, high-risk
//! categories, risk tiers), the immutable ten-step answer catalog, and the
//! answer normalizer that turns raw step input into the canonical in-memory
//! shape.
//!
//! ## Key Design Principles
//!
//! 1. **Newtypes for identifiers and indices.** `SystemId` and `StepIndex`
//!    cannot be confused with bare UUIDs or integers; `StepIndex` can only
//!    hold 1..=10.
//!
//! 2. **Single taxonomy enums.** `ProhibitedPractice` and `HighRiskCategory`
//!    each list their variants once, in evaluation precedence order. Every
//!    `match` is exhaustive, so adding a practice forces every consumer to
//!    handle it.
//!
//! 3. **Canonical answers only.** `AnswerValue` has exactly one shape per
//!    field kind. Raw input (native arrays, JSON-text arrays, `"yes"` for
//!    booleans) is folded into that shape by [`normalize`] at the boundary.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `aira-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod answer;
pub mod catalog;
pub mod error;
pub mod identity;
pub mod normalize;
pub mod step;
pub mod taxonomy;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use answer::{AnswerRecord, AnswerSet, AnswerValue, NONE_SENTINEL};
pub use catalog::{FieldKind, FieldSpec, Gate, StepDefinition, CLASSIFICATION_STEPS};
pub use error::AiraError;
pub use identity::SystemId;
pub use normalize::{normalize_field, normalize_flat, normalize_step, toggle_selection};
pub use step::{StepIndex, STEP_COUNT};
pub use taxonomy::{
    ConfidenceLevel, HighRiskCategory, ImpactLevel, OversightModel, ProhibitedPractice, RiskTier,
    Tristate,
};
pub use temporal::Timestamp;
