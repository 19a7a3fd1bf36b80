//! # Step Validators
//!
//! Pure checks of one step's normalized answers against the catalog. A
//! validator never fails; it returns a field → message map, empty when the
//! step is valid. Hidden (gated-off) fields are never required.
//!
//! Checks, per visible field:
//!
//! - required fields must be answered;
//! - text fields must reach their minimum length after trimming;
//! - multi-selects must have at least one selection, only known options,
//!   and never `"none"` together with another option;
//! - choice fields must hold one of their options.

use std::collections::BTreeMap;

use aira_core::catalog::{self, FieldKind, FieldSpec};
use aira_core::{AnswerRecord, AnswerValue, StepIndex, NONE_SENTINEL};

/// Field name → human-readable message. Empty means valid.
pub type FieldErrors = BTreeMap<String, String>;

/// Validate the answers of `step`.
pub fn validate_step(step: StepIndex, record: &AnswerRecord) -> FieldErrors {
    let def = catalog::step(step);
    let mut errors = FieldErrors::new();
    for spec in def.fields {
        if !spec.gate.is_open(record) {
            continue;
        }
        if let Some(message) = check_field(spec, record.get(spec.name), record) {
            errors.insert(spec.name.to_string(), message);
        }
    }
    errors
}

/// Validate every step that has answers, keyed by step.
pub fn validate_all(answers: &aira_core::AnswerSet) -> BTreeMap<StepIndex, FieldErrors> {
    StepIndex::all()
        .filter_map(|step| {
            let empty = AnswerRecord::new();
            let record = answers.step(step).unwrap_or(&empty);
            let errors = validate_step(step, record);
            (!errors.is_empty()).then_some((step, errors))
        })
        .collect()
}

fn check_field(spec: &FieldSpec, value: Option<&AnswerValue>, record: &AnswerRecord) -> Option<String> {
    let Some(value) = value else {
        return spec.is_required_in(record).then(|| missing_message(spec));
    };
    match (spec.kind, value) {
        (FieldKind::Bool, AnswerValue::Bool(_)) => None,
        (FieldKind::Choice(options), AnswerValue::Text(choice)) => (!options.contains(&choice.as_str()))
            .then(|| format!("{choice:?} is not a valid option for {}", spec.label)),
        (FieldKind::Text { min_len }, AnswerValue::Text(text)) => {
            let len = text.trim().chars().count();
            (spec.required && len < min_len)
                .then(|| format!("{} must be at least {min_len} characters", spec.label))
        }
        (FieldKind::Set { none_sentinel, .. }, AnswerValue::Set(selected)) => {
            if selected.is_empty() {
                return spec
                    .required
                    .then(|| format!("Please select at least one option for {}", spec.label));
            }
            if let Some(unknown) = selected.iter().find(|s| !spec.accepts_option(s)) {
                return Some(format!("{unknown:?} is not a valid option for {}", spec.label));
            }
            (none_sentinel && selected.contains(NONE_SENTINEL) && selected.len() > 1)
                .then(|| format!("\"{NONE_SENTINEL}\" cannot be combined with other selections"))
        }
        _ => Some(format!("{} has an invalid value", spec.label)),
    }
}

fn missing_message(spec: &FieldSpec) -> String {
    match spec.kind {
        FieldKind::Bool | FieldKind::Choice(_) => format!("Please answer: {}", spec.label),
        FieldKind::Text { .. } => format!("{} is required", spec.label),
        FieldKind::Set { .. } => format!("Please select at least one option for {}", spec.label),
    }
}
