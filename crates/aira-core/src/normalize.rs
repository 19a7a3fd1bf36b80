//! # Answer Normalizer
//!
//! Folds raw step input into the canonical [`AnswerValue`] shapes. Raw input
//! comes from answer files, CLI `--data` arguments and remote session
//! snapshots, and is inconsistent in exactly the ways a form backend tends to
//! be: multi-selects arrive as native arrays or as JSON text, booleans arrive
//! as `"yes"`, blanks arrive as `""`.
//!
//! Normalization runs once at the boundary (session hydration, step
//! submission, file load). Everything downstream may assume canonical shapes.
//!
//! ## Rules
//!
//! - `null`, or whitespace-only text for a text/choice/bool field, means
//!   "never answered" and yields `None`.
//! - Booleans accept `true`/`false` and the text forms `true`, `false`,
//!   `yes`, `no` (case-insensitive).
//! - Sets accept an array or a JSON-text array. Malformed text becomes an
//!   empty set and is logged at `warn`.
//! - Where a set declares the `"none"` sentinel, the last-selected value
//!   wins: `["children", "none"]` becomes `{none}`, `["none", "children"]`
//!   becomes `{children}`.
//! - Fields the catalog does not know are dropped and logged at `debug`.
//!
//! Every function here is idempotent on canonical input.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::answer::{AnswerRecord, AnswerSet, AnswerValue, NONE_SENTINEL};
use crate::catalog::{self, FieldKind, FieldSpec};
use crate::step::StepIndex;

/// Normalize one raw value against its catalog field.
pub fn normalize_field(spec: &FieldSpec, raw: &Value) -> Option<AnswerValue> {
    if raw.is_null() {
        return None;
    }
    match spec.kind {
        FieldKind::Bool => normalize_bool(spec.name, raw),
        FieldKind::Choice(_) | FieldKind::Text { .. } => normalize_text(spec.name, raw),
        FieldKind::Set { none_sentinel, .. } => normalize_set(spec.name, raw, none_sentinel),
    }
}

/// Normalize the raw data submitted for `step`.
///
/// Keys the step does not own are dropped.
pub fn normalize_step(step: StepIndex, raw: &Map<String, Value>) -> AnswerRecord {
    let def = catalog::step(step);
    let mut record = AnswerRecord::new();
    for (name, value) in raw {
        let Some(spec) = def.field(name) else {
            tracing::debug!(step = step.get(), field = %name, "dropping field not owned by step");
            continue;
        };
        if let Some(answer) = normalize_field(spec, value) {
            record.insert(spec.name, answer);
        }
    }
    record
}

/// Normalize a flattened answer map, distributing fields to their owning steps.
pub fn normalize_flat(raw: &Map<String, Value>) -> AnswerSet {
    let mut answers = AnswerSet::new();
    for (name, value) in raw {
        let Some((def, spec)) = catalog::field(name) else {
            tracing::debug!(field = %name, "dropping unknown answer field");
            continue;
        };
        if let Some(answer) = normalize_field(spec, value) {
            let single: AnswerRecord = [(spec.name, answer)].into_iter().collect();
            answers.merge_step(def.index, &single);
        }
    }
    answers
}

/// Apply one interactive click on a multi-select option.
///
/// With `none_sentinel`, checking `"none"` clears every other option and
/// checking any other option clears `"none"`. Unchecking simply removes.
pub fn toggle_selection(
    current: &BTreeSet<String>,
    value: &str,
    checked: bool,
    none_sentinel: bool,
) -> BTreeSet<String> {
    let mut next = current.clone();
    if !checked {
        next.remove(value);
        return next;
    }
    if none_sentinel {
        if value == NONE_SENTINEL {
            next.clear();
        } else {
            next.remove(NONE_SENTINEL);
        }
    }
    next.insert(value.to_string());
    next
}

// ─── Per-kind normalization ─────────────────────────────────────────────

fn normalize_bool(field: &str, raw: &Value) -> Option<AnswerValue> {
    match raw {
        Value::Bool(b) => Some(AnswerValue::Bool(*b)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => None,
            "true" | "yes" => Some(AnswerValue::Bool(true)),
            "false" | "no" => Some(AnswerValue::Bool(false)),
            other => {
                tracing::warn!(field, value = other, "unrecognised boolean text, treating as unanswered");
                None
            }
        },
        other => {
            tracing::warn!(field, value = %other, "non-boolean value for boolean field, treating as unanswered");
            None
        }
    }
}

fn normalize_text(field: &str, raw: &Value) -> Option<AnswerValue> {
    match raw {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| AnswerValue::text(trimmed))
        }
        Value::Number(n) => Some(AnswerValue::text(n.to_string())),
        other => {
            tracing::warn!(field, value = %other, "non-text value for text field, treating as unanswered");
            None
        }
    }
}

fn normalize_set(field: &str, raw: &Value, none_sentinel: bool) -> Option<AnswerValue> {
    let items = match raw {
        Value::Array(items) => collect_items(items),
        Value::String(s) if s.trim().is_empty() => return None,
        Value::String(s) => match serde_json::from_str::<Vec<Value>>(s) {
            Ok(items) => collect_items(&items),
            Err(e) => {
                tracing::warn!(field, error = %e, "malformed encoded selection, using empty set");
                Vec::new()
            }
        },
        other => {
            tracing::warn!(field, value = %other, "non-array value for selection field, using empty set");
            Vec::new()
        }
    };
    Some(AnswerValue::Set(canonical_selection(items, none_sentinel)))
}

fn collect_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => {
                let t = s.trim();
                (!t.is_empty()).then(|| t.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

/// Collapse an ordered selection into a set, honouring the none sentinel.
fn canonical_selection(items: Vec<String>, none_sentinel: bool) -> BTreeSet<String> {
    if none_sentinel && items.iter().any(|i| i == NONE_SENTINEL) {
        if items.last().map(String::as_str) == Some(NONE_SENTINEL) {
            return BTreeSet::from([NONE_SENTINEL.to_string()]);
        }
        return items.into_iter().filter(|i| i != NONE_SENTINEL).collect();
    }
    items.into_iter().collect()
}
