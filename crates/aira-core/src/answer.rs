//! # Canonical Answer Shape
//!
//! Every answer held in memory has exactly one shape per field kind:
//!
//! | Field kind | `AnswerValue` |
//! |------------|---------------|
//! | bool       | `Bool` |
//! | choice     | `Text` (one of the field's options) |
//! | text       | `Text` (trimmed, non-empty) |
//! | set        | `Set` (sorted, deduplicated) |
//!
//! An absent key means "never answered". That is distinct from `Bool(false)`
//! or an empty set, which are real answers. The classifier relies on this
//! distinction to report incomplete assessments instead of guessing.
//!
//! Raw input never reaches these types directly; see [`crate::normalize`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::step::StepIndex;

/// Sentinel option in multi-selects meaning "none of the above".
pub const NONE_SENTINEL: &str = "none";

/// A single normalized answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Text(String),
    Set(BTreeSet<String>),
}

impl AnswerValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Build a set answer from any iterator of string-likes.
    pub fn set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    /// Build a text answer.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// The plain JSON form, as stored by a remote registry.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Text(s) => Value::String(s.clone()),
            Self::Set(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
        }
    }
}

/// The answers of one step (or a flattened view across steps), keyed by
/// field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerRecord(BTreeMap<String, AnswerValue>);

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&AnswerValue> {
        self.0.get(field)
    }

    /// Boolean answer, `None` if absent or not a boolean.
    pub fn bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(AnswerValue::as_bool)
    }

    /// Text or choice answer, `None` if absent or not text.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(AnswerValue::as_text)
    }

    /// Set answer, `None` if absent or not a set.
    pub fn set(&self, field: &str) -> Option<&BTreeSet<String>> {
        self.get(field).and_then(AnswerValue::as_set)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: AnswerValue) -> Option<AnswerValue> {
        self.0.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<AnswerValue> {
        self.0.remove(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The plain JSON object form.
    pub fn to_json_map(&self) -> Map<String, Value> {
        self.0.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
    }

    /// Overlay `other` on top of `self`; fields in `other` win.
    pub fn merge(&mut self, other: &AnswerRecord) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }
}

impl<K: Into<String>> FromIterator<(K, AnswerValue)> for AnswerRecord {
    fn from_iter<T: IntoIterator<Item = (K, AnswerValue)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// All answers of an assessment, grouped by owning step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<StepIndex, AnswerRecord>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self, step: StepIndex) -> Option<&AnswerRecord> {
        self.0.get(&step)
    }

    /// Replace the answers of `step` wholesale.
    pub fn replace_step(&mut self, step: StepIndex, record: AnswerRecord) {
        self.0.insert(step, record);
    }

    /// Overlay `record` onto the existing answers of `step`.
    pub fn merge_step(&mut self, step: StepIndex, record: &AnswerRecord) {
        self.0.entry(step).or_default().merge(record);
    }

    pub fn steps(&self) -> impl Iterator<Item = (StepIndex, &AnswerRecord)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(AnswerRecord::is_empty)
    }

    /// Single flat record across all steps. Field names are unique across
    /// the catalog, so nothing is shadowed.
    pub fn flatten(&self) -> AnswerRecord {
        let mut flat = AnswerRecord::new();
        for record in self.0.values() {
            flat.merge(record);
        }
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_is_distinct_from_false() {
        let mut rec = AnswerRecord::new();
        rec.insert("social_scoring", AnswerValue::Bool(false));
        assert_eq!(rec.bool("social_scoring"), Some(false));
        assert_eq!(rec.bool("subliminal_manipulation"), None);
    }

    #[test]
    fn typed_accessors_reject_wrong_shape() {
        let mut rec = AnswerRecord::new();
        rec.insert("system_name", AnswerValue::text("Screener"));
        assert_eq!(rec.bool("system_name"), None);
        assert_eq!(rec.text("system_name"), Some("Screener"));
        assert!(rec.set("system_name").is_none());
    }

    #[test]
    fn flatten_merges_all_steps() {
        let mut answers = AnswerSet::new();
        let s4 = StepIndex::new(4).unwrap();
        let s5 = StepIndex::new(5).unwrap();
        answers.replace_step(s4, [("social_scoring", AnswerValue::Bool(true))].into_iter().collect());
        answers.replace_step(s5, [("education", AnswerValue::Bool(false))].into_iter().collect());
        let flat = answers.flatten();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat.bool("social_scoring"), Some(true));
        assert_eq!(flat.bool("education"), Some(false));
    }

    #[test]
    fn merge_step_overlays_fields() {
        let mut answers = AnswerSet::new();
        let s1 = StepIndex::FIRST;
        answers.replace_step(
            s1,
            [("system_name", AnswerValue::text("A")), ("system_version", AnswerValue::text("1"))]
                .into_iter()
                .collect(),
        );
        answers.merge_step(s1, &[("system_name", AnswerValue::text("B"))].into_iter().collect());
        let rec = answers.step(s1).unwrap();
        assert_eq!(rec.text("system_name"), Some("B"));
        assert_eq!(rec.text("system_version"), Some("1"));
    }

    #[test]
    fn untagged_serialization_is_plain_json() {
        let rec: AnswerRecord = [
            ("flag", AnswerValue::Bool(true)),
            ("name", AnswerValue::text("x")),
            ("groups", AnswerValue::set(["b", "a"])),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"flag": true, "name": "x", "groups": ["a", "b"]})
        );
    }

    #[test]
    fn answer_set_serializes_with_step_keys() {
        let mut answers = AnswerSet::new();
        answers.replace_step(
            StepIndex::new(7).unwrap(),
            [("potential_impact", AnswerValue::text("minor_suggestions"))].into_iter().collect(),
        );
        let json = serde_json::to_string(&answers).unwrap();
        let back: AnswerSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, answers);
    }
}
