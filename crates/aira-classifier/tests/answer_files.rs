//! Classification of flattened answer documents, as loaded from files.

use aira_classifier::{classify, ClassificationError, ClassificationInput, RuleId};
use aira_core::{normalize_flat, HighRiskCategory, ProhibitedPractice, RiskTier, Timestamp};
use serde_json::{json, Value};

fn classify_json(doc: Value) -> Result<aira_classifier::ClassificationResult, ClassificationError> {
    let Value::Object(map) = doc else { panic!("expected object") };
    let answers = normalize_flat(&map);
    let input = ClassificationInput::from_answers(&answers)?;
    classify(&input, Timestamp::parse("2026-10-19T00:00:00Z").unwrap())
}

const ARTICLE_5_CLEAR: [(&str, bool); 4] = [
    ("subliminal_manipulation", false),
    ("vulnerability_exploitation", false),
    ("social_scoring", false),
    ("realtime_biometric_identification", false),
];

fn with_article_5_clear(mut doc: Value) -> Value {
    for (k, v) in ARTICLE_5_CLEAR {
        doc[k] = json!(v);
    }
    doc
}

fn with_categories_clear(mut doc: Value) -> Value {
    for c in HighRiskCategory::all() {
        doc[c.as_str()] = json!(false);
    }
    doc
}

#[test]
fn subliminal_manipulation_outranks_employment() {
    let result = classify_json(json!({
        "subliminal_manipulation": true,
        "employment_hr": true
    }))
    .unwrap();
    assert_eq!(result.risk_tier, RiskTier::Unacceptable);
    assert_eq!(
        result.primary_reason,
        RuleId::ProhibitedPractice(ProhibitedPractice::SubliminalManipulation)
    );
}

#[test]
fn employment_without_exemption_is_high() {
    let doc = with_article_5_clear(json!({
        "employment_hr": true,
        "preparatory_only": false
    }));
    let result = classify_json(doc).unwrap();
    assert_eq!(result.risk_tier, RiskTier::High);
    assert_eq!(result.primary_reason.to_string(), "annex_iii.employment_hr");
}

#[test]
fn automated_legal_effect_is_limited() {
    let doc = with_categories_clear(with_article_5_clear(json!({
        "ai_regulated_product": "no",
        "automated_decision_legal_effect": "yes"
    })));
    assert_eq!(classify_json(doc).unwrap().risk_tier, RiskTier::Limited);
}

#[test]
fn all_negative_is_minimal() {
    let doc = with_categories_clear(with_article_5_clear(json!({
        "ai_regulated_product": "no",
        "automated_decision_legal_effect": "no",
        "human_oversight_model": "human_in_command",
        "potential_impact": "minor_suggestions"
    })));
    let result = classify_json(doc).unwrap();
    assert_eq!(result.risk_tier, RiskTier::Minimal);
}

#[test]
fn all_flags_negative_without_oversight_answers_is_incomplete() {
    let doc = with_categories_clear(with_article_5_clear(json!({
        "ai_regulated_product": "no",
        "automated_decision_legal_effect": "no"
    })));
    let err = classify_json(doc).unwrap_err();
    let ClassificationError::Incomplete { missing_fields, missing_steps } = err else {
        panic!("expected incomplete, got {err:?}");
    };
    assert_eq!(missing_fields, ["human_oversight_model", "potential_impact"]);
    assert_eq!(missing_steps.iter().map(|s| s.get()).collect::<Vec<_>>(), [7]);
}

#[test]
fn text_booleans_from_registry_are_understood() {
    let doc = json!({
        "subliminal_manipulation": "no",
        "vulnerability_exploitation": "no",
        "social_scoring": "yes",
        "realtime_biometric_identification": "no"
    });
    let result = classify_json(doc).unwrap();
    assert_eq!(result.risk_tier, RiskTier::Unacceptable);
    assert!(result.prohibited_practice_violation());
}

#[test]
fn empty_document_is_incomplete() {
    assert!(matches!(
        classify_json(json!({})),
        Err(ClassificationError::Incomplete { .. })
    ));
}
