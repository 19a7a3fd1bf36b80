//! # Classification Engine
//!
//! Priority-ordered evaluation of a [`ClassificationInput`]. Rules are tried
//! from the most to the least severe tier and evaluation stops at the first
//! rule that fires:
//!
//! ```text
//! 1. unacceptable  any prohibited practice is true           confidence high
//! 2. high          safety component, or a category match      high / medium
//!                  not covered by the preparatory exemption
//! 3. limited       automated legal effect (yes | not_sure),   medium
//!                  or oversight gap with above-minimal impact
//! 4. minimal       nothing above fired                        medium / low
//! ```
//!
//! ## Unanswered fields
//!
//! A rule fires only on answered fields. When a rule does not fire but an
//! unanswered field could have made it fire, evaluation stops with
//! [`ClassificationError::Incomplete`] listing every unanswered field the
//! first three rules use. A gap is never read as "no".
//!
//! ## Preparatory exemption
//!
//! `preparatory_only == true` suppresses category matches in rule 2, and
//! only those. It has no effect on rule 1 or on a safety-component match.
//! An exempted system that triggers nothing in rule 3 is still classified
//! limited with reason `annex_iii.preparatory_exemption`: the exemption
//! lowers the tier, it never removes the category match.
//!
//! The engine is pure. The evaluation time is supplied by the caller.

use std::collections::BTreeSet;

use aira_core::catalog;
use aira_core::{
    ConfidenceLevel, HighRiskCategory, ImpactLevel, OversightModel, ProhibitedPractice, RiskTier,
    StepIndex, Timestamp, Tristate,
};

use crate::error::ClassificationError;
use crate::input::{ClassificationInput, SAFETY_COMPONENT_FIELD};
use crate::result::{ClassificationResult, RuleId};

/// GDPR answers that count as definite for confidence purposes.
const DEFINITE_GDPR_STATUS: &[&str] = &["fully_compliant", "partially_compliant", "not_compliant"];

/// Classify `input`, stamping the result with `computed_at`.
pub fn classify(
    input: &ClassificationInput,
    computed_at: Timestamp,
) -> Result<ClassificationResult, ClassificationError> {
    let outcome = evaluate(input)?;
    tracing::info!(
        tier = %outcome.tier,
        reason = %outcome.reason,
        has_exceptions = outcome.has_exceptions,
        "classification computed"
    );
    Ok(ClassificationResult {
        risk_tier: outcome.tier,
        primary_reason: outcome.reason,
        confidence_level: outcome.confidence,
        violated_practices: outcome.violated,
        matched_categories: outcome.matched,
        has_exceptions: outcome.has_exceptions,
        computed_at,
        reported_flags: None,
    })
}

struct Outcome {
    tier: RiskTier,
    reason: RuleId,
    confidence: ConfidenceLevel,
    violated: BTreeSet<ProhibitedPractice>,
    matched: BTreeSet<HighRiskCategory>,
    has_exceptions: bool,
}

impl Outcome {
    fn new(tier: RiskTier, reason: RuleId, confidence: ConfidenceLevel) -> Self {
        Self {
            tier,
            reason,
            confidence,
            violated: BTreeSet::new(),
            matched: BTreeSet::new(),
            has_exceptions: false,
        }
    }
}

fn evaluate(input: &ClassificationInput) -> Result<Outcome, ClassificationError> {
    // ── Rule 1: prohibited practices ────────────────────────────────────
    if let Some(first) = input.first_violation() {
        let mut outcome = Outcome::new(
            RiskTier::Unacceptable,
            RuleId::ProhibitedPractice(first),
            ConfidenceLevel::High,
        );
        outcome.violated = input
            .prohibited_practices
            .iter()
            .filter(|(_, v)| **v)
            .map(|(p, _)| *p)
            .collect();
        return Ok(outcome);
    }
    if ProhibitedPractice::all()
        .iter()
        .any(|p| !input.prohibited_practices.contains_key(p))
    {
        return Err(incomplete(input));
    }

    // ── Rule 2: safety component and high-risk categories ───────────────
    let matched: BTreeSet<HighRiskCategory> = input
        .categories
        .iter()
        .filter(|(_, v)| **v)
        .map(|(c, _)| *c)
        .collect();

    if input.safety_component == Some(true) {
        let mut outcome = Outcome::new(RiskTier::High, RuleId::SafetyComponent, ConfidenceLevel::High);
        outcome.matched = matched;
        return Ok(outcome);
    }

    let mut exempted = false;
    if let Some(first) = input.first_category() {
        match input.preparatory_only {
            Some(false) => {
                let mut outcome = Outcome::new(
                    RiskTier::High,
                    RuleId::HighRiskCategory(first),
                    ConfidenceLevel::Medium,
                );
                outcome.matched = matched;
                return Ok(outcome);
            }
            Some(true) => exempted = true,
            None => return Err(incomplete(input)),
        }
    }
    let categories_answered = HighRiskCategory::all()
        .iter()
        .all(|c| input.categories.contains_key(c));
    if input.safety_component.is_none() || !categories_answered {
        return Err(incomplete(input));
    }

    // ── Rule 3: transparency triggers ───────────────────────────────────
    let limited = |reason: RuleId| {
        let mut outcome = Outcome::new(RiskTier::Limited, reason, ConfidenceLevel::Medium);
        outcome.matched = matched.clone();
        outcome.has_exceptions = exempted;
        outcome
    };

    match input.automated_decision_legal_effect {
        Some(Tristate::Yes | Tristate::NotSure) => return Ok(limited(RuleId::AutomatedLegalEffect)),
        Some(Tristate::No) => {}
        None => return Err(incomplete(input)),
    }
    match oversight_gap(input.human_oversight_model, input.potential_impact) {
        Some(true) => return Ok(limited(RuleId::OversightGap)),
        Some(false) => {}
        None => return Err(incomplete(input)),
    }
    if exempted {
        return Ok(limited(RuleId::PreparatoryExemption));
    }

    // ── Rule 4: minimal ─────────────────────────────────────────────────
    let confidence = if supporting_answers_definite(input) {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    };
    Ok(Outcome::new(RiskTier::Minimal, RuleId::NoRiskIndicators, confidence))
}

/// `Some(true)` when oversight is weaker than full command and impact is
/// above minimal; `None` when the answer depends on an unanswered field.
fn oversight_gap(model: Option<OversightModel>, impact: Option<ImpactLevel>) -> Option<bool> {
    match (model, impact) {
        (Some(m), Some(i)) => Some(m.is_weaker_than_full_command() && i.is_above_minimal()),
        (Some(m), None) if !m.is_weaker_than_full_command() => Some(false),
        (None, Some(i)) if !i.is_above_minimal() => Some(false),
        _ => None,
    }
}

fn supporting_answers_definite(input: &ClassificationInput) -> bool {
    let conformity = match input.safety_component {
        // Only asked for regulated products.
        Some(false) => true,
        _ => matches!(input.third_party_conformity, Some(Tristate::Yes | Tristate::No)),
    };
    let gdpr = input
        .gdpr_compliance_status
        .as_deref()
        .is_some_and(|s| DEFINITE_GDPR_STATUS.contains(&s));
    conformity && input.humans_can_override.is_some() && gdpr
}

/// Every unanswered field used by rules 1 to 3, in rule order.
fn incomplete(input: &ClassificationInput) -> ClassificationError {
    let mut missing: Vec<&'static str> = Vec::new();
    for p in ProhibitedPractice::all() {
        if !input.prohibited_practices.contains_key(p) {
            missing.push(p.as_str());
        }
    }
    if input.safety_component.is_none() {
        missing.push(SAFETY_COMPONENT_FIELD);
    }
    for c in HighRiskCategory::all() {
        if !input.categories.contains_key(c) {
            missing.push(c.as_str());
        }
    }
    if input.first_category().is_some() && input.preparatory_only.is_none() {
        missing.push("preparatory_only");
    }
    if input.automated_decision_legal_effect.is_none() {
        missing.push("automated_decision_legal_effect");
    }
    if input.human_oversight_model.is_none() {
        missing.push("human_oversight_model");
    }
    if input.potential_impact.is_none() {
        missing.push("potential_impact");
    }

    let missing_steps: BTreeSet<StepIndex> =
        missing.iter().filter_map(|f| catalog::owning_step(f)).collect();
    tracing::debug!(missing = ?missing, "classification incomplete");
    ClassificationError::Incomplete {
        missing_fields: missing.into_iter().map(str::to_string).collect(),
        missing_steps: missing_steps.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at() -> Timestamp {
        Timestamp::parse("2026-10-19T12:00:00Z").unwrap()
    }

    /// Every rule field answered negatively.
    fn all_clear() -> ClassificationInput {
        let mut input = ClassificationInput::default();
        for p in ProhibitedPractice::all() {
            input.prohibited_practices.insert(*p, false);
        }
        for c in HighRiskCategory::all() {
            input.categories.insert(*c, false);
        }
        input.safety_component = Some(false);
        input.automated_decision_legal_effect = Some(Tristate::No);
        input.human_oversight_model = Some(OversightModel::HumanInCommand);
        input.potential_impact = Some(ImpactLevel::MinorSuggestions);
        input.humans_can_override = Some(true);
        input.gdpr_compliance_status = Some("fully_compliant".into());
        input
    }

    #[test]
    fn prohibited_practice_beats_category_match() {
        let input = ClassificationInput::default()
            .with_practice(ProhibitedPractice::SubliminalManipulation, true)
            .with_category(HighRiskCategory::EmploymentHr, true);
        let result = classify(&input, at()).unwrap();
        assert_eq!(result.risk_tier, RiskTier::Unacceptable);
        assert_eq!(
            result.primary_reason,
            RuleId::ProhibitedPractice(ProhibitedPractice::SubliminalManipulation)
        );
        assert_eq!(result.confidence_level, ConfidenceLevel::High);
        assert!(result.matched_categories.is_empty());
        assert_eq!(result.computed_at, at());
    }

    #[test]
    fn reason_is_first_true_practice_and_all_are_listed() {
        let input = all_clear()
            .with_practice(ProhibitedPractice::RealtimeBiometricIdentification, true)
            .with_practice(ProhibitedPractice::SocialScoring, true);
        let result = classify(&input, at()).unwrap();
        assert_eq!(
            result.primary_reason,
            RuleId::ProhibitedPractice(ProhibitedPractice::SocialScoring)
        );
        assert_eq!(result.violated_practices.len(), 2);
    }

    #[test]
    fn preparatory_exemption_never_suppresses_prohibited_practice() {
        let mut input = all_clear()
            .with_practice(ProhibitedPractice::SocialScoring, true)
            .with_category(HighRiskCategory::LawEnforcement, true);
        input.preparatory_only = Some(true);
        let result = classify(&input, at()).unwrap();
        assert_eq!(result.risk_tier, RiskTier::Unacceptable);
        assert!(!result.has_exceptions);
    }

    #[test]
    fn category_match_without_exemption_is_high() {
        let mut input = ClassificationInput::default()
            .with_category(HighRiskCategory::EmploymentHr, true);
        for p in ProhibitedPractice::all() {
            input.prohibited_practices.insert(*p, false);
        }
        input.preparatory_only = Some(false);
        let result = classify(&input, at()).unwrap();
        assert_eq!(result.risk_tier, RiskTier::High);
        assert_eq!(
            result.primary_reason,
            RuleId::HighRiskCategory(HighRiskCategory::EmploymentHr)
        );
        assert_eq!(result.confidence_level, ConfidenceLevel::Medium);
        assert!(result.category_match());
    }

    #[test]
    fn first_category_in_fixed_order_is_the_reason() {
        let mut input = all_clear()
            .with_category(HighRiskCategory::Profiling, true)
            .with_category(HighRiskCategory::Education, true);
        input.preparatory_only = Some(false);
        let result = classify(&input, at()).unwrap();
        assert_eq!(result.primary_reason, RuleId::HighRiskCategory(HighRiskCategory::Education));
        assert_eq!(result.matched_categories.len(), 2);
    }

    #[test]
    fn safety_component_is_high_with_high_confidence_and_not_exemptable() {
        let mut input = all_clear().with_category(HighRiskCategory::Education, true);
        input.safety_component = Some(true);
        input.preparatory_only = Some(true);
        let result = classify(&input, at()).unwrap();
        assert_eq!(result.risk_tier, RiskTier::High);
        assert_eq!(result.primary_reason, RuleId::SafetyComponent);
        assert_eq!(result.confidence_level, ConfidenceLevel::High);
        assert!(!result.has_exceptions);
    }

    #[test]
    fn exemption_downgrades_to_limited() {
        let mut input = all_clear().with_category(HighRiskCategory::Education, true);
        input.preparatory_only = Some(true);
        let result = classify(&input, at()).unwrap();
        assert_eq!(result.risk_tier, RiskTier::Limited);
        assert_eq!(result.primary_reason, RuleId::PreparatoryExemption);
        assert!(result.has_exceptions);
        assert!(result.matched_categories.contains(&HighRiskCategory::Education));
    }

    #[test]
    fn exemption_then_transparency_trigger_keeps_exception_flag() {
        let mut input = all_clear().with_category(HighRiskCategory::Education, true);
        input.preparatory_only = Some(true);
        input.automated_decision_legal_effect = Some(Tristate::Yes);
        let result = classify(&input, at()).unwrap();
        assert_eq!(result.risk_tier, RiskTier::Limited);
        assert_eq!(result.primary_reason, RuleId::AutomatedLegalEffect);
        assert!(result.has_exceptions);
    }

    #[test]
    fn automated_legal_effect_is_limited() {
        let mut input = ClassificationInput::default();
        for p in ProhibitedPractice::all() {
            input.prohibited_practices.insert(*p, false);
        }
        for c in HighRiskCategory::all() {
            input.categories.insert(*c, false);
        }
        input.safety_component = Some(false);
        input.automated_decision_legal_effect = Some(Tristate::Yes);
        let result = classify(&input, at()).unwrap();
        assert_eq!(result.risk_tier, RiskTier::Limited);
        assert_eq!(result.confidence_level, ConfidenceLevel::Medium);
    }

    #[test]
    fn not_sure_counts_as_yes() {
        let mut input = all_clear();
        input.automated_decision_legal_effect = Some(Tristate::NotSure);
        assert_eq!(classify(&input, at()).unwrap().risk_tier, RiskTier::Limited);
    }

    #[test]
    fn oversight_gap_requires_above_minimal_impact() {
        let mut input = all_clear();
        input.human_oversight_model = Some(OversightModel::HumanOnLoop);
        input.potential_impact = Some(ImpactLevel::MinorSuggestions);
        assert_eq!(classify(&input, at()).unwrap().risk_tier, RiskTier::Minimal);

        input.potential_impact = Some(ImpactLevel::LifeChangingLegal);
        let result = classify(&input, at()).unwrap();
        assert_eq!(result.risk_tier, RiskTier::Limited);
        assert_eq!(result.primary_reason, RuleId::OversightGap);
    }

    #[test]
    fn all_negative_is_minimal_with_medium_confidence() {
        let result = classify(&all_clear(), at()).unwrap();
        assert_eq!(result.risk_tier, RiskTier::Minimal);
        assert_eq!(result.primary_reason, RuleId::NoRiskIndicators);
        assert_eq!(result.confidence_level, ConfidenceLevel::Medium);
    }

    #[test]
    fn uncertain_supporting_answers_lower_minimal_confidence() {
        let mut input = all_clear();
        input.gdpr_compliance_status = Some("unknown".into());
        assert_eq!(classify(&input, at()).unwrap().confidence_level, ConfidenceLevel::Low);

        let mut input = all_clear();
        input.humans_can_override = None;
        assert_eq!(classify(&input, at()).unwrap().confidence_level, ConfidenceLevel::Low);

        let mut input = all_clear();
        input.safety_component = Some(false);
        input.third_party_conformity = None;
        assert_eq!(classify(&input, at()).unwrap().confidence_level, ConfidenceLevel::Medium);
    }

    #[test]
    fn empty_input_is_incomplete_and_names_steps() {
        let err = classify(&ClassificationInput::default(), at()).unwrap_err();
        let ClassificationError::Incomplete { missing_fields, missing_steps } = err else {
            panic!("expected incomplete, got {err:?}");
        };
        assert_eq!(missing_fields[0], "subliminal_manipulation");
        let steps: Vec<u8> = missing_steps.iter().map(|s| s.get()).collect();
        assert_eq!(steps, [4, 5, 6, 7]);
    }

    #[test]
    fn unanswered_transparency_field_is_incomplete_not_minimal() {
        let mut input = all_clear();
        input.automated_decision_legal_effect = None;
        let err = classify(&input, at()).unwrap_err();
        assert_eq!(
            err,
            ClassificationError::Incomplete {
                missing_fields: vec!["automated_decision_legal_effect".into()],
                missing_steps: vec![StepIndex::new(7).unwrap()],
            }
        );
    }

    #[test]
    fn category_without_exemption_answer_is_incomplete() {
        let input = all_clear().with_category(HighRiskCategory::Profiling, true);
        let err = classify(&input, at()).unwrap_err();
        assert!(matches!(
            err,
            ClassificationError::Incomplete { ref missing_fields, .. }
                if missing_fields == &vec!["preparatory_only".to_string()]
        ));
    }

    #[test]
    fn oversight_decided_by_single_answer() {
        let mut input = all_clear();
        input.potential_impact = None;
        input.human_oversight_model = Some(OversightModel::HumanInCommand);
        assert_eq!(classify(&input, at()).unwrap().risk_tier, RiskTier::Minimal);

        input.human_oversight_model = Some(OversightModel::HumanInLoop);
        assert!(classify(&input, at()).is_err());
    }

    fn arb_input() -> impl Strategy<Value = ClassificationInput> {
        (
            proptest::collection::vec(proptest::option::of(any::<bool>()), 4),
            proptest::collection::vec(proptest::option::of(any::<bool>()), 9),
            proptest::option::of(any::<bool>()),
            proptest::option::of(any::<bool>()),
            proptest::option::of(prop_oneof![Just(Tristate::Yes), Just(Tristate::No), Just(Tristate::NotSure)]),
            proptest::option::of(prop_oneof![
                Just(OversightModel::HumanInLoop),
                Just(OversightModel::HumanOnLoop),
                Just(OversightModel::HumanInCommand)
            ]),
            proptest::option::of(prop_oneof![
                Just(ImpactLevel::MinorSuggestions),
                Just(ImpactLevel::OperationalDecisions),
                Just(ImpactLevel::LifeChangingLegal)
            ]),
        )
            .prop_map(|(practices, categories, prep, safety, auto, model, impact)| {
                let mut input = ClassificationInput::default();
                for (p, v) in ProhibitedPractice::all().iter().zip(practices) {
                    if let Some(v) = v {
                        input.prohibited_practices.insert(*p, v);
                    }
                }
                for (c, v) in HighRiskCategory::all().iter().zip(categories) {
                    if let Some(v) = v {
                        input.categories.insert(*c, v);
                    }
                }
                input.preparatory_only = prep;
                input.safety_component = safety;
                input.automated_decision_legal_effect = auto;
                input.human_oversight_model = model;
                input.potential_impact = impact;
                input
            })
    }

    proptest! {
        #[test]
        fn any_prohibited_practice_forces_unacceptable(input in arb_input()) {
            if input.first_violation().is_some() {
                let result = classify(&input, at()).unwrap();
                prop_assert_eq!(result.risk_tier, RiskTier::Unacceptable);
            }
        }

        #[test]
        fn unexempted_category_or_safety_match_is_high(input in arb_input()) {
            let clean = ProhibitedPractice::all()
                .iter()
                .all(|p| input.prohibited_practices.get(p) == Some(&false));
            let category = input.first_category().is_some() && input.preparatory_only == Some(false);
            let safety = input.safety_component == Some(true);
            if clean && (category || safety) {
                let result = classify(&input, at()).unwrap();
                prop_assert_eq!(result.risk_tier, RiskTier::High);
            }
        }

        #[test]
        fn classification_never_panics_and_is_deterministic(input in arb_input()) {
            prop_assert_eq!(classify(&input, at()), classify(&input, at()));
        }

        #[test]
        fn exemption_never_yields_minimal(input in arb_input()) {
            if input.first_category().is_some() && input.preparatory_only == Some(true) {
                if let Ok(result) = classify(&input, at()) {
                    prop_assert_ne!(result.risk_tier, RiskTier::Minimal);
                }
            }
        }
    }
}
