//! Banners shown alongside the wizard, computed from the current answers on
//! every read. None of them is stored.

use aira_core::{
    AnswerRecord, AnswerSet, HighRiskCategory, ImpactLevel, OversightModel, ProhibitedPractice,
};
use serde::{Deserialize, Serialize};

/// A warning or notice derived from the answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Banner {
    /// At least one prohibited practice is answered `true`.
    ProhibitedPracticeDetected,
    /// At least one high-risk category is answered `true`.
    HighRiskCategoryDetected,
    /// The system is a component of a regulated product.
    RegulatedProductNotice,
    /// Oversight short of full command with above-minimal impact.
    OversightGap,
    /// Users are not notified, or decisions cannot be explained despite a
    /// high transparency level.
    TransparencyGap,
}

impl Banner {
    pub fn message(&self) -> &'static str {
        match self {
            Self::ProhibitedPracticeDetected => {
                "Prohibited practice detected: this system may not be deployed in the EU."
            }
            Self::HighRiskCategoryDetected => {
                "High-risk area detected: full high-risk obligations are likely to apply."
            }
            Self::RegulatedProductNotice => {
                "Regulated product: a conformity assessment under sectoral legislation is required."
            }
            Self::OversightGap => {
                "Human oversight may be insufficient for the potential impact of this system."
            }
            Self::TransparencyGap => {
                "Transparency gap: users must be informed and decisions should be explainable."
            }
        }
    }
}

/// All banners that apply to `answers`, in display order.
pub fn banners(answers: &AnswerSet) -> Vec<Banner> {
    let flat = answers.flatten();
    let checks: [(Banner, fn(&AnswerRecord) -> bool); 5] = [
        (Banner::ProhibitedPracticeDetected, prohibited_practice_detected),
        (Banner::HighRiskCategoryDetected, high_risk_category_detected),
        (Banner::RegulatedProductNotice, regulated_product),
        (Banner::OversightGap, oversight_gap),
        (Banner::TransparencyGap, transparency_gap),
    ];
    checks
        .into_iter()
        .filter(|(_, check)| check(&flat))
        .map(|(banner, _)| banner)
        .collect()
}

fn prohibited_practice_detected(flat: &AnswerRecord) -> bool {
    ProhibitedPractice::all()
        .iter()
        .any(|p| flat.bool(p.as_str()) == Some(true))
}

fn high_risk_category_detected(flat: &AnswerRecord) -> bool {
    HighRiskCategory::all()
        .iter()
        .any(|c| flat.bool(c.as_str()) == Some(true))
}

fn regulated_product(flat: &AnswerRecord) -> bool {
    flat.text("ai_regulated_product") == Some("yes")
}

fn oversight_gap(flat: &AnswerRecord) -> bool {
    let model = flat
        .text("human_oversight_model")
        .and_then(|s| s.parse::<OversightModel>().ok());
    let impact = flat
        .text("potential_impact")
        .and_then(|s| s.parse::<ImpactLevel>().ok());
    matches!(
        (model, impact),
        (Some(m), Some(i)) if m.is_weaker_than_full_command() && i.is_above_minimal()
    )
}

fn transparency_gap(flat: &AnswerRecord) -> bool {
    flat.text("user_notification_mechanism") == Some("no")
        || (flat.text("decision_explanation_capability") == Some("no")
            && flat.text("transparency_level") == Some("high"))
}
