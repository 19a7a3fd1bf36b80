//! # Classification Result
//!
//! The outcome of one classification run, whether computed locally by
//! [`crate::engine::classify`] or received from a remote registry. Results
//! are superseded by the next run, never merged.
//!
//! ## Rule identifiers
//!
//! `primary_reason` is a stable dotted identifier naming the first rule that
//! fired:
//!
//! | Identifier | Tier |
//! |------------|------|
//! | `article_5.<practice>` | unacceptable |
//! | `annex_i.safety_component` | high |
//! | `annex_iii.<category>` | high |
//! | `annex_iii.preparatory_exemption` | limited |
//! | `transparency.automated_decision_legal_effect` | limited |
//! | `transparency.oversight_gap` | limited |
//! | `minimal.no_risk_indicators` | minimal |
//!
//! Remote registries may send free text instead; it is preserved as
//! [`RuleId::External`].

use std::collections::BTreeSet;
use std::fmt;

use aira_core::{ConfidenceLevel, HighRiskCategory, ProhibitedPractice, RiskTier, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::ClassificationError;

// ---------------------------------------------------------------------------
// RuleId
// ---------------------------------------------------------------------------

/// Identifier of the rule that decided a classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RuleId {
    ProhibitedPractice(ProhibitedPractice),
    SafetyComponent,
    HighRiskCategory(HighRiskCategory),
    PreparatoryExemption,
    AutomatedLegalEffect,
    OversightGap,
    NoRiskIndicators,
    /// Free-text reason from a remote registry.
    External(String),
}

impl RuleId {
    /// Human-readable rationale for the rule.
    pub fn rationale(&self) -> String {
        match self {
            Self::ProhibitedPractice(p) => format!(
                "The system involves {}, a prohibited practice under Article 5. \
                 It may not be placed on the market or put into service.",
                p.label()
            ),
            Self::SafetyComponent => "The system is a safety component of a product covered by \
                 Union harmonisation legislation (Annex I) and is high-risk."
                .to_string(),
            Self::HighRiskCategory(c) => format!(
                "The system is used in {}, a high-risk area listed in Annex III.",
                c.label()
            ),
            Self::PreparatoryExemption => "The system matches an Annex III area but only performs \
                 preparatory or procedural tasks. The high-risk classification is lowered to \
                 limited risk; the exemption must be documented."
                .to_string(),
            Self::AutomatedLegalEffect => "The system makes or supports automated decisions that \
                 may produce legal or similarly significant effects. Transparency obligations apply."
                .to_string(),
            Self::OversightGap => "Human oversight falls short of full human command while the \
                 potential impact exceeds minor suggestions. Transparency obligations apply."
                .to_string(),
            Self::NoRiskIndicators => "No prohibited practice, high-risk area or transparency \
                 trigger was identified. Voluntary codes of conduct are recommended."
                .to_string(),
            Self::External(text) => text.clone(),
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProhibitedPractice(p) => write!(f, "article_5.{}", p.as_str()),
            Self::SafetyComponent => f.write_str("annex_i.safety_component"),
            Self::HighRiskCategory(c) => write!(f, "annex_iii.{}", c.as_str()),
            Self::PreparatoryExemption => f.write_str("annex_iii.preparatory_exemption"),
            Self::AutomatedLegalEffect => f.write_str("transparency.automated_decision_legal_effect"),
            Self::OversightGap => f.write_str("transparency.oversight_gap"),
            Self::NoRiskIndicators => f.write_str("minimal.no_risk_indicators"),
            Self::External(text) => f.write_str(text),
        }
    }
}

impl From<RuleId> for String {
    fn from(rule: RuleId) -> String {
        rule.to_string()
    }
}

impl From<String> for RuleId {
    fn from(s: String) -> Self {
        let known = match s.as_str() {
            "annex_i.safety_component" => Some(Self::SafetyComponent),
            "annex_iii.preparatory_exemption" => Some(Self::PreparatoryExemption),
            "transparency.automated_decision_legal_effect" => Some(Self::AutomatedLegalEffect),
            "transparency.oversight_gap" => Some(Self::OversightGap),
            "minimal.no_risk_indicators" => Some(Self::NoRiskIndicators),
            other => {
                if let Some(p) = other.strip_prefix("article_5.") {
                    p.parse().ok().map(Self::ProhibitedPractice)
                } else if let Some(c) = other.strip_prefix("annex_iii.") {
                    c.parse().ok().map(Self::HighRiskCategory)
                } else {
                    None
                }
            }
        };
        known.unwrap_or(Self::External(s))
    }
}

// ---------------------------------------------------------------------------
// ClassificationResult
// ---------------------------------------------------------------------------

/// Risk tier with rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub risk_tier: RiskTier,
    pub primary_reason: RuleId,
    pub confidence_level: ConfidenceLevel,
    /// Every true prohibited-practice flag; empty unless the tier is unacceptable.
    pub violated_practices: BTreeSet<ProhibitedPractice>,
    /// Every true category flag, populated whenever the category rule was reached.
    pub matched_categories: BTreeSet<HighRiskCategory>,
    /// The preparatory-only exemption downgraded a category match.
    pub has_exceptions: bool,
    pub computed_at: Timestamp,
    /// Remote results may report flags without naming them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_flags: Option<ReportedFlags>,
}

/// Violation and match flags as reported by a remote registry that does not
/// enumerate the individual practices or categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedFlags {
    pub prohibited_practice_violation: bool,
    pub category_match: bool,
}

impl ClassificationResult {
    pub fn prohibited_practice_violation(&self) -> bool {
        match self.reported_flags {
            Some(flags) => flags.prohibited_practice_violation,
            None => !self.violated_practices.is_empty(),
        }
    }

    pub fn category_match(&self) -> bool {
        match self.reported_flags {
            Some(flags) => flags.category_match,
            None => !self.matched_categories.is_empty(),
        }
    }

    pub fn rationale(&self) -> String {
        self.primary_reason.rationale()
    }
}

// ---------------------------------------------------------------------------
// Remote results
// ---------------------------------------------------------------------------

/// A classification as sent by a remote registry: loose keys, every field
/// optional. Validate with [`RemoteClassification::validate`] before use.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RemoteClassification {
    #[serde(alias = "riskLevel", alias = "risk_tier", alias = "riskTier")]
    pub risk_level: Option<String>,
    #[serde(alias = "primaryReason")]
    pub primary_reason: Option<String>,
    #[serde(alias = "confidenceLevel")]
    pub confidence_level: Option<String>,
    #[serde(alias = "prohibitedPracticeViolation", alias = "article_5_violation")]
    pub prohibited_practice_violation: Option<bool>,
    #[serde(alias = "categoryMatch", alias = "annex_iii_match")]
    pub category_match: Option<bool>,
    #[serde(alias = "hasExceptions")]
    pub has_exceptions: Option<bool>,
    #[serde(alias = "violatedPractices")]
    pub violated_practices: Option<Vec<String>>,
    #[serde(alias = "matchedCategories")]
    pub matched_categories: Option<Vec<String>>,
    #[serde(alias = "computedAt", alias = "created_at", alias = "createdAt")]
    pub computed_at: Option<String>,
}

impl RemoteClassification {
    /// Validate into a [`ClassificationResult`].
    ///
    /// `received_at` stands in for a missing or unparseable timestamp. Any
    /// missing required field is an error; a tier is never defaulted.
    pub fn validate(self, received_at: Timestamp) -> Result<ClassificationResult, ClassificationError> {
        let risk_tier = self
            .risk_level
            .as_deref()
            .ok_or_else(|| missing("riskLevel"))?
            .parse::<RiskTier>()
            .map_err(|e| ClassificationError::MalformedClassificationResult(e.to_string()))?;
        let primary_reason = self
            .primary_reason
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| missing("primaryReason"))?;
        let confidence_level = self
            .confidence_level
            .as_deref()
            .ok_or_else(|| missing("confidenceLevel"))?
            .parse::<ConfidenceLevel>()
            .map_err(|e| ClassificationError::MalformedClassificationResult(e.to_string()))?;
        let prohibited_practice_violation = self
            .prohibited_practice_violation
            .ok_or_else(|| missing("prohibitedPracticeViolation"))?;
        let category_match = self.category_match.ok_or_else(|| missing("categoryMatch"))?;

        if prohibited_practice_violation && risk_tier != RiskTier::Unacceptable {
            return Err(ClassificationError::MalformedClassificationResult(format!(
                "prohibited practice violation reported with tier {risk_tier}"
            )));
        }

        let violated_practices = parse_names::<ProhibitedPractice>(self.violated_practices)?;
        let matched_categories = parse_names::<HighRiskCategory>(self.matched_categories)?;
        let computed_at = self
            .computed_at
            .as_deref()
            .and_then(|s| Timestamp::parse(s).ok())
            .unwrap_or(received_at);

        Ok(ClassificationResult {
            risk_tier,
            primary_reason: RuleId::from(primary_reason),
            confidence_level,
            violated_practices,
            matched_categories,
            has_exceptions: self.has_exceptions.unwrap_or(false),
            computed_at,
            reported_flags: Some(ReportedFlags {
                prohibited_practice_violation,
                category_match,
            }),
        })
    }
}

fn missing(field: &str) -> ClassificationError {
    ClassificationError::MalformedClassificationResult(format!("missing required field {field}"))
}

fn parse_names<T>(names: Option<Vec<String>>) -> Result<BTreeSet<T>, ClassificationError>
where
    T: std::str::FromStr<Err = aira_core::AiraError> + Ord,
{
    names
        .unwrap_or_default()
        .iter()
        .map(|n| {
            n.parse::<T>()
                .map_err(|e| ClassificationError::MalformedClassificationResult(e.to_string()))
        })
        .collect()
}
