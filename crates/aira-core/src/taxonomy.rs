//! # Regulatory Taxonomy — Single Source of Truth
//!
//! The fixed vocabularies the classifier reasons over. Each enum is defined
//! once; `all()` returns the variants in **evaluation precedence order**, and
//! that order is load-bearing: the first true prohibited practice or the first
//! true high-risk category becomes the primary reason of a classification.
//!
//! | Enum | Answers question of | Step |
//! |------|---------------------|------|
//! | [`ProhibitedPractice`] | Article 5 prohibited practices | 4 |
//! | [`HighRiskCategory`] | Annex III high-risk domains of use | 5 |
//! | [`Tristate`] | yes / no / not sure questions | 6, 7 |
//! | [`OversightModel`] | human oversight arrangement | 7 |
//! | [`ImpactLevel`] | potential impact on affected persons | 7 |
//!
//! The `as_str()` identifiers double as the answer field names (for the flag
//! enums) or the accepted option values (for the choice enums).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AiraError;

// ---------------------------------------------------------------------------
// ProhibitedPractice
// ---------------------------------------------------------------------------

/// An Article-5-style prohibited practice. Any one of them being present
/// forces the unacceptable tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProhibitedPractice {
    /// Subliminal or purposefully manipulative techniques distorting behaviour.
    SubliminalManipulation,
    /// Exploitation of vulnerabilities of a group (age, disability, situation).
    VulnerabilityExploitation,
    /// Social scoring by or on behalf of public authorities.
    SocialScoring,
    /// Real-time remote biometric identification in publicly accessible spaces.
    RealtimeBiometricIdentification,
}

impl ProhibitedPractice {
    /// All practices in precedence order.
    pub fn all() -> &'static [ProhibitedPractice] {
        &[
            Self::SubliminalManipulation,
            Self::VulnerabilityExploitation,
            Self::SocialScoring,
            Self::RealtimeBiometricIdentification,
        ]
    }

    /// The identifier, which is also the step-4 answer field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubliminalManipulation => "subliminal_manipulation",
            Self::VulnerabilityExploitation => "vulnerability_exploitation",
            Self::SocialScoring => "social_scoring",
            Self::RealtimeBiometricIdentification => "realtime_biometric_identification",
        }
    }

    /// The free-text field that must explain a `true` answer.
    pub fn details_field(&self) -> &'static str {
        match self {
            Self::SubliminalManipulation => "manipulation_details",
            Self::VulnerabilityExploitation => "vulnerability_details",
            Self::SocialScoring => "social_scoring_details",
            Self::RealtimeBiometricIdentification => "biometric_details",
        }
    }

    /// Human-readable label used in rationales and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SubliminalManipulation => "subliminal or manipulative techniques",
            Self::VulnerabilityExploitation => "exploitation of vulnerable groups",
            Self::SocialScoring => "social scoring by public authorities",
            Self::RealtimeBiometricIdentification => {
                "real-time remote biometric identification in public spaces"
            }
        }
    }
}

impl fmt::Display for ProhibitedPractice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProhibitedPractice {
    type Err = AiraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| AiraError::UnknownIdentifier {
                kind: "prohibited practice",
                value: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// HighRiskCategory
// ---------------------------------------------------------------------------

/// An Annex-III-style high-risk domain of use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighRiskCategory {
    /// Biometric categorisation of natural persons.
    BiometricCategorization,
    /// Safety management of critical infrastructure.
    CriticalInfrastructure,
    /// Education and vocational training (admission, assessment).
    Education,
    /// Employment, worker management and access to self-employment.
    EmploymentHr,
    /// Access to essential private and public services (credit, benefits).
    EssentialServices,
    /// Law enforcement.
    LawEnforcement,
    /// Migration, asylum and border control management.
    MigrationAsylum,
    /// Administration of justice and democratic processes.
    JusticeDemocracy,
    /// Profiling of natural persons.
    Profiling,
}

impl HighRiskCategory {
    /// All categories in precedence order.
    pub fn all() -> &'static [HighRiskCategory] {
        &[
            Self::BiometricCategorization,
            Self::CriticalInfrastructure,
            Self::Education,
            Self::EmploymentHr,
            Self::EssentialServices,
            Self::LawEnforcement,
            Self::MigrationAsylum,
            Self::JusticeDemocracy,
            Self::Profiling,
        ]
    }

    /// The identifier, which is also the step-5 answer field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BiometricCategorization => "biometric_categorization",
            Self::CriticalInfrastructure => "critical_infrastructure",
            Self::Education => "education",
            Self::EmploymentHr => "employment_hr",
            Self::EssentialServices => "essential_services",
            Self::LawEnforcement => "law_enforcement",
            Self::MigrationAsylum => "migration_asylum",
            Self::JusticeDemocracy => "justice_democracy",
            Self::Profiling => "profiling",
        }
    }

    /// Human-readable label used in rationales and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BiometricCategorization => "biometric categorisation",
            Self::CriticalInfrastructure => "critical infrastructure",
            Self::Education => "education and vocational training",
            Self::EmploymentHr => "employment and worker management",
            Self::EssentialServices => "access to essential services",
            Self::LawEnforcement => "law enforcement",
            Self::MigrationAsylum => "migration, asylum and border control",
            Self::JusticeDemocracy => "administration of justice and democratic processes",
            Self::Profiling => "profiling of natural persons",
        }
    }
}

impl fmt::Display for HighRiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HighRiskCategory {
    type Err = AiraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AiraError::UnknownIdentifier {
                kind: "high-risk category",
                value: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// RiskTier
// ---------------------------------------------------------------------------

/// Compliance risk tier, ordered by descending compliance burden.
///
/// `Ord` follows severity: `Minimal < Limited < High < Unacceptable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// Voluntary codes of conduct only.
    Minimal,
    /// Transparency obligations.
    Limited,
    /// Full high-risk obligations.
    High,
    /// Prohibited; the system may not be deployed (terminal).
    Unacceptable,
}

impl RiskTier {
    /// All tiers from most to least severe.
    pub fn all() -> &'static [RiskTier] {
        &[Self::Unacceptable, Self::High, Self::Limited, Self::Minimal]
    }

    /// Snake-case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Limited => "limited",
            Self::High => "high",
            Self::Unacceptable => "unacceptable",
        }
    }

    /// Whether the tier forbids deployment outright.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Unacceptable)
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = AiraError;

    /// Case-insensitive; the remote registry has emitted both `high` and `HIGH`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| AiraError::UnknownIdentifier {
                kind: "risk tier",
                value: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// ConfidenceLevel
// ---------------------------------------------------------------------------

/// How strongly the collected answers support the assigned tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfidenceLevel {
    type Err = AiraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(AiraError::UnknownIdentifier {
                kind: "confidence level",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Choice vocabularies used by the rules
// ---------------------------------------------------------------------------

/// Answer to a yes / no / not-sure question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tristate {
    Yes,
    No,
    NotSure,
}

impl Tristate {
    pub const OPTIONS: &'static [&'static str] = &["yes", "no", "not_sure"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::NotSure => "not_sure",
        }
    }
}

impl FromStr for Tristate {
    type Err = AiraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "not_sure" => Ok(Self::NotSure),
            _ => Err(AiraError::UnknownIdentifier {
                kind: "yes/no/not_sure answer",
                value: s.to_string(),
            }),
        }
    }
}

/// Human oversight arrangement, from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OversightModel {
    /// Humans monitor and may intervene after the fact.
    HumanOnLoop,
    /// Humans take part in each decision cycle.
    HumanInLoop,
    /// Humans hold full command; the system only recommends.
    HumanInCommand,
}

impl OversightModel {
    pub const OPTIONS: &'static [&'static str] = &["human_in_loop", "human_on_loop", "human_in_command"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HumanOnLoop => "human_on_loop",
            Self::HumanInLoop => "human_in_loop",
            Self::HumanInCommand => "human_in_command",
        }
    }

    /// Whether oversight falls short of full human command.
    pub fn is_weaker_than_full_command(&self) -> bool {
        *self < Self::HumanInCommand
    }
}

impl FromStr for OversightModel {
    type Err = AiraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human_on_loop" => Ok(Self::HumanOnLoop),
            "human_in_loop" => Ok(Self::HumanInLoop),
            "human_in_command" => Ok(Self::HumanInCommand),
            _ => Err(AiraError::UnknownIdentifier {
                kind: "human oversight model",
                value: s.to_string(),
            }),
        }
    }
}

/// Potential impact of the system's outputs on affected persons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    /// Minor suggestions a person can freely ignore.
    MinorSuggestions,
    /// Operational decisions with moderate consequences.
    OperationalDecisions,
    /// Life-changing or legally significant decisions.
    LifeChangingLegal,
}

impl ImpactLevel {
    pub const OPTIONS: &'static [&'static str] =
        &["minor_suggestions", "operational_decisions", "life_changing_legal"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MinorSuggestions => "minor_suggestions",
            Self::OperationalDecisions => "operational_decisions",
            Self::LifeChangingLegal => "life_changing_legal",
        }
    }

    /// Whether the impact exceeds the minimal level.
    pub fn is_above_minimal(&self) -> bool {
        *self > Self::MinorSuggestions
    }
}

impl FromStr for ImpactLevel {
    type Err = AiraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minor_suggestions" => Ok(Self::MinorSuggestions),
            "operational_decisions" => Ok(Self::OperationalDecisions),
            "life_changing_legal" => Ok(Self::LifeChangingLegal),
            _ => Err(AiraError::UnknownIdentifier {
                kind: "impact level",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prohibited_practices_keep_precedence_order() {
        let names: Vec<&str> = ProhibitedPractice::all().iter().map(|p| p.as_str()).collect();
        assert_eq!(
            names,
            [
                "subliminal_manipulation",
                "vulnerability_exploitation",
                "social_scoring",
                "realtime_biometric_identification"
            ]
        );
    }

    #[test]
    fn category_identifiers_round_trip() {
        for cat in HighRiskCategory::all() {
            assert_eq!(cat.as_str().parse::<HighRiskCategory>().unwrap(), *cat);
            let json = serde_json::to_string(cat).unwrap();
            assert_eq!(json, format!("\"{}\"", cat.as_str()));
        }
    }

    #[test]
    fn risk_tier_ordering_follows_severity() {
        assert!(RiskTier::Unacceptable > RiskTier::High);
        assert!(RiskTier::High > RiskTier::Limited);
        assert!(RiskTier::Limited > RiskTier::Minimal);
        assert!(RiskTier::Unacceptable.is_terminal());
    }

    #[test]
    fn risk_tier_parse_is_case_insensitive() {
        assert_eq!("HIGH".parse::<RiskTier>().unwrap(), RiskTier::High);
        assert!("severe".parse::<RiskTier>().is_err());
    }

    #[test]
    fn only_full_command_counts_as_full_oversight() {
        assert!(OversightModel::HumanOnLoop.is_weaker_than_full_command());
        assert!(OversightModel::HumanInLoop.is_weaker_than_full_command());
        assert!(!OversightModel::HumanInCommand.is_weaker_than_full_command());
    }

    #[test]
    fn minor_suggestions_is_the_minimal_impact() {
        assert!(!ImpactLevel::MinorSuggestions.is_above_minimal());
        assert!(ImpactLevel::OperationalDecisions.is_above_minimal());
        assert!(ImpactLevel::LifeChangingLegal.is_above_minimal());
    }

    #[test]
    fn choice_option_lists_parse() {
        for opt in OversightModel::OPTIONS {
            assert!(opt.parse::<OversightModel>().is_ok());
        }
        for opt in ImpactLevel::OPTIONS {
            assert!(opt.parse::<ImpactLevel>().is_ok());
        }
        for opt in Tristate::OPTIONS {
            assert!(opt.parse::<Tristate>().is_ok());
        }
    }
}
