//! # Classification Report
//!
//! The exported artifact of an assessment: the classification with its
//! rationale, a fixed compliance checklist for the tier, and a timeline of
//! milestone dates at fixed month offsets from the report date.
//!
//! | Tier | Milestones (months from report date) |
//! |------|--------------------------------------|
//! | unacceptable | +0 cease, +1 withdraw |
//! | high | +3, +6, +12 |
//! | limited | +3, +6 |
//! | minimal | +12 |
//!
//! A result carrying a prohibited-practice violation always gets the
//! cessation checklist, whatever tier was reported alongside it.
//!
//! When step-10 answers are available the report also carries a
//! [`ReadinessSummary`] of the governance measures already in place.

use aira_core::{AnswerRecord, AnswerSet, RiskTier, StepIndex, SystemId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::result::{ClassificationResult, RuleId};

/// Report construction failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// A milestone fell outside the representable calendar range.
    #[error("milestone at +{months} months from {from} is out of range")]
    DateOutOfRange { from: NaiveDate, months: u32 },
}

// ---------------------------------------------------------------------------
// Checklists
// ---------------------------------------------------------------------------

const CESSATION: &[&str] = &[
    "Immediate cessation of development/deployment",
    "System cannot be placed on the EU market",
    "Review system design to eliminate prohibited practices",
    "Consider alternative approaches that comply with Article 5",
];

const HIGH_RISK: &[&str] = &[
    "Technical documentation (Article 11)",
    "Risk management system (Article 9)",
    "Data governance and management (Article 10)",
    "Human oversight measures (Article 14)",
    "Accuracy, robustness and cybersecurity (Article 15)",
    "Conformity assessment procedure",
    "CE marking and EU declaration of conformity",
    "Registration in EU database",
    "Quality management system",
    "Post-market monitoring system",
];

const TRANSPARENCY: &[&str] = &[
    "Transparency obligations - inform users about AI interaction",
    "Design system to clearly indicate AI operation",
    "Provide clear information about AI capabilities and limitations",
    "Implement user notification mechanisms",
];

const VOLUNTARY: &[&str] = &[
    "Voluntary codes of conduct (encouraged)",
    "AI ethics guidelines compliance",
    "Best practices for responsible AI development",
    "Regular system monitoring and updates",
];

/// The fixed compliance checklist for a classification.
pub fn compliance_requirements(result: &ClassificationResult) -> &'static [&'static str] {
    if result.prohibited_practice_violation() {
        return CESSATION;
    }
    match result.risk_tier {
        RiskTier::Unacceptable => CESSATION,
        RiskTier::High => HIGH_RISK,
        RiskTier::Limited => TRANSPARENCY,
        RiskTier::Minimal => VOLUNTARY,
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// Urgency of the implementation timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

/// A dated milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub months_from_report: u32,
    pub due: NaiveDate,
    pub description: String,
}

fn milestone_plan(tier: RiskTier) -> (Urgency, &'static [(u32, &'static str)]) {
    match tier {
        RiskTier::Unacceptable => (
            Urgency::High,
            &[
                (0, "Stop development and deployment of the prohibited functionality"),
                (1, "Withdraw the system from service and document remediation"),
            ],
        ),
        RiskTier::High => (
            Urgency::High,
            &[
                (3, "Risk management system and technical documentation in place"),
                (6, "Data governance, human oversight and quality management implemented"),
                (12, "Conformity assessment completed, CE marking and EU database registration"),
            ],
        ),
        RiskTier::Limited => (
            Urgency::Medium,
            &[
                (3, "User notification of AI interaction implemented"),
                (6, "Transparency documentation published"),
            ],
        ),
        RiskTier::Minimal => (
            Urgency::Low,
            &[(12, "Review adherence to voluntary codes of conduct")],
        ),
    }
}

fn timeline(tier: RiskTier, report_date: Timestamp) -> Result<Vec<Milestone>, ReportError> {
    let (_, plan) = milestone_plan(tier);
    plan.iter()
        .map(|(months, description)| {
            let due = report_date
                .date_plus_months(*months)
                .ok_or(ReportError::DateOutOfRange {
                    from: report_date.date(),
                    months: *months,
                })?;
            Ok(Milestone {
                months_from_report: *months,
                due,
                description: (*description).to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Governance readiness
// ---------------------------------------------------------------------------

/// State of one governance measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    Ready,
    InProgress,
    Gap,
    Unanswered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessItem {
    pub field: String,
    pub status: ReadinessStatus,
}

/// Summary of the step-10 governance answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessSummary {
    pub items: Vec<ReadinessItem>,
    /// Number of items in [`ReadinessStatus::Ready`].
    pub ready: usize,
    /// Fields whose measure is missing or unanswered.
    pub gaps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance_owner: Option<String>,
}

const READINESS_FIELDS: &[&str] = &[
    "risk_management_system",
    "quality_management_system",
    "technical_documentation_status",
    "post_market_monitoring",
    "compliance_owner_assigned",
];

impl ReadinessSummary {
    /// Summarize the governance answers of step 10.
    pub fn from_record(record: &AnswerRecord) -> Self {
        let items: Vec<ReadinessItem> = READINESS_FIELDS
            .iter()
            .map(|field| {
                let status = match record.text(field) {
                    Some("yes" | "complete") => ReadinessStatus::Ready,
                    Some("in_progress" | "partial" | "planned") => ReadinessStatus::InProgress,
                    Some(_) => ReadinessStatus::Gap,
                    None => ReadinessStatus::Unanswered,
                };
                ReadinessItem { field: (*field).to_string(), status }
            })
            .collect();
        let ready = items.iter().filter(|i| i.status == ReadinessStatus::Ready).count();
        let gaps = items
            .iter()
            .filter(|i| matches!(i.status, ReadinessStatus::Gap | ReadinessStatus::Unanswered))
            .map(|i| i.field.clone())
            .collect();
        Self {
            items,
            ready,
            gaps,
            compliance_owner: record.text("compliance_owner").map(str::to_string),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Exported classification report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub system_id: SystemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_name: Option<String>,
    pub classified_at: Timestamp,
    pub report_date: NaiveDate,
    pub risk_tier: RiskTier,
    pub primary_reason: RuleId,
    pub rationale: String,
    pub confidence_level: aira_core::ConfidenceLevel,
    pub prohibited_practice_violation: bool,
    pub category_match: bool,
    pub has_exceptions: bool,
    pub compliance_requirements: Vec<String>,
    pub urgency: Urgency,
    pub timeline: Vec<Milestone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub governance_readiness: Option<ReadinessSummary>,
}

impl ComplianceReport {
    /// Build the report for `result`, dating milestones from `report_date`.
    ///
    /// `answers` contributes the system name and, once step 10 has answers,
    /// the governance readiness summary.
    pub fn build(
        system_id: SystemId,
        result: &ClassificationResult,
        answers: Option<&AnswerSet>,
        report_date: Timestamp,
    ) -> Result<Self, ReportError> {
        let tier = if result.prohibited_practice_violation() {
            RiskTier::Unacceptable
        } else {
            result.risk_tier
        };
        let (urgency, _) = milestone_plan(tier);
        let system_name = answers
            .and_then(|a| a.step(StepIndex::FIRST))
            .and_then(|r| r.text("system_name"))
            .map(str::to_string);
        let governance_readiness = answers
            .and_then(|a| a.step(StepIndex::LAST))
            .filter(|r| !r.is_empty())
            .map(ReadinessSummary::from_record);

        Ok(Self {
            system_id,
            system_name,
            classified_at: result.computed_at,
            report_date: report_date.date(),
            risk_tier: result.risk_tier,
            primary_reason: result.primary_reason.clone(),
            rationale: result.rationale(),
            confidence_level: result.confidence_level,
            prohibited_practice_violation: result.prohibited_practice_violation(),
            category_match: result.category_match(),
            has_exceptions: result.has_exceptions,
            compliance_requirements: compliance_requirements(result)
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            urgency,
            timeline: timeline(tier, report_date)?,
            governance_readiness,
        })
    }
}
