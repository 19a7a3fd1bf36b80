//! # Classification Input
//!
//! The typed projection of the flattened answers that the rules read.
//! Every field is optional: `None` means "never answered", which the engine
//! treats differently from a negative answer.

use std::collections::BTreeMap;

use aira_core::{
    AnswerRecord, AnswerSet, AnswerValue, HighRiskCategory, ImpactLevel, OversightModel,
    ProhibitedPractice, Tristate,
};
use serde::{Deserialize, Serialize};

use crate::error::ClassificationError;

/// Step-6 field whose `yes` answer marks a safety component.
pub const SAFETY_COMPONENT_FIELD: &str = "ai_regulated_product";

/// Answers relevant to classification, extracted from an [`AnswerSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationInput {
    /// Answered prohibited-practice flags. Absent key = unanswered.
    pub prohibited_practices: BTreeMap<ProhibitedPractice, bool>,
    /// Answered high-risk category flags. Absent key = unanswered.
    pub categories: BTreeMap<HighRiskCategory, bool>,
    pub preparatory_only: Option<bool>,
    /// `ai_regulated_product == yes`.
    pub safety_component: Option<bool>,
    pub automated_decision_legal_effect: Option<Tristate>,
    pub human_oversight_model: Option<OversightModel>,
    pub potential_impact: Option<ImpactLevel>,

    // Supporting answers, used only for minimal-tier confidence.
    pub third_party_conformity: Option<Tristate>,
    pub humans_can_override: Option<bool>,
    pub gdpr_compliance_status: Option<String>,
}

impl ClassificationInput {
    /// Build from all collected answers.
    pub fn from_answers(answers: &AnswerSet) -> Result<Self, ClassificationError> {
        Self::from_record(&answers.flatten())
    }

    /// Build from a flattened answer record.
    pub fn from_record(record: &AnswerRecord) -> Result<Self, ClassificationError> {
        let mut input = Self::default();
        for practice in ProhibitedPractice::all() {
            if let Some(v) = bool_field(record, practice.as_str())? {
                input.prohibited_practices.insert(*practice, v);
            }
        }
        for category in HighRiskCategory::all() {
            if let Some(v) = bool_field(record, category.as_str())? {
                input.categories.insert(*category, v);
            }
        }
        input.preparatory_only = bool_field(record, "preparatory_only")?;
        input.safety_component = yes_no_field(record, SAFETY_COMPONENT_FIELD)?;
        input.automated_decision_legal_effect = parsed_field(record, "automated_decision_legal_effect")?;
        input.human_oversight_model = parsed_field(record, "human_oversight_model")?;
        input.potential_impact = parsed_field(record, "potential_impact")?;
        input.third_party_conformity = parsed_field(record, "third_party_conformity")?;
        input.humans_can_override = yes_no_field(record, "humans_can_override")?;
        input.gdpr_compliance_status = text_field(record, "gdpr_compliance_status")?.map(str::to_string);
        Ok(input)
    }

    /// Convenience for building inputs field by field.
    pub fn with_practice(mut self, practice: ProhibitedPractice, value: bool) -> Self {
        self.prohibited_practices.insert(practice, value);
        self
    }

    /// Convenience for building inputs field by field.
    pub fn with_category(mut self, category: HighRiskCategory, value: bool) -> Self {
        self.categories.insert(category, value);
        self
    }

    /// First true prohibited practice in precedence order.
    pub fn first_violation(&self) -> Option<ProhibitedPractice> {
        ProhibitedPractice::all()
            .iter()
            .copied()
            .find(|p| self.prohibited_practices.get(p) == Some(&true))
    }

    /// First true category in precedence order.
    pub fn first_category(&self) -> Option<HighRiskCategory> {
        HighRiskCategory::all()
            .iter()
            .copied()
            .find(|c| self.categories.get(c) == Some(&true))
    }
}

fn invalid(field: &str, value: &AnswerValue) -> ClassificationError {
    let value = match value {
        AnswerValue::Bool(b) => b.to_string(),
        AnswerValue::Text(s) => s.clone(),
        AnswerValue::Set(s) => format!("{s:?}"),
    };
    ClassificationError::InvalidAnswer { field: field.to_string(), value }
}

fn bool_field(record: &AnswerRecord, field: &str) -> Result<Option<bool>, ClassificationError> {
    match record.get(field) {
        None => Ok(None),
        Some(AnswerValue::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(invalid(field, other)),
    }
}

fn text_field<'a>(record: &'a AnswerRecord, field: &str) -> Result<Option<&'a str>, ClassificationError> {
    match record.get(field) {
        None => Ok(None),
        Some(AnswerValue::Text(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(invalid(field, other)),
    }
}

fn yes_no_field(record: &AnswerRecord, field: &str) -> Result<Option<bool>, ClassificationError> {
    match text_field(record, field)? {
        None => Ok(None),
        Some("yes") => Ok(Some(true)),
        Some("no") => Ok(Some(false)),
        Some(other) => Err(ClassificationError::InvalidAnswer {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}

fn parsed_field<T: std::str::FromStr>(
    record: &AnswerRecord,
    field: &str,
) -> Result<Option<T>, ClassificationError> {
    match text_field(record, field)? {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| ClassificationError::InvalidAnswer {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}
