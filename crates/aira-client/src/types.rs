//! Wire types of the AI system registry.
//!
//! Every response is wrapped in `{success, data, message}`. Records use
//! `#[serde(default)]` generously: the registry's assessment table has grown
//! columns over time and older rows lack them.

use aira_classifier::RemoteClassification;
use aira_core::{StepIndex, SystemId, Timestamp, STEP_COUNT};
use aira_wizard::{CompletedSteps, SessionSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClientError;

/// Response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload. `success: false` or missing data is a failure.
    pub fn into_data(self, endpoint: &str) -> Result<T, ClientError> {
        let unsuccessful = |message: Option<String>, fallback: &str| ClientError::Unsuccessful {
            endpoint: endpoint.to_string(),
            message: message.unwrap_or_else(|| fallback.to_string()),
        };
        if self.success == Some(false) {
            return Err(unsuccessful(self.message, "success=false"));
        }
        self.data.ok_or_else(|| unsuccessful(self.message, "response carries no data"))
    }
}

/// Request to register a system.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSystemRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub development_stage: Option<String>,
}

/// A registered system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemRecord {
    pub id: SystemId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub development_stage: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Payload of `POST /ai-systems/`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedSystem {
    pub ai_system: SystemRecord,
    #[serde(default)]
    pub assessment: Option<Map<String, Value>>,
}

/// Payload of `GET /ai-systems/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemDetail {
    pub ai_system: SystemRecord,
    /// The latest assessment row, flat: bookkeeping columns and answers side by side.
    #[serde(default)]
    pub assessment: Option<Map<String, Value>>,
    #[serde(default)]
    pub classification: Option<RemoteClassification>,
}

/// Bookkeeping columns of an assessment row that are not answers.
const BOOKKEEPING: &[&str] = &[
    "id",
    "ai_system_id",
    "user_id",
    "current_step",
    "completed_steps",
    "draft_steps",
    "is_draft",
    "created_at",
    "updated_at",
];

impl SystemDetail {
    /// Project the assessment row into a session snapshot.
    ///
    /// Completed steps come from `step_<n>_completed` flags when the row has
    /// any, otherwise from `completed_steps` (a list or a count).
    /// `current_step` past the last step is clamped to the last step.
    pub fn into_snapshot(self) -> SessionSnapshot {
        let system_id = Some(self.ai_system.id);
        let Some(mut row) = self.assessment else {
            return SessionSnapshot {
                system_id,
                ..Default::default()
            };
        };

        let has_flags = row.keys().any(|k| k.starts_with("step_") && k.ends_with("_completed"));
        let completed_steps = if has_flags {
            CompletedSteps::from_flags(&row)
        } else {
            row.get("completed_steps")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default()
        };
        let current_step = row
            .get("current_step")
            .and_then(Value::as_i64)
            .and_then(|n| StepIndex::new(n.min(i64::from(STEP_COUNT))).ok());
        let draft_steps = row
            .get("draft_steps")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        let timestamp = |key: &str| {
            row.get(key)
                .and_then(Value::as_str)
                .and_then(|s| Timestamp::parse(s).ok())
        };
        let created_at = timestamp("created_at");
        let updated_at = timestamp("updated_at");

        row.retain(|k, _| {
            !BOOKKEEPING.contains(&k.as_str()) && !(k.starts_with("step_") && k.ends_with("_completed"))
        });

        SessionSnapshot {
            system_id,
            current_step,
            completed_steps,
            draft_steps,
            answers: row,
            created_at,
            updated_at,
        }
    }
}

/// Body of `PUT /ai-systems/{id}/assessment`.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentUpdate {
    pub step: StepIndex,
    /// The step's answers plus `is_draft`.
    pub data: Map<String, Value>,
}

/// Payload of a successful assessment update: the updated row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatedAssessment {
    #[serde(default)]
    pub updated_at: Option<String>,
}
