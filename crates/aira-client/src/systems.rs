//! Typed client for the registry's AI system resource.
//!
//! ## Paths (relative to the configured base URL)
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `ai-systems/` | Register a system and open its assessment |
//! | GET    | `ai-systems/{id}` | System, latest assessment row, latest classification |
//! | PUT    | `ai-systems/{id}/assessment` | Save one step (`data.is_draft` marks drafts) |
//! | POST   | `ai-systems/{id}/classify` | Classify the stored answers |
//!
//! Requests are sent once. Failures surface to the caller, which decides
//! whether to try again.

use aira_classifier::RemoteClassification;
use aira_core::SystemId;
use aira_wizard::{SaveAck, StepWrite};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;
use crate::types::{
    AssessmentUpdate, CreateSystemRequest, CreatedSystem, Envelope, SystemDetail, UpdatedAssessment,
};

/// Resource path segment.
const API_PREFIX: &str = "ai-systems";

/// Client for the `ai-systems` resource.
#[derive(Debug, Clone)]
pub struct SystemsClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl SystemsClient {
    pub(crate) fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }

    /// Register a new system.
    ///
    /// Calls `POST {base_url}/ai-systems/`.
    pub async fn create(&self, req: &CreateSystemRequest) -> Result<CreatedSystem, ClientError> {
        let endpoint = "POST /ai-systems/";
        let url = format!("{}{}/", self.base_url, API_PREFIX);

        let resp = self
            .http
            .post(&url)
            .json(req)
            .send()
            .await
            .map_err(|e| ClientError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;
        let created: CreatedSystem = read_envelope(resp, endpoint).await?;
        tracing::info!(system_id = %created.ai_system.id, "system registered");
        Ok(created)
    }

    /// Get a system with its latest assessment and classification.
    ///
    /// Calls `GET {base_url}/ai-systems/{id}`.
    pub async fn get(&self, id: SystemId) -> Result<SystemDetail, ClientError> {
        let endpoint = format!("GET /ai-systems/{id}");
        let url = format!("{}{}/{id}", self.base_url, API_PREFIX);

        let resp = self.http.get(&url).send().await.map_err(|e| ClientError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        read_envelope(resp, &endpoint).await
    }

    /// Save one step's answers.
    ///
    /// Calls `PUT {base_url}/ai-systems/{id}/assessment`.
    pub async fn save_step(&self, id: SystemId, write: &StepWrite) -> Result<SaveAck, ClientError> {
        let endpoint = format!("PUT /ai-systems/{id}/assessment");
        let url = format!("{}{}/{id}/assessment", self.base_url, API_PREFIX);

        let mut data = write.data.to_json_map();
        data.insert("is_draft".into(), Value::Bool(write.is_draft));
        let body = AssessmentUpdate { step: write.step, data };

        let resp = self
            .http
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        let updated: UpdatedAssessment = read_envelope(resp, &endpoint).await?;
        tracing::debug!(system_id = %id, step = write.step.get(), is_draft = write.is_draft, "step stored");
        Ok(SaveAck {
            updated_at: updated
                .updated_at
                .as_deref()
                .and_then(|s| aira_core::Timestamp::parse(s).ok()),
        })
    }

    /// Classify the stored answers. The record is returned unvalidated.
    ///
    /// Calls `POST {base_url}/ai-systems/{id}/classify`.
    pub async fn classify(&self, id: SystemId) -> Result<RemoteClassification, ClientError> {
        let endpoint = format!("POST /ai-systems/{id}/classify");
        let url = format!("{}{}/{id}/classify", self.base_url, API_PREFIX);

        let resp = self.http.post(&url).send().await.map_err(|e| ClientError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        read_envelope(resp, &endpoint).await
    }
}

/// Check the status, decode the envelope and unwrap its data.
async fn read_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
    endpoint: &str,
) -> Result<T, ClientError> {
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::ApiError {
            endpoint: endpoint.into(),
            status,
            body,
        });
    }

    let envelope: Envelope<T> = resp.json().await.map_err(|e| ClientError::Deserialization {
        endpoint: endpoint.into(),
        source: e,
    })?;
    envelope.into_data(endpoint)
}
