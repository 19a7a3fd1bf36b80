//! # aira-client -- Typed HTTP client for the AI system registry
//!
//! The registry stores registered systems, their assessment answers and
//! classification results. This crate wraps its REST API and implements
//! [`AssessmentGateway`] on top of it, so a
//! [`StepController`](aira_wizard::StepController) can drive an assessment
//! that lives remotely.
//!
//! ## Error mapping
//!
//! | Client error | Gateway error |
//! |--------------|---------------|
//! | 404 on `GET ai-systems/{id}` | `NotFound` |
//! | other non-2xx | `Rejected { status, message }` |
//! | transport failure, timeout | `Transport` |
//! | `success: false`, missing data, undecodable body | `Protocol` |

pub mod config;
pub mod error;
pub mod systems;
pub mod types;

pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use types::{CreateSystemRequest, CreatedSystem, SystemDetail, SystemRecord};

use std::time::Duration;

use aira_classifier::RemoteClassification;
use aira_core::SystemId;
use aira_wizard::{AssessmentGateway, PersistenceError, SaveAck, SessionSnapshot, StepWrite};

/// Top-level registry client.
#[derive(Debug, Clone)]
pub struct AiraClient {
    systems: systems::SystemsClient,
}

impl AiraClient {
    /// Create a new registry client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let mut value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| ClientError::Config(ConfigError::InvalidToken))?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            systems: systems::SystemsClient::new(http, config.base_url),
        })
    }

    /// Access the `ai-systems` resource client.
    pub fn systems(&self) -> &systems::SystemsClient {
        &self.systems
    }
}

impl AssessmentGateway for AiraClient {
    async fn fetch(&self, system_id: SystemId) -> Result<SessionSnapshot, PersistenceError> {
        match self.systems.get(system_id).await {
            Ok(detail) => Ok(detail.into_snapshot()),
            Err(e) if e.status() == Some(404) => Err(PersistenceError::NotFound(system_id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, system_id: SystemId, write: &StepWrite) -> Result<SaveAck, PersistenceError> {
        match self.systems.save_step(system_id, write).await {
            Ok(ack) => Ok(ack),
            Err(e) if e.status() == Some(404) => Err(PersistenceError::NotFound(system_id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn classify(&self, system_id: SystemId) -> Result<RemoteClassification, PersistenceError> {
        Ok(self.systems.classify(system_id).await?)
    }
}
