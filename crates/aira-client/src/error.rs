//! Registry client error types.

use aira_wizard::PersistenceError;

/// Errors from registry API calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The registry returned a non-2xx status.
    #[error("registry {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// A 2xx response whose envelope reports failure or carries no data.
    #[error("registry {endpoint} reported failure: {message}")]
    Unsuccessful { endpoint: String, message: String },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl ClientError {
    /// HTTP status reported by the registry, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::Http { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<ClientError> for PersistenceError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::ApiError { status, body, .. } => PersistenceError::Rejected {
                status,
                message: body,
            },
            ClientError::Http { .. } => PersistenceError::Transport(err.to_string()),
            ClientError::Unsuccessful { .. } | ClientError::Deserialization { .. } => {
                PersistenceError::Protocol(err.to_string())
            }
            ClientError::Config(_) => PersistenceError::Transport(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_become_rejections() {
        let err = ClientError::ApiError {
            endpoint: "PUT /ai-systems/x/assessment".into(),
            status: 422,
            body: "step out of range".into(),
        };
        assert_eq!(err.status(), Some(422));
        assert_eq!(
            PersistenceError::from(err),
            PersistenceError::Rejected {
                status: 422,
                message: "step out of range".into()
            }
        );
    }

    #[test]
    fn envelope_failures_become_protocol_errors() {
        let err = ClientError::Unsuccessful {
            endpoint: "POST /ai-systems/x/classify".into(),
            message: "no data".into(),
        };
        assert!(matches!(PersistenceError::from(err), PersistenceError::Protocol(_)));
    }
}
