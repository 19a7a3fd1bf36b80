//! # System Identifier
//!
//! Newtype for the identity of a regulated AI system. An assessment session
//! is keyed by this identifier; it is assigned by the remote registry when
//! the system is first registered.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AiraError;

/// Unique identifier for a registered AI system (and its assessment session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemId(pub Uuid);

impl SystemId {
    /// Generate a new random system identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a system identifier from its hyphenated UUID form.
    ///
    /// Surrounding whitespace is ignored; identifiers copied from URLs
    /// frequently carry a trailing newline.
    pub fn parse(s: &str) -> Result<Self, AiraError> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| AiraError::InvalidSystemId(s.to_string()))
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SystemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SystemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SystemId {
    type Err = AiraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
