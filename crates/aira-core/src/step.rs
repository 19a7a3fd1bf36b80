//! # Step Index
//!
//! The assessment wizard has exactly ten steps. `StepIndex` is a validated
//! newtype over `u8` restricted to 1..=10 so out-of-range steps cannot reach
//! the controller or the catalog.

use serde::{Deserialize, Serialize};

use crate::error::AiraError;

/// Number of steps in the assessment wizard.
pub const STEP_COUNT: u8 = 10;

/// One-based index of a wizard step, guaranteed to be within 1..=10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct StepIndex(u8);

impl StepIndex {
    /// The first step (basic identification).
    pub const FIRST: StepIndex = StepIndex(1);
    /// The last step (governance readiness).
    pub const LAST: StepIndex = StepIndex(STEP_COUNT);

    /// Construct a step index, rejecting values outside 1..=10.
    pub fn new(n: i64) -> Result<Self, AiraError> {
        if (1..=i64::from(STEP_COUNT)).contains(&n) {
            Ok(Self(n as u8))
        } else {
            Err(AiraError::StepOutOfRange(n))
        }
    }

    /// Const constructor for catalog tables. Callers guarantee 1..=10.
    pub(crate) const fn from_catalog(n: u8) -> Self {
        Self(n)
    }

    /// The raw one-based value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// The following step, or `None` at the last step.
    pub fn next(self) -> Option<Self> {
        (self.0 < STEP_COUNT).then(|| Self(self.0 + 1))
    }

    /// The preceding step, or `None` at the first step.
    pub fn prev(self) -> Option<Self> {
        (self.0 > 1).then(|| Self(self.0 - 1))
    }

    /// All ten steps in order.
    pub fn all() -> impl Iterator<Item = StepIndex> {
        (1..=STEP_COUNT).map(StepIndex)
    }
}

impl TryFrom<i64> for StepIndex {
    type Error = AiraError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<StepIndex> for u8 {
    fn from(step: StepIndex) -> u8 {
        step.0
    }
}

impl std::fmt::Display for StepIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
