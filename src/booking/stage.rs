use crate::errors::{BookingError, Result};
use serde::{Deserialize, Serialize};

/// Where a booking session currently stands.
///
/// The flow only ever moves forward: search, pick a room, enter guest data,
/// pay. `Completed` and `Failed` are terminal. Every stage operation guards
/// on the expected stage and rejects out-of-order calls, so a replayed
/// request cannot re-run a side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "search")]
    Search,
    #[serde(rename = "room-selection")]
    RoomSelection,
    #[serde(rename = "personal-data")]
    PersonalData,
    #[serde(rename = "payment")]
    Payment,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Search => "search",
            Stage::RoomSelection => "room-selection",
            Stage::PersonalData => "personal-data",
            Stage::Payment => "payment",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Completed | Stage::Failed)
    }

    /// Guard for stage operations: errors unless the session is exactly at
    /// `expected`, leaving the stage untouched.
    pub fn require(&self, expected: Stage) -> Result<()> {
        if *self == expected {
            Ok(())
        } else {
            Err(BookingError::SessionStateViolation {
                expected: expected.as_str().to_string(),
                actual: self.as_str().to_string(),
            })
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
