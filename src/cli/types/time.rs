//! Time-related types for the FPL season.

use crate::error::{AlertError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe wrapper for gameweek numbers (one round of fixtures).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameweekId(pub u16);

impl GameweekId {
    pub fn new(gameweek: u16) -> Self {
        Self(gameweek)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl Default for GameweekId {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for GameweekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GameweekId {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
