//! Allocation events emitted alongside every counter write.

use crate::error::BanditResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Spin,
    Win,
    Lose,
}

/// One spin, win or loss. Serialized as a single JSON line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEvent {
    pub kind: EventKind,
    /// Seconds since the Unix epoch, with microsecond precision.
    pub timestamp: f64,
    pub nonce: String,
    pub test: String,
    pub choice: String,
}

impl AllocationEvent {
    pub fn new(kind: EventKind, nonce: String, test: &str, choice: &str) -> Self {
        Self {
            kind,
            timestamp: Utc::now().timestamp_micros() as f64 / 1_000_000.0,
            nonce,
            test: test.to_string(),
            choice: choice.to_string(),
        }
    }

    pub fn to_line(&self) -> BanditResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
