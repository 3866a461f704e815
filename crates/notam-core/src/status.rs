//! User-assigned review status

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Review state a pilot assigns to a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    #[default]
    Unread,
    Read,
    Important,
    Ignored,
    FollowUp,
}

impl ReviewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewState::Unread => "unread",
            ReviewState::Read => "read",
            ReviewState::Important => "important",
            ReviewState::Ignored => "ignored",
            ReviewState::FollowUp => "follow_up",
        }
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "unread" => Ok(ReviewState::Unread),
            "read" => Ok(ReviewState::Read),
            "important" => Ok(ReviewState::Important),
            "ignored" => Ok(ReviewState::Ignored),
            "follow_up" | "followup" => Ok(ReviewState::FollowUp),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

/// Status of one notice: a state plus an optional free-text note
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserStatus {
    pub state: ReviewState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl UserStatus {
    pub fn new(state: ReviewState) -> Self {
        Self { state, note: None }
    }

    pub fn with_state(mut self, state: ReviewState) -> Self {
        self.state = state;
        self
    }

    /// Blank notes clear the existing one
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        let trimmed = note.trim();
        self.note = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }
}
