//! Enriched notice: a raw notice plus everything derived from the flight and user state

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::IdentityKey;
use crate::notam::RawNotam;
use crate::qcode::NotamCategory;
use crate::status::{ReviewState, UserStatus};

/// Context-derived relevance, independent of user status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Low,
    #[default]
    Normal,
    High,
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PriorityTier::Low => "low",
            PriorityTier::Normal => "normal",
            PriorityTier::High => "high",
        })
    }
}

/// A notice after enrichment. Rebuilt from scratch whenever an input changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedNotam {
    pub notam: RawNotam,
    pub key: IdentityKey,
    pub status: UserStatus,
    pub category: NotamCategory,
    /// Key absent from the previous briefing
    pub is_new: bool,
    pub is_globally_ignored: bool,
    /// Distance from the route centerline; `None` without position or route
    pub route_distance_nm: Option<f64>,
    /// Distance from departure measured along the route
    pub along_route_nm: Option<f64>,
    /// Distance to the nearer of departure and destination
    pub terminal_distance_nm: Option<f64>,
    pub is_altitude_relevant: bool,
    pub is_active_for_flight: bool,
    pub priority: PriorityTier,
    /// Name of the rule that decided the priority, `None` for the default
    pub priority_rule: Option<String>,
}

impl EnrichedNotam {
    pub fn state(&self) -> ReviewState {
        self.status.state
    }

    pub fn location(&self) -> &str {
        self.notam.location.as_deref().unwrap_or("")
    }
}
