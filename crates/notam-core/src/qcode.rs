//! ICAO Q-code parsing and the 12-way notice classification

use std::fmt;

use serde::{Deserialize, Serialize};

/// Subjects that concern helicopter operations (heliports, FATO, heliport lighting)
pub const HELICOPTER_SUBJECTS: &[&str] = &["FH", "FP", "LU", "LW"];

/// Obstacle and obstacle-light subjects
pub const OBSTACLE_SUBJECTS: &[&str] = &["OB", "OL"];

/// Q-code condition for "closed"
pub const CLOSED_CONDITION: &str = "LC";

/// A parsed Q-code: a two-letter subject and an optional two-letter condition.
///
/// Accepts the full Q-line form (`QMRLC`) as well as the bare forms (`MRLC`, `MR`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QCode {
    subject: String,
    condition: Option<String>,
}

impl QCode {
    pub fn parse(raw: &str) -> Option<Self> {
        let letters: String = raw
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        // An odd length means the leading Q marker is present
        let body = match letters.len() {
            3 | 5 => letters.strip_prefix('Q')?,
            2 | 4 => letters.as_str(),
            _ => return None,
        };

        let subject = body[..2].to_string();
        let condition = (body.len() == 4).then(|| body[2..].to_string());

        Some(Self { subject, condition })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn category(&self) -> NotamCategory {
        NotamCategory::from_subject(&self.subject)
    }

    pub fn is_helicopter(&self) -> bool {
        HELICOPTER_SUBJECTS.contains(&self.subject.as_str())
    }

    pub fn is_obstacle(&self) -> bool {
        OBSTACLE_SUBJECTS.contains(&self.subject.as_str())
    }

    pub fn is_closed(&self) -> bool {
        self.condition.as_deref() == Some(CLOSED_CONDITION)
    }
}

impl fmt::Display for QCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}{}", self.subject, self.condition.as_deref().unwrap_or(""))
    }
}

/// Top-level ICAO grouping of categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    /// Aerodromes, air routes and ground aids
    Aga,
    /// Communications, navigation and surveillance
    Cns,
    /// Air traffic management
    Atm,
    Other,
}

/// Notice category derived from the Q-code subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotamCategory {
    Lighting,
    MovementArea,
    Facilities,
    Communications,
    InstrumentApproach,
    Navigation,
    Airspace,
    Restrictions,
    AirTrafficServices,
    Warnings,
    Obstacles,
    Miscellaneous,
}

impl NotamCategory {
    pub const ALL: [NotamCategory; 12] = [
        NotamCategory::Lighting,
        NotamCategory::MovementArea,
        NotamCategory::Facilities,
        NotamCategory::Communications,
        NotamCategory::InstrumentApproach,
        NotamCategory::Navigation,
        NotamCategory::Airspace,
        NotamCategory::Restrictions,
        NotamCategory::AirTrafficServices,
        NotamCategory::Warnings,
        NotamCategory::Obstacles,
        NotamCategory::Miscellaneous,
    ];

    /// Classify a two-letter subject. Unknown subjects land in `Miscellaneous`.
    pub fn from_subject(subject: &str) -> Self {
        if OBSTACLE_SUBJECTS.contains(&subject) {
            return NotamCategory::Obstacles;
        }

        match subject.chars().next() {
            Some('L') => NotamCategory::Lighting,
            Some('M') => NotamCategory::MovementArea,
            Some('F') => NotamCategory::Facilities,
            Some('C') => NotamCategory::Communications,
            Some('I') => NotamCategory::InstrumentApproach,
            Some('N') | Some('G') => NotamCategory::Navigation,
            Some('A') => NotamCategory::Airspace,
            Some('R') => NotamCategory::Restrictions,
            Some('S') | Some('P') => NotamCategory::AirTrafficServices,
            Some('W') => NotamCategory::Warnings,
            _ => NotamCategory::Miscellaneous,
        }
    }

    pub fn group(&self) -> CategoryGroup {
        match self {
            NotamCategory::Lighting | NotamCategory::MovementArea | NotamCategory::Facilities => {
                CategoryGroup::Aga
            }
            NotamCategory::Communications
            | NotamCategory::InstrumentApproach
            | NotamCategory::Navigation => CategoryGroup::Cns,
            NotamCategory::Airspace
            | NotamCategory::Restrictions
            | NotamCategory::AirTrafficServices => CategoryGroup::Atm,
            NotamCategory::Warnings | NotamCategory::Obstacles | NotamCategory::Miscellaneous => {
                CategoryGroup::Other
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NotamCategory::Lighting => "Lighting",
            NotamCategory::MovementArea => "Movement Area",
            NotamCategory::Facilities => "Facilities & Services",
            NotamCategory::Communications => "Communications & Surveillance",
            NotamCategory::InstrumentApproach => "ILS / MLS",
            NotamCategory::Navigation => "Navigation Aids & GNSS",
            NotamCategory::Airspace => "Airspace Organization",
            NotamCategory::Restrictions => "Airspace Restrictions",
            NotamCategory::AirTrafficServices => "ATS & Procedures",
            NotamCategory::Warnings => "Navigation Warnings",
            NotamCategory::Obstacles => "Obstacles",
            NotamCategory::Miscellaneous => "Other Information",
        }
    }
}

impl fmt::Display for NotamCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
