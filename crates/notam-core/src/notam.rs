//! Raw NOTAM record as delivered by the briefing importer

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::geo::Coordinate;
use crate::qcode::{NotamCategory, QCode};
use crate::Result;

static HELICOPTER_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(HELIPORT|HELIPAD|FATO)\b").expect("valid regex"));

static CLOSED_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(CLSD|CLOSED)\b").expect("valid regex"));

/// One notice of a briefing. Read-only for the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawNotam {
    pub id: Option<String>,
    pub q_code: Option<String>,
    pub location: Option<String>,
    /// Q-line scope letters (`A` aerodrome, `E` en-route, `W` nav warning)
    pub scope: Option<String>,
    pub point: Option<Coordinate>,
    pub lower_limit_ft: Option<i32>,
    pub upper_limit_ft: Option<i32>,
    #[serde(default, with = "time::serde::timestamp::option")]
    pub effective_from: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::timestamp::option")]
    pub effective_to: Option<OffsetDateTime>,
    #[serde(default)]
    pub message: String,
}

impl RawNotam {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_q_code(mut self, q_code: impl Into<String>) -> Self {
        self.q_code = Some(q_code.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_point(mut self, lat: f64, lon: f64) -> Self {
        self.point = Some(Coordinate::new(lat, lon));
        self
    }

    pub fn with_limits(mut self, lower_ft: Option<i32>, upper_ft: Option<i32>) -> Self {
        self.lower_limit_ft = lower_ft;
        self.upper_limit_ft = upper_ft;
        self
    }

    pub fn with_effective(
        mut self,
        from: Option<OffsetDateTime>,
        to: Option<OffsetDateTime>,
    ) -> Self {
        self.effective_from = from;
        self.effective_to = to;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn parsed_q_code(&self) -> Option<QCode> {
        self.q_code.as_deref().and_then(QCode::parse)
    }

    /// Unparseable or missing Q-codes classify as `Miscellaneous`
    pub fn category(&self) -> NotamCategory {
        self.parsed_q_code()
            .map(|q| q.category())
            .unwrap_or(NotamCategory::Miscellaneous)
    }

    /// Usable position, if any
    pub fn position(&self) -> Option<Coordinate> {
        self.point.filter(Coordinate::is_valid)
    }

    pub fn is_helicopter_related(&self) -> bool {
        self.parsed_q_code().is_some_and(|q| q.is_helicopter())
            || HELICOPTER_TEXT.is_match(&self.message)
    }

    pub fn is_obstacle(&self) -> bool {
        self.parsed_q_code().is_some_and(|q| q.is_obstacle())
    }

    /// Runway, taxiway or apron closure
    pub fn is_movement_area_closure(&self) -> bool {
        match self.parsed_q_code() {
            Some(q) if q.category() == NotamCategory::MovementArea => {
                q.is_closed() || CLOSED_TEXT.is_match(&self.message)
            }
            _ => false,
        }
    }

    /// Case-insensitive ICAO comparison
    pub fn is_at(&self, icao: &str) -> bool {
        self.location
            .as_deref()
            .is_some_and(|loc| loc.trim().eq_ignore_ascii_case(icao.trim()))
    }
}

/// Parse a briefing exported as a JSON array of notices
pub fn parse_briefing(json: &str) -> Result<Vec<RawNotam>> {
    Ok(serde_json::from_str(json)?)
}
