//! Flight context: route geometry, cruise altitude and time window

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::geo::{project_onto_route, Coordinate, RouteProjection};
use crate::Result;

pub const DEFAULT_WINDOW_BUFFER: Duration = Duration::hours(2);

/// Half-height of the altitude band around cruise
pub const CRUISE_ALTITUDE_MARGIN_FT: i32 = 2000;

/// Flight data as supplied by the route planner
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlightPlan {
    #[serde(default)]
    pub route: Vec<Coordinate>,
    pub departure: Option<String>,
    pub destination: Option<String>,
    #[serde(default)]
    pub alternates: Vec<String>,
    /// Defaults to the first route point
    pub departure_point: Option<Coordinate>,
    /// Defaults to the last route point
    pub destination_point: Option<Coordinate>,
    pub cruise_altitude_ft: Option<i32>,
    #[serde(default, with = "time::serde::timestamp::option")]
    pub departure_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::timestamp::option")]
    pub arrival_time: Option<OffsetDateTime>,
}

impl FlightPlan {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Immutable snapshot of the current flight. Derived values are computed once
/// at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightContext {
    route: Vec<Coordinate>,
    departure: Option<String>,
    destination: Option<String>,
    alternates: Vec<String>,
    departure_point: Option<Coordinate>,
    destination_point: Option<Coordinate>,
    cruise_altitude_ft: Option<i32>,
    departure_time: Option<OffsetDateTime>,
    arrival_time: Option<OffsetDateTime>,
    window_before: Duration,
    window_after: Duration,
    flight_window_start: Option<OffsetDateTime>,
    flight_window_end: Option<OffsetDateTime>,
    cruise_altitude_range: Option<(i32, i32)>,
}

fn normalize_icao(icao: Option<String>) -> Option<String> {
    icao.map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
}

impl FlightContext {
    /// Build from a plan. Invalid route coordinates are dropped.
    pub fn new(plan: FlightPlan) -> Self {
        let route: Vec<Coordinate> = plan.route.into_iter().filter(Coordinate::is_valid).collect();

        let departure_point = plan
            .departure_point
            .filter(Coordinate::is_valid)
            .or_else(|| route.first().copied());
        let destination_point = plan
            .destination_point
            .filter(Coordinate::is_valid)
            .or_else(|| if route.len() > 1 { route.last().copied() } else { None });

        let cruise_altitude_range = plan.cruise_altitude_ft.map(|cruise| {
            (
                cruise.saturating_sub(CRUISE_ALTITUDE_MARGIN_FT),
                cruise.saturating_add(CRUISE_ALTITUDE_MARGIN_FT),
            )
        });

        let mut context = Self {
            route,
            departure: normalize_icao(plan.departure),
            destination: normalize_icao(plan.destination),
            alternates: plan
                .alternates
                .into_iter()
                .filter_map(|a| normalize_icao(Some(a)))
                .collect(),
            departure_point,
            destination_point,
            cruise_altitude_ft: plan.cruise_altitude_ft,
            departure_time: plan.departure_time,
            arrival_time: plan.arrival_time,
            window_before: DEFAULT_WINDOW_BUFFER,
            window_after: DEFAULT_WINDOW_BUFFER,
            flight_window_start: None,
            flight_window_end: None,
            cruise_altitude_range,
        };
        context.compute_window();
        context
    }

    /// Same flight with different buffers around departure and arrival
    pub fn with_window_buffers(mut self, before: Duration, after: Duration) -> Self {
        self.window_before = before;
        self.window_after = after;
        self.compute_window();
        self
    }

    fn compute_window(&mut self) {
        self.flight_window_start = self
            .departure_time
            .and_then(|t| t.checked_sub(self.window_before));
        self.flight_window_end = self
            .arrival_time
            .and_then(|t| t.checked_add(self.window_after));
    }

    pub fn route(&self) -> &[Coordinate] {
        &self.route
    }

    pub fn has_valid_route(&self) -> bool {
        self.route.len() >= 2
    }

    pub fn departure(&self) -> Option<&str> {
        self.departure.as_deref()
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn alternates(&self) -> &[String] {
        &self.alternates
    }

    pub fn cruise_altitude_ft(&self) -> Option<i32> {
        self.cruise_altitude_ft
    }

    pub fn departure_time(&self) -> Option<OffsetDateTime> {
        self.departure_time
    }

    pub fn arrival_time(&self) -> Option<OffsetDateTime> {
        self.arrival_time
    }

    pub fn flight_window_start(&self) -> Option<OffsetDateTime> {
        self.flight_window_start
    }

    pub fn flight_window_end(&self) -> Option<OffsetDateTime> {
        self.flight_window_end
    }

    /// `[cruise - 2000, cruise + 2000]` ft
    pub fn cruise_altitude_range(&self) -> Option<(i32, i32)> {
        self.cruise_altitude_range
    }

    /// Minimum distance to the route centerline; `None` without a valid route
    pub fn distance_from_centerline(&self, point: &Coordinate) -> Option<f64> {
        self.project(point).map(|p| p.cross_track_nm)
    }

    pub fn project(&self, point: &Coordinate) -> Option<RouteProjection> {
        if !point.is_valid() {
            return None;
        }
        project_onto_route(point, &self.route)
    }

    /// Whether `[low, high]` intersects the cruise band.
    ///
    /// `None` when cruise altitude is unknown. A missing lower limit means
    /// surface, a missing upper limit means unlimited.
    pub fn overlaps_altitude(&self, low: Option<i32>, high: Option<i32>) -> Option<bool> {
        let (cruise_low, cruise_high) = self.cruise_altitude_range?;
        let low = low.unwrap_or(i32::MIN);
        let high = high.unwrap_or(i32::MAX);
        Some(low <= cruise_high && high >= cruise_low)
    }

    /// Whether a validity interval overlaps the flight window.
    ///
    /// Missing bounds on either side are unbounded, so permanent notices and
    /// flights without times are always active.
    pub fn overlaps_window(
        &self,
        from: Option<OffsetDateTime>,
        to: Option<OffsetDateTime>,
    ) -> bool {
        let (Some(from), Some(to)) = (from, to) else {
            return true;
        };

        let starts_before_window_ends = self.flight_window_end.is_none_or(|end| from <= end);
        let ends_after_window_starts = self.flight_window_start.is_none_or(|start| to >= start);

        starts_before_window_ends && ends_after_window_starts
    }

    /// Distance to the nearer of the departure and destination airports
    pub fn terminal_distance(&self, point: &Coordinate) -> Option<f64> {
        if !point.is_valid() {
            return None;
        }
        [self.departure_point, self.destination_point]
            .iter()
            .flatten()
            .map(|airport| airport.distance_nm(point))
            .min_by(f64::total_cmp)
    }

    pub fn is_departure(&self, icao: &str) -> bool {
        self.departure
            .as_deref()
            .is_some_and(|d| d.eq_ignore_ascii_case(icao.trim()))
    }

    pub fn is_destination(&self, icao: &str) -> bool {
        self.destination
            .as_deref()
            .is_some_and(|d| d.eq_ignore_ascii_case(icao.trim()))
    }

    pub fn is_terminal(&self, icao: &str) -> bool {
        self.is_departure(icao) || self.is_destination(icao)
    }

    pub fn is_alternate(&self, icao: &str) -> bool {
        self.alternates
            .iter()
            .any(|a| a.eq_ignore_ascii_case(icao.trim()))
    }
}

impl From<FlightPlan> for FlightContext {
    fn from(plan: FlightPlan) -> Self {
        Self::new(plan)
    }
}

impl Default for FlightContext {
    fn default() -> Self {
        Self::new(FlightPlan::default())
    }
}
