//! Great-circle geometry for route corridors

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// A WGS84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and inside the lat/lon ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat.abs() <= 90.0
            && self.lon.abs() <= 180.0
    }

    pub fn distance_nm(&self, other: &Coordinate) -> f64 {
        haversine_nm(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Great-circle distance in nautical miles.
pub fn haversine_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    EARTH_RADIUS_NM * central_angle(lat1, lon1, lat2, lon2)
}

fn central_angle(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial bearing from `from` to `to`, radians
fn initial_bearing(from: &Coordinate, to: &Coordinate) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let dlon = (to.lon - from.lon).to_radians();
    let y = dlon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlon.cos();
    y.atan2(x)
}

/// Where a point falls relative to a route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteProjection {
    /// Distance from the nearest point on the route
    pub cross_track_nm: f64,
    /// Distance travelled along the route from its first point to the foot of the projection
    pub along_route_nm: f64,
}

/// Project `point` onto the great-circle segment `a -> b`.
///
/// The foot of the perpendicular is clamped to the segment, so points abeam
/// the extension of a segment measure to the nearest endpoint.
pub fn project_onto_segment(point: &Coordinate, a: &Coordinate, b: &Coordinate) -> RouteProjection {
    let d12 = central_angle(a.lat, a.lon, b.lat, b.lon);
    let d13 = central_angle(a.lat, a.lon, point.lat, point.lon);

    if d12 < 1e-12 {
        return RouteProjection {
            cross_track_nm: d13 * EARTH_RADIUS_NM,
            along_route_nm: 0.0,
        };
    }

    let delta = initial_bearing(a, point) - initial_bearing(a, b);
    let dxt = (d13.sin() * delta.sin()).clamp(-1.0, 1.0).asin();
    let dat = (d13.cos() / dxt.cos()).clamp(-1.0, 1.0).acos() * delta.cos().signum();

    if dat <= 0.0 {
        RouteProjection {
            cross_track_nm: d13 * EARTH_RADIUS_NM,
            along_route_nm: 0.0,
        }
    } else if dat >= d12 {
        RouteProjection {
            cross_track_nm: b.distance_nm(point),
            along_route_nm: d12 * EARTH_RADIUS_NM,
        }
    } else {
        RouteProjection {
            cross_track_nm: dxt.abs() * EARTH_RADIUS_NM,
            along_route_nm: dat * EARTH_RADIUS_NM,
        }
    }
}

/// Project `point` onto a polyline; `None` when the route has fewer than two points.
///
/// Ties between segments resolve to the earliest segment.
pub fn project_onto_route(point: &Coordinate, route: &[Coordinate]) -> Option<RouteProjection> {
    if route.len() < 2 {
        return None;
    }

    let mut best: Option<RouteProjection> = None;
    let mut travelled = 0.0;

    for leg in route.windows(2) {
        let segment = project_onto_segment(point, &leg[0], &leg[1]);
        let candidate = RouteProjection {
            cross_track_nm: segment.cross_track_nm,
            along_route_nm: travelled + segment.along_route_nm,
        };

        if best.is_none_or(|b| candidate.cross_track_nm < b.cross_track_nm) {
            best = Some(candidate);
        }

        travelled += leg[0].distance_nm(&leg[1]);
    }

    best
}
