//! Grouping of the filtered notices for display

use std::collections::HashMap;
use std::hash::Hash;

use notam_core::{EnrichedNotam, FlightContext, NotamCategory};
use serde::{Deserialize, Serialize};

/// Notices farther than this from the centerline go to the `Distant` bucket
pub const DEFAULT_DISTANT_THRESHOLD_NM: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// One flat group
    None,
    Airport,
    Category,
    #[default]
    RouteOrder,
}

/// Route-order buckets, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteBucket {
    Departure,
    EnRoute,
    Destination,
    Alternates,
    Distant,
    NoCoordinates,
}

impl RouteBucket {
    pub const ORDER: [RouteBucket; 6] = [
        RouteBucket::Departure,
        RouteBucket::EnRoute,
        RouteBucket::Destination,
        RouteBucket::Alternates,
        RouteBucket::Distant,
        RouteBucket::NoCoordinates,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RouteBucket::Departure => "Departure",
            RouteBucket::EnRoute => "En Route",
            RouteBucket::Destination => "Destination",
            RouteBucket::Alternates => "Alternates",
            RouteBucket::Distant => "Distant",
            RouteBucket::NoCoordinates => "No Coordinates",
        }
    }

    fn index(&self) -> usize {
        match self {
            RouteBucket::Departure => 0,
            RouteBucket::EnRoute => 1,
            RouteBucket::Destination => 2,
            RouteBucket::Alternates => 3,
            RouteBucket::Distant => 4,
            RouteBucket::NoCoordinates => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum GroupKey {
    All,
    Airport(String),
    Category(NotamCategory),
    Route(RouteBucket),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeGroup {
    pub key: GroupKey,
    pub title: String,
    pub notices: Vec<EnrichedNotam>,
}

/// Which route bucket a notice belongs to.
///
/// Airport roles win over geometry; a notice whose route distance is undefined
/// has no usable coordinates.
pub fn route_bucket(
    notice: &EnrichedNotam,
    context: &FlightContext,
    distant_threshold_nm: f64,
) -> RouteBucket {
    let location = notice.location();

    if !location.is_empty() {
        if context.is_departure(location) {
            return RouteBucket::Departure;
        }
        if context.is_destination(location) {
            return RouteBucket::Destination;
        }
        if context.is_alternate(location) {
            return RouteBucket::Alternates;
        }
    }

    match notice.route_distance_nm {
        None => RouteBucket::NoCoordinates,
        Some(d) if d > distant_threshold_nm => RouteBucket::Distant,
        Some(_) => RouteBucket::EnRoute,
    }
}

/// Group notices for display. Order within a group follows input order,
/// except en-route notices which are sorted by distance from departure.
pub fn group(
    notices: Vec<EnrichedNotam>,
    mode: GroupingMode,
    context: &FlightContext,
    distant_threshold_nm: f64,
) -> Vec<NoticeGroup> {
    match mode {
        GroupingMode::None => vec![NoticeGroup {
            key: GroupKey::All,
            title: "All NOTAMs".to_string(),
            notices,
        }],
        GroupingMode::Airport => group_by_first_appearance(notices, |n| n.location().trim().to_ascii_uppercase())
            .into_iter()
            .map(|(icao, notices)| NoticeGroup {
                title: if icao.is_empty() { "Unknown location".to_string() } else { icao.clone() },
                key: GroupKey::Airport(icao),
                notices,
            })
            .collect(),
        GroupingMode::Category => group_by_first_appearance(notices, |n| n.category)
            .into_iter()
            .map(|(category, notices)| NoticeGroup {
                key: GroupKey::Category(category),
                title: category.label().to_string(),
                notices,
            })
            .collect(),
        GroupingMode::RouteOrder => group_by_route(notices, context, distant_threshold_nm),
    }
}

fn group_by_first_appearance<K, F>(notices: Vec<EnrichedNotam>, key_of: F) -> Vec<(K, Vec<EnrichedNotam>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&EnrichedNotam) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<EnrichedNotam>)> = Vec::new();

    for notice in notices {
        let key = key_of(&notice);
        match index.get(&key) {
            Some(&i) => groups[i].1.push(notice),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![notice]));
            }
        }
    }

    groups
}

/// All six buckets, always in the fixed order, possibly empty
fn group_by_route(
    notices: Vec<EnrichedNotam>,
    context: &FlightContext,
    distant_threshold_nm: f64,
) -> Vec<NoticeGroup> {
    let mut buckets: Vec<Vec<EnrichedNotam>> = vec![Vec::new(); RouteBucket::ORDER.len()];

    for notice in notices {
        let bucket = route_bucket(&notice, context, distant_threshold_nm);
        buckets[bucket.index()].push(notice);
    }

    buckets[RouteBucket::EnRoute.index()].sort_by(|a, b| {
        let a = a.along_route_nm.unwrap_or(f64::INFINITY);
        let b = b.along_route_nm.unwrap_or(f64::INFINITY);
        a.total_cmp(&b)
    });

    RouteBucket::ORDER
        .iter()
        .zip(buckets)
        .map(|(bucket, notices)| NoticeGroup {
            key: GroupKey::Route(*bucket),
            title: bucket.label().to_string(),
            notices,
        })
        .collect()
}
