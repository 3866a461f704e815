//! Filter pipeline
//!
//! A fixed sequence of independent predicates over enriched notices. Stage
//! order is part of the contract: structural and globally scoped filters run
//! before text search, and later stages assume earlier ones have already
//! pruned distance and time irrelevant notices.

pub mod stages;

use std::collections::BTreeSet;

use notam_core::{CategoryGroup, EnrichedNotam, NotamCategory, PriorityTier, ReviewState};
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::debug;

use crate::group::GroupingMode;

/// ICAO category switches. Everything is enabled unless listed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryToggles {
    #[serde(default)]
    pub disabled: BTreeSet<NotamCategory>,
}

impl CategoryToggles {
    pub fn is_enabled(&self, category: NotamCategory) -> bool {
        !self.disabled.contains(&category)
    }

    pub fn set(&mut self, category: NotamCategory, enabled: bool) {
        if enabled {
            self.disabled.remove(&category);
        } else {
            self.disabled.insert(category);
        }
    }

    /// Switch a whole AGA/CNS/ATM/Other group
    pub fn set_group(&mut self, group: CategoryGroup, enabled: bool) {
        for category in NotamCategory::ALL.iter().filter(|c| c.group() == group) {
            self.set(*category, enabled);
        }
    }

    pub fn enable_all(&mut self) {
        self.disabled.clear();
    }
}

/// Q-line scope selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeFilter {
    #[default]
    All,
    Aerodrome,
    EnRoute,
    NavWarning,
}

impl ScopeFilter {
    /// Notices without a scope always match
    pub fn matches(&self, scope: Option<&str>) -> bool {
        let letter = match self {
            ScopeFilter::All => return true,
            ScopeFilter::Aerodrome => 'A',
            ScopeFilter::EnRoute => 'E',
            ScopeFilter::NavWarning => 'W',
        };

        match scope.map(str::trim).filter(|s| !s.is_empty()) {
            Some(scope) => scope.chars().any(|c| c.eq_ignore_ascii_case(&letter)),
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartFilters {
    pub hide_helicopter: bool,
    pub filter_obstacles: bool,
    /// Obstacles farther than this from departure/destination are hidden
    pub obstacle_distance_nm: f64,
    pub scope: ScopeFilter,
}

impl Default for SmartFilters {
    fn default() -> Self {
        Self {
            hide_helicopter: true,
            filter_obstacles: true,
            obstacle_distance_nm: 2.0,
            scope: ScopeFilter::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorFilter {
    pub enabled: bool,
    pub width_nm: f64,
}

impl Default for CorridorFilter {
    fn default() -> Self {
        Self {
            enabled: false,
            width_nm: 25.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeWindowFilter {
    pub enabled: bool,
    pub buffer_before_minutes: i64,
    pub buffer_after_minutes: i64,
}

impl TimeWindowFilter {
    pub fn buffer_before(&self) -> Duration {
        minutes_saturating(self.buffer_before_minutes)
    }

    pub fn buffer_after(&self) -> Duration {
        minutes_saturating(self.buffer_after_minutes)
    }
}

/// Out of range buffers saturate instead of overflowing
fn minutes_saturating(minutes: i64) -> Duration {
    Duration::seconds(minutes.saturating_mul(60))
}

impl Default for TimeWindowFilter {
    fn default() -> Self {
        Self {
            enabled: true,
            buffer_before_minutes: 120,
            buffer_after_minutes: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Unread,
    Important,
    FollowUp,
}

impl StatusFilter {
    pub fn matches(&self, state: ReviewState) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Unread => state == ReviewState::Unread,
            StatusFilter::Important => state == ReviewState::Important,
            StatusFilter::FollowUp => state == ReviewState::FollowUp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityFilter {
    pub show_read: bool,
    /// Also reveals globally ignored notices
    pub show_ignored: bool,
}

impl Default for VisibilityFilter {
    fn default() -> Self {
        Self {
            show_read: true,
            show_ignored: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityFilter {
    #[default]
    All,
    High,
    Normal,
    Low,
}

impl PriorityFilter {
    pub fn matches(&self, tier: PriorityTier) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::High => tier == PriorityTier::High,
            PriorityFilter::Normal => tier == PriorityTier::Normal,
            PriorityFilter::Low => tier == PriorityTier::Low,
        }
    }
}

/// Everything the UI lets the user filter by. Owned by the caller and never
/// mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub categories: CategoryToggles,
    pub smart: SmartFilters,
    pub corridor: CorridorFilter,
    pub time_window: TimeWindowFilter,
    pub query: String,
    pub status: StatusFilter,
    pub visibility: VisibilityFilter,
    pub priority: PriorityFilter,
    pub grouping: GroupingMode,
}

/// One step of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStage {
    GlobalIgnore,
    RouteCorridor,
    TimeWindow,
    Category,
    Smart,
    Search,
    Status,
    Visibility,
    Priority,
}

impl FilterStage {
    pub const ORDER: [FilterStage; 9] = [
        FilterStage::GlobalIgnore,
        FilterStage::RouteCorridor,
        FilterStage::TimeWindow,
        FilterStage::Category,
        FilterStage::Smart,
        FilterStage::Search,
        FilterStage::Status,
        FilterStage::Visibility,
        FilterStage::Priority,
    ];

    /// Keep the notices this stage lets through, in order
    pub fn apply(&self, notices: Vec<EnrichedNotam>, filter: &FilterState) -> Vec<EnrichedNotam> {
        match self {
            FilterStage::GlobalIgnore => retain(notices, |n| stages::global_ignore(n, &filter.visibility)),
            FilterStage::RouteCorridor => retain(notices, |n| stages::route_corridor(n, &filter.corridor)),
            FilterStage::TimeWindow => retain(notices, |n| stages::time_window(n, &filter.time_window)),
            FilterStage::Category => retain(notices, |n| stages::category(n, &filter.categories)),
            FilterStage::Smart => retain(notices, |n| stages::smart(n, &filter.smart)),
            FilterStage::Search => {
                let needle = filter.query.trim().to_lowercase();
                if needle.is_empty() {
                    return notices;
                }
                retain(notices, |n| stages::search(n, &needle))
            }
            FilterStage::Status => retain(notices, |n| filter.status.matches(n.state())),
            FilterStage::Visibility => retain(notices, |n| stages::visibility(n, &filter.visibility)),
            FilterStage::Priority => retain(notices, |n| filter.priority.matches(n.priority)),
        }
    }
}

fn retain<F>(mut notices: Vec<EnrichedNotam>, keep: F) -> Vec<EnrichedNotam>
where
    F: Fn(&EnrichedNotam) -> bool,
{
    notices.retain(|n| keep(n));
    notices
}

/// How many notices each stage removed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageReport {
    pub input: usize,
    pub dropped: Vec<(FilterStage, usize)>,
}

impl StageReport {
    pub fn dropped_by(&self, stage: FilterStage) -> usize {
        self.dropped
            .iter()
            .find(|(s, _)| *s == stage)
            .map_or(0, |(_, n)| *n)
    }

    pub fn output(&self) -> usize {
        self.input - self.dropped.iter().map(|(_, n)| n).sum::<usize>()
    }
}

/// Ordered composition of the stages
pub struct FilterPipeline;

impl FilterPipeline {
    pub fn run(notices: &[EnrichedNotam], filter: &FilterState) -> Vec<EnrichedNotam> {
        Self::run_traced(notices, filter).0
    }

    pub fn run_traced(
        notices: &[EnrichedNotam],
        filter: &FilterState,
    ) -> (Vec<EnrichedNotam>, StageReport) {
        let mut report = StageReport {
            input: notices.len(),
            dropped: Vec::with_capacity(FilterStage::ORDER.len()),
        };

        let mut current = notices.to_vec();
        for stage in FilterStage::ORDER {
            let before = current.len();
            current = stage.apply(current, filter);
            let dropped = before - current.len();
            if dropped > 0 {
                debug!("Filter stage {:?} dropped {} notices", stage, dropped);
            }
            report.dropped.push((stage, dropped));
        }

        debug!("Filter pipeline kept {} of {} notices", current.len(), report.input);
        (current, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let filter = FilterState::default();
        assert!(filter.smart.hide_helicopter);
        assert!(filter.smart.filter_obstacles);
        assert_eq!(filter.smart.obstacle_distance_nm, 2.0);
        assert!(!filter.corridor.enabled);
        assert!(filter.time_window.enabled);
        assert_eq!(filter.time_window.buffer_before(), Duration::hours(2));
        assert!(filter.visibility.show_read);
        assert!(!filter.visibility.show_ignored);
        assert!(NotamCategory::ALL.iter().all(|c| filter.categories.is_enabled(*c)));
    }

    #[test]
    fn test_category_group_toggle() {
        let mut toggles = CategoryToggles::default();
        toggles.set_group(CategoryGroup::Cns, false);

        assert!(!toggles.is_enabled(NotamCategory::Navigation));
        assert!(!toggles.is_enabled(NotamCategory::Communications));
        assert!(toggles.is_enabled(NotamCategory::Lighting));

        toggles.enable_all();
        assert!(toggles.is_enabled(NotamCategory::Navigation));
    }

    #[test]
    fn test_scope_matching() {
        assert!(ScopeFilter::All.matches(Some("W")));
        assert!(ScopeFilter::Aerodrome.matches(Some("AE")));
        assert!(ScopeFilter::EnRoute.matches(Some("ae")));
        assert!(!ScopeFilter::NavWarning.matches(Some("AE")));
        assert!(ScopeFilter::NavWarning.matches(None));
        assert!(ScopeFilter::NavWarning.matches(Some(" ")));
    }

    #[test]
    fn test_partial_filter_state_deserializes() {
        let filter: FilterState =
            serde_json::from_str(r#"{"query": "crane", "smart": {"hide_helicopter": false}}"#).unwrap();
        assert_eq!(filter.query, "crane");
        assert!(!filter.smart.hide_helicopter);
        assert!(filter.smart.filter_obstacles);
        assert_eq!(filter.grouping, GroupingMode::RouteOrder);
    }

    #[test]
    fn test_huge_buffers_saturate() {
        let window = TimeWindowFilter {
            buffer_before_minutes: i64::MAX,
            buffer_after_minutes: i64::MIN,
            ..Default::default()
        };
        assert_eq!(window.buffer_before(), Duration::seconds(i64::MAX));
        assert_eq!(window.buffer_after(), Duration::seconds(i64::MIN));
    }

    #[test]
    fn test_status_buckets() {
        let all = [
            ReviewState::Unread,
            ReviewState::Read,
            ReviewState::Important,
            ReviewState::Ignored,
            ReviewState::FollowUp,
        ];
        let kept = |filter: StatusFilter| -> Vec<ReviewState> {
            all.iter().copied().filter(|s| filter.matches(*s)).collect()
        };

        assert_eq!(kept(StatusFilter::All), all.to_vec());
        assert_eq!(kept(StatusFilter::Unread), vec![ReviewState::Unread]);
        assert_eq!(kept(StatusFilter::Important), vec![ReviewState::Important]);
        assert_eq!(kept(StatusFilter::FollowUp), vec![ReviewState::FollowUp]);
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(FilterStage::ORDER[0], FilterStage::GlobalIgnore);
        assert_eq!(FilterStage::ORDER[5], FilterStage::Search);
        assert_eq!(FilterStage::ORDER[8], FilterStage::Priority);
    }
}
