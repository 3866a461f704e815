//! The review reducer: immutable inputs in, a complete view out
//!
//! Every change of inputs (new briefing, new flight, status edit, filter
//! change) produces a fresh [`BriefingInputs`] and a full recomputation.
//! Nothing is patched in place, so a view always matches exactly one set of
//! inputs.

use std::collections::{HashMap, HashSet};

use notam_core::{EnrichedNotam, FlightContext, IdentityKey, RawNotam, UserStatus};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::enrich::Enricher;
use crate::error::Cancelled;
use crate::filter::{FilterPipeline, FilterState, StageReport};
use crate::group::{group, NoticeGroup, DEFAULT_DISTANT_THRESHOLD_NM};
use crate::priority::{PriorityConfig, PriorityEngine};
use crate::stats::BriefingStats;

/// Everything one view is computed from
#[derive(Debug, Clone, Default)]
pub struct BriefingInputs {
    pub notams: Vec<RawNotam>,
    /// Window buffers set on the context are replaced by the filter's
    pub context: FlightContext,
    pub statuses: HashMap<IdentityKey, UserStatus>,
    pub previous_keys: HashSet<IdentityKey>,
    pub ignored_keys: HashSet<IdentityKey>,
    pub filter: FilterState,
}

impl BriefingInputs {
    pub fn new(notams: Vec<RawNotam>, context: FlightContext) -> Self {
        Self {
            notams,
            context,
            ..Default::default()
        }
    }

    pub fn with_statuses(mut self, statuses: HashMap<IdentityKey, UserStatus>) -> Self {
        self.statuses = statuses;
        self
    }

    pub fn with_previous_keys(mut self, keys: HashSet<IdentityKey>) -> Self {
        self.previous_keys = keys;
        self
    }

    pub fn with_ignored_keys(mut self, keys: HashSet<IdentityKey>) -> Self {
        self.ignored_keys = keys;
        self
    }

    pub fn with_filter(mut self, filter: FilterState) -> Self {
        self.filter = filter;
        self
    }
}

/// Result of one computation
#[derive(Debug, Clone, Default, Serialize)]
pub struct BriefingView {
    /// Every notice of the briefing, in input order
    pub enriched: Vec<EnrichedNotam>,
    /// Notices that survived the filter pipeline
    pub visible: Vec<EnrichedNotam>,
    pub groups: Vec<NoticeGroup>,
    pub stats: BriefingStats,
    pub visible_stats: BriefingStats,
    pub stage_report: StageReport,
}

impl BriefingView {
    pub fn find(&self, key: &IdentityKey) -> Option<&EnrichedNotam> {
        self.enriched.iter().find(|n| &n.key == key)
    }

    pub fn is_visible(&self, key: &IdentityKey) -> bool {
        self.visible.iter().any(|n| &n.key == key)
    }
}

#[derive(Debug)]
pub struct ReviewEngine {
    priority: PriorityEngine,
    distant_threshold_nm: f64,
}

impl ReviewEngine {
    pub fn new(priority: PriorityEngine) -> Self {
        Self {
            priority,
            distant_threshold_nm: DEFAULT_DISTANT_THRESHOLD_NM,
        }
    }

    pub fn from_config(config: &PriorityConfig) -> Self {
        Self::new(PriorityEngine::from_config(config))
    }

    pub fn with_distant_threshold(mut self, threshold_nm: f64) -> Self {
        self.distant_threshold_nm = threshold_nm;
        self
    }

    pub fn priority(&self) -> &PriorityEngine {
        &self.priority
    }

    pub fn compute(&self, inputs: &BriefingInputs) -> BriefingView {
        let context = windowed_context(inputs);
        let enriched = self.enricher(inputs, &context).enrich(&inputs.notams);
        self.finish(enriched, inputs, &context)
    }

    /// Same as [`compute`](Self::compute), giving up as soon as `cancel` fires
    pub fn compute_cancellable(
        &self,
        inputs: &BriefingInputs,
        cancel: &CancellationToken,
    ) -> Result<BriefingView, Cancelled> {
        let context = windowed_context(inputs);
        let enriched = self
            .enricher(inputs, &context)
            .enrich_cancellable(&inputs.notams, cancel)?;

        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        Ok(self.finish(enriched, inputs, &context))
    }

    fn enricher<'a>(&'a self, inputs: &'a BriefingInputs, context: &'a FlightContext) -> Enricher<'a> {
        Enricher::new(
            &inputs.statuses,
            &inputs.previous_keys,
            &inputs.ignored_keys,
            context,
            &self.priority,
        )
    }

    fn finish(
        &self,
        enriched: Vec<EnrichedNotam>,
        inputs: &BriefingInputs,
        context: &FlightContext,
    ) -> BriefingView {
        let (visible, stage_report) = FilterPipeline::run_traced(&enriched, &inputs.filter);
        let groups = group(
            visible.clone(),
            inputs.filter.grouping,
            context,
            self.distant_threshold_nm,
        );

        let view = BriefingView {
            stats: BriefingStats::from_notices(&enriched),
            visible_stats: BriefingStats::from_notices(&visible),
            enriched,
            visible,
            groups,
            stage_report,
        };
        debug!(
            "Computed view: {} notices, {} visible, {} groups",
            view.stats.total,
            view.visible_stats.total,
            view.groups.len()
        );
        view
    }
}

impl Default for ReviewEngine {
    fn default() -> Self {
        Self::new(PriorityEngine::default())
    }
}

/// The time window filter owns the buffers, so they override whatever the
/// caller set with [`FlightContext::with_window_buffers`].
fn windowed_context(inputs: &BriefingInputs) -> FlightContext {
    let window = &inputs.filter.time_window;
    inputs
        .context
        .clone()
        .with_window_buffers(window.buffer_before(), window.buffer_after())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notam_core::{identity, Coordinate, FlightPlan, ReviewState};
    use time::macros::datetime;

    use crate::group::{GroupKey, GroupingMode, RouteBucket};

    fn context() -> FlightContext {
        FlightContext::new(FlightPlan {
            route: vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 10.0)],
            departure: Some("DEPT".to_string()),
            destination: Some("DEST".to_string()),
            departure_time: Some(datetime!(2024-03-01 10:00 UTC)),
            arrival_time: Some(datetime!(2024-03-01 12:00 UTC)),
            ..Default::default()
        })
    }

    #[test]
    fn test_compute_view() {
        let notams = vec![
            RawNotam::new("A1").with_location("DEPT").with_message("TWY A CLSD"),
            RawNotam::new("A2").with_q_code("QFHAS").with_location("DEST"),
            RawNotam::new("A3").with_location("FIRX").with_point(0.1, 4.0),
        ];
        let view = ReviewEngine::default().compute(&BriefingInputs::new(notams, context()));

        assert_eq!(view.enriched.len(), 3);
        assert_eq!(view.stats.total, 3);
        // Helicopter notice hidden by default
        assert_eq!(view.visible_stats.total, 2);
        assert_eq!(view.stage_report.dropped_by(crate::filter::FilterStage::Smart), 1);
        assert_eq!(view.groups.len(), 6);
        assert_eq!(view.groups[1].key, GroupKey::Route(RouteBucket::EnRoute));
        assert_eq!(view.groups[1].notices.len(), 1);
        assert!(view.find(&identity::key(&view.enriched[1].notam)).is_some());
        assert!(!view.is_visible(&view.enriched[1].key));
    }

    #[test]
    fn test_filter_buffers_move_the_window() {
        // Ends 90 minutes before departure
        let notam = RawNotam::new("A1").with_effective(
            Some(datetime!(2024-03-01 06:00 UTC)),
            Some(datetime!(2024-03-01 08:30 UTC)),
        );
        let mut inputs = BriefingInputs::new(vec![notam], context());

        let view = ReviewEngine::default().compute(&inputs);
        assert!(view.enriched[0].is_active_for_flight);

        inputs.filter.time_window.buffer_before_minutes = 60;
        let view = ReviewEngine::default().compute(&inputs);
        assert!(!view.enriched[0].is_active_for_flight);
        assert!(view.visible.is_empty());
    }

    #[test]
    fn test_filter_buffers_override_context_buffers() {
        // Ends 90 minutes before departure
        let notam = RawNotam::new("A1").with_effective(
            Some(datetime!(2024-03-01 06:00 UTC)),
            Some(datetime!(2024-03-01 08:30 UTC)),
        );
        let narrow = context().with_window_buffers(time::Duration::minutes(30), time::Duration::minutes(30));
        let inputs = BriefingInputs::new(vec![notam], narrow);

        let view = ReviewEngine::default().compute(&inputs);
        assert!(view.enriched[0].is_active_for_flight);
        assert_eq!(
            windowed_context(&inputs).flight_window_start(),
            Some(datetime!(2024-03-01 08:00 UTC))
        );
    }

    #[test]
    fn test_statuses_flow_into_view() {
        let notam = RawNotam::new("A1").with_location("DEPT");
        let key = identity::key(&notam);
        let inputs = BriefingInputs::new(vec![notam], context())
            .with_statuses(HashMap::from([(key.clone(), UserStatus::new(ReviewState::Read))]))
            .with_previous_keys([key.clone()].into())
            .with_filter(FilterState {
                grouping: GroupingMode::None,
                ..Default::default()
            });

        let view = ReviewEngine::default().compute(&inputs);
        assert_eq!(view.enriched[0].state(), ReviewState::Read);
        assert!(!view.enriched[0].is_new);
        assert_eq!(view.groups.len(), 1);
    }

    #[test]
    fn test_cancelled_compute() {
        let token = CancellationToken::new();
        token.cancel();
        let inputs = BriefingInputs::new(vec![RawNotam::new("A1")], context());
        assert!(ReviewEngine::default().compute_cancellable(&inputs, &token).is_err());

        let view = ReviewEngine::default()
            .compute_cancellable(&inputs, &CancellationToken::new())
            .unwrap();
        assert_eq!(view.enriched.len(), 1);
    }
}
