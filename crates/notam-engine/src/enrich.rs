//! Enrichment: compute everything about every notice, drop nothing
//!
//! Filtering is a separate stage so a UI can explain why a hidden notice
//! ranks the way it does.

use std::collections::{HashMap, HashSet};

use notam_core::{identity, EnrichedNotam, FlightContext, IdentityKey, RawNotam, UserStatus};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::Cancelled;
use crate::priority::{NoticeFacts, PriorityEngine};

/// Everything enrichment reads besides the notices themselves
pub struct Enricher<'a> {
    statuses: &'a HashMap<IdentityKey, UserStatus>,
    previous_keys: &'a HashSet<IdentityKey>,
    ignored_keys: &'a HashSet<IdentityKey>,
    context: &'a FlightContext,
    priority: &'a PriorityEngine,
}

impl<'a> Enricher<'a> {
    pub fn new(
        statuses: &'a HashMap<IdentityKey, UserStatus>,
        previous_keys: &'a HashSet<IdentityKey>,
        ignored_keys: &'a HashSet<IdentityKey>,
        context: &'a FlightContext,
        priority: &'a PriorityEngine,
    ) -> Self {
        Self {
            statuses,
            previous_keys,
            ignored_keys,
            context,
            priority,
        }
    }

    /// Enrich a single notice. Missing data falls back to the documented defaults.
    pub fn enrich_one(&self, notam: &RawNotam) -> EnrichedNotam {
        let key = identity::key(notam);
        let status = self.statuses.get(&key).cloned().unwrap_or_default();
        let is_globally_ignored = self.ignored_keys.contains(&key);
        let is_new = !self.previous_keys.contains(&key);

        let position = notam.position();
        let projection = position.and_then(|p| self.context.project(&p));
        let route_distance_nm = projection.map(|p| p.cross_track_nm);
        let along_route_nm = projection.map(|p| p.along_route_nm);
        let terminal_distance_nm = position.and_then(|p| self.context.terminal_distance(&p));

        let is_altitude_relevant = self
            .context
            .overlaps_altitude(notam.lower_limit_ft, notam.upper_limit_ft)
            .unwrap_or(false);

        let is_active_for_flight = self
            .context
            .overlaps_window(notam.effective_from, notam.effective_to);

        let category = notam.category();
        let verdict = self.priority.evaluate(
            &NoticeFacts {
                notam,
                category,
                terminal_distance_nm,
                is_altitude_relevant,
            },
            route_distance_nm,
            self.context,
        );

        EnrichedNotam {
            notam: notam.clone(),
            key,
            status,
            category,
            is_new,
            is_globally_ignored,
            route_distance_nm,
            along_route_nm,
            terminal_distance_nm,
            is_altitude_relevant,
            is_active_for_flight,
            priority: verdict.tier,
            priority_rule: verdict.rule.map(str::to_string),
        }
    }

    /// Enrich in input order
    pub fn enrich(&self, notams: &[RawNotam]) -> Vec<EnrichedNotam> {
        let enriched: Vec<EnrichedNotam> = notams.iter().map(|n| self.enrich_one(n)).collect();
        debug!("Enriched {} notices", enriched.len());
        enriched
    }

    /// Enrich in input order, checking `cancel` before every notice
    pub fn enrich_cancellable(
        &self,
        notams: &[RawNotam],
        cancel: &CancellationToken,
    ) -> Result<Vec<EnrichedNotam>, Cancelled> {
        let mut enriched = Vec::with_capacity(notams.len());

        for notam in notams {
            if cancel.is_cancelled() {
                debug!("Enrichment cancelled after {} of {} notices", enriched.len(), notams.len());
                return Err(Cancelled);
            }
            enriched.push(self.enrich_one(notam));
        }

        debug!("Enriched {} notices", enriched.len());
        Ok(enriched)
    }
}

/// Enrich a briefing against the flight and the user's stored state
pub fn enrich(
    notams: &[RawNotam],
    statuses: &HashMap<IdentityKey, UserStatus>,
    previous_keys: &HashSet<IdentityKey>,
    ignored_keys: &HashSet<IdentityKey>,
    context: &FlightContext,
    priority: &PriorityEngine,
) -> Vec<EnrichedNotam> {
    Enricher::new(statuses, previous_keys, ignored_keys, context, priority).enrich(notams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notam_core::{Coordinate, FlightPlan, NotamCategory, PriorityTier, ReviewState};
    use time::macros::datetime;

    fn context() -> FlightContext {
        FlightContext::new(FlightPlan {
            route: vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 10.0)],
            departure: Some("AAAA".to_string()),
            destination: Some("BBBB".to_string()),
            cruise_altitude_ft: Some(9000),
            departure_time: Some(datetime!(2024-03-01 10:00 UTC)),
            arrival_time: Some(datetime!(2024-03-01 12:00 UTC)),
            ..Default::default()
        })
    }

    fn run(notams: &[RawNotam]) -> Vec<EnrichedNotam> {
        enrich(
            notams,
            &HashMap::new(),
            &HashSet::new(),
            &HashSet::new(),
            &context(),
            &PriorityEngine::default(),
        )
    }

    #[test]
    fn test_order_preserved_and_nothing_dropped() {
        let notams: Vec<RawNotam> = (0..5)
            .map(|i| RawNotam::new(format!("A{i}")).with_message(format!("notice {i}")))
            .collect();
        let enriched = run(&notams);

        assert_eq!(enriched.len(), 5);
        for (raw, e) in notams.iter().zip(&enriched) {
            assert_eq!(&e.notam, raw);
        }
    }

    #[test]
    fn test_malformed_notice_gets_defaults() {
        let enriched = run(&[RawNotam::default(), RawNotam::new("X").with_q_code("??")]);

        for e in &enriched {
            assert_eq!(e.status.state, ReviewState::Unread);
            assert!(e.is_new);
            assert!(!e.is_globally_ignored);
            assert!(e.route_distance_nm.is_none());
            assert!(e.is_active_for_flight);
            // Unknown limits are open-ended, so the band overlaps cruise
            assert!(e.is_altitude_relevant);
            assert_eq!(e.category, NotamCategory::Miscellaneous);
            assert_eq!(e.priority, PriorityTier::Normal);
        }
    }

    #[test]
    fn test_close_and_altitude_relevant_is_high() {
        // ~3 nm north of the route
        let notam = RawNotam::new("A1")
            .with_q_code("QRDCA")
            .with_point(0.05, 5.0)
            .with_limits(Some(0), Some(10_000));
        let e = &run(&[notam])[0];

        let d = e.route_distance_nm.unwrap();
        assert!(d > 2.5 && d < 3.5, "got {d}");
        assert!(e.is_altitude_relevant);
        assert_eq!(e.priority, PriorityTier::High);
        assert_eq!(e.priority_rule.as_deref(), Some("close_altitude"));
    }

    #[test]
    fn test_altitude_not_relevant_without_cruise() {
        let no_cruise = FlightContext::new(FlightPlan::default());
        let notam = RawNotam::new("A1").with_limits(Some(0), Some(10_000));
        let e = enrich(
            &[notam],
            &HashMap::new(),
            &HashSet::new(),
            &HashSet::new(),
            &no_cruise,
            &PriorityEngine::default(),
        );
        assert!(!e[0].is_altitude_relevant);
    }

    #[test]
    fn test_inactive_notice() {
        let notam = RawNotam::new("A1").with_effective(
            Some(datetime!(2024-03-02 00:00 UTC)),
            Some(datetime!(2024-03-03 00:00 UTC)),
        );
        assert!(!run(&[notam])[0].is_active_for_flight);
    }

    #[test]
    fn test_user_state_lookup() {
        let notam = RawNotam::new("A1").with_q_code("QMRLC").with_location("AAAA");
        let k = identity::key(&notam);

        let mut statuses = HashMap::new();
        statuses.insert(k.clone(), UserStatus::new(ReviewState::Important));
        let previous: HashSet<_> = [k.clone()].into();
        let ignored: HashSet<_> = [k.clone()].into();

        let e = &enrich(
            &[notam],
            &statuses,
            &previous,
            &ignored,
            &context(),
            &PriorityEngine::default(),
        )[0];

        assert_eq!(e.status.state, ReviewState::Important);
        assert!(!e.is_new);
        assert!(e.is_globally_ignored);
        // Priority ignores user state: closure at departure stays high
        assert_eq!(e.priority, PriorityTier::High);
    }

    #[test]
    fn test_priority_is_deterministic() {
        let notams = vec![
            RawNotam::new("A1").with_q_code("QOBCE").with_point(0.0, 5.0),
            RawNotam::new("A2").with_q_code("QFHXX"),
            RawNotam::new("A3").with_q_code("QMRLC").with_location("BBBB"),
        ];
        let first: Vec<_> = run(&notams).into_iter().map(|e| e.priority).collect();
        for _ in 0..3 {
            let again: Vec<_> = run(&notams).into_iter().map(|e| e.priority).collect();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();

        let statuses = HashMap::new();
        let keys = HashSet::new();
        let ctx = context();
        let engine = PriorityEngine::default();
        let enricher = Enricher::new(&statuses, &keys, &keys, &ctx, &engine);

        let result = enricher.enrich_cancellable(&[RawNotam::new("A1")], &token);
        assert_eq!(result, Err(Cancelled));
    }

    #[test]
    fn test_not_cancelled_matches_plain_enrichment() {
        let statuses = HashMap::new();
        let keys = HashSet::new();
        let ctx = context();
        let engine = PriorityEngine::default();
        let enricher = Enricher::new(&statuses, &keys, &keys, &ctx, &engine);
        let notams = vec![RawNotam::new("A1"), RawNotam::new("A2").with_q_code("QFHXX")];

        let result = enricher
            .enrich_cancellable(&notams, &CancellationToken::new())
            .unwrap();
        assert_eq!(result, enricher.enrich(&notams));
    }
}
