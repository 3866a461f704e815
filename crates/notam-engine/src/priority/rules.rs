//! Built-in priority rules

use notam_core::{FlightContext, NotamCategory, PriorityTier};

use super::{NoticeFacts, PriorityRule};

/// Close to the route and inside the cruise altitude band
pub struct CloseAltitudeRule {
    max_distance_nm: f64,
}

impl CloseAltitudeRule {
    pub fn new(max_distance_nm: f64) -> Self {
        Self { max_distance_nm }
    }
}

impl PriorityRule for CloseAltitudeRule {
    fn name(&self) -> &'static str {
        "close_altitude"
    }

    fn evaluate(
        &self,
        notice: &NoticeFacts<'_>,
        distance_nm: Option<f64>,
        _context: &FlightContext,
    ) -> Option<PriorityTier> {
        let close = distance_nm.is_some_and(|d| d <= self.max_distance_nm);
        (close && notice.is_altitude_relevant).then_some(PriorityTier::High)
    }
}

/// Runway/taxiway closure at the departure or destination airport
pub struct TerminalClosureRule;

impl PriorityRule for TerminalClosureRule {
    fn name(&self) -> &'static str {
        "terminal_closure"
    }

    fn evaluate(
        &self,
        notice: &NoticeFacts<'_>,
        _distance_nm: Option<f64>,
        context: &FlightContext,
    ) -> Option<PriorityTier> {
        let at_terminal = notice
            .notam
            .location
            .as_deref()
            .is_some_and(|loc| context.is_terminal(loc));

        (at_terminal && notice.notam.is_movement_area_closure()).then_some(PriorityTier::High)
    }
}

/// Obstacle too far from departure and destination to matter.
/// Abstains when the distance is unknown.
pub struct DistantObstacleRule {
    threshold_nm: f64,
}

impl DistantObstacleRule {
    pub fn new(threshold_nm: f64) -> Self {
        Self { threshold_nm }
    }
}

impl PriorityRule for DistantObstacleRule {
    fn name(&self) -> &'static str {
        "distant_obstacle"
    }

    fn evaluate(
        &self,
        notice: &NoticeFacts<'_>,
        _distance_nm: Option<f64>,
        _context: &FlightContext,
    ) -> Option<PriorityTier> {
        if notice.category != NotamCategory::Obstacles {
            return None;
        }
        let far = notice
            .terminal_distance_nm
            .is_some_and(|d| d > self.threshold_nm);
        far.then_some(PriorityTier::Low)
    }
}

/// Heliports, FATOs and heliport lighting
pub struct HelicopterRule;

impl PriorityRule for HelicopterRule {
    fn name(&self) -> &'static str {
        "helicopter"
    }

    fn evaluate(
        &self,
        notice: &NoticeFacts<'_>,
        _distance_nm: Option<f64>,
        _context: &FlightContext,
    ) -> Option<PriorityTier> {
        notice
            .notam
            .is_helicopter_related()
            .then_some(PriorityTier::Low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notam_core::{FlightPlan, RawNotam};

    fn context() -> FlightContext {
        FlightContext::new(FlightPlan {
            departure: Some("LSZH".to_string()),
            destination: Some("LSGG".to_string()),
            cruise_altitude_ft: Some(9000),
            ..Default::default()
        })
    }

    fn facts(notam: &RawNotam) -> NoticeFacts<'_> {
        NoticeFacts {
            notam,
            category: notam.category(),
            terminal_distance_nm: None,
            is_altitude_relevant: false,
        }
    }

    #[test]
    fn test_close_altitude() {
        let rule = CloseAltitudeRule::new(10.0);
        let notam = RawNotam::new("A1").with_q_code("QRDCA");
        let mut notice = facts(&notam);
        notice.is_altitude_relevant = true;

        assert_eq!(rule.evaluate(&notice, Some(3.0), &context()), Some(PriorityTier::High));
        assert_eq!(rule.evaluate(&notice, Some(10.0), &context()), Some(PriorityTier::High));
        assert_eq!(rule.evaluate(&notice, Some(10.1), &context()), None);
        assert_eq!(rule.evaluate(&notice, None, &context()), None);

        notice.is_altitude_relevant = false;
        assert_eq!(rule.evaluate(&notice, Some(3.0), &context()), None);
    }

    #[test]
    fn test_terminal_closure() {
        let rule = TerminalClosureRule;
        let at_destination = RawNotam::new("A1").with_q_code("QMRLC").with_location("lsgg");
        let elsewhere = RawNotam::new("A2").with_q_code("QMRLC").with_location("LFSB");
        let not_closed = RawNotam::new("A3").with_q_code("QMRAS").with_location("LSZH");

        assert_eq!(
            rule.evaluate(&facts(&at_destination), None, &context()),
            Some(PriorityTier::High)
        );
        assert_eq!(rule.evaluate(&facts(&elsewhere), None, &context()), None);
        assert_eq!(rule.evaluate(&facts(&not_closed), None, &context()), None);
    }

    #[test]
    fn test_distant_obstacle() {
        let rule = DistantObstacleRule::new(2.0);
        let crane = RawNotam::new("A1").with_q_code("QOBCE").with_message("CRANE 250FT AGL");
        let mut notice = facts(&crane);

        notice.terminal_distance_nm = Some(15.0);
        assert_eq!(rule.evaluate(&notice, None, &context()), Some(PriorityTier::Low));

        notice.terminal_distance_nm = Some(1.5);
        assert_eq!(rule.evaluate(&notice, None, &context()), None);

        notice.terminal_distance_nm = None;
        assert_eq!(rule.evaluate(&notice, None, &context()), None);
    }

    #[test]
    fn test_helicopter() {
        let rule = HelicopterRule;
        let heliport = RawNotam::new("A1").with_q_code("QFHAS");
        let runway = RawNotam::new("A2").with_q_code("QMRLC");

        assert_eq!(rule.evaluate(&facts(&heliport), None, &context()), Some(PriorityTier::Low));
        assert_eq!(rule.evaluate(&facts(&runway), None, &context()), None);
    }
}
