//! Priority classification as an ordered rule chain
//!
//! Rules are evaluated in order and the first one with an opinion decides.
//! When every rule abstains the notice is `Normal`.

pub mod rules;

use notam_core::{FlightContext, NotamCategory, PriorityTier, RawNotam};
use serde::{Deserialize, Serialize};

use rules::{CloseAltitudeRule, DistantObstacleRule, HelicopterRule, TerminalClosureRule};

/// What a rule can see of a notice while it is being enriched
#[derive(Debug, Clone, Copy)]
pub struct NoticeFacts<'a> {
    pub notam: &'a RawNotam,
    pub category: NotamCategory,
    pub terminal_distance_nm: Option<f64>,
    pub is_altitude_relevant: bool,
}

/// A single step of the priority chain
pub trait PriorityRule: Send + Sync {
    /// Name of the rule, used in configuration and explanations
    fn name(&self) -> &'static str;

    /// `None` abstains and passes the decision to the next rule
    fn evaluate(
        &self,
        notice: &NoticeFacts<'_>,
        distance_nm: Option<f64>,
        context: &FlightContext,
    ) -> Option<PriorityTier>;
}

/// Built-in rules, addressable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    CloseAltitude,
    TerminalClosure,
    DistantObstacle,
    Helicopter,
}

impl RuleKind {
    pub const DEFAULT_ORDER: [RuleKind; 4] = [
        RuleKind::CloseAltitude,
        RuleKind::TerminalClosure,
        RuleKind::DistantObstacle,
        RuleKind::Helicopter,
    ];

    fn build(&self, config: &PriorityConfig) -> Box<dyn PriorityRule> {
        match self {
            RuleKind::CloseAltitude => Box::new(CloseAltitudeRule::new(config.close_distance_nm)),
            RuleKind::TerminalClosure => Box::new(TerminalClosureRule),
            RuleKind::DistantObstacle => {
                Box::new(DistantObstacleRule::new(config.obstacle_threshold_nm))
            }
            RuleKind::Helicopter => Box::new(HelicopterRule),
        }
    }
}

/// Thresholds and order of the built-in rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityConfig {
    /// Route distance under which an altitude-relevant notice is high priority (default: 10)
    pub close_distance_nm: f64,
    /// Terminal distance beyond which an obstacle is low priority (default: 2)
    pub obstacle_threshold_nm: f64,
    /// Evaluation order
    pub rules: Vec<RuleKind>,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            close_distance_nm: 10.0,
            obstacle_threshold_nm: 2.0,
            rules: RuleKind::DEFAULT_ORDER.to_vec(),
        }
    }
}

/// The outcome of a chain evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub tier: PriorityTier,
    /// Rule that decided, `None` for the default
    pub rule: Option<&'static str>,
}

/// Ordered rule chain
pub struct PriorityEngine {
    rules: Vec<Box<dyn PriorityRule>>,
}

impl PriorityEngine {
    pub fn new(rules: Vec<Box<dyn PriorityRule>>) -> Self {
        Self { rules }
    }

    /// Chain without rules; everything is `Normal`
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn from_config(config: &PriorityConfig) -> Self {
        Self {
            rules: config.rules.iter().map(|kind| kind.build(config)).collect(),
        }
    }

    pub fn push(&mut self, rule: Box<dyn PriorityRule>) {
        self.rules.push(rule);
    }

    /// Insert at `index`, clamped to the end of the chain
    pub fn insert(&mut self, index: usize, rule: Box<dyn PriorityRule>) {
        let index = index.min(self.rules.len());
        self.rules.insert(index, rule);
    }

    /// Remove every rule with this name; returns whether any was removed
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.name() != name);
        self.rules.len() != before
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn evaluate(
        &self,
        notice: &NoticeFacts<'_>,
        distance_nm: Option<f64>,
        context: &FlightContext,
    ) -> Verdict {
        for rule in &self.rules {
            if let Some(tier) = rule.evaluate(notice, distance_nm, context) {
                return Verdict {
                    tier,
                    rule: Some(rule.name()),
                };
            }
        }

        Verdict {
            tier: PriorityTier::Normal,
            rule: None,
        }
    }
}

impl Default for PriorityEngine {
    fn default() -> Self {
        Self::from_config(&PriorityConfig::default())
    }
}

impl std::fmt::Debug for PriorityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityEngine")
            .field("rules", &self.rule_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notam_core::{Coordinate, FlightPlan};

    fn context() -> FlightContext {
        FlightContext::new(FlightPlan {
            route: vec![Coordinate::new(47.4647, 8.5492), Coordinate::new(46.2381, 6.1089)],
            departure: Some("LSZH".to_string()),
            destination: Some("LSGG".to_string()),
            cruise_altitude_ft: Some(9000),
            ..Default::default()
        })
    }

    fn facts(notam: &RawNotam, terminal: Option<f64>, altitude: bool) -> NoticeFacts<'_> {
        NoticeFacts {
            notam,
            category: notam.category(),
            terminal_distance_nm: terminal,
            is_altitude_relevant: altitude,
        }
    }

    struct Always(PriorityTier);

    impl PriorityRule for Always {
        fn name(&self) -> &'static str {
            "always"
        }

        fn evaluate(
            &self,
            _notice: &NoticeFacts<'_>,
            _distance_nm: Option<f64>,
            _context: &FlightContext,
        ) -> Option<PriorityTier> {
            Some(self.0)
        }
    }

    #[test]
    fn test_default_chain_order() {
        let engine = PriorityEngine::default();
        assert_eq!(
            engine.rule_names(),
            vec!["close_altitude", "terminal_closure", "distant_obstacle", "helicopter"]
        );
    }

    #[test]
    fn test_all_abstain_is_normal() {
        let engine = PriorityEngine::default();
        let notam = RawNotam::new("A1").with_q_code("QCAAS").with_location("LSAS");
        let verdict = engine.evaluate(&facts(&notam, None, false), None, &context());
        assert_eq!(verdict.tier, PriorityTier::Normal);
        assert_eq!(verdict.rule, None);
    }

    #[test]
    fn test_first_opinion_wins() {
        // Close and altitude-relevant helicopter notice: rule 1 fires before rule 4
        let engine = PriorityEngine::default();
        let notam = RawNotam::new("A1").with_q_code("QFHXX");
        let verdict = engine.evaluate(&facts(&notam, None, true), Some(3.0), &context());
        assert_eq!(verdict.tier, PriorityTier::High);
        assert_eq!(verdict.rule, Some("close_altitude"));

        let far = engine.evaluate(&facts(&notam, None, true), Some(30.0), &context());
        assert_eq!(far.tier, PriorityTier::Low);
        assert_eq!(far.rule, Some("helicopter"));
    }

    #[test]
    fn test_reordering_changes_outcome() {
        let config = PriorityConfig {
            rules: vec![RuleKind::Helicopter, RuleKind::CloseAltitude],
            ..Default::default()
        };
        let engine = PriorityEngine::from_config(&config);
        let notam = RawNotam::new("A1").with_q_code("QFHXX");
        let verdict = engine.evaluate(&facts(&notam, None, true), Some(3.0), &context());
        assert_eq!(verdict.tier, PriorityTier::Low);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut engine = PriorityEngine::default();
        engine.insert(0, Box::new(Always(PriorityTier::High)));
        assert_eq!(engine.rule_names()[0], "always");

        let notam = RawNotam::new("A1").with_q_code("QFHXX");
        assert_eq!(
            engine.evaluate(&facts(&notam, None, false), None, &context()).tier,
            PriorityTier::High
        );

        assert!(engine.remove("always"));
        assert!(!engine.remove("always"));
        assert_eq!(
            engine.evaluate(&facts(&notam, None, false), None, &context()).tier,
            PriorityTier::Low
        );
    }

    #[test]
    fn test_insert_past_end_appends() {
        let mut engine = PriorityEngine::empty();
        engine.insert(10, Box::new(Always(PriorityTier::Low)));
        assert_eq!(engine.rule_names(), vec!["always"]);
    }

    #[test]
    fn test_config_serialization() {
        let config = PriorityConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"close_altitude\""));
        let parsed: PriorityConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
