use notam_core::{EnrichedNotam, PriorityTier, ReviewState};
use serde::{Deserialize, Serialize};

/// Summary counts over a list of enriched notices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BriefingStats {
    pub total: usize,
    pub unread: usize,
    pub important: usize,
    pub follow_up: usize,
    pub new: usize,
    pub high_priority: usize,
    /// Ignored by the user or through the global ignore list
    pub ignored: usize,
}

impl BriefingStats {
    pub fn from_notices(notices: &[EnrichedNotam]) -> Self {
        notices.iter().fold(Self::default(), |mut stats, n| {
            stats.total += 1;
            match n.state() {
                ReviewState::Unread => stats.unread += 1,
                ReviewState::Important => stats.important += 1,
                ReviewState::FollowUp => stats.follow_up += 1,
                ReviewState::Read | ReviewState::Ignored => {}
            }
            if n.is_new {
                stats.new += 1;
            }
            if n.priority == PriorityTier::High {
                stats.high_priority += 1;
            }
            if n.is_globally_ignored || n.state() == ReviewState::Ignored {
                stats.ignored += 1;
            }
            stats
        })
    }
}

impl From<&[EnrichedNotam]> for BriefingStats {
    fn from(notices: &[EnrichedNotam]) -> Self {
        Self::from_notices(notices)
    }
}
