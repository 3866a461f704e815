//! Briefing review engine
//!
//! This crate contains:
//! - Enrichment of raw notices against the flight and stored user state
//! - Priority rule chain
//! - Ordered filter pipeline and display grouping
//! - The review reducer, session and background worker

pub mod enrich;
pub mod error;
pub mod filter;
pub mod group;
pub mod priority;
pub mod review;
pub mod session;
pub mod stats;
pub mod store;
pub mod worker;

pub use enrich::{enrich, Enricher};
pub use error::{Cancelled, SessionError, StoreError};
pub use filter::{FilterPipeline, FilterStage, FilterState, StageReport};
pub use group::{group, GroupKey, GroupingMode, NoticeGroup, RouteBucket};
pub use priority::{PriorityConfig, PriorityEngine, PriorityRule, RuleKind};
pub use review::{BriefingInputs, BriefingView, ReviewEngine};
pub use session::ReviewSession;
pub use stats::BriefingStats;
pub use store::{BriefingScope, MemoryStatusStore, StatusStore};
pub use worker::{ComputedView, ReviewWorker};
