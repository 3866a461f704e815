//! Core domain models for NOTAM briefing review
//!
//! This crate contains:
//! - Domain models (RawNotam, FlightContext, EnrichedNotam, UserStatus)
//! - Q-code classification
//! - Stable identity across briefing re-imports
//! - Route geometry

pub mod enriched;
pub mod error;
pub mod flight;
pub mod geo;
pub mod identity;
pub mod notam;
pub mod qcode;
pub mod status;

pub use enriched::{EnrichedNotam, PriorityTier};
pub use error::{Error, Result};
pub use flight::{FlightContext, FlightPlan};
pub use geo::{Coordinate, RouteProjection};
pub use identity::IdentityKey;
pub use notam::{parse_briefing, RawNotam};
pub use qcode::{CategoryGroup, NotamCategory, QCode};
pub use status::{ReviewState, UserStatus};
