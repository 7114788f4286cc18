//! Trip planning.
//!
//! Planning runs in three stages:
//! 1. [`expand`] the directory into directed ride segments, filtered by mode
//! 2. [`Planner::search`] the segments for the best trip with at most two
//!    transfers and a bounded total walk
//! 3. [`compose`] the winner into a display itinerary with leg geometry

mod compose;
mod config;
mod expand;
mod search;

pub use compose::{compose, direct_drive};
pub use config::{ConfigError, CostMetric, MAX_SUPPORTED_TRANSFERS, SearchConfig, WalkDistance};
pub use expand::expand;
pub use search::{Candidate, Planner, SearchError, SearchRequest, score, segment_cost};
