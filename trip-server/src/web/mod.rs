//! Web layer for the trip planner.
//!
//! JSON endpoints for planning trips, inspecting the current trip, looking
//! up places and drawing the transit network.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
