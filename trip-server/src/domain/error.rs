//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from network/IO errors of the external collaborators.

use super::coord::InvalidCoord;
use super::network::RouteId;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A coordinate is non-finite or out of range
    #[error(transparent)]
    InvalidCoord(#[from] InvalidCoord),

    /// A fare, time or distance is negative or not a number
    #[error("invalid {field}: {value}")]
    InvalidCost { field: &'static str, value: f64 },

    /// A route has no stops, so it has no destination
    #[error("route {0} has no stops")]
    EmptyRoute(RouteId),

    /// Cumulative costs must not decrease along a route
    #[error("route {route}: cumulative cost decreases at stop {stop_index}")]
    DecreasingCost { route: RouteId, stop_index: usize },
}
