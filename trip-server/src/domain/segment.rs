//! Search-ready ride segments derived from routes.

use std::fmt;

use serde::Serialize;

use super::coord::Coord;
use super::mode::TransportMode;
use super::network::{RouteId, TerminalId};

/// Direction of travel along a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Terminal to destination stop.
    Forward,
    /// Destination stop back to terminal.
    Return,
}

/// Identity of a segment: the same route leg may appear at most once in a trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SegmentKey {
    pub terminal: TerminalId,
    pub route: RouteId,
    pub direction: Direction,
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Forward => "fwd",
            Direction::Return => "ret",
        };
        write!(f, "{}/{}/{}", self.terminal, self.route, dir)
    }
}

/// A named point at either end of a segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    pub name: String,
    pub coord: Coord,
}

/// One display entry of a ride: an instruction with an optional map focus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayStep {
    pub text: String,
    pub coord: Option<Coord>,
}

/// A directed ride unit.
///
/// Costs are those of the route's destination stop, regardless of direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub key: SegmentKey,
    /// Route name, when the directory gives one.
    pub route_name: Option<String>,
    pub mode: TransportMode,
    pub start: Endpoint,
    pub end: Endpoint,
    pub fare: f64,
    pub time_mins: f64,
    pub distance_km: f64,
    pub steps: Vec<DisplayStep>,
    /// Path geometry in the direction of travel, when stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Coord>>,
}

impl Segment {
    pub fn direction(&self) -> Direction {
        self.key.direction
    }
}
