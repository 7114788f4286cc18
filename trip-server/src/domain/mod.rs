//! Domain types for the trip planner.
//!
//! This module contains the validated model of the transit network and of
//! the trips built on it. All types enforce their invariants at construction
//! time, so code that receives these types can trust their validity.

mod coord;
mod error;
mod itinerary;
mod mode;
mod network;
mod segment;

pub use coord::{Coord, InvalidCoord, haversine_km};
pub use error::DomainError;
pub use itinerary::{
    DISCOUNT_RATE, DRIVE_COLOR, Fare, GeometrySource, Itinerary, LegDrawing, LegStyle, Step, StepKind,
    TripKind, TripTime, WALK_COLOR,
};
pub use mode::{ModeFilter, ModeKind, TransportMode};
pub use network::{Cost, Directory, Route, RouteId, Stop, StopId, Terminal, TerminalId};
pub use segment::{Direction, DisplayStep, Endpoint, Segment, SegmentKey};
