//! The transit directory: terminals, routes and stops.
//!
//! These types are only constructed through validating constructors, so a
//! `Directory` never contains non-finite costs, out-of-range coordinates,
//! empty routes or routes whose cumulative costs go backwards.

use std::fmt;

use serde::Serialize;

use super::coord::Coord;
use super::error::DomainError;
use super::mode::TransportMode;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Directory identifier of a terminal.
    TerminalId
);
string_id!(
    /// Directory identifier of a route.
    RouteId
);
string_id!(
    /// Directory identifier of a stop.
    StopId
);

/// Cumulative cost of reaching a stop from the route's origin terminal.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Cost {
    pub fare: f64,
    pub time_mins: f64,
    pub distance_km: f64,
}

impl Cost {
    /// Create a cost, rejecting negative or non-finite components.
    pub fn new(fare: f64, time_mins: f64, distance_km: f64) -> Result<Self, DomainError> {
        for (field, value) in [
            ("fare", fare),
            ("time", time_mins),
            ("distance", distance_km),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::InvalidCost { field, value });
            }
        }
        Ok(Self {
            fare,
            time_mins,
            distance_km,
        })
    }

    /// True if no component of `self` exceeds the matching component of `other`.
    pub fn is_within(&self, other: &Cost) -> bool {
        self.fare <= other.fare
            && self.time_mins <= other.time_mins
            && self.distance_km <= other.distance_km
    }
}

/// A waypoint along a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub coord: Coord,
    /// Cumulative cost from the route's origin terminal.
    pub cost: Cost,
}

impl Stop {
    pub fn new(id: StopId, name: impl Into<String>, coord: Coord, cost: Cost) -> Self {
        Self {
            id,
            name: name.into(),
            coord,
            cost,
        }
    }
}

/// An ordered sequence of stops operated under one transport mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    id: RouteId,
    name: Option<String>,
    mode: TransportMode,
    stops: Vec<Stop>,
    path: Option<Vec<Coord>>,
}

impl Route {
    /// Create a route.
    ///
    /// Fails if there are no stops or if cumulative fare, time or distance
    /// decrease from one stop to the next. A path with fewer than two points
    /// is dropped rather than rejected.
    pub fn new(
        id: RouteId,
        name: Option<String>,
        mode: TransportMode,
        stops: Vec<Stop>,
        path: Option<Vec<Coord>>,
    ) -> Result<Self, DomainError> {
        if stops.is_empty() {
            return Err(DomainError::EmptyRoute(id));
        }

        for (idx, pair) in stops.windows(2).enumerate() {
            if !pair[0].cost.is_within(&pair[1].cost) {
                return Err(DomainError::DecreasingCost {
                    route: id,
                    stop_index: idx + 1,
                });
            }
        }

        let path = path.filter(|p| p.len() >= 2);

        Ok(Self {
            id,
            name,
            mode,
            stops,
            path,
        })
    }

    pub fn id(&self) -> &RouteId {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn mode(&self) -> &TransportMode {
        &self.mode
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Precomputed path geometry from the terminal to the destination, if any.
    pub fn path(&self) -> Option<&[Coord]> {
        self.path.as_deref()
    }

    /// The last stop of the route.
    pub fn destination(&self) -> &Stop {
        // Non-empty by construction
        &self.stops[self.stops.len() - 1]
    }
}

/// A named origin location owning routes.
#[derive(Debug, Clone, PartialEq)]
pub struct Terminal {
    pub id: TerminalId,
    pub name: String,
    pub coord: Coord,
    pub city: Option<String>,
    pub routes: Vec<Route>,
}

/// The whole network, in directory order.
///
/// Iteration order is significant: it decides ties between equally scored
/// trips.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directory {
    terminals: Vec<Terminal>,
}

impl Directory {
    pub fn new(terminals: Vec<Terminal>) -> Self {
        Self { terminals }
    }

    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    /// Total number of routes across all terminals.
    pub fn route_count(&self) -> usize {
        self.terminals.iter().map(|t| t.routes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.terminals.is_empty()
    }
}
