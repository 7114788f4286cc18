//! Composed, display-ready trips.

use serde::Serialize;

use super::coord::Coord;
use super::segment::Endpoint;

/// Concessionary fares are a fixed share of the regular fare.
pub const DISCOUNT_RATE: f64 = 0.8;

/// Line color for walking legs.
pub const WALK_COLOR: &str = "#71717A";

/// Line color for the direct road route offered when no transit trip exists.
pub const DRIVE_COLOR: &str = "#E45A5A";

/// Shape of a trip by number of vehicle transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TripKind {
    Direct,
    OneTransfer,
    TwoTransfer,
}

impl TripKind {
    /// Kind of a trip using `segments` rides, if that count is supported.
    pub fn for_segment_count(segments: usize) -> Option<Self> {
        match segments {
            1 => Some(TripKind::Direct),
            2 => Some(TripKind::OneTransfer),
            3 => Some(TripKind::TwoTransfer),
            _ => None,
        }
    }

    pub fn transfers(&self) -> usize {
        match self {
            TripKind::Direct => 0,
            TripKind::OneTransfer => 1,
            TripKind::TwoTransfer => 2,
        }
    }
}

/// What a step asks the commuter to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Walk,
    Ride,
    /// A waypoint along a ride.
    Stop,
}

/// One instruction of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub kind: StepKind,
    pub instruction: String,
    /// Where the map should focus when the step is selected.
    pub coord: Option<Coord>,
}

impl Step {
    pub fn new(kind: StepKind, instruction: impl Into<String>, coord: Option<Coord>) -> Self {
        Self {
            kind,
            instruction: instruction.into(),
            coord,
        }
    }
}

/// Regular and concessionary fare.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fare {
    pub regular: f64,
    pub discounted: f64,
}

impl Fare {
    /// A fare whose discounted amount is derived from the regular one.
    pub fn from_regular(regular: f64) -> Self {
        Self {
            regular,
            discounted: regular * DISCOUNT_RATE,
        }
    }
}

/// Trip duration as shown, and the literal in-vehicle time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TripTime {
    /// Winning score minus the walking term. Equals `ride_mins` only when
    /// the trip was scored by time.
    pub display_mins: f64,
    /// Sum of the rides' times.
    pub ride_mins: f64,
}

/// How a leg is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegStyle {
    Walk,
    Ride,
    /// Road route straight from origin to destination, outside the network.
    Drive,
}

/// Where a leg's geometry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometrySource {
    /// The route's stored path.
    Stored,
    /// The external geometry provider.
    Provider,
    /// Two-point fallback between the leg's endpoints.
    StraightLine,
}

/// A drawing primitive for one leg of a trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegDrawing {
    pub style: LegStyle,
    pub path: Vec<Coord>,
    pub source: GeometrySource,
    pub color: &'static str,
    /// Icon for ride legs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    /// Mode name for ride legs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// A fully composed trip, owned by whoever displays it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itinerary {
    pub kind: TripKind,
    pub title: String,
    pub label: String,
    pub origin: Endpoint,
    pub destination: Endpoint,
    pub steps: Vec<Step>,
    pub fare: Fare,
    pub distance_km: f64,
    pub time: TripTime,
    pub legs: Vec<LegDrawing>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discounted_fare_is_eighty_percent() {
        let fare = Fare::from_regular(25.0);
        assert_eq!(fare.regular, 25.0);
        assert_eq!(fare.discounted, 20.0);
    }

    #[test]
    fn trip_kind_from_segment_count() {
        assert_eq!(TripKind::for_segment_count(1), Some(TripKind::Direct));
        assert_eq!(TripKind::for_segment_count(3), Some(TripKind::TwoTransfer));
        assert_eq!(TripKind::for_segment_count(0), None);
        assert_eq!(TripKind::for_segment_count(4), None);
        assert_eq!(TripKind::OneTransfer.transfers(), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn discount_is_a_fixed_share(regular in 0.0f64..10_000.0) {
                let fare = Fare::from_regular(regular);
                prop_assert_eq!(fare.regular, regular);
                prop_assert_eq!(fare.discounted, regular * 0.8);
            }
        }
    }
}
