//! Data transfer objects for web requests and responses.
//!
//! Positions in responses are `[lat, lng]` pairs, ready for map libraries.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Coord, GeometrySource, Itinerary, LegDrawing, LegStyle, Route, Step, StepKind, Terminal,
    TripKind,
};
use crate::geo::Place;
use crate::planner::{ConfigError, SearchConfig};
use crate::session::LocationInput;

fn position(coord: Coord) -> [f64; 2] {
    [coord.lat(), coord.lng()]
}

/// Request to plan a trip.
#[derive(Debug, Deserialize)]
pub struct PlanTripRequest {
    pub origin: LocationInput,
    pub destination: LocationInput,

    /// Walking budget, e.g. "2", "1.5km" or "800m"
    pub max_walk: Option<String>,

    /// Maximum number of transfers (0 to 2)
    pub max_transfers: Option<u32>,

    /// "time", "fare" or "distance"
    pub cost_metric: Option<String>,

    /// Mode tokens to allow, e.g. ["jeepney", "train"]
    pub modes: Option<Vec<String>>,
}

impl PlanTripRequest {
    /// Search settings, with defaults for anything not given.
    pub fn search_config(&self) -> Result<SearchConfig, ConfigError> {
        SearchConfig::from_surface(
            self.max_walk.as_deref(),
            self.max_transfers,
            self.cost_metric.as_deref(),
            self.modes.as_deref(),
        )
    }
}

/// Outcome of a plan request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Found,
    NoRoute,
}

/// Response to a plan request.
#[derive(Debug, Serialize)]
pub struct PlanTripResponse {
    pub status: PlanStatus,

    /// Generation of this request
    pub generation: u64,

    /// Whether a newer request overtook this one, leaving the current trip
    /// untouched
    pub superseded: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub itinerary: Option<ItineraryView>,

    /// Road route from origin to destination, given when no transit trip fits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_route: Option<LegView>,
}

/// The trip currently on display.
#[derive(Debug, Serialize)]
pub struct CurrentTripResponse {
    pub generation: u64,
    pub itinerary: ItineraryView,
}

/// Response to clearing the current trip.
#[derive(Debug, Serialize)]
pub struct ClearTripResponse {
    pub generation: u64,
}

/// A composed trip.
#[derive(Debug, Serialize)]
pub struct ItineraryView {
    pub kind: TripKind,
    pub title: String,
    pub label: String,
    pub origin: PlaceView,
    pub destination: PlaceView,
    pub steps: Vec<StepView>,
    pub fare: FareView,

    /// Total distance, walking included (km)
    pub distance_km: f64,

    /// Total distance for display, e.g. "6.8 km"
    pub distance: String,

    /// Duration derived from the trip's score (minutes, rounded)
    pub display_time_mins: i64,

    /// Duration for display, e.g. "42 min"
    pub time: String,

    /// Sum of ride times (minutes)
    pub ride_time_mins: f64,

    pub legs: Vec<LegView>,
}

impl ItineraryView {
    pub fn from_itinerary(itinerary: &Itinerary) -> Self {
        let display_time_mins = itinerary.time.display_mins.round() as i64;
        Self {
            kind: itinerary.kind,
            title: itinerary.title.clone(),
            label: itinerary.label.clone(),
            origin: PlaceView::new(&itinerary.origin.name, itinerary.origin.coord),
            destination: PlaceView::new(&itinerary.destination.name, itinerary.destination.coord),
            steps: itinerary.steps.iter().map(StepView::from_step).collect(),
            fare: FareView {
                regular: itinerary.fare.regular,
                discounted: itinerary.fare.discounted,
            },
            distance_km: itinerary.distance_km,
            distance: format!("{:.1} km", itinerary.distance_km),
            display_time_mins,
            time: format!("{display_time_mins} min"),
            ride_time_mins: itinerary.time.ride_mins,
            legs: itinerary.legs.iter().map(LegView::from_leg).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FareView {
    pub regular: f64,
    /// Student, senior and PWD fare
    pub discounted: f64,
}

#[derive(Debug, Serialize)]
pub struct StepView {
    pub kind: StepKind,
    pub instruction: String,
    /// Where to focus the map for this step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<[f64; 2]>,
}

impl StepView {
    fn from_step(step: &Step) -> Self {
        Self {
            kind: step.kind,
            instruction: step.instruction.clone(),
            location: step.coord.map(position),
        }
    }
}

/// One leg of a trip as drawn on the map.
#[derive(Debug, Serialize)]
pub struct LegView {
    pub style: LegStyle,
    pub source: GeometrySource,
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Whether the line should be dashed
    pub dashed: bool,
    pub path: Vec<[f64; 2]>,
}

impl LegView {
    pub fn from_leg(leg: &LegDrawing) -> Self {
        Self {
            style: leg.style,
            source: leg.source,
            color: leg.color,
            icon: leg.icon,
            mode: leg.mode.clone(),
            dashed: leg.style == LegStyle::Walk || leg.source == GeometrySource::StraightLine,
            path: leg.path.iter().copied().map(position).collect(),
        }
    }
}

/// A named position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceView {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl PlaceView {
    pub fn new(name: &str, coord: Coord) -> Self {
        Self {
            name: name.to_string(),
            lat: coord.lat(),
            lng: coord.lng(),
        }
    }

    pub fn from_place(place: &Place) -> Self {
        Self::new(&place.name, place.coord)
    }
}

/// Query for place search.
#[derive(Debug, Deserialize)]
pub struct PlaceSearchQuery {
    pub q: String,
}

/// Query for reverse geocoding.
#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    pub lat: f64,
    pub lng: f64,
}

/// Response to a place search.
#[derive(Debug, Serialize)]
pub struct PlaceSearchResponse {
    /// Best match, if any
    pub place: Option<PlaceView>,
}

/// The transit network for map display.
#[derive(Debug, Serialize)]
pub struct NetworkResponse {
    pub version: u64,
    pub terminals: Vec<TerminalView>,
}

#[derive(Debug, Serialize)]
pub struct TerminalView {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub routes: Vec<RouteView>,
}

impl TerminalView {
    pub fn from_terminal(terminal: &Terminal) -> Self {
        Self {
            id: terminal.id.to_string(),
            name: terminal.name.clone(),
            lat: terminal.coord.lat(),
            lng: terminal.coord.lng(),
            city: terminal.city.clone(),
            routes: terminal.routes.iter().map(RouteView::from_route).collect(),
        }
    }
}

/// A route summarized by its destination stop.
#[derive(Debug, Serialize)]
pub struct RouteView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub mode: String,
    pub color: &'static str,
    pub icon: &'static str,
    pub destination: PlaceView,
    pub fare: f64,
    pub time_mins: f64,
    pub distance_km: f64,
    pub stops: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<[f64; 2]>>,
}

impl RouteView {
    pub fn from_route(route: &Route) -> Self {
        let dest = route.destination();
        let kind = route.mode().kind();
        Self {
            id: route.id().to_string(),
            name: route.name().map(str::to_string),
            mode: route.mode().name().to_string(),
            color: kind.color_hint(),
            icon: kind.icon_hint(),
            destination: PlaceView::new(&dest.name, dest.coord),
            fare: dest.cost.fare,
            time_mins: dest.cost.time_mins,
            distance_km: dest.cost.distance_km,
            stops: route.stops().len(),
            path: route
                .path()
                .map(|p| p.iter().copied().map(position).collect()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DRIVE_COLOR, Endpoint, Fare, TripTime, WALK_COLOR};

    fn coord(lat: f64, lng: f64) -> Coord {
        Coord::new(lat, lng).unwrap()
    }

    fn itinerary() -> Itinerary {
        Itinerary {
            kind: TripKind::Direct,
            title: "Trip to Quiapo".into(),
            label: "Jeepney + Walking".into(),
            origin: Endpoint {
                name: "Gateway Mall".into(),
                coord: coord(14.621, 121.053),
            },
            destination: Endpoint {
                name: "Quiapo".into(),
                coord: coord(14.599, 120.983),
            },
            steps: vec![
                Step::new(StepKind::Walk, "Walk 0.5 km to Cubao", Some(coord(14.621, 121.053))),
                Step::new(StepKind::Ride, "Ride Jeepney towards Quiapo", None),
            ],
            fare: Fare::from_regular(15.0),
            distance_km: 9.1234,
            time: TripTime {
                display_mins: 41.6,
                ride_mins: 35.0,
            },
            legs: vec![LegDrawing {
                style: LegStyle::Walk,
                path: vec![coord(14.621, 121.053), coord(14.619, 121.057)],
                source: GeometrySource::StraightLine,
                color: WALK_COLOR,
                icon: None,
                mode: None,
            }],
        }
    }

    #[test]
    fn itinerary_view_formats_totals() {
        let view = ItineraryView::from_itinerary(&itinerary());

        assert_eq!(view.distance, "9.1 km");
        assert_eq!(view.display_time_mins, 42);
        assert_eq!(view.time, "42 min");
        assert_eq!(view.fare.discounted, 12.0);
        assert_eq!(view.steps[0].location, Some([14.621, 121.053]));
        assert_eq!(view.steps[1].location, None);
        assert!(view.legs[0].dashed);
    }

    #[test]
    fn itinerary_view_json_shape() {
        let json = serde_json::to_value(ItineraryView::from_itinerary(&itinerary())).unwrap();

        assert_eq!(json["kind"], "direct");
        assert_eq!(json["steps"][0]["kind"], "walk");
        assert!(json["steps"][1].get("location").is_none());
        assert_eq!(json["legs"][0]["source"], "straight_line");
        assert_eq!(json["legs"][0]["path"][1][1], 121.057);
        assert!(json["legs"][0].get("icon").is_none());
    }

    #[test]
    fn no_route_response_carries_direct_route() {
        let response = PlanTripResponse {
            status: PlanStatus::NoRoute,
            generation: 3,
            superseded: false,
            itinerary: None,
            direct_route: Some(LegView::from_leg(&LegDrawing {
                style: LegStyle::Drive,
                path: vec![coord(14.621, 121.053), coord(16.40, 120.59)],
                source: GeometrySource::StraightLine,
                color: DRIVE_COLOR,
                icon: None,
                mode: None,
            })),
        };
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["status"], "no_route");
        assert!(json.get("itinerary").is_none());
        assert_eq!(json["direct_route"]["style"], "drive");
        assert_eq!(json["direct_route"]["dashed"], true);
        assert_eq!(json["direct_route"]["path"][1][0], 16.4);
    }

    #[test]
    fn plan_request_defaults_and_overrides() {
        let req: PlanTripRequest = serde_json::from_str(
            r#"{"origin": {"text": "Cubao"}, "destination": {"text": "Quiapo"}}"#,
        )
        .unwrap();
        assert_eq!(req.search_config().unwrap(), SearchConfig::default());

        let req: PlanTripRequest = serde_json::from_str(
            r#"{
                "origin": {"text": "Pinned", "pinned": {"name": "Pinned", "coord": {"lat": 14.6, "lng": 121.0}}},
                "destination": {"text": "Quiapo"},
                "max_walk": "500m", "max_transfers": 2, "cost_metric": "fare", "modes": ["Jeepney"]
            }"#,
        )
        .unwrap();
        let config = req.search_config().unwrap();
        assert_eq!(config.max_walk_km, 0.5);
        assert_eq!(config.max_transfers, 2);
        assert_eq!(config.active_modes.tokens(), ["jeepney"]);
        assert!(req.origin.pinned.is_some());

        let req: PlanTripRequest = serde_json::from_str(
            r#"{"origin": {"text": "a"}, "destination": {"text": "b"}, "max_walk": "far"}"#,
        )
        .unwrap();
        assert!(req.search_config().is_err());
    }
}
