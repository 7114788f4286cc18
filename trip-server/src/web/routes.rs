//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::Coord;
use crate::geo::{GeoError, Geocoder, GeometryProvider, Place};
use crate::planner::ConfigError;
use crate::session::{PlanError, PlanRequest, SessionStatus};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<G, P>(state: AppState<G, P>) -> Router
where
    G: Geocoder + 'static,
    P: GeometryProvider + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status::<G, P>))
        .route("/network", get(network::<G, P>))
        .route("/trip/plan", axum::routing::post(plan_trip::<G, P>))
        .route(
            "/trip/current",
            get(current_trip::<G, P>).delete(clear_trip::<G, P>),
        )
        .route("/places/search", get(search_place::<G, P>))
        .route("/places/reverse", get(reverse_place::<G, P>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness and directory counts.
async fn status<G, P>(State(state): State<AppState<G, P>>) -> Json<SessionStatus>
where
    G: Geocoder,
    P: GeometryProvider,
{
    Json(state.session.status().await)
}

/// The loaded transit network, for drawing terminals and routes.
async fn network<G, P>(
    State(state): State<AppState<G, P>>,
) -> Result<Json<NetworkResponse>, AppError>
where
    G: Geocoder,
    P: GeometryProvider,
{
    let loaded = state
        .session
        .directory()
        .await
        .ok_or_else(|| AppError::from(PlanError::NotReady))?;

    Ok(Json(NetworkResponse {
        version: loaded.version,
        terminals: loaded
            .directory
            .terminals()
            .iter()
            .map(TerminalView::from_terminal)
            .collect(),
    }))
}

/// Plan a trip. Finding no route is a normal outcome, not an error.
async fn plan_trip<G, P>(
    State(state): State<AppState<G, P>>,
    Json(req): Json<PlanTripRequest>,
) -> Result<Json<PlanTripResponse>, AppError>
where
    G: Geocoder,
    P: GeometryProvider,
{
    let config = req.search_config()?;
    let request = PlanRequest {
        origin: req.origin,
        destination: req.destination,
        config,
    };

    match state.session.plan(&request).await {
        Ok(outcome) => Ok(Json(PlanTripResponse {
            status: PlanStatus::Found,
            generation: outcome.generation,
            superseded: outcome.superseded,
            itinerary: Some(ItineraryView::from_itinerary(&outcome.itinerary)),
            direct_route: None,
        })),
        Err(PlanError::NoRoute {
            generation,
            superseded,
            direct,
        }) => Ok(Json(PlanTripResponse {
            status: PlanStatus::NoRoute,
            generation,
            superseded,
            itinerary: None,
            direct_route: Some(LegView::from_leg(&direct)),
        })),
        Err(e) => Err(e.into()),
    }
}

/// The trip on display, or 204 when there is none.
async fn current_trip<G, P>(State(state): State<AppState<G, P>>) -> Response
where
    G: Geocoder,
    P: GeometryProvider,
{
    match state.session.current().await {
        Some(trip) => Json(CurrentTripResponse {
            generation: trip.generation,
            itinerary: ItineraryView::from_itinerary(&trip.itinerary),
        })
        .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Discard the current trip and any search still in flight.
async fn clear_trip<G, P>(State(state): State<AppState<G, P>>) -> Json<ClearTripResponse>
where
    G: Geocoder,
    P: GeometryProvider,
{
    Json(ClearTripResponse {
        generation: state.session.clear().await,
    })
}

/// Best geocoder match for free text.
async fn search_place<G, P>(
    State(state): State<AppState<G, P>>,
    Query(query): Query<PlaceSearchQuery>,
) -> Result<Json<PlaceSearchResponse>, AppError>
where
    G: Geocoder,
    P: GeometryProvider,
{
    let text = query.q.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest {
            message: "query must not be empty".into(),
        });
    }

    let place = state.session.geocoder().search(text).await?;
    Ok(Json(PlaceSearchResponse {
        place: place.as_ref().map(PlaceView::from_place),
    }))
}

/// Name a point picked on the map. Falls back to the bare coordinates when
/// the geocoder cannot name it.
async fn reverse_place<G, P>(
    State(state): State<AppState<G, P>>,
    Query(query): Query<ReverseQuery>,
) -> Result<Json<PlaceView>, AppError>
where
    G: Geocoder,
    P: GeometryProvider,
{
    let coord = Coord::new(query.lat, query.lng).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    let place = match state.session.geocoder().reverse(coord).await {
        Ok(place) => place,
        Err(e) => {
            warn!(%coord, error = %e, "reverse geocoding failed");
            Place::unnamed(coord)
        }
    };
    Ok(Json(PlaceView::from_place(&place)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Unprocessable { message: String },
    BadGateway { message: String },
    ServiceUnavailable { message: String },
    Internal { message: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            AppError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message }
            | AppError::Unprocessable { message }
            | AppError::BadGateway { message }
            | AppError::ServiceUnavailable { message }
            | AppError::Internal { message } => message,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<GeoError> for AppError {
    fn from(e: GeoError) -> Self {
        AppError::BadGateway {
            message: e.to_string(),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        let message = e.to_string();
        match e {
            PlanError::NotReady => AppError::ServiceUnavailable { message },
            PlanError::LocationsNotFound { .. } => AppError::Unprocessable { message },
            // Handlers answer no-route themselves; reaching here is a bug.
            PlanError::NoRoute { .. } => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, message = self.message(), "request failed");
        } else {
            warn!(%status, message = self.message(), "request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.message().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::directory::IngestReport;
    use crate::domain::{
        Cost, Directory, LegStyle, Route, RouteId, Stop, StopId, Terminal, TerminalId, TransportMode,
    };
    use crate::geo::Profile;
    use crate::session::{LocationInput, TripSession};

    fn coord(lat: f64, lng: f64) -> Coord {
        Coord::new(lat, lng).unwrap()
    }

    /// Knows two places; "outage" fails.
    struct FixedGeocoder;

    impl Geocoder for FixedGeocoder {
        async fn search(&self, text: &str) -> Result<Option<Place>, GeoError> {
            match text {
                "Gateway Mall" => Ok(Some(Place::new("Gateway Mall, Cubao", coord(14.6205, 121.0530)))),
                "Quiapo Church" => Ok(Some(Place::new("Quiapo Church, Manila", coord(14.5990, 120.9838)))),
                "outage" => Err(GeoError::Api {
                    status: 503,
                    message: "unavailable".into(),
                }),
                _ => Ok(None),
            }
        }

        async fn reverse(&self, coord: Coord) -> Result<Place, GeoError> {
            if coord.lat() > 15.0 {
                return Err(GeoError::NoGeometry);
            }
            Ok(Place::new("Cubao, Quezon City", coord))
        }
    }

    struct StraightLines;

    impl GeometryProvider for StraightLines {
        async fn route(&self, from: Coord, to: Coord, _: Profile) -> Result<Vec<Coord>, GeoError> {
            Ok(vec![from, to])
        }
    }

    type TestState = AppState<FixedGeocoder, StraightLines>;

    fn state() -> TestState {
        AppState::new(Arc::new(TripSession::new(FixedGeocoder, StraightLines)))
    }

    fn directory() -> Directory {
        let stop = Stop::new(
            StopId::new("101"),
            "Quiapo",
            coord(14.598, 120.984),
            Cost::new(15.0, 35.0, 8.5).unwrap(),
        );
        let route = Route::new(
            RouteId::new("10"),
            Some("Cubao - Quiapo".into()),
            TransportMode::new("Jeepney"),
            vec![stop],
            None,
        )
        .unwrap();
        Directory::new(vec![Terminal {
            id: TerminalId::new("1"),
            name: "Cubao".into(),
            coord: coord(14.619, 121.057),
            city: Some("Quezon City".into()),
            routes: vec![route],
        }])
    }

    async fn ready_state() -> TestState {
        let state = state();
        state
            .session
            .install_directory(directory(), IngestReport::default())
            .await;
        state
    }

    fn plan_request(origin: &str, destination: &str) -> PlanTripRequest {
        PlanTripRequest {
            origin: LocationInput::text(origin),
            destination: LocationInput::text(destination),
            max_walk: None,
            max_transfers: None,
            cost_metric: None,
            modes: None,
        }
    }

    #[tokio::test]
    async fn health_returns_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn plan_before_directory_is_unavailable() {
        let err = plan_trip(State(state()), Json(plan_request("Gateway Mall", "Quiapo Church")))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = network(State(state())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn plan_then_current_then_clear() {
        let state = ready_state().await;

        let Json(response) = plan_trip(
            State(state.clone()),
            Json(plan_request("Gateway Mall", "Quiapo Church")),
        )
        .await
        .unwrap();
        assert_eq!(response.status, PlanStatus::Found);
        assert!(!response.superseded);
        let itinerary = response.itinerary.unwrap();
        assert_eq!(itinerary.title, "Trip to Quiapo Church");
        assert_eq!(itinerary.label, "Jeepney + Walking");
        assert_eq!(itinerary.fare.regular, 15.0);

        let current = current_trip(State(state.clone())).await;
        assert_eq!(current.status(), StatusCode::OK);

        let Json(cleared) = clear_trip(State(state.clone())).await;
        assert!(cleared.generation > response.generation);
        let current = current_trip(State(state)).await;
        assert_eq!(current.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn no_route_is_a_normal_response() {
        let state = ready_state().await;
        let mut req = plan_request("Gateway Mall", "Quiapo Church");
        req.modes = Some(vec!["train".into()]);

        let Json(response) = plan_trip(State(state), Json(req)).await.unwrap();

        assert_eq!(response.status, PlanStatus::NoRoute);
        assert!(response.itinerary.is_none());
        let direct = response.direct_route.unwrap();
        assert_eq!(direct.style, LegStyle::Drive);
        assert_eq!(direct.path, [[14.6205, 121.0530], [14.5990, 120.9838]]);
    }

    #[tokio::test]
    async fn unknown_location_is_unprocessable() {
        let state = ready_state().await;
        let err = plan_trip(State(state), Json(plan_request("Atlantis", "Quiapo Church")))
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message(), "locations not found: Atlantis");
    }

    #[tokio::test]
    async fn bad_config_is_bad_request() {
        let state = ready_state().await;
        let mut req = plan_request("Gateway Mall", "Quiapo Church");
        req.cost_metric = Some("comfort".into());

        let err = plan_trip(State(state), Json(req)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn network_lists_terminals_and_routes() {
        let Json(response) = network(State(ready_state().await)).await.unwrap();

        assert_eq!(response.version, 1);
        assert_eq!(response.terminals.len(), 1);
        let route = &response.terminals[0].routes[0];
        assert_eq!(route.destination.name, "Quiapo");
        assert_eq!(route.time_mins, 35.0);
    }

    #[tokio::test]
    async fn place_search() {
        let Json(found) = search_place(
            State(state()),
            Query(PlaceSearchQuery {
                q: " Gateway Mall ".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(found.place.unwrap().name, "Gateway Mall, Cubao");

        let Json(missing) = search_place(State(state()), Query(PlaceSearchQuery { q: "Atlantis".into() }))
            .await
            .unwrap();
        assert!(missing.place.is_none());

        let err = search_place(State(state()), Query(PlaceSearchQuery { q: "  ".into() }))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = search_place(State(state()), Query(PlaceSearchQuery { q: "outage".into() }))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn reverse_falls_back_to_coordinates() {
        let Json(named) = reverse_place(State(state()), Query(ReverseQuery { lat: 14.62, lng: 121.05 }))
            .await
            .unwrap();
        assert_eq!(named.name, "Cubao, Quezon City");

        let Json(unnamed) = reverse_place(State(state()), Query(ReverseQuery { lat: 16.4, lng: 120.6 }))
            .await
            .unwrap();
        assert_eq!(unnamed.name, "16.4000, 120.6000");
        assert_eq!(unnamed.lat, 16.4);

        let err = reverse_place(State(state()), Query(ReverseQuery { lat: 95.0, lng: 0.0 }))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_statuses() {
        let not_ready: AppError = PlanError::NotReady.into();
        assert_eq!(not_ready.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        let geo: AppError = GeoError::NoGeometry.into();
        assert_eq!(geo.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
