//! OSRM-style route geometry client.

use serde::Deserialize;
use tracing::trace;

use crate::domain::Coord;

use super::error::GeoError;
use super::{GeometryProvider, Profile, fetch_body, parse_json};

/// Default base URL for the public OSRM demo server.
const DEFAULT_BASE_URL: &str = "https://router.project-osrm.org";

#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: LineString,
}

/// GeoJSON line string: `[lng, lat]` positions.
#[derive(Debug, Deserialize)]
struct LineString {
    coordinates: Vec<[f64; 2]>,
}

/// Configuration for the OSRM client.
#[derive(Debug, Clone)]
pub struct OsrmConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OsrmConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for self-hosted instances).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Geometry provider backed by an OSRM server.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    http: reqwest::Client,
    base_url: String,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, GeoError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl GeometryProvider for OsrmClient {
    async fn route(&self, from: Coord, to: Coord, profile: Profile) -> Result<Vec<Coord>, GeoError> {
        let url = route_url(&self.base_url, from, to, profile);
        trace!(%url, "fetching route geometry");

        let body = fetch_body(
            self.http
                .get(&url)
                .query(&[("overview", "full"), ("geometries", "geojson")]),
        )
        .await?;
        parse_route(&body)
    }
}

/// OSRM orders positions longitude first.
fn route_url(base_url: &str, from: Coord, to: Coord, profile: Profile) -> String {
    format!(
        "{base_url}/route/v1/{}/{},{};{},{}",
        profile.as_str(),
        from.lng(),
        from.lat(),
        to.lng(),
        to.lat()
    )
}

/// Geometry of the first route, as coordinates.
fn parse_route(body: &str) -> Result<Vec<Coord>, GeoError> {
    let response: RouteResponse = parse_json(body)?;
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(GeoError::NoGeometry)?;

    let path = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lng, lat]| Coord::new(lat, lng))
        .collect::<Result<Vec<_>, _>>()?;

    if path.len() < 2 {
        return Err(GeoError::NoGeometry);
    }
    Ok(path)
}
