//! Nominatim-style geocoding client.

use serde::Deserialize;
use tracing::debug;

use crate::domain::Coord;

use super::error::GeoError;
use super::{Geocoder, Place, fetch_body, parse_json};

/// Default base URL for the public Nominatim service.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim's usage policy asks every client to identify itself.
const USER_AGENT: &str = concat!("trip-server/", env!("CARGO_PKG_VERSION"));

/// One search or reverse result. Nominatim sends coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

impl NominatimPlace {
    fn coord(&self) -> Result<Coord, GeoError> {
        let parse = |s: &str| {
            s.trim().parse::<f64>().map_err(|e| GeoError::Json {
                message: format!("bad coordinate {s:?}: {e}"),
            })
        };
        Ok(Coord::new(parse(&self.lat)?, parse(&self.lon)?)?)
    }
}

/// Reverse lookups answer `{"error": ...}` for points with no address.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReverseResponse {
    Found(NominatimPlace),
    Missing {
        #[allow(dead_code)]
        error: String,
    },
}

/// Configuration for the Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Comma-separated ISO country codes searches are restricted to
    pub country_codes: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl NominatimConfig {
    /// Create a config for the public service, restricted to the Philippines.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            country_codes: "ph".to_string(),
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for self-hosted instances).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Restrict searches to the given country codes.
    pub fn with_country_codes(mut self, codes: impl Into<String>) -> Self {
        self.country_codes = codes.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Geocoder backed by a Nominatim instance.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
    country_codes: String,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, GeoError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country_codes: config.country_codes,
        })
    }
}

impl Geocoder for NominatimClient {
    async fn search(&self, text: &str) -> Result<Option<Place>, GeoError> {
        let url = format!("{}/search", self.base_url);
        let mut query = vec![("q", text), ("format", "json"), ("limit", "1")];
        if !self.country_codes.is_empty() {
            query.push(("countrycodes", self.country_codes.as_str()));
        }

        let body = fetch_body(self.http.get(&url).query(&query)).await?;
        let place = parse_search(&body, text)?;
        debug!(query = text, found = place.is_some(), "geocoder search");
        Ok(place)
    }

    async fn reverse(&self, coord: Coord) -> Result<Place, GeoError> {
        let url = format!("{}/reverse", self.base_url);
        let lat = coord.lat().to_string();
        let lon = coord.lng().to_string();

        let body = fetch_body(self.http.get(&url).query(&[
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("format", "json"),
        ]))
        .await?;
        parse_reverse(&body, coord)
    }
}

/// First search result, named by its display name (or the query text).
fn parse_search(body: &str, text: &str) -> Result<Option<Place>, GeoError> {
    let results: Vec<NominatimPlace> = parse_json(body)?;
    let Some(first) = results.into_iter().next() else {
        return Ok(None);
    };
    let coord = first.coord()?;
    let name = first.display_name.unwrap_or_else(|| text.to_string());
    Ok(Some(Place::new(name, coord)))
}

/// The named place at `coord`. The pinned coordinate is kept as is; only the
/// name comes from the service.
fn parse_reverse(body: &str, coord: Coord) -> Result<Place, GeoError> {
    let name = match parse_json::<ReverseResponse>(body)? {
        ReverseResponse::Found(place) => place.display_name,
        ReverseResponse::Missing { .. } => None,
    };
    Ok(match name {
        Some(name) if !name.trim().is_empty() => Place::new(name, coord),
        _ => Place::unnamed(coord),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = NominatimConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.country_codes, "ph");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn config_builder() {
        let config = NominatimConfig::new()
            .with_base_url("http://localhost:8080")
            .with_country_codes("ph,sg")
            .with_timeout(3);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.country_codes, "ph,sg");
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn search_takes_first_result() {
        let body = r#"[
            {"lat": "14.6178", "lon": "121.0572", "display_name": "Cubao, Quezon City, Metro Manila"},
            {"lat": "10.3", "lon": "123.9", "display_name": "Elsewhere"}
        ]"#;
        let place = parse_search(body, "cubao").unwrap().unwrap();
        assert_eq!(place.name, "Cubao, Quezon City, Metro Manila");
        assert_eq!(place.coord, Coord::new(14.6178, 121.0572).unwrap());
    }

    #[test]
    fn search_with_no_results() {
        assert_eq!(parse_search("[]", "nowhere").unwrap(), None);
    }

    #[test]
    fn search_rejects_bad_coordinates() {
        let body = r#"[{"lat": "north", "lon": "121.0", "display_name": "x"}]"#;
        assert!(matches!(
            parse_search(body, "x"),
            Err(GeoError::Json { .. })
        ));

        let body = r#"[{"lat": "95.0", "lon": "121.0", "display_name": "x"}]"#;
        assert!(matches!(
            parse_search(body, "x"),
            Err(GeoError::InvalidCoord(_))
        ));
    }

    #[test]
    fn search_rejects_malformed_json() {
        assert!(matches!(
            parse_search("{not json", "x"),
            Err(GeoError::Json { .. })
        ));
    }

    #[test]
    fn reverse_uses_display_name() {
        let coord = Coord::new(14.5995, 120.9842).unwrap();
        let body = r#"{"lat": "14.5996", "lon": "120.9841", "display_name": "Quiapo, Manila"}"#;
        let place = parse_reverse(body, coord).unwrap();
        assert_eq!(place.name, "Quiapo, Manila");
        assert_eq!(place.coord, coord);
    }

    #[test]
    fn reverse_falls_back_to_coordinate_name() {
        let coord = Coord::new(14.599512, 120.984222).unwrap();
        let body = r#"{"error": "Unable to geocode"}"#;
        let place = parse_reverse(body, coord).unwrap();
        assert_eq!(place.name, "14.5995, 120.9842");
    }
}
