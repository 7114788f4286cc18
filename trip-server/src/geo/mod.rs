//! External geographic services.
//!
//! Two collaborators sit behind traits so the planner and session can be
//! exercised without a network:
//! - [`Geocoder`] turns place text into coordinates and back
//! - [`GeometryProvider`] draws a street-following path between two points
//!
//! The HTTP implementations speak the Nominatim and OSRM dialects.

mod error;
mod geocoder;
mod geometry;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::domain::Coord;

pub use error::GeoError;
pub use geocoder::{NominatimClient, NominatimConfig};
pub use geometry::{OsrmClient, OsrmConfig};

/// A named location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub coord: Coord,
}

impl Place {
    pub fn new(name: impl Into<String>, coord: Coord) -> Self {
        Self {
            name: name.into(),
            coord,
        }
    }

    /// A place named after its own coordinate, for points with no address.
    pub fn unnamed(coord: Coord) -> Self {
        Self {
            name: coord.to_string(),
            coord,
        }
    }
}

/// Travel profile for path geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    Walking,
    Driving,
}

impl Profile {
    /// Path segment used by OSRM-style routers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Walking => "foot",
            Profile::Driving => "driving",
        }
    }
}

/// Place lookup by text and by coordinate.
pub trait Geocoder: Send + Sync {
    /// Best match for `text`, or `None` when nothing matches.
    fn search(&self, text: &str) -> impl Future<Output = Result<Option<Place>, GeoError>> + Send;

    /// Name of the place at `coord`. Falls back to the formatted coordinate
    /// when the service has no name for it.
    fn reverse(&self, coord: Coord) -> impl Future<Output = Result<Place, GeoError>> + Send;
}

/// Street-following path geometry between two points.
pub trait GeometryProvider: Send + Sync {
    /// Path from `from` to `to`, including both ends.
    fn route(
        &self,
        from: Coord,
        to: Coord,
        profile: Profile,
    ) -> impl Future<Output = Result<Vec<Coord>, GeoError>> + Send;
}

/// Send a GET request and return the body of a successful response.
async fn fetch_body(request: reqwest::RequestBuilder) -> Result<String, GeoError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GeoError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    Ok(response.text().await?)
}

/// Parse a JSON body, keeping a truncated copy of the body in the error.
fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, GeoError> {
    serde_json::from_str(body).map_err(|e| GeoError::Json {
        message: format!("{e} (body: {})", body.chars().take(200).collect::<String>()),
    })
}
