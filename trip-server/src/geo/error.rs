//! Geocoder and geometry provider error types.

use crate::domain::InvalidCoord;

/// Errors from the external geographic services.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Response carried a coordinate we cannot use
    #[error(transparent)]
    InvalidCoord(#[from] InvalidCoord),

    /// Routing service found no path between the points
    #[error("no route geometry between the given points")]
    NoGeometry,
}
