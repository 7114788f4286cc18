//! Geographic coordinates and great-circle distance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Error returned when a latitude/longitude pair is not a usable coordinate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate ({lat}, {lng}): {reason}")]
pub struct InvalidCoord {
    lat: f64,
    lng: f64,
    reason: &'static str,
}

/// A WGS84 position in decimal degrees.
///
/// Both components are finite and in range by construction, so distances
/// computed from a `Coord` are never NaN.
///
/// # Examples
///
/// ```
/// use trip_server::domain::Coord;
///
/// let cubao = Coord::new(14.6191, 121.0577).unwrap();
/// assert_eq!(cubao.lat(), 14.6191);
///
/// assert!(Coord::new(91.0, 0.0).is_err());
/// assert!(Coord::new(f64::NAN, 0.0).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Serialize)]
pub struct Coord {
    lat: f64,
    lng: f64,
}

impl Coord {
    /// Create a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidCoord> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(InvalidCoord {
                lat,
                lng,
                reason: "must be finite",
            });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoord {
                lat,
                lng,
                reason: "latitude must be within [-90, 90]",
            });
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(InvalidCoord {
                lat,
                lng,
                reason: "longitude must be within [-180, 180]",
            });
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Great-circle (haversine) distance to `other` in kilometers.
    pub fn distance_km(&self, other: &Coord) -> f64 {
        haversine_km(*self, *other)
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coord({}, {})", self.lat, self.lng)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

impl<'de> Deserialize<'de> for Coord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            lat: f64,
            lng: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coord::new(raw.lat, raw.lng).map_err(serde::de::Error::custom)
    }
}

/// Great-circle distance between two coordinates in kilometers.
pub fn haversine_km(from: Coord, to: Coord) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
