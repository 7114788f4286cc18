//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default directory refresh interval (24 hours).
const DEFAULT_REFRESH_SECS: u64 = 24 * 60 * 60;

/// Error reading server configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnvError {
    /// A variable was set but could not be parsed
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// Neither a directory URL nor a directory file was given
    #[error("set DIRECTORY_URL or DIRECTORY_FILE")]
    NoDirectorySource,
}

/// Where to load the directory from.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryLocation {
    Url(String),
    File(PathBuf),
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub directory: DirectoryLocation,
    /// Geocoder base URL; the public Nominatim service when unset
    pub geocoder_url: Option<String>,
    /// Geometry base URL; the public OSRM server when unset
    pub geometry_url: Option<String>,
    pub geocoder_country_codes: String,
    /// How often to reload the directory once loaded
    pub directory_refresh: Duration,
    /// How soon to retry while no directory has loaded
    pub directory_retry: Duration,
    pub geometry_cache_ttl: Duration,
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, EnvError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EnvError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bind_addr = match get("BIND_ADDR") {
            Some(value) => value.trim().parse().map_err(|e: std::net::AddrParseError| {
                EnvError::Invalid {
                    var: "BIND_ADDR",
                    value,
                    reason: e.to_string(),
                }
            })?,
            None => SocketAddr::from(([127, 0, 0, 1], 3000)),
        };

        // A file takes precedence so a local copy can stand in for the API
        let directory = match (get("DIRECTORY_FILE"), get("DIRECTORY_URL")) {
            (Some(path), _) => DirectoryLocation::File(PathBuf::from(path)),
            (None, Some(url)) => DirectoryLocation::Url(url),
            (None, None) => return Err(EnvError::NoDirectorySource),
        };

        let secs = |var: &'static str, default: u64| -> Result<Duration, EnvError> {
            match get(var) {
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| EnvError::Invalid {
                        var,
                        value,
                        reason: e.to_string(),
                    }),
                None => Ok(Duration::from_secs(default)),
            }
        };

        Ok(Self {
            bind_addr,
            directory,
            geocoder_url: get("GEOCODER_URL"),
            geometry_url: get("GEOMETRY_URL"),
            geocoder_country_codes: get("GEOCODER_COUNTRY_CODES").unwrap_or_else(|| "ph".into()),
            directory_refresh: secs("DIRECTORY_REFRESH_SECS", DEFAULT_REFRESH_SECS)?,
            directory_retry: secs("DIRECTORY_RETRY_SECS", 30)?,
            geometry_cache_ttl: secs("GEOMETRY_CACHE_TTL_SECS", 3600)?,
        })
    }
}
