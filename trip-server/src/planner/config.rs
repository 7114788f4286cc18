//! Search configuration for the trip planner.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::ModeFilter;

/// Transfers beyond this are accepted but have no effect.
pub const MAX_SUPPORTED_TRANSFERS: u32 = 2;

/// Error parsing a user-facing configuration value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Walking distance could not be parsed
    #[error("invalid walking distance {input:?}: {reason}")]
    InvalidWalkDistance { input: String, reason: &'static str },

    /// Unknown cost metric name
    #[error("unknown cost metric {0:?} (expected time, fare or distance)")]
    UnknownMetric(String),
}

/// The quantity a trip is scored by. Lower scores win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CostMetric {
    #[default]
    Time,
    Fare,
    Distance,
}

impl CostMetric {
    /// Score units charged per walked kilometer.
    ///
    /// These constants are informal heuristics, not calibrated walking
    /// speeds or fare elasticities.
    pub fn walk_weight(&self) -> f64 {
        match self {
            CostMetric::Time => 12.0,
            CostMetric::Fare => 10.0,
            CostMetric::Distance => 1.0,
        }
    }
}

impl FromStr for CostMetric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "time" => Ok(CostMetric::Time),
            "fare" => Ok(CostMetric::Fare),
            "distance" => Ok(CostMetric::Distance),
            _ => Err(ConfigError::UnknownMetric(s.to_string())),
        }
    }
}

impl fmt::Display for CostMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CostMetric::Time => "time",
            CostMetric::Fare => "fare",
            CostMetric::Distance => "distance",
        })
    }
}

/// A walking distance budget in kilometers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct WalkDistance(f64);

impl WalkDistance {
    /// Create from kilometers. Must be finite and non-negative.
    pub fn from_km(km: f64) -> Option<Self> {
        (km.is_finite() && km >= 0.0).then_some(Self(km))
    }

    /// Parse `"1.5"`, `"1.5km"`, `"500m"` or `"500 m"`. Unsuffixed values are
    /// kilometers; units are case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_server::planner::WalkDistance;
    ///
    /// assert_eq!(WalkDistance::parse("500m").unwrap().km(), 0.5);
    /// assert_eq!(WalkDistance::parse("2").unwrap().km(), 2.0);
    /// assert!(WalkDistance::parse("2 miles").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let err = |reason| ConfigError::InvalidWalkDistance {
            input: input.to_string(),
            reason,
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(err("empty"));
        }

        let split = trimmed
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);

        let divisor = match unit.trim().to_lowercase().as_str() {
            "" | "km" => 1.0,
            "m" => 1000.0,
            _ => return Err(err("unit must be m or km")),
        };

        let value: f64 = number.trim().parse().map_err(|_| err("not a number"))?;
        Self::from_km(value / divisor).ok_or_else(|| err("must be finite and non-negative"))
    }

    pub fn km(&self) -> f64 {
        self.0
    }
}

/// Configuration parameters for trip search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Maximum total walking distance across all walk legs (km).
    pub max_walk_km: f64,

    /// Maximum number of vehicle transfers. Values above 2 behave as 2.
    pub max_transfers: u32,

    /// What trips are scored by.
    pub cost_metric: CostMetric,

    /// Which transport modes may be used.
    pub active_modes: ModeFilter,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        max_walk: WalkDistance,
        max_transfers: u32,
        cost_metric: CostMetric,
        active_modes: ModeFilter,
    ) -> Self {
        Self {
            max_walk_km: max_walk.km(),
            max_transfers,
            cost_metric,
            active_modes,
        }
    }

    /// Build a configuration from user-facing values, using the defaults for
    /// anything not given.
    pub fn from_surface(
        max_walk: Option<&str>,
        max_transfers: Option<u32>,
        metric: Option<&str>,
        modes: Option<&[String]>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_walk_km = match max_walk {
            Some(s) => WalkDistance::parse(s)?.km(),
            None => defaults.max_walk_km,
        };
        let cost_metric = match metric {
            Some(s) => s.parse()?,
            None => defaults.cost_metric,
        };
        let active_modes = match modes {
            Some(tokens) => ModeFilter::new(tokens),
            None => defaults.active_modes,
        };

        Ok(Self {
            max_walk_km,
            max_transfers: max_transfers.unwrap_or(defaults.max_transfers),
            cost_metric,
            active_modes,
        })
    }

    /// The transfer ceiling actually searched.
    pub fn effective_transfers(&self) -> u32 {
        self.max_transfers.min(MAX_SUPPORTED_TRANSFERS)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_walk_km: 2.0,
            max_transfers: 1,
            cost_metric: CostMetric::Time,
            active_modes: ModeFilter::all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.max_walk_km, 2.0);
        assert_eq!(config.max_transfers, 1);
        assert_eq!(config.cost_metric, CostMetric::Time);
        assert_eq!(config.active_modes, ModeFilter::all());
    }

    #[test]
    fn walk_weights() {
        assert_eq!(CostMetric::Time.walk_weight(), 12.0);
        assert_eq!(CostMetric::Fare.walk_weight(), 10.0);
        assert_eq!(CostMetric::Distance.walk_weight(), 1.0);
    }

    #[test]
    fn parse_walk_distance_units() {
        assert_eq!(WalkDistance::parse("1.5").unwrap().km(), 1.5);
        assert_eq!(WalkDistance::parse("1.5km").unwrap().km(), 1.5);
        assert_eq!(WalkDistance::parse(" 1.5 KM ").unwrap().km(), 1.5);
        assert_eq!(WalkDistance::parse("750m").unwrap().km(), 0.75);
        assert_eq!(WalkDistance::parse("750 M").unwrap().km(), 0.75);
        assert_eq!(WalkDistance::parse("0").unwrap().km(), 0.0);
    }

    #[test]
    fn reject_bad_walk_distance() {
        assert!(WalkDistance::parse("").is_err());
        assert!(WalkDistance::parse("km").is_err());
        assert!(WalkDistance::parse("-1").is_err());
        assert!(WalkDistance::parse("1.5 mi").is_err());
        assert!(WalkDistance::parse("abc").is_err());
        assert!(WalkDistance::parse("NaN").is_err());
        assert!(WalkDistance::parse("inf").is_err());
    }

    #[test]
    fn parse_metric() {
        assert_eq!("time".parse::<CostMetric>().unwrap(), CostMetric::Time);
        assert_eq!("FARE".parse::<CostMetric>().unwrap(), CostMetric::Fare);
        assert_eq!(
            " distance ".parse::<CostMetric>().unwrap(),
            CostMetric::Distance
        );
        assert!(matches!(
            "speed".parse::<CostMetric>(),
            Err(ConfigError::UnknownMetric(_))
        ));
    }

    #[test]
    fn from_surface_uses_defaults() {
        let config = SearchConfig::from_surface(None, None, None, None).unwrap();
        assert_eq!(config, SearchConfig::default());
    }

    #[test]
    fn from_surface_overrides() {
        let modes = vec!["Jeepney".to_string(), "train".to_string()];
        let config =
            SearchConfig::from_surface(Some("800m"), Some(2), Some("fare"), Some(&modes)).unwrap();

        assert_eq!(config.max_walk_km, 0.8);
        assert_eq!(config.max_transfers, 2);
        assert_eq!(config.cost_metric, CostMetric::Fare);
        assert_eq!(config.active_modes.tokens(), ["jeepney", "train"]);
    }

    #[test]
    fn from_surface_rejects_bad_values() {
        assert!(SearchConfig::from_surface(Some("far"), None, None, None).is_err());
        assert!(SearchConfig::from_surface(None, None, Some("cheapest"), None).is_err());
    }

    #[test]
    fn transfers_above_ceiling_clamp() {
        let mut config = SearchConfig::default();
        config.max_transfers = 7;
        assert_eq!(config.effective_transfers(), 2);
        config.max_transfers = 0;
        assert_eq!(config.effective_transfers(), 0);
    }
}
