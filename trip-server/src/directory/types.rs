//! Directory API response DTOs.
//!
//! These types map directly to the directory JSON. Contributed data is
//! loosely typed: ids may be numbers or strings, numeric values may arrive
//! as strings with a unit suffix, and fields may be missing. Everything is
//! accepted here and validated in [`super::convert`].

use serde::Deserialize;

/// An id sent as either a number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    Number(i64),
    Text(String),
}

impl LooseId {
    pub fn to_id_string(&self) -> String {
        match self {
            LooseId::Number(n) => n.to_string(),
            LooseId::Text(s) => s.trim().to_string(),
        }
    }
}

/// A number sent as either a JSON number or a string such as `"35 min"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    /// The numeric value. Strings contribute their leading token only, so
    /// `"8.5 km"` is 8.5. Non-finite values are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_server::directory::LooseNumber;
    ///
    /// assert_eq!(LooseNumber::Text("35 min".into()).value(), Some(35.0));
    /// assert_eq!(LooseNumber::Number(12.5).value(), Some(12.5));
    /// assert_eq!(LooseNumber::Text("about 5".into()).value(), None);
    /// ```
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            LooseNumber::Number(n) => *n,
            LooseNumber::Text(s) => s.split_whitespace().next()?.parse().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl std::fmt::Display for LooseNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LooseNumber::Number(n) => write!(f, "{n}"),
            LooseNumber::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// A terminal's city: a name, a numeric reference, or an object with a name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseCity {
    Name(String),
    Id(i64),
    Object { name: String },
}

impl LooseCity {
    pub fn name(&self) -> String {
        match self {
            LooseCity::Name(name) | LooseCity::Object { name } => name.clone(),
            LooseCity::Id(id) => id.to_string(),
        }
    }
}

/// A terminal with its outbound routes.
#[derive(Debug, Clone, Deserialize)]
pub struct TerminalDto {
    pub id: LooseId,
    pub name: String,
    #[serde(default)]
    pub latitude: Option<LooseNumber>,
    #[serde(default)]
    pub longitude: Option<LooseNumber>,
    #[serde(default)]
    pub city: Option<LooseCity>,
    #[serde(default)]
    pub routes: Vec<RouteDto>,
}

/// A route from its terminal through an ordered list of stops.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteDto {
    pub id: LooseId,
    #[serde(default)]
    pub name: Option<String>,
    /// Free-text mode name ("Jeepney", "Bus", "LRT-1", ...).
    #[serde(alias = "type")]
    pub mode: String,
    /// Path as `[lat, lng]` pairs.
    #[serde(default)]
    pub geometry: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub stops: Vec<StopDto>,
}

/// A stop with cumulative cost from the route's terminal.
#[derive(Debug, Clone, Deserialize)]
pub struct StopDto {
    pub id: LooseId,
    pub name: String,
    #[serde(default)]
    pub latitude: Option<LooseNumber>,
    #[serde(default)]
    pub longitude: Option<LooseNumber>,
    #[serde(default)]
    pub fare: Option<LooseNumber>,
    #[serde(default)]
    pub time: Option<LooseNumber>,
    #[serde(default)]
    pub distance: Option<LooseNumber>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_ids() {
        let ids: Vec<LooseId> = serde_json::from_str(r#"[7, "r-12", " 3 "]"#).unwrap();
        let ids: Vec<String> = ids.iter().map(LooseId::to_id_string).collect();
        assert_eq!(ids, ["7", "r-12", "3"]);
    }

    #[test]
    fn loose_numbers() {
        let nums: Vec<LooseNumber> =
            serde_json::from_str(r#"[15, 12.5, "35 min", "8.5 km", "13", "", "n/a"]"#).unwrap();
        let values: Vec<Option<f64>> = nums.iter().map(LooseNumber::value).collect();
        assert_eq!(
            values,
            [
                Some(15.0),
                Some(12.5),
                Some(35.0),
                Some(8.5),
                Some(13.0),
                None,
                None
            ]
        );
    }

    #[test]
    fn non_finite_text_is_rejected() {
        assert_eq!(LooseNumber::Text("NaN".into()).value(), None);
        assert_eq!(LooseNumber::Text("inf km".into()).value(), None);
    }

    #[test]
    fn city_shapes() {
        let cities: Vec<LooseCity> =
            serde_json::from_str(r#"["Manila", 4, {"id": 2, "name": "Quezon City"}]"#).unwrap();
        let names: Vec<String> = cities.iter().map(LooseCity::name).collect();
        assert_eq!(names, ["Manila", "4", "Quezon City"]);
    }

    #[test]
    fn terminal_with_missing_optionals() {
        let json = r#"{
            "id": 1,
            "name": "Cubao",
            "latitude": "14.6191",
            "longitude": 121.0577,
            "routes": [{
                "id": "r1",
                "type": "Jeepney",
                "stops": [{"id": 1, "name": "Quiapo", "latitude": 14.598, "longitude": 120.984,
                           "fare": "15", "time": "35 min", "distance": "8.5 km"}]
            }]
        }"#;
        let terminal: TerminalDto = serde_json::from_str(json).unwrap();
        assert!(terminal.city.is_none());
        assert_eq!(terminal.routes[0].mode, "Jeepney");
        assert!(terminal.routes[0].geometry.is_none());
        assert_eq!(terminal.routes[0].stops[0].time.as_ref().unwrap().value(), Some(35.0));
    }
}
