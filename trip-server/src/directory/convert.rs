//! Conversion from directory DTOs to domain types.
//!
//! Bad records are skipped rather than failing the whole directory: a bad
//! stop takes its route with it, and a terminal with an unusable position
//! takes all of its routes. Every skip is logged with its reason.

use tracing::warn;

use crate::domain::{
    Coord, Cost, Directory, DomainError, Route, RouteId, Stop, StopId, Terminal, TerminalId,
    TransportMode,
};

use super::types::{LooseNumber, RouteDto, StopDto, TerminalDto};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A numeric field could not be read as a finite number
    #[error("invalid {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },

    /// The values parsed but break a domain rule
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A stop of the route was rejected
    #[error("stop {index}: {source}")]
    Stop {
        index: usize,
        #[source]
        source: Box<ConversionError>,
    },
}

/// Counts of what an ingestion kept and skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub terminals_kept: usize,
    pub terminals_skipped: usize,
    pub routes_kept: usize,
    pub routes_skipped: usize,
}

/// Convert a directory response into the domain model.
pub fn convert_directory(terminals: &[TerminalDto]) -> (Directory, IngestReport) {
    let mut report = IngestReport::default();
    let mut kept = Vec::with_capacity(terminals.len());

    for dto in terminals {
        match convert_terminal(dto, &mut report) {
            Ok(terminal) => {
                report.terminals_kept += 1;
                kept.push(terminal);
            }
            Err(e) => {
                warn!(
                    terminal = %dto.id.to_id_string(),
                    name = %dto.name,
                    routes = dto.routes.len(),
                    error = %e,
                    "skipping terminal"
                );
                report.terminals_skipped += 1;
                report.routes_skipped += dto.routes.len();
            }
        }
    }

    (Directory::new(kept), report)
}

/// Convert a terminal, skipping any routes that fail.
fn convert_terminal(
    dto: &TerminalDto,
    report: &mut IngestReport,
) -> Result<Terminal, ConversionError> {
    let coord = coord(dto.latitude.as_ref(), dto.longitude.as_ref())?;
    let id = TerminalId::new(dto.id.to_id_string());

    let mut routes = Vec::with_capacity(dto.routes.len());
    for route in &dto.routes {
        match convert_route(route) {
            Ok(route) => {
                report.routes_kept += 1;
                routes.push(route);
            }
            Err(e) => {
                warn!(
                    terminal = %id,
                    route = %route.id.to_id_string(),
                    error = %e,
                    "skipping route"
                );
                report.routes_skipped += 1;
            }
        }
    }

    Ok(Terminal {
        id,
        name: dto.name.trim().to_string(),
        coord,
        city: dto.city.as_ref().map(|c| c.name()),
        routes,
    })
}

/// Convert a route. Any invalid stop fails the route.
pub fn convert_route(dto: &RouteDto) -> Result<Route, ConversionError> {
    if dto.mode.trim().is_empty() {
        return Err(ConversionError::MissingField("mode"));
    }

    let stops = dto
        .stops
        .iter()
        .enumerate()
        .map(|(index, stop)| {
            convert_stop(stop).map_err(|e| ConversionError::Stop {
                index,
                source: Box::new(e),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let path = dto
        .geometry
        .as_ref()
        .map(|points| {
            points
                .iter()
                .map(|&[lat, lng]| Coord::new(lat, lng).map_err(DomainError::from))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    let name = dto
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(Route::new(
        RouteId::new(dto.id.to_id_string()),
        name,
        TransportMode::new(&dto.mode),
        stops,
        path,
    )?)
}

fn convert_stop(dto: &StopDto) -> Result<Stop, ConversionError> {
    let coord = coord(dto.latitude.as_ref(), dto.longitude.as_ref())?;
    let cost = Cost::new(
        number("fare", dto.fare.as_ref())?,
        number("time", dto.time.as_ref())?,
        number("distance", dto.distance.as_ref())?,
    )?;

    Ok(Stop::new(
        StopId::new(dto.id.to_id_string()),
        dto.name.trim(),
        coord,
        cost,
    ))
}

fn coord(
    lat: Option<&LooseNumber>,
    lng: Option<&LooseNumber>,
) -> Result<Coord, ConversionError> {
    let lat = number("latitude", lat)?;
    let lng = number("longitude", lng)?;
    Ok(Coord::new(lat, lng).map_err(DomainError::from)?)
}

fn number(field: &'static str, value: Option<&LooseNumber>) -> Result<f64, ConversionError> {
    let value = value.ok_or(ConversionError::MissingField(field))?;
    value.value().ok_or_else(|| ConversionError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
