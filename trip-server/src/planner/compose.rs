//! Itinerary composition.
//!
//! Turns the winning [`Candidate`] into an [`Itinerary`]: instruction steps,
//! fare and distance totals, and one drawing primitive per leg. Legs alternate
//! walk, ride, walk, ... and always start and end with a walk.
//!
//! Geometry for each leg is the segment's stored path if it has one, then the
//! geometry provider, then a straight line. A provider failure only costs the
//! leg its street-following shape.

use tracing::warn;

use crate::domain::{
    Coord, DRIVE_COLOR, Endpoint, Fare, GeometrySource, Itinerary, LegDrawing, LegStyle, Segment, Step,
    StepKind, TripKind, TripTime, WALK_COLOR,
};
use crate::geo::{GeometryProvider, Profile};

use super::search::Candidate;

/// Compose the display itinerary for a candidate.
///
/// `origin` and `destination` are the resolved trip endpoints, named as the
/// user entered them.
pub async fn compose<G: GeometryProvider>(
    candidate: &Candidate,
    origin: &Endpoint,
    destination: &Endpoint,
    geometry: &G,
) -> Itinerary {
    let segments = &candidate.segments;

    Itinerary {
        kind: candidate.kind,
        title: title(candidate.kind, &destination.name),
        label: label(candidate.kind, segments),
        origin: origin.clone(),
        destination: destination.clone(),
        steps: steps(candidate, origin),
        fare: Fare::from_regular(candidate.ride_fare()),
        distance_km: candidate.walk_km() + candidate.ride_distance_km(),
        time: TripTime {
            display_mins: candidate.score - candidate.walk_penalty(),
            ride_mins: candidate.ride_time_mins(),
        },
        legs: legs(candidate, origin, destination, geometry).await,
    }
}

/// Road route straight from `origin` to `destination`, for when no transit
/// trip fits. Falls back to a straight line like any other leg.
pub async fn direct_drive<G: GeometryProvider>(
    origin: &Endpoint,
    destination: &Endpoint,
    geometry: &G,
) -> LegDrawing {
    let (path, source) =
        fetch_path(0, origin.coord, destination.coord, Profile::Driving, geometry).await;
    LegDrawing {
        style: LegStyle::Drive,
        path,
        source,
        color: DRIVE_COLOR,
        icon: None,
        mode: None,
    }
}

/// "Trip to Quiapo (1 Transfer)": the destination up to its first comma.
fn title(kind: TripKind, destination: &str) -> String {
    let place = destination.split(',').next().unwrap_or(destination).trim();
    match kind.transfers() {
        0 => format!("Trip to {place}"),
        1 => format!("Trip to {place} (1 Transfer)"),
        n => format!("Trip to {place} ({n} Transfers)"),
    }
}

fn label(kind: TripKind, segments: &[Segment]) -> String {
    match (kind, segments.first()) {
        (TripKind::Direct, Some(only)) => format!("{} + Walking", only.mode),
        _ => "Multi-Leg Trip".to_string(),
    }
}

fn steps(candidate: &Candidate, origin: &Endpoint) -> Vec<Step> {
    let segments = &candidate.segments;
    // A candidate built by hand may carry fewer walk legs than rides need
    let walk = |i: usize| candidate.walks_km.get(i).copied().unwrap_or(0.0);
    let mut steps = Vec::new();

    if let Some(first) = segments.first() {
        steps.push(Step::new(
            StepKind::Walk,
            format!("Walk {:.1} km to {}", walk(0), first.start.name),
            Some(origin.coord),
        ));
    }

    for (i, segment) in segments.iter().enumerate() {
        steps.push(Step::new(
            StepKind::Ride,
            format!("Ride {} towards {}", segment.mode, segment.end.name),
            Some(segment.start.coord),
        ));
        steps.extend(
            segment
                .steps
                .iter()
                .map(|s| Step::new(StepKind::Stop, s.text.clone(), s.coord)),
        );

        let after = walk(i + 1);
        let instruction = match segments.get(i + 1) {
            Some(next) => format!(
                "Alight at {} and walk {after:.1} km to {}",
                segment.end.name, next.start.name
            ),
            None => format!(
                "Alight at {} and walk {after:.1} km to destination",
                segment.end.name
            ),
        };
        steps.push(Step::new(
            StepKind::Walk,
            instruction,
            Some(segment.end.coord),
        ));
    }

    steps
}

async fn legs<G: GeometryProvider>(
    candidate: &Candidate,
    origin: &Endpoint,
    destination: &Endpoint,
    geometry: &G,
) -> Vec<LegDrawing> {
    let segments = &candidate.segments;
    let mut legs = Vec::with_capacity(segments.len() * 2 + 1);

    let mut walk_from = origin.coord;
    for segment in segments {
        let index = legs.len();
        legs.push(walk_leg(index, walk_from, segment.start.coord, geometry).await);

        let index = legs.len();
        legs.push(ride_leg(index, segment, geometry).await);

        walk_from = segment.end.coord;
    }
    let index = legs.len();
    legs.push(walk_leg(index, walk_from, destination.coord, geometry).await);

    legs
}

async fn walk_leg<G: GeometryProvider>(
    index: usize,
    from: Coord,
    to: Coord,
    geometry: &G,
) -> LegDrawing {
    let (path, source) = fetch_path(index, from, to, Profile::Walking, geometry).await;
    LegDrawing {
        style: LegStyle::Walk,
        path,
        source,
        color: WALK_COLOR,
        icon: None,
        mode: None,
    }
}

async fn ride_leg<G: GeometryProvider>(index: usize, segment: &Segment, geometry: &G) -> LegDrawing {
    let (path, source) = match &segment.path {
        Some(path) => (path.clone(), GeometrySource::Stored),
        None => {
            fetch_path(
                index,
                segment.start.coord,
                segment.end.coord,
                Profile::Driving,
                geometry,
            )
            .await
        }
    };

    let kind = segment.mode.kind();
    LegDrawing {
        style: LegStyle::Ride,
        path,
        source,
        color: kind.color_hint(),
        icon: Some(kind.icon_hint()),
        mode: Some(segment.mode.name().to_string()),
    }
}

/// Provider geometry, or a straight line when the provider fails.
async fn fetch_path<G: GeometryProvider>(
    index: usize,
    from: Coord,
    to: Coord,
    profile: Profile,
    geometry: &G,
) -> (Vec<Coord>, GeometrySource) {
    match geometry.route(from, to, profile).await {
        Ok(path) => (path, GeometrySource::Provider),
        Err(e) => {
            warn!(leg = index, profile = profile.as_str(), error = %e, "geometry unavailable, drawing straight line");
            (vec![from, to], GeometrySource::StraightLine)
        }
    }
}
