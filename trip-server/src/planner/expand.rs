//! Expansion of directory routes into directed ride segments.
//!
//! Every route admitted by the mode filter yields exactly two segments:
//! forward (terminal to destination stop) with one display step per stop,
//! and return (destination stop to terminal) with generic boarding steps.
//! The network carries no stop-level detail for the return direction, so
//! the return steps stay coarse.

use crate::domain::{
    Directory, Direction, DisplayStep, Endpoint, ModeFilter, Route, Segment, SegmentKey, Terminal,
};

/// Expand the directory into segments, in directory order: terminals, then
/// routes within a terminal, then forward before return.
pub fn expand(directory: &Directory, active_modes: &ModeFilter) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(directory.route_count() * 2);

    for terminal in directory.terminals() {
        for route in &terminal.routes {
            if !active_modes.matches(route.mode()) {
                continue;
            }
            segments.push(forward_segment(terminal, route));
            segments.push(return_segment(terminal, route));
        }
    }

    segments
}

fn terminal_endpoint(terminal: &Terminal) -> Endpoint {
    Endpoint {
        name: terminal.name.clone(),
        coord: terminal.coord,
    }
}

fn destination_endpoint(route: &Route) -> Endpoint {
    let dest = route.destination();
    Endpoint {
        name: dest.name.clone(),
        coord: dest.coord,
    }
}

fn forward_segment(terminal: &Terminal, route: &Route) -> Segment {
    let cost = route.destination().cost;

    let steps = route
        .stops()
        .iter()
        .map(|stop| DisplayStep {
            text: stop.name.clone(),
            coord: Some(stop.coord),
        })
        .collect();

    Segment {
        key: SegmentKey {
            terminal: terminal.id.clone(),
            route: route.id().clone(),
            direction: Direction::Forward,
        },
        route_name: route.name().map(str::to_string),
        mode: route.mode().clone(),
        start: terminal_endpoint(terminal),
        end: destination_endpoint(route),
        fare: cost.fare,
        time_mins: cost.time_mins,
        distance_km: cost.distance_km,
        steps,
        path: route.path().map(<[_]>::to_vec),
    }
}

fn return_segment(terminal: &Terminal, route: &Route) -> Segment {
    let cost = route.destination().cost;
    let start = destination_endpoint(route);
    let end = terminal_endpoint(terminal);

    let steps = vec![
        DisplayStep {
            text: format!("Board at {}", start.name),
            coord: Some(start.coord),
        },
        DisplayStep {
            text: format!("Travel to {}", end.name),
            coord: Some(end.coord),
        },
    ];

    let path = route.path().map(|p| p.iter().rev().copied().collect());

    Segment {
        key: SegmentKey {
            terminal: terminal.id.clone(),
            route: route.id().clone(),
            direction: Direction::Return,
        },
        route_name: route.name().map(str::to_string),
        mode: route.mode().clone(),
        start,
        end,
        fare: cost.fare,
        time_mins: cost.time_mins,
        distance_km: cost.distance_km,
        steps,
        path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coord, Cost, RouteId, Stop, StopId, TerminalId, TransportMode};

    fn coord(lat: f64, lng: f64) -> Coord {
        Coord::new(lat, lng).unwrap()
    }

    fn route(id: &str, mode: &str, stops: &[(&str, f64, f64, f64)]) -> Route {
        let stops = stops
            .iter()
            .enumerate()
            .map(|(i, (name, fare, time, dist))| {
                Stop::new(
                    StopId::new(format!("{id}-{i}")),
                    *name,
                    coord(14.6 + i as f64 * 0.01, 121.0),
                    Cost::new(*fare, *time, *dist).unwrap(),
                )
            })
            .collect();
        Route::new(
            RouteId::new(id),
            None,
            TransportMode::new(mode),
            stops,
            Some(vec![coord(14.5, 121.0), coord(14.55, 121.0), coord(14.62, 121.0)]),
        )
        .unwrap()
    }

    fn directory() -> Directory {
        Directory::new(vec![
            Terminal {
                id: TerminalId::new("t1"),
                name: "Cubao".into(),
                coord: coord(14.5, 121.0),
                city: Some("Quezon City".into()),
                routes: vec![
                    route(
                        "r1",
                        "Jeepney",
                        &[("Aurora", 8.0, 10.0, 2.0), ("Quiapo", 15.0, 35.0, 8.5)],
                    ),
                    route("r2", "Bus", &[("Ayala", 25.0, 45.0, 12.3)]),
                ],
            },
            Terminal {
                id: TerminalId::new("t2"),
                name: "Santolan".into(),
                coord: coord(14.61, 121.08),
                city: None,
                routes: vec![route("r3", "LRT", &[("Recto", 25.0, 30.0, 13.8)])],
            },
        ])
    }

    #[test]
    fn two_segments_per_route() {
        let segments = expand(&directory(), &ModeFilter::all());
        assert_eq!(segments.len(), 6);
    }

    #[test]
    fn forward_and_return_are_swapped_with_equal_costs() {
        let segments = expand(&directory(), &ModeFilter::all());

        for pair in segments.chunks(2) {
            let (fwd, ret) = (&pair[0], &pair[1]);
            assert_eq!(fwd.direction(), Direction::Forward);
            assert_eq!(ret.direction(), Direction::Return);
            assert_eq!(fwd.start, ret.end);
            assert_eq!(fwd.end, ret.start);
            assert_eq!(fwd.fare, ret.fare);
            assert_eq!(fwd.time_mins, ret.time_mins);
            assert_eq!(fwd.distance_km, ret.distance_km);
        }
    }

    #[test]
    fn costs_come_from_destination_stop() {
        let segments = expand(&directory(), &ModeFilter::all());
        let fwd = &segments[0];
        assert_eq!(fwd.fare, 15.0);
        assert_eq!(fwd.time_mins, 35.0);
        assert_eq!(fwd.distance_km, 8.5);
        assert_eq!(fwd.start.name, "Cubao");
        assert_eq!(fwd.end.name, "Quiapo");
    }

    #[test]
    fn forward_steps_per_stop_return_steps_generic() {
        let segments = expand(&directory(), &ModeFilter::all());
        let (fwd, ret) = (&segments[0], &segments[1]);

        let texts: Vec<&str> = fwd.steps.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["Aurora", "Quiapo"]);

        let texts: Vec<&str> = ret.steps.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["Board at Quiapo", "Travel to Cubao"]);
    }

    #[test]
    fn return_path_is_reversed() {
        let segments = expand(&directory(), &ModeFilter::all());
        let fwd = segments[0].path.as_ref().unwrap();
        let ret = segments[1].path.as_ref().unwrap();
        assert_eq!(fwd.first(), ret.last());
        assert_eq!(fwd.last(), ret.first());
    }

    #[test]
    fn order_is_terminal_route_direction() {
        let segments = expand(&directory(), &ModeFilter::all());
        let keys: Vec<String> = segments.iter().map(|s| s.key.to_string()).collect();
        assert_eq!(
            keys,
            [
                "t1/r1/fwd",
                "t1/r1/ret",
                "t1/r2/fwd",
                "t1/r2/ret",
                "t2/r3/fwd",
                "t2/r3/ret"
            ]
        );
    }

    #[test]
    fn mode_filter_excludes_routes() {
        let filter = ModeFilter::new(["jeepney", "train"]);
        let segments = expand(&directory(), &filter);

        // "LRT" is a train by kind, but its name contains neither token
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.mode.name() == "Jeepney"));

        let segments = expand(&directory(), &ModeFilter::new(["lrt"]));
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.mode.name() == "LRT"));
    }

    #[test]
    fn unrestricted_filter_keeps_every_route() {
        assert_eq!(expand(&directory(), &ModeFilter::all()).len(), 6);
    }

    #[test]
    fn empty_directory_yields_nothing() {
        assert!(expand(&Directory::default(), &ModeFilter::all()).is_empty());
    }
}
