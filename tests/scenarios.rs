//! End-to-end assembly scenarios on a synthetic street and transit network.
//!
//! The main fixture is a straight street chain with four stops hanging off
//! it and, optionally, one transit trip running along it:
//!
//!   n0 --- n1 --- n2 --- n3 --- n4 --- n5      (120s per edge)
//!     S0      S1     S2       S3
//!
//! S0 sits on the origin's own edge and has no departures; the trip runs
//! S1 -> S2 -> S3.

use geo::Point;
use intermodal::{
    CancelToken, Connection, Error, IntermodalOptions, Route, Stop, StopId, StreetGraph,
    TransitData, TransitModel, try_calculate_intermodal,
};

const EDGE_WEIGHT: u32 = 120;
const DEPARTURE: u32 = 28800; // 08:00

fn stop(local: u32, lon: f64) -> Stop {
    Stop {
        id: StopId { tile: 1, local },
        name: format!("s{local}"),
        geometry: Point::new(lon, 0.01001),
    }
}

/// Trip 0 along the chain: S1 -> S2 -> S3.
fn line_connections() -> Vec<Connection> {
    vec![
        Connection {
            trip: 0,
            from_stop: 1,
            to_stop: 2,
            departure: 29000,
            arrival: 29050,
        },
        Connection {
            trip: 0,
            from_stop: 2,
            to_stop: 3,
            departure: 29060,
            arrival: 29100,
        },
    ]
}

/// Builds the fixture; `with_island` adds a street component disconnected
/// from everything, far enough that no stop tile covers it.
fn build_model(connections: Vec<Connection>, with_island: bool) -> TransitModel {
    let mut graph = StreetGraph::new();
    let nodes: Vec<_> = (0..6)
        .map(|i| graph.add_node(Point::new(0.001 + f64::from(i) * 0.002, 0.01)))
        .collect();
    for pair in nodes.windows(2) {
        graph.add_edge(pair[0], pair[1], EDGE_WEIGHT);
    }

    if with_island {
        let m0 = graph.add_node(Point::new(0.801, 0.01));
        let m1 = graph.add_node(Point::new(0.803, 0.01));
        graph.add_edge(m0, m1, EDGE_WEIGHT);
    }

    let stops = vec![
        stop(0, 0.0015), // on the origin's edge, never served
        stop(1, 0.0035),
        stop(2, 0.0055),
        stop(3, 0.0085),
    ];
    let data = TransitData::new(stops, connections).unwrap();
    TransitModel::new(graph, data)
}

fn options() -> IntermodalOptions {
    IntermodalOptions {
        departure: DEPARTURE,
        ..IntermodalOptions::default()
    }
}

fn origin() -> Point<f64> {
    Point::new(0.001, 0.01)
}

fn destination() -> Point<f64> {
    Point::new(0.011, 0.01)
}

fn calculate(model: &TransitModel) -> Result<Route, Error> {
    try_calculate_intermodal(
        model,
        origin(),
        destination(),
        &options(),
        &CancelToken::new(),
    )
}

#[test]
fn assembles_a_three_stop_route_in_chronological_order() {
    let model = build_model(line_connections(), false);
    let route = calculate(&model).expect("route must assemble");

    // The reverse-linked journey chain comes out forward
    let names: Vec<_> = route.stops.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["s1", "s2", "s3"]);

    let arrivals: Vec<_> = route.stops.iter().map(|s| s.arrival).collect();
    assert_eq!(arrivals, vec![28950, 29050, 29100]);
    assert!(arrivals.windows(2).all(|w| w[0] <= w[1]));

    // Shape runs door to door without gaps
    assert!(route.is_contiguous());
    let first = route.shape.first().unwrap();
    let last = route.shape.last().unwrap();
    assert!((first.x - 0.001).abs() < 1e-9 && (first.y - 0.01).abs() < 1e-9);
    assert!((last.x - 0.011).abs() < 1e-9 && (last.y - 0.01).abs() < 1e-9);
}

#[test]
fn boards_the_stop_the_scan_chose_not_the_first_discovered() {
    let model = build_model(line_connections(), false);
    let route = calculate(&model).unwrap();

    // S0 is the closest stop to the origin but has no departures; the
    // assembler must fetch the path to S1 instead.
    assert_eq!(route.stops[0].stop, StopId { tile: 1, local: 1 });
    assert!(route.stops.iter().all(|s| s.stop != StopId { tile: 1, local: 0 }));
}

#[test]
fn reachable_stops_without_connections_fail_as_no_journey() {
    // Both sides discover stops; the scan just finds nothing.
    let model = build_model(Vec::new(), false);
    let result = calculate(&model);
    assert!(matches!(result, Err(Error::NoJourneyFound)));
}

#[test]
fn isolated_origin_fails_as_no_source_stop() {
    // The origin's street component reaches no stop.
    let model = build_model(line_connections(), true);
    let result = try_calculate_intermodal(
        &model,
        Point::new(0.801, 0.01),
        destination(),
        &options(),
        &CancelToken::new(),
    );
    assert!(matches!(result, Err(Error::NoSourceStop)));
}

#[test]
fn isolated_destination_fails_as_no_target_stop() {
    let model = build_model(line_connections(), true);
    let result = try_calculate_intermodal(
        &model,
        origin(),
        Point::new(0.803, 0.01),
        &options(),
        &CancelToken::new(),
    );
    assert!(matches!(result, Err(Error::NoTargetStop)));
}

#[test]
fn unresolvable_endpoints_fail_resolution() {
    let model = build_model(line_connections(), false);
    let result = try_calculate_intermodal(
        &model,
        Point::new(5.0, 5.0),
        destination(),
        &options(),
        &CancelToken::new(),
    );
    assert!(matches!(result, Err(Error::ResolutionFailure)));
}

#[test]
fn identical_requests_produce_identical_routes() {
    let model = build_model(line_connections(), false);

    let first = calculate(&model).unwrap();
    let second = calculate(&model).unwrap();

    assert_eq!(first.shape, second.shape);
    assert_eq!(
        first.stops.iter().map(|s| (s.stop, s.arrival, s.shape_index)).collect::<Vec<_>>(),
        second.stops.iter().map(|s| (s.stop, s.arrival, s.shape_index)).collect::<Vec<_>>(),
    );
}

#[test]
fn cancelled_requests_surface_as_cancelled() {
    let model = build_model(line_connections(), false);
    let token = CancelToken::new();
    token.cancel();

    let result = try_calculate_intermodal(&model, origin(), destination(), &options(), &token);
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[test]
fn the_route_renders_as_geojson() {
    let model = build_model(line_connections(), false);
    let route = calculate(&model).unwrap();

    let rendered = route.to_geojson_string().unwrap();
    assert!(rendered.contains("FeatureCollection"));
    assert!(rendered.contains("\"s1\""));
}
