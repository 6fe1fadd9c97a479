mod common;

use std::sync::Arc;

use common::{corridor_network, line_network, time_only_disutility, travel_time};
use roadrouter_lib::{
    AStarEuclideanRouter, AStarLandmarksRouter, Coord, Error, EuclideanHeuristic,
    LandmarkHeuristic, LeastCostPathCalculator, LinkAttributes, Network, Preprocess,
    PreprocessEuclidean, PreprocessLandmarks, RouteAlgorithm, RouterConfig,
};

/// Triangle whose shortcut `a -> c` is stored shorter than the distance
/// between its nodes.
fn network_with_short_link() -> Arc<Network> {
    let mut builder = Network::builder();
    let a = builder.add_node("a", Coord::new(0.0, 0.0)).unwrap();
    let b = builder.add_node("b", Coord::new(500.0, 500.0)).unwrap();
    let c = builder.add_node("c", Coord::new(1000.0, 0.0)).unwrap();
    builder
        .add_link("ab", a, b, LinkAttributes::new(800.0, 20.0))
        .unwrap();
    builder
        .add_link("bc", b, c, LinkAttributes::new(800.0, 20.0))
        .unwrap();
    builder
        .add_link("ac", a, c, LinkAttributes::new(600.0, 10.0))
        .unwrap();
    Arc::new(builder.build())
}

#[test]
fn short_link_produces_a_warning_and_routing_still_works() {
    let network = network_with_short_link();
    let data = PreprocessEuclidean.run(&network).expect("preprocessing succeeds");

    assert_eq!(data.warnings().len(), 1);
    let warning = &data.warnings()[0];
    assert_eq!(warning.link_name, "ac");
    assert_eq!(warning.length, 600.0);
    assert_eq!(warning.straight_line, 1000.0);
    assert_eq!(data.max_freespeed(), 20.0);

    let router = AStarEuclideanRouter::with_heuristic(
        network.clone(),
        travel_time(),
        time_only_disutility(),
        EuclideanHeuristic::new(Arc::new(data)),
    )
    .unwrap();
    let a = network.node_id("a").unwrap();
    let c = network.node_id("c").unwrap();
    let path = router
        .calc_least_cost_path(a, c, 0.0, None, None)
        .unwrap()
        .expect("route exists");
    assert_eq!(path.node_names(&network).first(), Some(&"a"));
    assert_eq!(path.node_names(&network).last(), Some(&"c"));
}

#[test]
fn euclidean_data_from_another_network_is_rejected() {
    let data = PreprocessEuclidean.run(&line_network()).unwrap();
    let error = AStarEuclideanRouter::with_heuristic(
        corridor_network(),
        travel_time(),
        time_only_disutility(),
        EuclideanHeuristic::new(Arc::new(data)),
    )
    .err()
    .expect("stale data is rejected");

    match error {
        Error::StalePreprocessData {
            expected_nodes,
            actual_nodes,
            ..
        } => {
            assert_eq!(expected_nodes, 6);
            assert_eq!(actual_nodes, 13);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn landmark_data_from_another_network_is_rejected() {
    let data = PreprocessLandmarks::new(time_only_disutility())
        .with_landmark_count(2)
        .run(&corridor_network())
        .unwrap();
    let result = AStarLandmarksRouter::with_heuristic(
        line_network(),
        travel_time(),
        time_only_disutility(),
        LandmarkHeuristic::new(Arc::new(data)),
    );
    assert!(matches!(result, Err(Error::StalePreprocessData { .. })));
}

#[test]
fn empty_network_cannot_be_preprocessed() {
    let empty = Network::default();
    assert!(matches!(
        PreprocessEuclidean.run(&empty),
        Err(Error::EmptyNetwork)
    ));
    assert!(matches!(
        PreprocessLandmarks::new(time_only_disutility()).run(&empty),
        Err(Error::EmptyNetwork)
    ));
}

#[test]
fn build_router_surfaces_preprocessing_errors() {
    let empty = Arc::new(Network::default());
    for algorithm in [RouteAlgorithm::AStarEuclidean, RouteAlgorithm::AStarLandmarks] {
        let result =
            RouterConfig::new(algorithm).build_router(empty.clone(), travel_time(), time_only_disutility());
        assert!(matches!(result, Err(Error::EmptyNetwork)), "{algorithm}");
    }
}

#[test]
fn landmark_bounds_never_exceed_true_costs() {
    let network = corridor_network();
    let data = PreprocessLandmarks::new(time_only_disutility())
        .with_landmark_count(3)
        .run(&network)
        .unwrap();
    let router = common::dijkstra(&network);

    for from in network.nodes() {
        for to in network.nodes() {
            let bound = data.lower_bound(from.id, to.id);
            assert!(bound >= 0.0);
            if let Some(path) = router
                .calc_least_cost_path(from.id, to.id, 0.0, None, None)
                .unwrap()
            {
                assert!(
                    bound <= path.travel_cost + 1e-9,
                    "{} -> {}: bound {bound} exceeds {}",
                    from.name,
                    to.name,
                    path.travel_cost
                );
            }
        }
    }
}

#[test]
fn preprocessed_data_is_shared_between_routers() {
    let network = corridor_network();
    let data = Arc::new(
        PreprocessLandmarks::new(time_only_disutility())
            .with_landmark_count(4)
            .run(&network)
            .unwrap(),
    );
    let exact = AStarLandmarksRouter::with_heuristic(
        network.clone(),
        travel_time(),
        time_only_disutility(),
        LandmarkHeuristic::new(data.clone()),
    )
    .unwrap();
    let greedy = AStarLandmarksRouter::with_heuristic(
        network.clone(),
        travel_time(),
        time_only_disutility(),
        LandmarkHeuristic::new(data.clone()),
    )
    .unwrap()
    .with_overdo_factor(3.0)
    .unwrap();

    let from = network.node_id("C0").unwrap();
    let to = network.node_id("C4").unwrap();
    let a = exact.calc_least_cost_path(from, to, 0.0, None, None).unwrap();
    let b = greedy.calc_least_cost_path(from, to, 0.0, None, None).unwrap();
    assert_eq!(a, b);
    assert_eq!(Arc::strong_count(&data), 3);
}
