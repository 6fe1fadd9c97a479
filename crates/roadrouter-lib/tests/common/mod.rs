//! Common test networks and routers.
//!
//! Every integration test builds its networks through these helpers so the
//! fixtures stay consistent across test files.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roadrouter_lib::{
    AStarEuclideanRouter, AStarLandmarksRouter, Coord, DijkstraRouter, EuclideanHeuristic,
    FreeSpeedTravelTime, LandmarkHeuristic, LinkAttributes, Network, NodeId,
    OnlyTimeDependentDisutility, Preprocess, PreprocessEuclidean, PreprocessLandmarks,
    TravelDisutility, TravelTime,
};

/// Six nodes in a row, all at the origin, joined by 1000 m car links at 10 m/s.
pub fn line_network() -> Arc<Network> {
    let mut builder = Network::builder();
    for i in 1..=6 {
        builder
            .add_node(format!("N{i}"), Coord::new(0.0, 0.0))
            .expect("unique node");
    }
    for i in 1..=5 {
        builder
            .add_link_between(
                format!("L{}{}", i, i + 1),
                &format!("N{i}"),
                &format!("N{}", i + 1),
                LinkAttributes::new(1000.0, 10.0).with_modes(["car"]),
            )
            .expect("valid link");
    }
    Arc::new(builder.build())
}

/// Two one-way chains `A1 -> A2 -> A3` and `B1 -> B2 -> B3` with no link
/// between them.
#[allow(dead_code)]
pub fn disconnected_network() -> Arc<Network> {
    let mut builder = Network::builder();
    for (chain, y) in [("A", 0.0), ("B", 500.0)] {
        for i in 1..=3 {
            builder
                .add_node(format!("{chain}{i}"), Coord::new(f64::from(i) * 100.0, y))
                .expect("unique node");
        }
        for i in 1..3 {
            builder
                .add_link_between(
                    format!("{chain}{i}{}", i + 1),
                    &format!("{chain}{i}"),
                    &format!("{chain}{}", i + 1),
                    LinkAttributes::new(100.0, 10.0),
                )
                .expect("valid link");
        }
    }
    Arc::new(builder.build())
}

/// East-west corridor `C0..C4` (100 m apart, both directions) with a dead-end
/// spur `Ci -> Bi -> Ui` going north from each of `C0..C3`. All links are
/// 100 m at 10 m/s. Corridor nodes are added first so they have the lowest ids.
#[allow(dead_code)]
pub fn corridor_network() -> Arc<Network> {
    let attributes = || LinkAttributes::new(100.0, 10.0);
    let mut builder = Network::builder();
    for i in 0..5 {
        builder
            .add_node(format!("C{i}"), Coord::new(f64::from(i) * 100.0, 0.0))
            .expect("unique node");
    }
    for i in 0..4 {
        let x = f64::from(i) * 100.0;
        builder
            .add_node(format!("B{i}"), Coord::new(x, 100.0))
            .expect("unique node");
        builder
            .add_node(format!("U{i}"), Coord::new(x, 200.0))
            .expect("unique node");
    }
    for i in 0..4 {
        let (here, next) = (format!("C{i}"), format!("C{}", i + 1));
        builder
            .add_link_between(format!("{here}{next}"), &here, &next, attributes())
            .expect("valid link");
        builder
            .add_link_between(format!("{next}{here}"), &next, &here, attributes())
            .expect("valid link");
        builder
            .add_link_between(format!("{here}B{i}"), &here, &format!("B{i}"), attributes())
            .expect("valid link");
        builder
            .add_link_between(
                format!("B{i}U{i}"),
                &format!("B{i}"),
                &format!("U{i}"),
                attributes(),
            )
            .expect("valid link");
    }
    Arc::new(builder.build())
}

/// Random directed network whose link lengths are never shorter than the
/// straight line between their nodes.
#[allow(dead_code)]
pub fn random_network(seed: u64, nodes: usize, out_degree: usize) -> Arc<Network> {
    let mut rng = StdRng::seed_from_u64(seed);
    let coords: Vec<Coord> = (0..nodes)
        .map(|_| Coord::new(rng.random_range(0.0..5000.0), rng.random_range(0.0..5000.0)))
        .collect();

    let mut builder = Network::builder();
    let ids: Vec<NodeId> = coords
        .iter()
        .enumerate()
        .map(|(i, &coord)| builder.add_node(format!("n{i}"), coord).expect("unique node"))
        .collect();

    let mut link = 0;
    for (tail, &from) in ids.iter().enumerate() {
        for _ in 0..out_degree {
            let head = rng.random_range(0..nodes);
            if head == tail {
                continue;
            }
            let straight = coords[tail].distance_to(&coords[head]);
            let length = straight * rng.random_range(1.0..1.6) + 1.0;
            let speed = rng.random_range(5.0..30.0);
            builder
                .add_link(
                    format!("l{link}"),
                    from,
                    ids[head],
                    LinkAttributes::new(length, speed),
                )
                .expect("valid link");
            link += 1;
        }
    }
    Arc::new(builder.build())
}

pub fn travel_time() -> Arc<dyn TravelTime> {
    Arc::new(FreeSpeedTravelTime)
}

pub fn time_only_disutility() -> Arc<dyn TravelDisutility> {
    Arc::new(OnlyTimeDependentDisutility::new(travel_time()))
}

pub fn dijkstra(network: &Arc<Network>) -> DijkstraRouter {
    DijkstraRouter::dijkstra(network.clone(), travel_time(), time_only_disutility())
}

#[allow(dead_code)]
pub fn euclidean(network: &Arc<Network>) -> AStarEuclideanRouter {
    let data = PreprocessEuclidean.run(network).expect("euclidean preprocessing");
    AStarEuclideanRouter::with_heuristic(
        network.clone(),
        travel_time(),
        time_only_disutility(),
        EuclideanHeuristic::new(Arc::new(data)),
    )
    .expect("fresh data")
}

#[allow(dead_code)]
pub fn landmarks(network: &Arc<Network>, count: usize) -> AStarLandmarksRouter {
    let data = PreprocessLandmarks::new(time_only_disutility())
        .with_landmark_count(count)
        .run(network)
        .expect("landmark preprocessing");
    AStarLandmarksRouter::with_heuristic(
        network.clone(),
        travel_time(),
        time_only_disutility(),
        LandmarkHeuristic::new(Arc::new(data)),
    )
    .expect("fresh data")
}

/// Bellman-Ford over free-flow travel times.
#[allow(dead_code)]
pub fn brute_force_cost(network: &Network, from: NodeId, to: NodeId) -> Option<f64> {
    let mut distances = vec![f64::INFINITY; network.node_count()];
    distances[from.index()] = 0.0;
    for _ in 0..network.node_count() {
        let mut changed = false;
        for link in network.links() {
            let candidate = distances[link.from.index()] + link.free_flow_travel_time();
            if candidate < distances[link.to.index()] {
                distances[link.to.index()] = candidate;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    let cost = distances[to.index()];
    cost.is_finite().then_some(cost)
}

/// Relative float comparison for path costs.
#[allow(dead_code)]
pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}
