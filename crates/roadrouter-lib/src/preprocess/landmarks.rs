use std::f64::consts::PI;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cost::TravelDisutility;
use crate::error::{Error, Result};
use crate::network::{Coord, Network, NodeId};
use crate::queue::PendingQueue;

use super::{ensure_not_empty, NetworkShape, Preprocess};

/// Number of landmarks selected when the caller does not choose one.
pub const DEFAULT_LANDMARK_COUNT: usize = 16;

/// Result of [`PreprocessLandmarks`].
///
/// For every landmark `L` it stores `d(L, n)` and `d(n, L)` for every node
/// `n`, measured with minimum link disutilities. Unreachable entries are
/// `f64::INFINITY`.
#[derive(Debug, Clone)]
pub struct LandmarkData {
    shape: NetworkShape,
    landmarks: Vec<NodeId>,
    from_landmark: Vec<Vec<f64>>,
    to_landmark: Vec<Vec<f64>>,
}

impl LandmarkData {
    pub fn shape(&self) -> NetworkShape {
        self.shape
    }

    pub fn landmarks(&self) -> &[NodeId] {
        &self.landmarks
    }

    /// Distance from landmark number `landmark` to `node`.
    pub fn distance_from_landmark(&self, landmark: usize, node: NodeId) -> f64 {
        self.from_landmark[landmark][node.index()]
    }

    /// Distance from `node` to landmark number `landmark`.
    pub fn distance_to_landmark(&self, landmark: usize, node: NodeId) -> f64 {
        self.to_landmark[landmark][node.index()]
    }

    /// Largest lower bound on `d(node, target)` implied by the triangle
    /// inequality over all landmarks. Terms with unreachable operands are
    /// skipped.
    pub fn lower_bound(&self, node: NodeId, target: NodeId) -> f64 {
        let (node, target) = (node.index(), target.index());
        let mut best = 0.0_f64;
        for (from, to) in self.from_landmark.iter().zip(&self.to_landmark) {
            // d(L, t) <= d(L, n) + d(n, t)
            if from[target].is_finite() && from[node].is_finite() {
                best = best.max(from[target] - from[node]);
            }
            // d(n, L) <= d(n, t) + d(t, L)
            if to[node].is_finite() && to[target].is_finite() {
                best = best.max(to[node] - to[target]);
            }
        }
        best
    }
}

/// Selects landmarks and computes exact distances to and from each of them.
///
/// Landmarks are the nodes farthest from the centre of the bounding box in
/// equally sized angular sectors. If that yields fewer landmarks than
/// requested (clustered or collinear coordinates), the rest are chosen by
/// repeatedly taking the node farthest, in graph distance, from all
/// landmarks picked so far.
#[derive(Clone)]
pub struct PreprocessLandmarks {
    landmark_count: usize,
    disutility: Arc<dyn TravelDisutility>,
}

impl PreprocessLandmarks {
    pub fn new(disutility: Arc<dyn TravelDisutility>) -> Self {
        Self {
            landmark_count: DEFAULT_LANDMARK_COUNT,
            disutility,
        }
    }

    pub fn with_landmark_count(mut self, landmark_count: usize) -> Self {
        self.landmark_count = landmark_count;
        self
    }

    pub fn landmark_count(&self) -> usize {
        self.landmark_count
    }
}

impl Preprocess for PreprocessLandmarks {
    type Data = LandmarkData;

    fn run(&self, network: &Network) -> Result<LandmarkData> {
        ensure_not_empty(network)?;
        if self.landmark_count == 0 {
            return Err(Error::InvalidLandmarkCount);
        }

        let weights: Vec<f64> = network
            .links()
            .iter()
            .map(|link| self.disutility.link_minimum_travel_disutility(link).max(0.0))
            .collect();
        let wanted = self.landmark_count.min(network.node_count());

        let mut landmarks = pie_slice_landmarks(network, wanted);
        debug!(
            selected = landmarks.len(),
            wanted, "selected landmarks by sector"
        );
        fill_farthest_landmarks(network, &weights, &mut landmarks, wanted);

        let (from_landmark, to_landmark): (Vec<Vec<f64>>, Vec<Vec<f64>>) = landmarks
            .iter()
            .map(|&landmark| {
                (
                    one_to_all(network, &weights, &[landmark], Direction::Forward),
                    one_to_all(network, &weights, &[landmark], Direction::Backward),
                )
            })
            .unzip();

        info!(
            nodes = network.node_count(),
            links = network.link_count(),
            landmarks = landmarks.len(),
            "landmark preprocessing finished"
        );

        Ok(LandmarkData {
            shape: NetworkShape::of(network),
            landmarks,
            from_landmark,
            to_landmark,
        })
    }
}

fn pie_slice_landmarks(network: &Network, count: usize) -> Vec<NodeId> {
    let centre = bounding_box_centre(network);
    let mut best: Vec<Option<(NodeId, f64)>> = vec![None; count];

    for node in network.nodes() {
        let dx = node.coord.x - centre.x;
        let dy = node.coord.y - centre.y;
        let angle = dy.atan2(dx) + PI;
        let sector = ((angle / (2.0 * PI)) * count as f64) as usize;
        let sector = sector.min(count - 1);
        let distance = dx.hypot(dy);

        match best[sector] {
            Some((_, farthest)) if farthest >= distance => {}
            _ => best[sector] = Some((node.id, distance)),
        }
    }

    best.into_iter().flatten().map(|(node, _)| node).collect()
}

fn bounding_box_centre(network: &Network) -> Coord {
    let mut min = Coord::new(f64::INFINITY, f64::INFINITY);
    let mut max = Coord::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for node in network.nodes() {
        min.x = min.x.min(node.coord.x);
        min.y = min.y.min(node.coord.y);
        max.x = max.x.max(node.coord.x);
        max.y = max.y.max(node.coord.y);
    }
    Coord::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0)
}

fn fill_farthest_landmarks(
    network: &Network,
    weights: &[f64],
    landmarks: &mut Vec<NodeId>,
    wanted: usize,
) {
    while landmarks.len() < wanted {
        let distances = one_to_all(network, weights, landmarks, Direction::Both);
        let candidate = network
            .nodes()
            .iter()
            .map(|node| node.id)
            .filter(|node| !landmarks.contains(node))
            .max_by(|&a, &b| {
                distances[a.index()]
                    .total_cmp(&distances[b.index()])
                    // Prefer the smaller id among equally distant nodes.
                    .then_with(|| b.cmp(&a))
            });
        match candidate {
            Some(node) => landmarks.push(node),
            None => break,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
    Both,
}

/// Plain Dijkstra from `sources` over static link weights.
fn one_to_all(
    network: &Network,
    weights: &[f64],
    sources: &[NodeId],
    direction: Direction,
) -> Vec<f64> {
    let mut distances = vec![f64::INFINITY; network.node_count()];
    let mut settled = vec![false; network.node_count()];
    let mut pending = PendingQueue::new(network.node_count());

    for &source in sources {
        distances[source.index()] = 0.0;
        pending.insert(source, 0.0);
    }

    while let Some((node, distance)) = pending.pop_min() {
        settled[node.index()] = true;

        let forward = network.out_links(node).iter().map(|&id| {
            let link = network.link(id);
            (link.to, weights[id.index()])
        });
        let backward = network.in_links(node).iter().map(|&id| {
            let link = network.link(id);
            (link.from, weights[id.index()])
        });
        let neighbours: Vec<(NodeId, f64)> = match direction {
            Direction::Forward => forward.collect(),
            Direction::Backward => backward.collect(),
            Direction::Both => forward.chain(backward).collect(),
        };

        for (next, weight) in neighbours {
            if settled[next.index()] {
                continue;
            }
            let candidate = distance + weight;
            if candidate < distances[next.index()] {
                distances[next.index()] = candidate;
                pending.decrease_or_insert(next, candidate);
            }
        }
    }

    distances
}
