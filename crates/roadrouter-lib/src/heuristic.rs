//! Remaining-cost estimates that steer the least-cost path search.
//!
//! The search is identical for every variant; only the [`Heuristic`] differs:
//!
//! - [`ZeroHeuristic`] turns the search into plain Dijkstra.
//! - [`EuclideanHeuristic`] divides the straight-line distance by the fastest
//!   free-flow speed in the network.
//! - [`LandmarkHeuristic`] applies the triangle inequality to precomputed
//!   landmark distances.
//!
//! Estimates must never exceed the true remaining cost for the search to
//! return least-cost paths.

use std::sync::Arc;

use crate::config::RouteAlgorithm;
use crate::error::Result;
use crate::network::{Network, NodeId};
use crate::preprocess::{EuclideanData, LandmarkData};

/// Lower-bound estimate of the cost from a node to the query target.
pub trait Heuristic: Send + Sync {
    /// Algorithm name this heuristic corresponds to.
    fn algorithm(&self) -> RouteAlgorithm;

    fn estimate(&self, network: &Network, node: NodeId, target: NodeId) -> f64;

    /// Check that the heuristic's data belongs to `network`.
    fn validate(&self, _network: &Network) -> Result<()> {
        Ok(())
    }
}

/// Estimates zero everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::Dijkstra
    }

    fn estimate(&self, _network: &Network, _node: NodeId, _target: NodeId) -> f64 {
        0.0
    }
}

/// Straight-line distance over the network's maximum free speed.
///
/// Admissible as long as every link is at least as long as the straight line
/// between its nodes and link disutility is at least the free-flow travel time.
#[derive(Debug, Clone)]
pub struct EuclideanHeuristic {
    data: Arc<EuclideanData>,
}

impl EuclideanHeuristic {
    pub fn new(data: Arc<EuclideanData>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &EuclideanData {
        &self.data
    }
}

impl Heuristic for EuclideanHeuristic {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::AStarEuclidean
    }

    fn estimate(&self, network: &Network, node: NodeId, target: NodeId) -> f64 {
        let distance = network
            .node(node)
            .coord
            .distance_to(&network.node(target).coord);
        distance / self.data.max_freespeed()
    }

    fn validate(&self, network: &Network) -> Result<()> {
        self.data.shape().check(network)
    }
}

/// Triangle-inequality bound from landmark distances.
#[derive(Debug, Clone)]
pub struct LandmarkHeuristic {
    data: Arc<LandmarkData>,
}

impl LandmarkHeuristic {
    pub fn new(data: Arc<LandmarkData>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &LandmarkData {
        &self.data
    }
}

impl Heuristic for LandmarkHeuristic {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::AStarLandmarks
    }

    fn estimate(&self, _network: &Network, node: NodeId, target: NodeId) -> f64 {
        self.data.lower_bound(node, target)
    }

    fn validate(&self, network: &Network) -> Result<()> {
        self.data.shape().check(network)
    }
}
