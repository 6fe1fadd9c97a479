use serde::Serialize;

use crate::network::{LinkId, Network, NodeId};

/// Per-query search state of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Label {
    /// Accumulated disutility from the source.
    pub cost: f64,
    /// Arrival time at the node.
    pub time: f64,
    /// Link the best known route arrives by; `None` for the source.
    pub predecessor: Option<LinkId>,
    pub settled: bool,
}

impl Label {
    pub fn origin(start_time: f64) -> Self {
        Self {
            cost: 0.0,
            time: start_time,
            predecessor: None,
            settled: false,
        }
    }
}

/// Least-cost route between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    /// Nodes from source to target, both inclusive.
    pub nodes: Vec<NodeId>,
    /// Links in travel order. One fewer than `nodes`.
    pub links: Vec<LinkId>,
    /// Seconds between departure and arrival at the target.
    pub travel_time: f64,
    /// Accumulated disutility.
    pub travel_cost: f64,
}

impl Path {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// `true` when source and target coincide.
    pub fn is_trivial(&self) -> bool {
        self.links.is_empty()
    }

    /// External identifiers of the path's links.
    pub fn link_names<'a>(&self, network: &'a Network) -> Vec<&'a str> {
        self.links
            .iter()
            .map(|&link| network.link(link).name.as_str())
            .collect()
    }

    /// External identifiers of the path's nodes.
    pub fn node_names<'a>(&self, network: &'a Network) -> Vec<&'a str> {
        self.nodes
            .iter()
            .map(|&node| network.node(node).name.as_str())
            .collect()
    }
}

/// Follow predecessor links back from `target` and assemble the forward path.
///
/// `labels` must hold a label for `target` and every node on its predecessor
/// chain, as left behind by a search that settled `target`.
pub fn build_path(
    network: &Network,
    labels: &[Option<Label>],
    target: NodeId,
    start_time: f64,
) -> Option<Path> {
    let arrival = labels.get(target.index()).copied().flatten()?;

    let mut nodes = vec![target];
    let mut links = Vec::new();
    let mut current = arrival;
    while let Some(link_id) = current.predecessor {
        // A chain longer than the node count would mean a cycle.
        if links.len() >= network.node_count() {
            return None;
        }
        let tail = network.link(link_id).from;
        links.push(link_id);
        nodes.push(tail);
        current = labels.get(tail.index()).copied().flatten()?;
    }
    nodes.reverse();
    links.reverse();

    Some(Path {
        nodes,
        links,
        travel_time: arrival.time - start_time,
        travel_cost: arrival.cost,
    })
}
