//! Road network model.
//!
//! Nodes and links are stored densely and addressed by [`NodeId`] and
//! [`LinkId`]; external identifiers are resolved through lookup tables.
//! Each node keeps its outgoing and incoming links.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Transport mode assigned to links when none is given explicitly.
pub const DEFAULT_MODE: &str = "car";

const DEFAULT_CAPACITY: f64 = 1800.0;

const MAX_SUGGESTIONS: usize = 3;

/// Minimum Jaro-Winkler similarity for an id to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Dense node index within a [`Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of the node in the network's node table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Dense link index within a [`Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(pub u32);

impl LinkId {
    /// Position of the link in the network's link table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Planar coordinate in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to `other`.
    pub fn distance_to(&self, other: &Coord) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Intersection or shape point of the road network.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub coord: Coord,
}

/// Directed road segment between two nodes.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: LinkId,
    pub name: String,
    pub from: NodeId,
    pub to: NodeId,
    /// Physical length in metres.
    pub length: f64,
    /// Free-flow speed in metres per second.
    pub freespeed: f64,
    /// Flow capacity in vehicles per hour. Not used by the router.
    pub capacity: f64,
    pub lanes: f64,
    pub allowed_modes: BTreeSet<String>,
}

impl Link {
    pub fn allows_mode(&self, mode: &str) -> bool {
        self.allowed_modes.contains(mode)
    }

    /// Seconds needed to traverse the link at free-flow speed.
    pub fn free_flow_travel_time(&self) -> f64 {
        self.length / self.freespeed
    }
}

/// Static attributes supplied when adding a link to a [`NetworkBuilder`].
#[derive(Debug, Clone)]
pub struct LinkAttributes {
    pub length: f64,
    pub freespeed: f64,
    pub capacity: f64,
    pub lanes: f64,
    pub allowed_modes: BTreeSet<String>,
}

impl LinkAttributes {
    /// Single-lane car link with the given length and free speed.
    pub fn new(length: f64, freespeed: f64) -> Self {
        Self {
            length,
            freespeed,
            capacity: DEFAULT_CAPACITY,
            lanes: 1.0,
            allowed_modes: BTreeSet::from([DEFAULT_MODE.to_string()]),
        }
    }

    pub fn with_modes<I, S>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_modes = modes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_lanes(mut self, lanes: f64) -> Self {
        self.lanes = lanes;
        self
    }
}

/// Immutable road network shared by every query.
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: Vec<Node>,
    links: Vec<Link>,
    out_links: Vec<Vec<LinkId>>,
    in_links: Vec<Vec<LinkId>>,
    node_index: HashMap<String, NodeId>,
    link_index: HashMap<String, LinkId>,
}

impl Network {
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::new()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Look up a node by index.
    ///
    /// Panics if `id` does not belong to this network; use
    /// [`Network::contains_node`] to validate foreign identifiers.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Look up a link by index. Panics on foreign identifiers.
    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.index()]
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn contains_link(&self, id: LinkId) -> bool {
        id.index() < self.links.len()
    }

    /// Links leaving `node`, in insertion order.
    pub fn out_links(&self, node: NodeId) -> &[LinkId] {
        self.out_links
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Links entering `node`, in insertion order.
    pub fn in_links(&self, node: NodeId) -> &[LinkId] {
        self.in_links
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolve an external node identifier.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.node_index.get(name).copied()
    }

    /// Resolve an external link identifier.
    pub fn link_id(&self, name: &str) -> Option<LinkId> {
        self.link_index.get(name).copied()
    }

    /// Like [`Network::node_id`] but reports unknown names as an error
    /// carrying similarly spelled node ids.
    pub fn resolve_node(&self, name: &str) -> Result<NodeId> {
        self.node_id(name).ok_or_else(|| Error::UnknownNode {
            id: name.to_string(),
            suggestions: self.similar_node_names(name, MAX_SUGGESTIONS),
        })
    }

    /// Like [`Network::link_id`] but reports unknown names as an error
    /// carrying similarly spelled link ids.
    pub fn resolve_link(&self, name: &str) -> Result<LinkId> {
        self.link_id(name).ok_or_else(|| Error::UnknownLink {
            id: name.to_string(),
            suggestions: self.similar_link_names(name, MAX_SUGGESTIONS),
        })
    }

    /// Up to `limit` node ids that look like `name`, most similar first.
    pub fn similar_node_names(&self, name: &str, limit: usize) -> Vec<String> {
        fuzzy_matches(self.nodes.iter().map(|node| node.name.as_str()), name, limit)
    }

    /// Up to `limit` link ids that look like `name`, most similar first.
    pub fn similar_link_names(&self, name: &str, limit: usize) -> Vec<String> {
        fuzzy_matches(self.links.iter().map(|link| link.name.as_str()), name, limit)
    }

    /// Highest free-flow speed over all links, or `None` without links.
    pub fn max_freespeed(&self) -> Option<f64> {
        self.links.iter().map(|link| link.freespeed).reduce(f64::max)
    }

    /// Sub-network containing every node and only the links that allow at
    /// least one of `modes`.
    ///
    /// Node identifiers are preserved; link identifiers are renumbered.
    pub fn filter_by_modes(&self, modes: &[&str]) -> Network {
        let mut builder = NetworkBuilder::with_capacity(self.nodes.len(), self.links.len());
        for node in &self.nodes {
            builder.push_node(node.name.clone(), node.coord);
        }
        for link in self
            .links
            .iter()
            .filter(|link| modes.iter().any(|mode| link.allows_mode(mode)))
        {
            builder.push_link(
                link.name.clone(),
                link.from,
                link.to,
                LinkAttributes {
                    length: link.length,
                    freespeed: link.freespeed,
                    capacity: link.capacity,
                    lanes: link.lanes,
                    allowed_modes: link.allowed_modes.clone(),
                },
            );
        }
        builder.build()
    }
}

fn fuzzy_matches<'a>(
    candidates: impl Iterator<Item = &'a str>,
    query: &str,
    limit: usize,
) -> Vec<String> {
    let query = query.to_lowercase();
    let mut scored: Vec<(f64, &str)> = candidates
        .map(|candidate| {
            let score = strsim::jaro_winkler(&query, &candidate.to_lowercase());
            (score, candidate)
        })
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

/// Incrementally assembles a validated [`Network`].
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    network: Network,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, links: usize) -> Self {
        let mut builder = Self::default();
        builder.network.nodes.reserve(nodes);
        builder.network.out_links.reserve(nodes);
        builder.network.in_links.reserve(nodes);
        builder.network.links.reserve(links);
        builder
    }

    /// Add a node, rejecting duplicate identifiers and non-finite coordinates.
    pub fn add_node(&mut self, name: impl Into<String>, coord: Coord) -> Result<NodeId> {
        let name = name.into();
        if self.network.node_index.contains_key(&name) {
            return Err(Error::DuplicateNode { id: name });
        }
        if !coord.x.is_finite() || !coord.y.is_finite() {
            return Err(Error::InvalidNodeCoordinate {
                id: name,
                x: coord.x,
                y: coord.y,
            });
        }
        Ok(self.push_node(name, coord))
    }

    /// Add a link between two existing nodes.
    ///
    /// Lengths must be finite and non-negative and free speeds finite and
    /// strictly positive, otherwise travel times are undefined.
    pub fn add_link(
        &mut self,
        name: impl Into<String>,
        from: NodeId,
        to: NodeId,
        attributes: LinkAttributes,
    ) -> Result<LinkId> {
        let name = name.into();
        if self.network.link_index.contains_key(&name) {
            return Err(Error::DuplicateLink { id: name });
        }
        for endpoint in [from, to] {
            if !self.network.contains_node(endpoint) {
                return Err(Error::UnknownNode {
                    id: endpoint.to_string(),
                    suggestions: Vec::new(),
                });
            }
        }
        if !attributes.length.is_finite() || attributes.length < 0.0 {
            return Err(Error::InvalidLinkAttribute {
                id: name,
                attribute: "length",
                value: attributes.length,
            });
        }
        if !attributes.freespeed.is_finite() || attributes.freespeed <= 0.0 {
            return Err(Error::InvalidLinkAttribute {
                id: name,
                attribute: "freespeed",
                value: attributes.freespeed,
            });
        }
        Ok(self.push_link(name, from, to, attributes))
    }

    /// Add a link whose endpoints are given by external node identifiers.
    pub fn add_link_between(
        &mut self,
        name: impl Into<String>,
        from: &str,
        to: &str,
        attributes: LinkAttributes,
    ) -> Result<LinkId> {
        let from = self.network.resolve_node(from)?;
        let to = self.network.resolve_node(to)?;
        self.add_link(name, from, to, attributes)
    }

    pub fn build(self) -> Network {
        self.network
    }

    fn push_node(&mut self, name: String, coord: Coord) -> NodeId {
        let id = NodeId(self.network.nodes.len() as u32);
        self.network.node_index.insert(name.clone(), id);
        self.network.nodes.push(Node { id, name, coord });
        self.network.out_links.push(Vec::new());
        self.network.in_links.push(Vec::new());
        id
    }

    fn push_link(
        &mut self,
        name: String,
        from: NodeId,
        to: NodeId,
        attributes: LinkAttributes,
    ) -> LinkId {
        let id = LinkId(self.network.links.len() as u32);
        self.network.link_index.insert(name.clone(), id);
        self.network.out_links[from.index()].push(id);
        self.network.in_links[to.index()].push(id);
        self.network.links.push(Link {
            id,
            name,
            from,
            to,
            length: attributes.length,
            freespeed: attributes.freespeed,
            capacity: attributes.capacity,
            lanes: attributes.lanes,
            allowed_modes: attributes.allowed_modes,
        });
        id
    }
}
