//! JSON network documents.
//!
//! ```json
//! {
//!   "nodes": [{ "id": "a", "x": 0.0, "y": 0.0 }],
//!   "links": [{ "id": "ab", "from": "a", "to": "b", "length": 100.0, "freespeed": 13.9 }]
//! }
//! ```
//!
//! `capacity`, `lanes` and `modes` are optional per link and default to
//! 1800 veh/h, one lane and `["car"]`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use roadrouter_lib::{Coord, LinkAttributes, Network, NetworkBuilder};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkDocument {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkRecord {
    pub id: String,
    pub from: String,
    pub to: String,
    pub length: f64,
    pub freespeed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lanes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modes: Option<Vec<String>>,
}

impl NetworkDocument {
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read network file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse network file {}", path.display()))
    }

    /// Validate the document and build the routable network.
    pub fn into_network(self) -> Result<Network> {
        let mut builder = NetworkBuilder::with_capacity(self.nodes.len(), self.links.len());
        for node in self.nodes {
            builder.add_node(node.id, Coord::new(node.x, node.y))?;
        }
        for link in self.links {
            let mut attributes = LinkAttributes::new(link.length, link.freespeed);
            if let Some(capacity) = link.capacity {
                attributes = attributes.with_capacity(capacity);
            }
            if let Some(lanes) = link.lanes {
                attributes = attributes.with_lanes(lanes);
            }
            if let Some(modes) = link.modes {
                attributes = attributes.with_modes(modes);
            }
            builder
                .add_link_between(link.id.clone(), &link.from, &link.to, attributes)
                .with_context(|| format!("invalid link '{}'", link.id))?;
        }
        Ok(builder.build())
    }
}

/// Read and validate a network document.
pub fn load_network(path: &Path) -> Result<Network> {
    let network = NetworkDocument::from_path(path)?
        .into_network()
        .with_context(|| format!("invalid network in {}", path.display()))?;
    tracing::debug!(
        nodes = network.node_count(),
        links = network.link_count(),
        path = %path.display(),
        "loaded network"
    );
    Ok(network)
}
