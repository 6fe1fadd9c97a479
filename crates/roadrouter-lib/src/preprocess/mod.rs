//! Network preprocessing for informed searches.
//!
//! Each strategy implements [`Preprocess`] and produces immutable data that
//! any number of concurrent queries can share behind an `Arc`. The data
//! remembers the shape of the network it was computed for; routers refuse
//! data whose shape does not match their network. After topology or speed
//! changes the preprocessing has to be run again.

mod euclidean;
mod landmarks;

pub use euclidean::{AdmissibilityWarning, EuclideanData, PreprocessEuclidean};
pub use landmarks::{LandmarkData, PreprocessLandmarks, DEFAULT_LANDMARK_COUNT};

use crate::error::{Error, Result};
use crate::network::Network;

/// A one-shot computation over a whole network.
pub trait Preprocess {
    type Data;

    /// Compute the preprocessing data. Fails on an empty network.
    fn run(&self, network: &Network) -> Result<Self::Data>;
}

/// Node and link counts of the network a preprocessing run covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkShape {
    pub nodes: usize,
    pub links: usize,
}

impl NetworkShape {
    pub fn of(network: &Network) -> Self {
        Self {
            nodes: network.node_count(),
            links: network.link_count(),
        }
    }

    /// Verify that `network` still has the recorded shape.
    pub fn check(&self, network: &Network) -> Result<()> {
        let actual = Self::of(network);
        if actual == *self {
            return Ok(());
        }
        Err(Error::StalePreprocessData {
            expected_nodes: self.nodes,
            expected_links: self.links,
            actual_nodes: actual.nodes,
            actual_links: actual.links,
        })
    }
}

fn ensure_not_empty(network: &Network) -> Result<()> {
    if network.is_empty() {
        Err(Error::EmptyNetwork)
    } else {
        Ok(())
    }
}
