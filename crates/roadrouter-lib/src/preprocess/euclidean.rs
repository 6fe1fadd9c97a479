use tracing::{info, warn};

use crate::error::Result;
use crate::network::{LinkId, Network};

use super::{ensure_not_empty, NetworkShape, Preprocess};

/// Link whose stored length is shorter than the straight line between its
/// endpoints. The Euclidean heuristic may overestimate across such links.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissibilityWarning {
    pub link: LinkId,
    pub link_name: String,
    pub length: f64,
    pub straight_line: f64,
}

/// Result of [`PreprocessEuclidean`].
#[derive(Debug, Clone)]
pub struct EuclideanData {
    shape: NetworkShape,
    max_freespeed: f64,
    warnings: Vec<AdmissibilityWarning>,
}

impl EuclideanData {
    pub fn shape(&self) -> NetworkShape {
        self.shape
    }

    /// Highest free-flow speed in the network. Infinite when there are no links.
    pub fn max_freespeed(&self) -> f64 {
        self.max_freespeed
    }

    pub fn warnings(&self) -> &[AdmissibilityWarning] {
        &self.warnings
    }
}

/// Collects the global maximum free speed and checks link lengths against
/// straight-line distances.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreprocessEuclidean;

impl Preprocess for PreprocessEuclidean {
    type Data = EuclideanData;

    fn run(&self, network: &Network) -> Result<EuclideanData> {
        ensure_not_empty(network)?;

        let max_freespeed = network.max_freespeed().unwrap_or(f64::INFINITY);
        let mut warnings = Vec::new();
        for link in network.links() {
            let straight_line = network
                .node(link.from)
                .coord
                .distance_to(&network.node(link.to).coord);
            if link.length < straight_line {
                warn!(
                    link = %link.name,
                    length = link.length,
                    straight_line,
                    "link is shorter than the distance between its nodes; \
                     euclidean estimates may not be admissible"
                );
                warnings.push(AdmissibilityWarning {
                    link: link.id,
                    link_name: link.name.clone(),
                    length: link.length,
                    straight_line,
                });
            }
        }

        info!(
            nodes = network.node_count(),
            links = network.link_count(),
            max_freespeed,
            warnings = warnings.len(),
            "euclidean preprocessing finished"
        );

        Ok(EuclideanData {
            shape: NetworkShape::of(network),
            max_freespeed,
            warnings,
        })
    }
}
