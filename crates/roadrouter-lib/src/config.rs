//! Router selection and configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cost::{TravelDisutility, TravelTime};
use crate::error::{Error, Result};
use crate::heuristic::{EuclideanHeuristic, LandmarkHeuristic};
use crate::network::Network;
use crate::preprocess::{
    Preprocess, PreprocessEuclidean, PreprocessLandmarks, DEFAULT_LANDMARK_COUNT,
};
use crate::router::{LeastCostPathCalculator, LeastCostPathRouter};

/// Supported least-cost path algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RouteAlgorithm {
    /// Dijkstra's algorithm without estimates.
    #[default]
    Dijkstra,
    /// A* guided by straight-line distance.
    AStarEuclidean,
    /// A* guided by landmark distances.
    AStarLandmarks,
}

impl RouteAlgorithm {
    pub const ALL: [RouteAlgorithm; 3] = [
        RouteAlgorithm::Dijkstra,
        RouteAlgorithm::AStarEuclidean,
        RouteAlgorithm::AStarLandmarks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteAlgorithm::Dijkstra => "dijkstra",
            RouteAlgorithm::AStarEuclidean => "a-star-euclidean",
            RouteAlgorithm::AStarLandmarks => "a-star-landmarks",
        }
    }
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteAlgorithm {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        RouteAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == normalized)
            .ok_or_else(|| Error::UnknownAlgorithm {
                name: value.to_string(),
                suggestions: RouteAlgorithm::ALL
                    .iter()
                    .map(|algorithm| algorithm.as_str().to_string())
                    .collect(),
            })
    }
}

/// Which router to build and how to tune it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    pub algorithm: RouteAlgorithm,
    /// Heuristic scaling; 1 keeps paths optimal.
    pub overdo_factor: f64,
    /// Only used by [`RouteAlgorithm::AStarLandmarks`].
    pub landmark_count: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            algorithm: RouteAlgorithm::Dijkstra,
            overdo_factor: 1.0,
            landmark_count: DEFAULT_LANDMARK_COUNT,
        }
    }
}

impl RouterConfig {
    pub fn new(algorithm: RouteAlgorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.overdo_factor.is_finite() || self.overdo_factor < 1.0 {
            return Err(Error::InvalidOverdoFactor {
                value: self.overdo_factor,
            });
        }
        if self.algorithm == RouteAlgorithm::AStarLandmarks && self.landmark_count == 0 {
            return Err(Error::InvalidLandmarkCount);
        }
        Ok(())
    }

    /// Run whatever preprocessing the algorithm needs and build the router.
    ///
    /// The Euclidean estimate is a travel time, so it only bounds the cost
    /// when every link's disutility is at least its free-flow travel time.
    /// Cheaper links are logged as a warning and may yield suboptimal paths.
    pub fn build_router(
        &self,
        network: Arc<Network>,
        travel_time: Arc<dyn TravelTime>,
        disutility: Arc<dyn TravelDisutility>,
    ) -> Result<Box<dyn LeastCostPathCalculator>> {
        self.validate()?;
        debug!(algorithm = %self.algorithm, overdo_factor = self.overdo_factor, "building router");

        let router: Box<dyn LeastCostPathCalculator> = match self.algorithm {
            RouteAlgorithm::Dijkstra => Box::new(
                LeastCostPathRouter::dijkstra(network, travel_time, disutility)
                    .with_overdo_factor(self.overdo_factor)?,
            ),
            RouteAlgorithm::AStarEuclidean => {
                let data = Arc::new(PreprocessEuclidean.run(&network)?);
                let cheap = links_below_free_flow_time(&network, disutility.as_ref());
                if cheap > 0 {
                    warn!(
                        links = cheap,
                        "disutility is below free-flow travel time on some links; \
                         euclidean estimates may overestimate the remaining cost"
                    );
                }
                Box::new(
                    LeastCostPathRouter::with_heuristic(
                        network,
                        travel_time,
                        disutility,
                        EuclideanHeuristic::new(data),
                    )?
                    .with_overdo_factor(self.overdo_factor)?,
                )
            }
            RouteAlgorithm::AStarLandmarks => {
                let data = Arc::new(
                    PreprocessLandmarks::new(disutility.clone())
                        .with_landmark_count(self.landmark_count)
                        .run(&network)?,
                );
                Box::new(
                    LeastCostPathRouter::with_heuristic(
                        network,
                        travel_time,
                        disutility,
                        LandmarkHeuristic::new(data),
                    )?
                    .with_overdo_factor(self.overdo_factor)?,
                )
            }
        };
        Ok(router)
    }
}

/// Number of links whose minimum disutility undercuts their free-flow time.
fn links_below_free_flow_time(network: &Network, disutility: &dyn TravelDisutility) -> usize {
    network
        .links()
        .iter()
        .filter(|link| {
            disutility.link_minimum_travel_disutility(link) < link.free_flow_travel_time() - 1e-9
        })
        .count()
}
