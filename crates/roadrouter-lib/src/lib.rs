//! roadrouter library entry points.
//!
//! This crate computes least-cost paths through a road network. A query
//! supplies source and target nodes, a departure time and optional traveler
//! and vehicle context; link costs come from caller-provided travel time and
//! travel disutility functions. Dijkstra, Euclidean A* and landmark A* share
//! one search loop that differs only in its heuristic. Higher-level consumers
//! (the CLI, simulations) should only depend on the items exported here.
//!

#![deny(warnings)]

pub mod config;
pub mod cost;
pub mod error;
pub mod heuristic;
pub mod network;
pub mod observer;
pub mod path;
pub mod preprocess;
pub mod queue;
pub mod router;

pub use config::{RouteAlgorithm, RouterConfig};
pub use cost::{
    FreeSpeedTravelTime, OnlyTimeDependentDisutility, TimeBinnedTravelTime,
    TimeDistanceDisutility, TravelDisutility, TravelTime, Traveler, Vehicle,
};
pub use error::{Error, Result};
pub use heuristic::{EuclideanHeuristic, Heuristic, LandmarkHeuristic, ZeroHeuristic};
pub use network::{Coord, Link, LinkAttributes, LinkId, Network, NetworkBuilder, Node, NodeId};
pub use observer::{
    CollectingSink, LabelSnapshot, NoopObserver, RecordingRouter, RouteSummary, SearchObserver,
    SummarySink, TracingSink, VisitCounter,
};
pub use path::Path;
pub use preprocess::{
    AdmissibilityWarning, EuclideanData, LandmarkData, Preprocess, PreprocessEuclidean,
    PreprocessLandmarks,
};
pub use queue::PendingQueue;
pub use router::{
    route_between_links, AStarEuclideanRouter, AStarLandmarksRouter, DijkstraRouter,
    LeastCostPathCalculator, LeastCostPathRouter,
};
