//! Least-cost path search.
//!
//! [`LeastCostPathRouter`] is a label-setting search generic over its
//! [`Heuristic`]. With [`ZeroHeuristic`] it is Dijkstra's algorithm; with an
//! admissible estimate it is A*. The overdo factor scales the estimate: values
//! above one make the search greedier and faster, at the price of no longer
//! guaranteeing least-cost paths.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use roadrouter_lib::{
//!     DijkstraRouter, FreeSpeedTravelTime, LeastCostPathCalculator, OnlyTimeDependentDisutility,
//! };
//!
//! let travel_time = Arc::new(FreeSpeedTravelTime);
//! let disutility = Arc::new(OnlyTimeDependentDisutility::new(travel_time.clone()));
//! let router = DijkstraRouter::dijkstra(network, travel_time, disutility);
//! let path = router.calc_least_cost_path(from, to, 8.0 * 3600.0, None, None)?;
//! ```

use std::sync::Arc;

use crate::cost::{TravelDisutility, TravelTime, Traveler, Vehicle};
use crate::error::{Error, Result};
use crate::heuristic::{EuclideanHeuristic, Heuristic, LandmarkHeuristic, ZeroHeuristic};
use crate::network::{LinkId, Network, NodeId};
use crate::observer::{LabelSnapshot, NoopObserver, SearchObserver};
use crate::path::{build_path, Label, Path};
use crate::queue::PendingQueue;

/// Common interface of every least-cost path algorithm.
///
/// `Ok(None)` means the target cannot be reached from the source; errors
/// are reserved for invalid input such as node ids from another network.
pub trait LeastCostPathCalculator: Send + Sync {
    fn network(&self) -> &Network;

    /// Run a query, reporting every label creation and improvement to `observer`.
    fn calc_least_cost_path_observed(
        &self,
        from: NodeId,
        to: NodeId,
        start_time: f64,
        traveler: Option<&Traveler>,
        vehicle: Option<&Vehicle>,
        observer: &mut dyn SearchObserver,
    ) -> Result<Option<Path>>;

    fn calc_least_cost_path(
        &self,
        from: NodeId,
        to: NodeId,
        start_time: f64,
        traveler: Option<&Traveler>,
        vehicle: Option<&Vehicle>,
    ) -> Result<Option<Path>> {
        self.calc_least_cost_path_observed(
            from,
            to,
            start_time,
            traveler,
            vehicle,
            &mut NoopObserver,
        )
    }
}

impl<R: LeastCostPathCalculator + ?Sized> LeastCostPathCalculator for Box<R> {
    fn network(&self) -> &Network {
        (**self).network()
    }

    fn calc_least_cost_path_observed(
        &self,
        from: NodeId,
        to: NodeId,
        start_time: f64,
        traveler: Option<&Traveler>,
        vehicle: Option<&Vehicle>,
        observer: &mut dyn SearchObserver,
    ) -> Result<Option<Path>> {
        (**self).calc_least_cost_path_observed(from, to, start_time, traveler, vehicle, observer)
    }
}

/// Label-setting search parameterized by its heuristic.
#[derive(Clone)]
pub struct LeastCostPathRouter<H = ZeroHeuristic> {
    network: Arc<Network>,
    travel_time: Arc<dyn TravelTime>,
    disutility: Arc<dyn TravelDisutility>,
    heuristic: H,
    overdo_factor: f64,
}

/// Plain Dijkstra.
pub type DijkstraRouter = LeastCostPathRouter<ZeroHeuristic>;
/// A* with the straight-line estimate.
pub type AStarEuclideanRouter = LeastCostPathRouter<EuclideanHeuristic>;
/// A* with landmark estimates.
pub type AStarLandmarksRouter = LeastCostPathRouter<LandmarkHeuristic>;

impl LeastCostPathRouter<ZeroHeuristic> {
    pub fn dijkstra(
        network: Arc<Network>,
        travel_time: Arc<dyn TravelTime>,
        disutility: Arc<dyn TravelDisutility>,
    ) -> Self {
        Self {
            network,
            travel_time,
            disutility,
            heuristic: ZeroHeuristic,
            overdo_factor: 1.0,
        }
    }
}

impl<H: Heuristic> LeastCostPathRouter<H> {
    /// Build a router guided by `heuristic`, which must have been prepared
    /// for `network`.
    pub fn with_heuristic(
        network: Arc<Network>,
        travel_time: Arc<dyn TravelTime>,
        disutility: Arc<dyn TravelDisutility>,
        heuristic: H,
    ) -> Result<Self> {
        heuristic.validate(&network)?;
        Ok(Self {
            network,
            travel_time,
            disutility,
            heuristic,
            overdo_factor: 1.0,
        })
    }

    /// Scale heuristic estimates by `overdo_factor`, which must be finite and >= 1.
    pub fn with_overdo_factor(mut self, overdo_factor: f64) -> Result<Self> {
        if !overdo_factor.is_finite() || overdo_factor < 1.0 {
            return Err(Error::InvalidOverdoFactor {
                value: overdo_factor,
            });
        }
        self.overdo_factor = overdo_factor;
        Ok(self)
    }

    pub fn overdo_factor(&self) -> f64 {
        self.overdo_factor
    }

    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }

    pub fn shared_network(&self) -> &Arc<Network> {
        &self.network
    }

    fn queue_key(&self, cost: f64, node: NodeId, target: NodeId) -> f64 {
        cost + self.heuristic.estimate(&self.network, node, target) * self.overdo_factor
    }

    fn ensure_node(&self, node: NodeId) -> Result<()> {
        if self.network.contains_node(node) {
            Ok(())
        } else {
            Err(Error::UnknownNode {
                id: node.to_string(),
                suggestions: Vec::new(),
            })
        }
    }
}

impl<H: Heuristic> LeastCostPathCalculator for LeastCostPathRouter<H> {
    fn network(&self) -> &Network {
        &self.network
    }

    fn calc_least_cost_path_observed(
        &self,
        from: NodeId,
        to: NodeId,
        start_time: f64,
        traveler: Option<&Traveler>,
        vehicle: Option<&Vehicle>,
        observer: &mut dyn SearchObserver,
    ) -> Result<Option<Path>> {
        self.ensure_node(from)?;
        self.ensure_node(to)?;

        let network = &*self.network;
        let mut labels: Vec<Option<Label>> = vec![None; network.node_count()];
        let mut pending = PendingQueue::new(network.node_count());

        let origin = Label::origin(start_time);
        let origin_key = self.queue_key(origin.cost, from, to);
        labels[from.index()] = Some(origin);
        pending.insert(from, origin_key);
        observer.on_label_updated(&LabelSnapshot {
            node: from,
            cost: origin.cost,
            time: origin.time,
            predecessor: None,
            estimated_total: origin_key,
        });

        while let Some((node, _)) = pending.pop_min() {
            let Some(label) = labels[node.index()].as_mut() else {
                continue;
            };
            label.settled = true;
            let current = *label;

            if node == to {
                return Ok(build_path(network, &labels, to, start_time));
            }

            for &link_id in network.out_links(node) {
                let link = network.link(link_id);
                let head = link.to;
                if labels[head.index()].is_some_and(|label| label.settled) {
                    continue;
                }

                let travel_time =
                    self.travel_time
                        .link_travel_time(link, current.time, traveler, vehicle);
                let disutility =
                    self.disutility
                        .link_travel_disutility(link, current.time, traveler, vehicle);
                let cost = current.cost + disutility;
                let time = current.time + travel_time;

                let improves = match labels[head.index()] {
                    None => true,
                    Some(existing) => cost < existing.cost,
                };
                if !improves {
                    continue;
                }

                labels[head.index()] = Some(Label {
                    cost,
                    time,
                    predecessor: Some(link_id),
                    settled: false,
                });
                let key = self.queue_key(cost, head, to);
                pending.decrease_or_insert(head, key);
                observer.on_label_updated(&LabelSnapshot {
                    node: head,
                    cost,
                    time,
                    predecessor: Some(link_id),
                    estimated_total: key,
                });
            }
        }

        Ok(None)
    }
}

/// Route from the end of `from_link` to the start of `to_link`.
///
/// The returned path excludes both links themselves. When the entry link
/// ends where the exit link starts, the path is trivial.
pub fn route_between_links<R>(
    router: &R,
    from_link: LinkId,
    to_link: LinkId,
    departure_time: f64,
    traveler: Option<&Traveler>,
    vehicle: Option<&Vehicle>,
) -> Result<Option<Path>>
where
    R: LeastCostPathCalculator + ?Sized,
{
    let network = router.network();
    for link in [from_link, to_link] {
        if !network.contains_link(link) {
            return Err(Error::UnknownLink {
                id: link.to_string(),
                suggestions: Vec::new(),
            });
        }
    }
    let start = network.link(from_link).to;
    let end = network.link(to_link).from;
    router.calc_least_cost_path(start, end, departure_time, traveler, vehicle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{FreeSpeedTravelTime, OnlyTimeDependentDisutility};
    use crate::network::{Coord, LinkAttributes};
    use crate::observer::VisitCounter;

    fn diamond() -> Arc<Network> {
        // a -> b -> d is 20 s, a -> c -> d is 30 s.
        let mut builder = Network::builder();
        let a = builder.add_node("a", Coord::new(0.0, 0.0)).unwrap();
        let b = builder.add_node("b", Coord::new(100.0, 50.0)).unwrap();
        let c = builder.add_node("c", Coord::new(100.0, -50.0)).unwrap();
        let d = builder.add_node("d", Coord::new(200.0, 0.0)).unwrap();
        for (name, from, to, length) in [
            ("ab", a, b, 150.0),
            ("bd", b, d, 150.0),
            ("ac", a, c, 150.0),
            ("cd", c, d, 300.0),
        ] {
            builder
                .add_link(name, from, to, LinkAttributes::new(length, 15.0))
                .unwrap();
        }
        Arc::new(builder.build())
    }

    fn dijkstra(network: Arc<Network>) -> DijkstraRouter {
        let travel_time: Arc<dyn TravelTime> = Arc::new(FreeSpeedTravelTime);
        let disutility = Arc::new(OnlyTimeDependentDisutility::new(travel_time.clone()));
        DijkstraRouter::dijkstra(network, travel_time, disutility)
    }

    #[test]
    fn picks_the_cheaper_branch() {
        let network = diamond();
        let router = dijkstra(network.clone());
        let a = network.node_id("a").unwrap();
        let d = network.node_id("d").unwrap();

        let path = router
            .calc_least_cost_path(a, d, 0.0, None, None)
            .unwrap()
            .expect("route exists");
        assert_eq!(path.link_names(&network), vec!["ab", "bd"]);
        assert_eq!(path.travel_time, 20.0);
        assert_eq!(path.travel_cost, 20.0);
    }

    #[test]
    fn source_equals_target_is_trivial() {
        let network = diamond();
        let router = dijkstra(network.clone());
        let b = network.node_id("b").unwrap();

        let path = router
            .calc_least_cost_path(b, b, 50.0, None, None)
            .unwrap()
            .unwrap();
        assert!(path.is_trivial());
        assert_eq!(path.nodes, vec![b]);
        assert_eq!(path.travel_time, 0.0);
        assert_eq!(path.travel_cost, 0.0);
    }

    #[test]
    fn unreachable_target_is_none() {
        let network = diamond();
        let router = dijkstra(network.clone());
        let a = network.node_id("a").unwrap();
        let d = network.node_id("d").unwrap();
        assert!(router
            .calc_least_cost_path(d, a, 0.0, None, None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn foreign_node_is_an_error() {
        let router = dijkstra(diamond());
        let error = router
            .calc_least_cost_path(NodeId(0), NodeId(99), 0.0, None, None)
            .unwrap_err();
        assert!(matches!(error, Error::UnknownNode { .. }));
    }

    #[test]
    fn observer_sees_every_label_update() {
        let network = diamond();
        let router = dijkstra(network.clone());
        let a = network.node_id("a").unwrap();
        let d = network.node_id("d").unwrap();
        let mut counter = VisitCounter::default();

        router
            .calc_least_cost_path_observed(a, d, 0.0, None, None, &mut counter)
            .unwrap();
        // a, then b and c from a, then d via b. Settling c finds no better d.
        assert_eq!(counter.visits(), 4);
    }

    #[test]
    fn overdo_factor_below_one_is_rejected() {
        let error = dijkstra(diamond()).with_overdo_factor(0.5).err().unwrap();
        assert!(matches!(error, Error::InvalidOverdoFactor { .. }));
        assert!(dijkstra(diamond()).with_overdo_factor(f64::NAN).is_err());
    }

    #[test]
    fn link_to_link_routes_between_link_ends() {
        let network = diamond();
        let router = dijkstra(network.clone());
        let ab = network.link_id("ab").unwrap();
        let bd = network.link_id("bd").unwrap();

        let path = route_between_links(&router, ab, bd, 0.0, None, None)
            .unwrap()
            .unwrap();
        assert!(path.is_trivial());
        assert_eq!(path.nodes, vec![network.node_id("b").unwrap()]);
    }
}
