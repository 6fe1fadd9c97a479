//! Instrumentation for least-cost path searches.
//!
//! The search calls a [`SearchObserver`] once whenever it creates or improves
//! a node label, including the source label and improvements of labels that
//! are already queued. Observers only see snapshots and cannot influence the
//! search.
//!
//! [`RecordingRouter`] composes this with any [`LeastCostPathCalculator`]: it
//! counts label updates, forwards them to attached observers and reports a
//! [`RouteSummary`] per query to a [`SummarySink`].

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::info;

use crate::cost::{Traveler, Vehicle};
use crate::error::Result;
use crate::network::{LinkId, Network, NodeId};
use crate::path::Path;
use crate::router::LeastCostPathCalculator;

/// Copy of a node label right after it was created or improved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelSnapshot {
    pub node: NodeId,
    pub cost: f64,
    pub time: f64,
    pub predecessor: Option<LinkId>,
    /// Queue key: cost plus the scaled heuristic estimate.
    pub estimated_total: f64,
}

/// Receives label updates from a running search.
pub trait SearchObserver {
    fn on_label_updated(&mut self, snapshot: &LabelSnapshot);
}

impl<F> SearchObserver for F
where
    F: FnMut(&LabelSnapshot),
{
    fn on_label_updated(&mut self, snapshot: &LabelSnapshot) {
        self(snapshot)
    }
}

/// Observer that ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    fn on_label_updated(&mut self, _snapshot: &LabelSnapshot) {}
}

/// Counts label creations and improvements.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisitCounter {
    visits: usize,
}

impl VisitCounter {
    pub fn visits(&self) -> usize {
        self.visits
    }
}

impl SearchObserver for VisitCounter {
    fn on_label_updated(&mut self, _snapshot: &LabelSnapshot) {
        self.visits += 1;
    }
}

/// Outcome of one query as reported by [`RecordingRouter`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub from: NodeId,
    pub to: NodeId,
    pub found: bool,
    pub link_count: usize,
    pub node_count: usize,
    pub travel_time: Option<f64>,
    pub travel_cost: Option<f64>,
    pub visited_nodes: usize,
}

impl RouteSummary {
    fn new(from: NodeId, to: NodeId, path: Option<&Path>, visited_nodes: usize) -> Self {
        Self {
            from,
            to,
            found: path.is_some(),
            link_count: path.map_or(0, Path::link_count),
            node_count: path.map_or(0, Path::node_count),
            travel_time: path.map(|path| path.travel_time),
            travel_cost: path.map(|path| path.travel_cost),
            visited_nodes,
        }
    }
}

/// Destination for per-query summaries.
pub trait SummarySink: Send + Sync {
    fn record(&self, summary: &RouteSummary);
}

/// Emits each summary as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl SummarySink for TracingSink {
    fn record(&self, summary: &RouteSummary) {
        if summary.found {
            info!(
                from = %summary.from,
                to = %summary.to,
                links = summary.link_count,
                nodes = summary.node_count,
                travel_time = summary.travel_time.unwrap_or_default(),
                travel_cost = summary.travel_cost.unwrap_or_default(),
                visited_nodes = summary.visited_nodes,
                "route computed"
            );
        } else {
            info!(
                from = %summary.from,
                to = %summary.to,
                visited_nodes = summary.visited_nodes,
                "no route found"
            );
        }
    }
}

/// Keeps summaries in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    summaries: Mutex<Vec<RouteSummary>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.summaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<RouteSummary> {
        self.summaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl SummarySink for CollectingSink {
    fn record(&self, summary: &RouteSummary) {
        self.summaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(summary.clone());
    }
}

type SharedObserver = Box<dyn SearchObserver + Send>;

/// Wraps a router, counting label updates and reporting route summaries.
///
/// Attached observers are shared by all queries on this wrapper. Each
/// callback takes the observer lock on its own, so concurrent queries run
/// side by side and only their callbacks interleave.
pub struct RecordingRouter<R> {
    inner: R,
    observers: Mutex<Vec<SharedObserver>>,
    sink: Arc<dyn SummarySink>,
}

impl<R: LeastCostPathCalculator> RecordingRouter<R> {
    /// Wrap `inner`, reporting summaries through `tracing`.
    pub fn new(inner: R) -> Self {
        Self::with_sink(inner, Arc::new(TracingSink))
    }

    pub fn with_sink(inner: R, sink: Arc<dyn SummarySink>) -> Self {
        Self {
            inner,
            observers: Mutex::new(Vec::new()),
            sink,
        }
    }

    /// Attach another observer to every future query.
    pub fn attach(&self, observer: impl SearchObserver + Send + 'static) {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(observer));
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

struct Fanout<'a> {
    counter: VisitCounter,
    caller: &'a mut dyn SearchObserver,
    attached: &'a Mutex<Vec<SharedObserver>>,
}

impl SearchObserver for Fanout<'_> {
    fn on_label_updated(&mut self, snapshot: &LabelSnapshot) {
        self.counter.on_label_updated(snapshot);
        self.caller.on_label_updated(snapshot);
        let mut attached = self
            .attached
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for observer in attached.iter_mut() {
            observer.on_label_updated(snapshot);
        }
    }
}

impl<R: LeastCostPathCalculator> LeastCostPathCalculator for RecordingRouter<R> {
    fn network(&self) -> &Network {
        self.inner.network()
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
        let mut fanout = Fanout {
            counter: VisitCounter::default(),
            caller: observer,
            attached: &self.observers,
        };

        let path = self.inner.calc_least_cost_path_observed(
            from,
            to,
            start_time,
            traveler,
            vehicle,
            &mut fanout,
        )?;
        let visits = fanout.counter.visits();

        self.sink
            .record(&RouteSummary::new(from, to, path.as_ref(), visits));
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(node: u32) -> LabelSnapshot {
        LabelSnapshot {
            node: NodeId(node),
            cost: 1.0,
            time: 1.0,
            predecessor: None,
            estimated_total: 1.0,
        }
    }

    #[test]
    fn closures_are_observers() {
        let mut nodes = Vec::new();
        let mut record = |snapshot: &LabelSnapshot| nodes.push(snapshot.node);
        record.on_label_updated(&snapshot(4));
        record.on_label_updated(&snapshot(2));
        assert_eq!(nodes, vec![NodeId(4), NodeId(2)]);
    }

    #[test]
    fn collecting_sink_survives_a_poisoned_lock() {
        let sink = Arc::new(CollectingSink::new());
        let poisoner = sink.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.summaries.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        sink.record(&RouteSummary::new(NodeId(0), NodeId(1), None, 1));
        assert_eq!(sink.summaries().len(), 1);
        assert!(!sink.last().unwrap().found);
    }
}
