//! Pending-node queue for the label-setting search.
//!
//! An indexed 4-ary min-heap: every node owns at most one entry, and a
//! position table maps nodes to their slot so keys can be changed in place.
//! Extracting the minimum and changing a key are `O(log n)`. Entries with
//! equal keys are ordered by node index, which keeps searches reproducible.

use std::cmp::Ordering;

use crate::network::NodeId;

const TREE_ARITY: usize = 4;
const ABSENT: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
struct Entry {
    key: f64,
    node: NodeId,
}

impl Entry {
    fn cmp_priority(&self, other: &Entry) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| self.node.cmp(&other.node))
    }
}

/// Min-priority queue over the nodes of one network.
#[derive(Debug, Clone)]
pub struct PendingQueue {
    positions: Vec<usize>,
    heap: Vec<Entry>,
}

impl PendingQueue {
    /// Create an empty queue able to hold nodes `0..node_count`.
    pub fn new(node_count: usize) -> Self {
        Self {
            positions: vec![ABSENT; node_count],
            heap: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.positions
            .get(node.index())
            .is_some_and(|&position| position != ABSENT)
    }

    /// Current key of `node`, if it is queued.
    pub fn key(&self, node: NodeId) -> Option<f64> {
        match self.positions.get(node.index()) {
            Some(&position) if position != ABSENT => Some(self.heap[position].key),
            _ => None,
        }
    }

    /// Smallest entry without removing it.
    pub fn peek(&self) -> Option<(NodeId, f64)> {
        self.heap.first().map(|entry| (entry.node, entry.key))
    }

    /// Queue `node` with `key`. A node that is already queued has its key
    /// replaced instead.
    pub fn insert(&mut self, node: NodeId, key: f64) {
        if self.contains(node) {
            self.update_key(node, key);
            return;
        }
        if node.index() >= self.positions.len() {
            self.positions.resize(node.index() + 1, ABSENT);
        }
        let position = self.heap.len();
        self.heap.push(Entry { key, node });
        self.positions[node.index()] = position;
        self.sift_up(position);
    }

    /// Lower the key of a queued node, or queue it if it is absent.
    ///
    /// A larger key for a queued node is ignored.
    pub fn decrease_or_insert(&mut self, node: NodeId, key: f64) {
        match self.key(node) {
            Some(current) if key.total_cmp(&current) == Ordering::Less => {
                let position = self.positions[node.index()];
                self.heap[position].key = key;
                self.sift_up(position);
            }
            Some(_) => {}
            None => self.insert(node, key),
        }
    }

    /// Remove and return the node with the smallest key.
    pub fn pop_min(&mut self) -> Option<(NodeId, f64)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let entry = self.heap.pop()?;
        self.positions[entry.node.index()] = ABSENT;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((entry.node, entry.key))
    }

    /// Drop all entries, keeping the allocated capacity.
    pub fn clear(&mut self) {
        for entry in &self.heap {
            self.positions[entry.node.index()] = ABSENT;
        }
        self.heap.clear();
    }

    fn update_key(&mut self, node: NodeId, key: f64) {
        let position = self.positions[node.index()];
        let previous = self.heap[position];
        self.heap[position].key = key;
        match self.heap[position].cmp_priority(&previous) {
            Ordering::Less => self.sift_up(position),
            Ordering::Greater => self.sift_down(position),
            Ordering::Equal => {}
        }
    }

    fn sift_up(&mut self, mut position: usize) {
        while position > 0 {
            let parent = (position - 1) / TREE_ARITY;
            if self.heap[parent].cmp_priority(&self.heap[position]) != Ordering::Greater {
                break;
            }
            self.swap(parent, position);
            position = parent;
        }
    }

    fn sift_down(&mut self, mut position: usize) {
        loop {
            let first_child = TREE_ARITY * position + 1;
            if first_child >= self.heap.len() {
                return;
            }
            let last_child = (first_child + TREE_ARITY).min(self.heap.len());
            let smallest = (first_child..last_child)
                .min_by(|&a, &b| self.heap[a].cmp_priority(&self.heap[b]))
                .unwrap_or(first_child);
            if self.heap[smallest].cmp_priority(&self.heap[position]) != Ordering::Less {
                return;
            }
            self.swap(smallest, position);
            position = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.positions[self.heap[a].node.index()] = a;
        self.positions[self.heap[b].node.index()] = b;
    }
}
