//! Bounded settle-based expansion over the street graph
//!
//! A Dijkstra variant that runs from one or more weighted sources, never
//! expands past a cost budget and hands every settled vertex to a caller
//! supplied callback. The callback can stop the whole search early; the
//! settled set stays available for cost lookups and path reconstruction
//! afterwards.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::ops::ControlFlow;

use hashbrown::HashMap;
use petgraph::Direction;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use super::CancelToken;
use crate::model::StreetGraph;
use crate::{Cost, Error};

/// Index of a [`VisitRecord`] inside its [`SearchSpace`]
pub type VisitId = usize;

/// A settled vertex: its cost from the search origin and a back-reference
/// into the shortest-path tree.
#[derive(Debug, Clone, Copy)]
pub struct VisitRecord {
    pub vertex: NodeIndex,
    /// Accumulated cost from the search origin
    pub cost: Cost,
    /// Edge traversed to settle this vertex, `None` for a search source
    pub edge: Option<EdgeIndex>,
    pub prev: Option<VisitId>,
}

/// All vertices settled by one bounded search run.
#[derive(Debug, Default)]
pub struct SearchSpace {
    visits: Vec<VisitRecord>,
    settled: HashMap<NodeIndex, VisitId>,
}

impl SearchSpace {
    /// Settled record for a vertex, if the search reached it.
    pub fn visit(&self, vertex: NodeIndex) -> Option<&VisitRecord> {
        self.settled.get(&vertex).map(|&id| &self.visits[id])
    }

    pub fn record(&self, id: VisitId) -> &VisitRecord {
        &self.visits[id]
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Vertices of the settled path ending at `vertex`, source first.
    pub fn unwind(&self, vertex: NodeIndex) -> Option<Vec<NodeIndex>> {
        let mut id = *self.settled.get(&vertex)?;
        let mut path = Vec::new();
        loop {
            let record = &self.visits[id];
            path.push(record.vertex);
            match record.prev {
                Some(prev) => id = prev,
                None => break,
            }
        }
        path.reverse();
        Some(path)
    }
}

#[derive(Copy, Clone, Eq, PartialEq)]
struct State {
    cost: Cost,
    node: NodeIndex,
    edge: Option<EdgeIndex>,
    prev: Option<VisitId>,
}

// Min-heap by cost (reversed from standard Rust BinaryHeap); ties broken by
// node index to keep the settle order deterministic.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.index().cmp(&self.node.index()))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Runs a bounded expansion from the given weighted sources.
///
/// Vertices are settled in non-decreasing cost order. `on_settle` receives
/// the space settled so far plus the id of the vertex just settled and may
/// return `ControlFlow::Break` to end the search; the space built up to that
/// point is still returned. The direction flag selects incoming instead of
/// outgoing edges, which matters once one-way edges exist; path orientation
/// is the caller's concern either way.
///
/// # Errors
///
/// `Error::Cancelled` when the token fires between settlements.
pub fn bounded_search<F>(
    graph: &StreetGraph,
    sources: &[(NodeIndex, Cost)],
    max: Cost,
    backward: bool,
    cancel: &CancelToken,
    mut on_settle: F,
) -> Result<SearchSpace, Error>
where
    F: FnMut(&SearchSpace, VisitId) -> ControlFlow<()>,
{
    let mut space = SearchSpace::default();
    let mut best: HashMap<NodeIndex, Cost> = HashMap::new();
    let mut heap = BinaryHeap::new();

    for &(node, cost) in sources {
        if cost > max {
            continue;
        }
        if best.get(&node).is_none_or(|&known| cost < known) {
            best.insert(node, cost);
            heap.push(State {
                cost,
                node,
                edge: None,
                prev: None,
            });
        }
    }

    let direction = if backward {
        Direction::Incoming
    } else {
        Direction::Outgoing
    };

    while let Some(State {
        cost,
        node,
        edge,
        prev,
    }) = heap.pop()
    {
        // Lazy-decrease: stale heap entries for settled vertices are skipped
        if space.settled.contains_key(&node) {
            continue;
        }
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let id = space.visits.len();
        space.visits.push(VisitRecord {
            vertex: node,
            cost,
            edge,
            prev,
        });
        space.settled.insert(node, id);

        if let ControlFlow::Break(()) = on_settle(&space, id) {
            return Ok(space);
        }

        for incident in graph.graph.edges_directed(node, direction) {
            let next = if incident.source() == node {
                incident.target()
            } else {
                incident.source()
            };
            let next_cost = cost.saturating_add(incident.weight().weight);
            if next_cost > max {
                continue;
            }
            if best.get(&next).is_none_or(|&known| next_cost < known) {
                best.insert(next, next_cost);
                heap.push(State {
                    cost: next_cost,
                    node: next,
                    edge: Some(incident.id()),
                    prev: Some(id),
                });
            }
        }
    }

    Ok(space)
}
