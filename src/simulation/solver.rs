//! Single-source shortest paths over the road graph
//!
//! Dijkstra with a lazy-deletion binary heap: stale entries are skipped on
//! pop instead of being decreased in place. Equal distances are disambiguated
//! by an insertion sequence number, so same-cost entries never overwrite each
//! other and the heap ordering stays total.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use ordered_float::OrderedFloat;

use super::graph::RoadGraph;
use super::types::JunctionId;

/// Result of one solver run from a single source junction.
///
/// Distances default to +infinity and predecessors to `None` for junctions
/// the search never reached. The table is discarded after path
/// reconstruction; it is never cached across graph mutations.
pub struct RouteTable {
    source: JunctionId,
    distances: HashMap<JunctionId, f64>,
    predecessors: HashMap<JunctionId, JunctionId>,
}

impl RouteTable {
    pub fn source(&self) -> JunctionId {
        self.source
    }

    /// Shortest known distance from the source; +infinity when unreached
    pub fn distance(&self, id: JunctionId) -> f64 {
        self.distances.get(&id).copied().unwrap_or(f64::INFINITY)
    }

    pub fn predecessor(&self, id: JunctionId) -> Option<JunctionId> {
        self.predecessors.get(&id).copied()
    }

    /// Reconstruct the path from the source to `end` by walking predecessor
    /// links backward, then reversing.
    ///
    /// Returns `None` when the predecessor chain never reaches the source.
    /// Asking for the source itself yields the trivial length-1 sequence,
    /// which is not a usable vehicle route.
    pub fn path_to(&self, end: JunctionId) -> Option<Vec<JunctionId>> {
        if end == self.source {
            return Some(vec![self.source]);
        }

        let mut path = vec![end];
        let mut current = end;
        while let Some(previous) = self.predecessor(current) {
            path.push(previous);
            if previous == self.source {
                path.reverse();
                return Some(path);
            }
            current = previous;
        }
        None
    }
}

/// Compute shortest distances and predecessor links from `start` to every
/// junction reachable from it.
pub fn shortest_paths(graph: &RoadGraph, start: JunctionId) -> RouteTable {
    let mut distances: HashMap<JunctionId, f64> = graph
        .junction_ids()
        .map(|id| (id, f64::INFINITY))
        .collect();
    let mut predecessors: HashMap<JunctionId, JunctionId> = HashMap::new();

    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, u64, JunctionId)>> = BinaryHeap::new();
    let mut sequence: u64 = 0;

    if distances.contains_key(&start) {
        distances.insert(start, 0.0);
        heap.push(Reverse((OrderedFloat(0.0), sequence, start)));
    }

    while let Some(Reverse((OrderedFloat(distance), _, id))) = heap.pop() {
        // Stale entry: a shorter route to this junction was already settled
        if distance > distance_of(&distances, id) {
            continue;
        }

        for (neighbor, weight) in graph.outgoing(id) {
            let candidate = distance + weight;
            if candidate < distance_of(&distances, neighbor) {
                distances.insert(neighbor, candidate);
                predecessors.insert(neighbor, id);
                sequence += 1;
                heap.push(Reverse((OrderedFloat(candidate), sequence, neighbor)));
            }
        }
    }

    RouteTable {
        source: start,
        distances,
        predecessors,
    }
}

fn distance_of(distances: &HashMap<JunctionId, f64>, id: JunctionId) -> f64 {
    distances.get(&id).copied().unwrap_or(f64::INFINITY)
}
