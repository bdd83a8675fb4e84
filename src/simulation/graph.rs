//! Road network graph store
//!
//! Owns the junctions and roads. The graph is logically undirected but every
//! connection is stored as two directed edges of equal weight, so the solver
//! can treat outgoing-edge lookups uniformly. petgraph's stable graph keeps
//! junction handles valid across deletions.

use std::collections::HashMap;

use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use petgraph::visit::IntoEdgeReferences;

use super::error::SimError;
use super::types::{Junction, JunctionId, Position};

#[derive(Default)]
pub struct RoadGraph {
    graph: StableDiGraph<Junction, f64>,

    /// Lowercased name -> junction handle, enforcing case-insensitive
    /// uniqueness
    names: HashMap<String, JunctionId>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a junction to the network.
    ///
    /// Fails with `DuplicateIdentity` if a junction with the same
    /// case-insensitive name already exists.
    pub fn add_junction(
        &mut self,
        name: impl Into<String>,
        x: f64,
        y: f64,
    ) -> Result<JunctionId, SimError> {
        let name = name.into();
        let key = name.to_lowercase();
        if self.names.contains_key(&key) {
            return Err(SimError::DuplicateIdentity(name));
        }

        let id = self.graph.add_node(Junction::new(name, x, y));
        self.names.insert(key, id);
        Ok(id)
    }

    pub fn junction(&self, id: JunctionId) -> Result<&Junction, SimError> {
        self.graph
            .node_weight(id)
            .ok_or_else(|| SimError::UnknownNode(format!("junction #{}", id.index())))
    }

    /// Look up a junction handle by name, case-insensitively
    pub fn resolve(&self, name: &str) -> Result<JunctionId, SimError> {
        self.names
            .get(&name.to_lowercase())
            .copied()
            .ok_or_else(|| SimError::UnknownNode(format!("junction '{}'", name)))
    }

    pub fn contains(&self, id: JunctionId) -> bool {
        self.graph.contains_node(id)
    }

    pub fn position(&self, id: JunctionId) -> Result<Position, SimError> {
        self.junction(id).map(|junction| junction.position)
    }

    /// True if a road connects the two junctions in either direction
    pub fn connected(&self, a: JunctionId, b: JunctionId) -> bool {
        self.graph.find_edge(a, b).is_some() || self.graph.find_edge(b, a).is_some()
    }

    /// Add a road between two junctions, inserting its mirror as well.
    ///
    /// Fails with `UnknownNode` if either endpoint is absent and with
    /// `InvalidWeight` for a non-positive weight. Adding a road where one
    /// already exists in either direction is a no-op; callers that want to
    /// surface the duplicate check it with [`RoadGraph::connected`] first.
    pub fn add_road(&mut self, a: JunctionId, b: JunctionId, weight: f64) -> Result<(), SimError> {
        self.junction(a)?;
        self.junction(b)?;
        if weight <= 0.0 {
            return Err(SimError::InvalidWeight(weight));
        }
        if self.connected(a, b) {
            return Ok(());
        }

        self.graph.add_edge(a, b, weight);
        self.graph.add_edge(b, a, weight);
        Ok(())
    }

    /// Remove the road between two junctions, both directions at once.
    ///
    /// Fails with `UnknownNode` if no road connects the pair.
    pub fn remove_road(&mut self, a: JunctionId, b: JunctionId) -> Result<(), SimError> {
        let forward = self.graph.find_edge(a, b);
        let backward = self.graph.find_edge(b, a);
        if forward.is_none() && backward.is_none() {
            return Err(self.missing_road(a, b));
        }

        for edge in [forward, backward].into_iter().flatten() {
            self.graph.remove_edge(edge);
        }
        Ok(())
    }

    /// Remove a junction together with every road touching it.
    ///
    /// Incident edges in both directions go with the node in one step, so no
    /// caller can observe a half-removed junction.
    pub fn remove_junction(&mut self, id: JunctionId) -> Result<Junction, SimError> {
        let junction = self
            .graph
            .remove_node(id)
            .ok_or_else(|| SimError::UnknownNode(format!("junction #{}", id.index())))?;
        self.names.remove(&junction.name.to_lowercase());
        Ok(junction)
    }

    /// Update the weight of the road between two junctions, keeping the
    /// mirror edge equal so undirected distances stay symmetric.
    pub fn set_road_weight(
        &mut self,
        a: JunctionId,
        b: JunctionId,
        weight: f64,
    ) -> Result<(), SimError> {
        if weight <= 0.0 {
            return Err(SimError::InvalidWeight(weight));
        }

        let forward = self.graph.find_edge(a, b);
        let backward = self.graph.find_edge(b, a);
        if forward.is_none() && backward.is_none() {
            return Err(self.missing_road(a, b));
        }

        for edge in [forward, backward].into_iter().flatten() {
            self.graph[edge] = weight;
        }
        Ok(())
    }

    /// Relocate a junction. Road weights are untouched; segment lengths seen
    /// by vehicles change implicitly through the coordinates.
    pub fn move_junction(&mut self, id: JunctionId, x: f64, y: f64) -> Result<(), SimError> {
        let junction = self
            .graph
            .node_weight_mut(id)
            .ok_or_else(|| SimError::UnknownNode(format!("junction #{}", id.index())))?;
        junction.position = Position::new(x, y);
        Ok(())
    }

    /// Weight of the directed edge from `a` to `b`, if present
    pub fn weight(&self, a: JunctionId, b: JunctionId) -> Option<f64> {
        self.graph
            .find_edge(a, b)
            .and_then(|edge| self.graph.edge_weight(edge))
            .copied()
    }

    /// Sum of edge weights along a node sequence; `None` if any hop has no
    /// road
    pub fn path_cost(&self, path: &[JunctionId]) -> Option<f64> {
        path.windows(2)
            .map(|pair| self.weight(pair[0], pair[1]))
            .sum()
    }

    /// Outgoing roads from a junction as `(neighbor, weight)` pairs
    pub fn outgoing(&self, id: JunctionId) -> impl Iterator<Item = (JunctionId, f64)> + '_ {
        self.graph
            .edges(id)
            .map(|edge| (edge.target(), *edge.weight()))
    }

    pub fn junction_ids(&self) -> impl Iterator<Item = JunctionId> + '_ {
        self.graph.node_indices()
    }

    pub fn junctions(&self) -> impl Iterator<Item = (JunctionId, &Junction)> + '_ {
        self.graph
            .node_indices()
            .filter_map(|id| self.graph.node_weight(id).map(|junction| (id, junction)))
    }

    /// Logical (undirected) roads, one entry per mirrored pair
    pub fn roads(&self) -> impl Iterator<Item = (JunctionId, JunctionId, f64)> + '_ {
        self.graph
            .edge_references()
            .filter(|edge| edge.source().index() < edge.target().index())
            .map(|edge| (edge.source(), edge.target(), *edge.weight()))
    }

    pub fn junction_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of logical roads; each is stored as two directed edges
    pub fn road_count(&self) -> usize {
        self.graph.edge_count() / 2
    }

    fn missing_road(&self, a: JunctionId, b: JunctionId) -> SimError {
        let describe = |id: JunctionId| {
            self.graph
                .node_weight(id)
                .map(|junction| junction.name.clone())
                .unwrap_or_else(|| format!("#{}", id.index()))
        };
        SimError::UnknownNode(format!("road between '{}' and '{}'", describe(a), describe(b)))
    }
}
