//! Main simulation world that ties everything together
//!
//! Owns the road graph and the active vehicles, applies network mutations
//! through an explicit command layer, and runs the route-consistency pass
//! that keeps every in-flight vehicle aligned with the current network.

use std::collections::HashMap;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use rand::SeedableRng;

use super::error::SimError;
use super::graph::RoadGraph;
use super::solver;
use super::types::{JunctionId, VehicleId, BASE_VEHICLE_SPEED};
use super::vehicle::Vehicle;

/// Per-tick probability (percent) of spawning a random vehicle, used by the
/// headless driver
pub const SPAWN_CHANCE_PERCENT: u32 = 5;

/// A single mutation of the road network.
///
/// Commands are applied synchronously by [`SimWorld::apply`]; every command
/// that can invalidate an in-flight route triggers exactly one
/// recomputation pass. Junctions are addressed by name so the command layer
/// is independent of any particular input modality.
#[derive(Debug, Clone)]
pub enum Command {
    AddNode { name: String, x: f64, y: f64 },
    AddEdge { from: String, to: String, weight: f64 },
    SetWeight { from: String, to: String, weight: f64 },
    RemoveEdge { from: String, to: String },
    RemoveNode { name: String },
    MoveNode { name: String, x: f64, y: f64 },
}

/// Lifetime counters for the simulation run
#[derive(Debug, Clone, Copy, Default)]
pub struct SimStats {
    pub vehicles_spawned: usize,
    pub vehicles_arrived: usize,
    pub vehicles_evicted: usize,
}

/// The main simulation world
pub struct SimWorld {
    /// Road network, the single source of truth for topology and weights
    pub graph: RoadGraph,

    /// Active vehicles; everything they hold is derived, recomputable state
    vehicles: HashMap<VehicleId, Vehicle>,

    /// Sequence generator for vehicle ids
    next_id: u64,

    /// Simulation time
    pub time: f64,

    /// Multiplier applied to elapsed time each tick (1.0 = normal)
    pub speed_factor: f64,

    /// Optional seeded RNG for reproducible runs
    rng: Option<StdRng>,

    pub stats: SimStats,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    fn new_internal(rng: Option<StdRng>) -> Self {
        Self {
            graph: RoadGraph::new(),
            vehicles: HashMap::new(),
            next_id: 0,
            time: 0.0,
            speed_factor: 1.0,
            rng,
            stats: SimStats::default(),
        }
    }

    pub fn new() -> Self {
        Self::new_internal(None)
    }

    /// Create a world with a seeded RNG for reproducible simulations
    pub fn new_with_seed(seed: u64) -> Self {
        Self::new_internal(Some(StdRng::seed_from_u64(seed)))
    }

    /// Choose a random element from a slice, using the seeded RNG if present
    fn choose_random<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            return None;
        }
        match &mut self.rng {
            Some(rng) => slice.choose(rng),
            None => slice.choose(&mut rand::rng()),
        }
    }

    /// True with the given percent probability, using the seeded RNG if
    /// present
    pub fn roll_percent(&mut self, percent: u32) -> bool {
        let roll = match &mut self.rng {
            Some(rng) => rng.random_range(1..100),
            None => rand::rng().random_range(1..100),
        };
        roll < percent
    }

    fn next_vehicle_id(&mut self) -> VehicleId {
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Apply one network mutation, then re-route the active vehicles.
    ///
    /// Adding a junction cannot touch any existing route, so it skips the
    /// recomputation pass; every other command runs it once.
    pub fn apply(&mut self, command: Command) -> Result<(), SimError> {
        match command {
            Command::AddNode { name, x, y } => {
                self.graph.add_junction(name, x, y)?;
            }
            Command::AddEdge { from, to, weight } => {
                let a = self.graph.resolve(&from)?;
                let b = self.graph.resolve(&to)?;
                self.graph.add_road(a, b, weight)?;
                self.recalculate_routes();
            }
            Command::SetWeight { from, to, weight } => {
                let a = self.graph.resolve(&from)?;
                let b = self.graph.resolve(&to)?;
                self.graph.set_road_weight(a, b, weight)?;
                self.recalculate_routes();
            }
            Command::RemoveEdge { from, to } => {
                let a = self.graph.resolve(&from)?;
                let b = self.graph.resolve(&to)?;
                self.graph.remove_road(a, b)?;
                self.recalculate_routes();
            }
            Command::RemoveNode { name } => {
                let id = self.graph.resolve(&name)?;
                self.graph.remove_junction(id)?;
                self.recalculate_routes();
            }
            Command::MoveNode { name, x, y } => {
                let id = self.graph.resolve(&name)?;
                self.graph.move_junction(id, x, y)?;
                // Weights are unchanged, but segment lengths under in-flight
                // vehicles shifted with the coordinates.
                self.recalculate_routes();
            }
        }
        Ok(())
    }

    /// Spawn a vehicle routed between two junctions.
    ///
    /// Fails with `NoPathFound` when the endpoints are not connected or when
    /// the route would be trivial (`start == end`).
    pub fn spawn_vehicle(
        &mut self,
        start: JunctionId,
        end: JunctionId,
        speed: f64,
    ) -> Result<VehicleId, SimError> {
        let origin = self.graph.position(start)?;
        self.graph.junction(end)?;

        let table = solver::shortest_paths(&self.graph, start);
        let path = table
            .path_to(end)
            .filter(|path| path.len() >= 2)
            .ok_or_else(|| {
                SimError::NoPathFound(self.junction_label(start), self.junction_label(end))
            })?;

        let id = self.next_vehicle_id();
        info!(
            "vehicle {:?} spawned: {} -> {} over {} junctions",
            id,
            self.junction_label(start),
            self.junction_label(end),
            path.len()
        );

        self.vehicles
            .insert(id, Vehicle::new(id, start, end, path, speed, origin));
        self.stats.vehicles_spawned += 1;
        Ok(id)
    }

    /// Spawn a vehicle between two distinct random junctions at base speed.
    ///
    /// Returns `Ok(None)` when the network has fewer than two junctions or
    /// when the chosen pair happens to be disconnected; neither case is an
    /// error for a random spawner.
    pub fn spawn_random_vehicle(&mut self) -> Result<Option<VehicleId>, SimError> {
        let ids: Vec<JunctionId> = self.graph.junction_ids().collect();
        if ids.len() < 2 {
            return Ok(None);
        }

        let start = match self.choose_random(&ids) {
            Some(&id) => id,
            None => return Ok(None),
        };
        let mut end = start;
        while end == start {
            end = match self.choose_random(&ids) {
                Some(&id) => id,
                None => return Ok(None),
            };
        }

        match self.spawn_vehicle(start, end, BASE_VEHICLE_SPEED) {
            Ok(id) => Ok(Some(id)),
            Err(SimError::NoPathFound(from, to)) => {
                debug!("no route from '{}' to '{}', skipping spawn", from, to);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Re-route every active vehicle from its original endpoints.
    ///
    /// Vehicles restart their journey at the beginning of the newly computed
    /// route; vehicles with no remaining route are evicted. All
    /// recomputations finish before any eviction happens, so removal
    /// decisions cannot observe a half-updated vehicle set.
    pub fn recalculate_routes(&mut self) {
        let mut assignments: Vec<(VehicleId, Vec<JunctionId>)> = Vec::new();
        let mut evicted: Vec<VehicleId> = Vec::new();

        for vehicle in self.vehicles.values() {
            let table = solver::shortest_paths(&self.graph, vehicle.start());
            match table.path_to(vehicle.end()) {
                Some(path) if path.len() >= 2 => assignments.push((vehicle.id, path)),
                _ => evicted.push(vehicle.id),
            }
        }

        for (id, path) in assignments {
            if let Some(vehicle) = self.vehicles.get_mut(&id) {
                vehicle.assign_path(path);
            }
        }

        for id in evicted {
            if let Some(vehicle) = self.vehicles.remove(&id) {
                self.stats.vehicles_evicted += 1;
                warn!(
                    "vehicle {:?} has no route from {} to {} after the network change, removing it",
                    id,
                    self.junction_label(vehicle.start()),
                    self.junction_label(vehicle.end())
                );
            }
        }
    }

    /// Advance every vehicle by one simulation step and remove arrivals.
    ///
    /// `delta` is scaled by the world's speed factor before it reaches the
    /// vehicles.
    pub fn tick(&mut self, delta: f64) {
        self.time += delta;
        let scaled = delta * self.speed_factor;

        let ids: Vec<VehicleId> = self.vehicles.keys().copied().collect();
        let mut arrived: Vec<VehicleId> = Vec::new();
        let mut failed: Vec<VehicleId> = Vec::new();

        for id in ids {
            let Some(vehicle) = self.vehicles.get_mut(&id) else {
                continue;
            };
            match vehicle.advance(&self.graph, scaled) {
                Ok(motion) if motion.arrived => arrived.push(id),
                Ok(_) => {}
                Err(err) => {
                    warn!("vehicle {:?} references a missing junction ({}), removing it", id, err);
                    failed.push(id);
                }
            }
        }

        for id in arrived {
            if let Some(vehicle) = self.vehicles.remove(&id) {
                self.stats.vehicles_arrived += 1;
                info!(
                    "vehicle {:?} arrived at {}",
                    id,
                    self.junction_label(vehicle.end())
                );
            }
        }

        for id in failed {
            if self.vehicles.remove(&id).is_some() {
                self.stats.vehicles_evicted += 1;
            }
        }
    }

    fn junction_label(&self, id: JunctionId) -> String {
        self.graph
            .junction(id)
            .map(|junction| junction.name.clone())
            .unwrap_or_else(|_| format!("#{}", id.index()))
    }

    /// Build a small demo network for headless runs
    pub fn create_demo_world() -> Self {
        Self::build_demo_network(SimWorld::new())
    }

    /// Demo network with a seeded RNG for reproducible runs
    pub fn create_demo_world_with_seed(seed: u64) -> Self {
        Self::build_demo_network(SimWorld::new_with_seed(seed))
    }

    fn build_demo_network(mut world: SimWorld) -> SimWorld {
        let junctions = [
            ("Northgate", 120.0, 40.0),
            ("Eastbridge", 260.0, 110.0),
            ("Southport", 200.0, 240.0),
            ("Westfield", 40.0, 200.0),
            ("Midtown", 150.0, 140.0),
            ("Harborview", 320.0, 220.0),
        ];
        for (name, x, y) in junctions {
            let _ = world.graph.add_junction(name, x, y);
        }

        let roads = [
            ("Northgate", "Eastbridge", 100.0),
            ("Eastbridge", "Southport", 90.0),
            ("Southport", "Westfield", 110.0),
            ("Westfield", "Northgate", 120.0),
            ("Northgate", "Midtown", 60.0),
            ("Midtown", "Southport", 70.0),
            ("Eastbridge", "Harborview", 80.0),
            ("Southport", "Harborview", 95.0),
        ];
        for (from, to, weight) in roads {
            if let (Ok(a), Ok(b)) = (world.graph.resolve(from), world.graph.resolve(to)) {
                let _ = world.graph.add_road(a, b, weight);
            }
        }

        world
    }
}
