//! Standalone road-network simulation module
//!
//! The core routing-and-simulation engine: the graph store, the
//! shortest-path solver, vehicle kinematics, and the route-consistency pass
//! that keeps in-flight vehicles aligned with a changing network. Everything
//! here runs headless and is driven synchronously by the caller.

mod error;
mod graph;
mod solver;
mod types;
mod vehicle;
mod world;

pub use error::SimError;
pub use graph::RoadGraph;
pub use solver::{shortest_paths, RouteTable};
pub use types::{Junction, JunctionId, Position, VehicleId, BASE_VEHICLE_SPEED};
pub use vehicle::{Motion, Vehicle};
pub use world::{Command, SimStats, SimWorld, SPAWN_CHANCE_PERCENT};
