//! Core types for the road simulation
//!
//! Standalone types shared by the graph store, the solver, and the world.

/// Stable handle to a junction in the road graph.
///
/// Handles stay valid across junction deletions, so vehicle paths and
/// predecessor maps never dangle.
pub type JunctionId = petgraph::stable_graph::NodeIndex;

/// A unique identifier for vehicles, issued by the world's sequence generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub u64);

/// A 2D position in the road network plane
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// A junction (intersection) in the road network.
///
/// The name is immutable after creation and unique case-insensitively;
/// the position may change when the junction is relocated.
#[derive(Debug, Clone)]
pub struct Junction {
    pub name: String,
    pub position: Position,
}

impl Junction {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            position: Position::new(x, y),
        }
    }
}

/// Base vehicle speed in world units per second
pub const BASE_VEHICLE_SPEED: f64 = 60.0;
