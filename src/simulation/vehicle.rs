//! Vehicle kinematics
//!
//! Advances one vehicle along its assigned path given elapsed time and
//! reports arrival. A vehicle is either traveling along a segment of its
//! path or arrived; there are no other states.

use super::error::SimError;
use super::graph::RoadGraph;
use super::types::{JunctionId, Position, VehicleId};

/// Where a vehicle ended up after one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub position: Position,
    pub arrived: bool,
}

/// A vehicle following a path at constant speed.
///
/// `start` and `end` record the original route request and never change;
/// the path itself is replaced wholesale by the coordinator whenever the
/// network mutates.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub speed: f64,
    start: JunctionId,
    end: JunctionId,
    path: Vec<JunctionId>,
    segment: usize,
    offset: f64,
    position: Position,
}

impl Vehicle {
    pub(crate) fn new(
        id: VehicleId,
        start: JunctionId,
        end: JunctionId,
        path: Vec<JunctionId>,
        speed: f64,
        origin: Position,
    ) -> Self {
        Self {
            id,
            speed,
            start,
            end,
            path,
            segment: 0,
            offset: 0.0,
            position: origin,
        }
    }

    pub fn start(&self) -> JunctionId {
        self.start
    }

    pub fn end(&self) -> JunctionId {
        self.end
    }

    pub fn path(&self) -> &[JunctionId] {
        &self.path
    }

    /// Progress cursor as `(segment index, distance along segment)`
    pub fn cursor(&self) -> (usize, f64) {
        (self.segment, self.offset)
    }

    /// Last computed position
    pub fn position(&self) -> Position {
        self.position
    }

    /// Replace the route and restart the journey from its beginning
    pub(crate) fn assign_path(&mut self, path: Vec<JunctionId>) {
        self.path = path;
        self.segment = 0;
        self.offset = 0.0;
    }

    /// Advance along the current path by `speed * delta`.
    ///
    /// At most one segment boundary is crossed per call; distance left over
    /// after crossing a boundary is dropped rather than carried into the
    /// next segment. This under-advances for very large deltas and is a
    /// known approximation.
    ///
    /// Calling this again after arrival keeps returning the terminal
    /// position with `arrived` set.
    pub fn advance(&mut self, graph: &RoadGraph, delta: f64) -> Result<Motion, SimError> {
        if self.path.len() < 2 || self.segment >= self.path.len() - 1 {
            let terminal = graph.position(self.end)?;
            self.position = terminal;
            return Ok(Motion {
                position: terminal,
                arrived: true,
            });
        }

        let from = graph.position(self.path[self.segment])?;
        let to = graph.position(self.path[self.segment + 1])?;
        let segment_length = from.distance(&to);

        self.offset += self.speed * delta;

        if self.offset >= segment_length {
            self.segment += 1;
            self.offset = 0.0;

            if self.segment >= self.path.len() - 1 {
                let terminal = graph.position(self.path[self.segment])?;
                self.position = terminal;
                return Ok(Motion {
                    position: terminal,
                    arrived: true,
                });
            }
        }

        let from = graph.position(self.path[self.segment])?;
        let to = graph.position(self.path[self.segment + 1])?;
        let span = from.distance(&to);

        // Coincident junctions make a zero-length segment; snap to its far
        // end instead of dividing by zero.
        let progress = if span > 0.0 { self.offset / span } else { 1.0 };
        self.position = from.lerp(&to, progress);

        Ok(Motion {
            position: self.position,
            arrived: false,
        })
    }
}
