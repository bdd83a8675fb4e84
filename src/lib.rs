//! Road Network Simulation Library
//!
//! Models a road network as a weighted graph and animates vehicles along
//! shortest paths through it, recomputing routes live as the network changes.
//! Runs headless; rendering and input handling belong to external callers.

pub mod simulation;
