//! Error taxonomy for the simulation core
//!
//! Every variant is a local, recoverable condition. A rejected operation
//! leaves the graph store unchanged; nothing here is fatal to the core.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A junction with the same case-insensitive name already exists
    #[error("a junction named '{0}' already exists")]
    DuplicateIdentity(String),

    /// An operation referenced something that is not in the road network
    #[error("not found in the road network: {0}")]
    UnknownNode(String),

    /// Road weights must be strictly positive
    #[error("invalid road weight {0}; weights must be positive")]
    InvalidWeight(f64),

    /// The solver could not connect the requested endpoints
    #[error("no path found from '{0}' to '{1}'")]
    NoPathFound(String, String),
}
