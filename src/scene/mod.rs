//! Boundary payload types and the canonical node model.

/// Canonical nodes and targets.
pub mod model;
/// Raw payload shapes delivered by the data-fetch collaborator.
pub mod payload;
