//! Raw payloads to canonical targets.

pub(crate) mod hints;
pub(crate) mod interactive;
pub(crate) mod metadata;
/// Entry point: [`pass::normalize`].
pub mod pass;
pub(crate) mod record;
pub(crate) mod tree;
