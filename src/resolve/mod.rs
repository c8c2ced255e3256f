//! Effective background resolution through transparent layering.

/// Ancestor/sibling walk and overlay compositing.
pub mod background;
