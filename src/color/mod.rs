//! Color math, parsing, and design-token palettes.

/// Luminance, contrast ratio, compositing, and large-text classification.
pub mod contrast;
/// Color parsing for payload, hint, and token representations.
pub mod parse;
/// Named design-token palettes.
pub mod tokens;
