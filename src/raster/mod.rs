//! Screenshot decoding and pixel sampling used when structural colors are unavailable.

/// zlib / deflate decompression.
pub mod inflate;
/// PNG container and scanline reconstruction.
pub mod png;
/// Ring and glyph-region sampling.
pub mod sampler;
