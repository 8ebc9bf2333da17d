//! Default configuration values.
//!
//! Used by `serde`'s `default` attribute on [`ShapeConfig`](super::ShapeConfig)
//! fields so a partial file only overrides what it names.

use crate::bitmap::DEFAULT_PIXELS_PER_BYTE;
use crate::mode::ShapeMode;
use crate::region::RegionEdges;
use crate::tree::QuadSplit;
use crate::types::Position;

/// Returns the default packing density (8 pixels per byte).
pub(super) fn default_pixels_per_byte() -> u8 {
    DEFAULT_PIXELS_PER_BYTE
}

/// Returns the default quadrant split ([`QuadSplit::Cover`]).
pub(super) fn default_quad_split() -> QuadSplit {
    QuadSplit::Cover
}

/// Returns the off-screen position windows wait at until their first shape.
pub(super) fn default_parked_position() -> Position {
    Position::new(-1000, -1000)
}

/// Returns the default region edge convention ([`RegionEdges::Exclusive`]).
pub(super) fn default_region_edges() -> RegionEdges {
    RegionEdges::Exclusive
}

/// Returns the default shape mode ([`ShapeMode::Default`]).
pub(super) fn default_mode() -> ShapeMode {
    ShapeMode::Default
}
