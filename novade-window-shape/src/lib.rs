//! # NovaDE Window Shape (`novade-window-shape`)
//!
//! `novade-window-shape` turns an image into the visible shape of a window.
//! Windows such as clocks, docks and splash screens use it to make parts of
//! their rectangle see-through and click-through.
//!
//! ## Purpose
//!
//! - **Classification**: a [`ShapeMode`] decides per pixel whether it belongs
//!   to the shape, by alpha cutoff or by color key.
//! - **Bitmap masks**: [`build_bitmap`] packs the classification of a whole
//!   surface into a bit-packed [`PackedBitmap`].
//! - **Shape trees**: [`build_tree`] decomposes a surface into a quadtree of
//!   uniformly opaque or transparent rectangles ([`ShapeTree`]), which can be
//!   walked with [`ShapeTree::traverse`] or [`ShapeTree::leaves`].
//! - **Regions**: [`RectRegion::from_tree`] collects the opaque rectangles in
//!   the form a windowing system's clip-region API expects.
//! - **Window lifecycle**: [`ShapedWindowManager`] tracks which windows are
//!   shapeable, parks them off-screen until their first shape, and hands
//!   regions to a [`WindowHost`].
//!
//! Configuration ([`ShapeConfig`]) is loaded from TOML. Diagnostics are emitted
//! through `tracing`; see [`logging`] for a ready-made subscriber.
//!
//! ## Usage
//!
//! ```
//! use novade_window_shape::{build_tree, MemorySurface, PixelFormat, Rgba, ShapeMode};
//!
//! let surface = MemorySurface::from_fn(8, 8, PixelFormat::Argb8888, |x, y| {
//!     if (x as i32 - 4).pow(2) + (y as i32 - 4).pow(2) < 12 {
//!         Rgba::opaque(40, 120, 200)
//!     } else {
//!         Rgba::TRANSPARENT
//!     }
//! });
//!
//! let tree = build_tree(&surface, ShapeMode::Default)?;
//! let mut opaque_area = 0;
//! tree.traverse(|rect, opaque| {
//!     if opaque {
//!         opaque_area += rect.area();
//!     }
//! });
//! assert!(opaque_area > 0 && opaque_area < 64);
//! # Ok::<(), novade_window_shape::ShapeError>(())
//! ```

pub mod bitmap;
pub mod config;
pub mod error;
pub mod logging;
pub mod mode;
pub mod region;
pub mod surface;
pub mod tree;
pub mod types;
pub mod window;

// Re-export key types for convenience
pub use bitmap::{build_bitmap, build_bitmap_with, PackedBitmap};
pub use config::ShapeConfig;
pub use error::{ConfigError, HostError, LoggingError, ShapeError, ShapeResult};
pub use logging::{init_logging, init_minimal_logging};
pub use mode::{classify, Classification, ShapeMode};
pub use region::{RectRegion, RegionEdges};
pub use surface::{MemorySurface, PixelAccess, PixelFormat, ShapeSurface};
pub use tree::{
    build_tree, build_tree_with, Leaves, NodeId, QuadSplit, Quadrants, ShapeNode, ShapeTree,
};
pub use types::{Position, Rect, Rgb, Rgba, Size};
pub use window::{ShapeState, ShapedWindowManager, WindowHost, WindowId, WindowParams};
