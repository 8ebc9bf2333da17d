//! Plain data types shared by the shape engine.
//!
//! - **Geometry**: [`Rect`] for pixel regions, [`Position`] and [`Size`] for windows.
//! - **Color**: [`Rgba`] pixels and [`Rgb`] color keys.

pub mod color;
pub mod geometry;

pub use color::{Rgb, Rgba};
pub use geometry::{Position, Rect, Size};
