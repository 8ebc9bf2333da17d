//! Shaped-window lifecycle.
//!
//! [`ShapedWindowManager`] tracks the shape state of every window it created
//! and drives the tree builder and region collection whenever a window's shape
//! surface changes. It talks to the actual windowing system only through the
//! [`WindowHost`] trait.
//!
//! A shapeable window starts parked off-screen in the
//! [`ShapeState::ShapeableNoShape`] state so the full rectangular window never
//! flashes on screen. The first successful [`ShapedWindowManager::set_shape`]
//! moves it to the position originally requested.

pub mod data_types;
pub mod host;
pub mod manager;

pub use data_types::{ShapeState, WindowId, WindowParams};
pub use host::WindowHost;
pub use manager::ShapedWindowManager;
