use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::mode::ShapeMode;
use crate::tree::ShapeTree;
use crate::types::{Position, Size};

/// Identifier of a window tracked by the shaped window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    /// Creates a new, process-unique `WindowId`.
    pub fn new_unique() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        WindowId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Parameters for creating a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowParams {
    /// Window title.
    pub title: String,
    /// Requested on-screen position of the top-left corner.
    pub position: Position,
    /// Client-area size. Shape surfaces must match it exactly.
    pub size: Size,
}

impl WindowParams {
    /// Creates window parameters.
    pub fn new(title: impl Into<String>, position: Position, size: Size) -> Self {
        Self {
            title: title.into(),
            position,
            size,
        }
    }
}

/// Shape state of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShapeState {
    /// The window cannot be shaped.
    #[default]
    NotShapeable,
    /// The window accepts a shape but none is active; it is parked off-screen.
    ShapeableNoShape,
    /// A shape is active and the window is at its requested position.
    HasShape,
}

/// Per-window record kept by the manager.
#[derive(Debug)]
pub(crate) struct WindowShape {
    pub(crate) state: ShapeState,
    pub(crate) size: Size,
    /// Where the host currently has the window.
    pub(crate) position: Position,
    /// Position to restore once the next shape is applied, while parked.
    pub(crate) deferred_position: Option<Position>,
    pub(crate) mode: Option<ShapeMode>,
    pub(crate) tree: Option<ShapeTree>,
}

impl WindowShape {
    pub(crate) fn plain(params: &WindowParams) -> Self {
        Self {
            state: ShapeState::NotShapeable,
            size: params.size,
            position: params.position,
            deferred_position: None,
            mode: None,
            tree: None,
        }
    }

    pub(crate) fn parked(params: &WindowParams, parked_at: Position) -> Self {
        Self {
            state: ShapeState::ShapeableNoShape,
            size: params.size,
            position: parked_at,
            deferred_position: Some(params.position),
            mode: None,
            tree: None,
        }
    }

    /// The position the user asked for, whether or not the window is parked.
    pub(crate) fn requested_position(&self) -> Position {
        self.deferred_position.unwrap_or(self.position)
    }
}
