//! Opaque-rectangle regions handed to the window host.
//!
//! A [`RectRegion`] is the platform-neutral form of a window's clip region: the
//! opaque leaves of a [`ShapeTree`] in traversal order. Turning it into a native
//! primitive (a Win32 `HRGN`, an X11 shape rectangle list, a Wayland input
//! region) is the host's job.
//!
//! Many native region APIs treat the far edges of a rectangle as exclusive.
//! With [`RegionEdges::Exclusive`] every rectangle is widened by one unit on
//! the right and bottom when it is added, so that the unioned outline matches
//! the source pixels on such hosts.

use serde::{Deserialize, Serialize};

use crate::tree::ShapeTree;
use crate::types::Rect;

/// Edge convention of the host's native region rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionEdges {
    /// Widen every rectangle by one unit in +x and +y.
    #[default]
    Exclusive,
    /// Pass rectangles through unchanged.
    Inclusive,
}

/// An ordered union of opaque rectangles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RectRegion {
    edges: RegionEdges,
    rects: Vec<Rect>,
}

impl RectRegion {
    /// Creates an empty region.
    pub fn new(edges: RegionEdges) -> Self {
        Self {
            edges,
            rects: Vec::new(),
        }
    }

    /// Collects the opaque leaves of `tree`. Transparent leaves are skipped.
    pub fn from_tree(tree: &ShapeTree, edges: RegionEdges) -> Self {
        let mut region = Self::new(edges);
        tree.traverse(|rect, opaque| {
            if opaque {
                region.union_rect(rect);
            }
        });
        region
    }

    /// Adds a rectangle to the union. Empty rectangles are ignored.
    pub fn union_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let rect = match self.edges {
            RegionEdges::Exclusive => Rect::new(rect.x, rect.y, rect.w + 1, rect.h + 1),
            RegionEdges::Inclusive => rect,
        };
        self.rects.push(rect);
    }

    /// The edge convention rectangles were adjusted for.
    pub fn edges(&self) -> RegionEdges {
        self.edges
    }

    /// The rectangles in the order they were added.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Number of rectangles.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Whether the region holds no rectangles, i.e. the window is fully cut away.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Bounding box of all rectangles.
    pub fn bounds(&self) -> Option<Rect> {
        self.rects.iter().copied().reduce(|acc, rect| acc.union(&rect))
    }

    /// Whether any rectangle contains `(x, y)`.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.rects.iter().any(|rect| rect.contains(x, y))
    }
}
