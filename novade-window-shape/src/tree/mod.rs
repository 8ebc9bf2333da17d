//! The shape quadtree.
//!
//! A [`ShapeTree`] decomposes a surface into rectangles that are uniformly
//! opaque or uniformly transparent. Interior [`ShapeNode::Quad`] nodes split
//! their rectangle into four quadrants; [`ShapeNode::Leaf`] nodes carry the
//! classification of their whole rectangle.
//!
//! Nodes live in an arena owned by the tree and refer to their children by
//! [`NodeId`]. Children are always stored before their parent, so dropping the
//! arena (or calling [`ShapeTree::free`]) tears the tree down children-first.
//!
//! ```
//! use novade_window_shape::{build_tree, MemorySurface, PixelFormat, Rect, Rgba, ShapeMode};
//!
//! let surface = MemorySurface::from_fn(4, 4, PixelFormat::Argb8888, |x, _| {
//!     if x < 2 { Rgba::opaque(255, 255, 255) } else { Rgba::TRANSPARENT }
//! });
//! let tree = build_tree(&surface, ShapeMode::Default).unwrap();
//!
//! let opaque: Vec<Rect> = tree.leaves().filter(|&(_, o)| o).map(|(r, _)| r).collect();
//! assert_eq!(opaque, vec![Rect::new(0, 0, 2, 2), Rect::new(0, 2, 2, 2)]);
//! ```

mod build;
mod traverse;

pub use build::{build_tree, build_tree_with};
pub use traverse::Leaves;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::mode::Classification;
use crate::types::Rect;

/// Index of a node inside its [`ShapeTree`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// How a non-uniform rectangle is divided into quadrants.
///
/// With [`QuadSplit::Cover`] the four quadrants tile their parent exactly. With
/// [`QuadSplit::Truncate`] every quadrant is `w / 2` × `h / 2`, so the last
/// column of an odd-width rectangle and the last row of an odd-height one are
/// left out of the tree; those pixels end up in no leaf at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuadSplit {
    /// Right and bottom quadrants absorb the odd column and row.
    #[default]
    Cover,
    /// Quadrants are all half-size, rounded down.
    Truncate,
}

impl QuadSplit {
    /// Quadrant rectangles of `rect`, in up-left, up-right, down-left,
    /// down-right order. Some may be empty.
    pub fn quadrants(self, rect: Rect) -> [Rect; 4] {
        let half_w = rect.w / 2;
        let half_h = rect.h / 2;
        let (right_w, bottom_h) = match self {
            QuadSplit::Cover => (rect.w - half_w, rect.h - half_h),
            QuadSplit::Truncate => (half_w, half_h),
        };
        let mid_x = rect.x + half_w;
        let mid_y = rect.y + half_h;
        [
            Rect::new(rect.x, rect.y, half_w, half_h),
            Rect::new(mid_x, rect.y, right_w, half_h),
            Rect::new(rect.x, mid_y, half_w, bottom_h),
            Rect::new(mid_x, mid_y, right_w, bottom_h),
        ]
    }
}

/// The four children of a [`ShapeNode::Quad`].
///
/// A quadrant is `None` when its rectangle is empty, which happens when a
/// one-pixel-thick strip is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quadrants {
    pub up_left: Option<NodeId>,
    pub up_right: Option<NodeId>,
    pub down_left: Option<NodeId>,
    pub down_right: Option<NodeId>,
}

impl Quadrants {
    /// Children in traversal order.
    pub const fn to_array(self) -> [Option<NodeId>; 4] {
        [self.up_left, self.up_right, self.down_left, self.down_right]
    }

    /// Present children in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> {
        self.to_array().into_iter().flatten()
    }
}

/// A node of the shape tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeNode {
    /// A non-empty rectangle with a single classification.
    Leaf {
        classification: Classification,
        rect: Rect,
    },
    /// A rectangle split into four quadrants.
    Quad(Quadrants),
}

/// A quadtree decomposition of a shape surface.
///
/// The tree is built by [`build_tree`] and exclusively owned by its caller.
/// It can be traversed any number of times; [`free`](Self::free) or dropping
/// it releases every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeTree {
    bounds: Rect,
    split: QuadSplit,
    nodes: Vec<ShapeNode>,
    root: Option<NodeId>,
}

impl ShapeTree {
    pub(crate) fn from_parts(
        bounds: Rect,
        split: QuadSplit,
        nodes: Vec<ShapeNode>,
        root: NodeId,
    ) -> Self {
        Self {
            bounds,
            split,
            nodes,
            root: Some(root),
        }
    }

    /// The surface rectangle the tree was built over.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The quadrant split the tree was built with.
    pub fn split(&self) -> QuadSplit {
        self.split
    }

    /// The root node, or `None` once the tree has been freed.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&ShapeNode> {
        self.nodes.get(id.0)
    }

    /// Total number of nodes, interior and leaf.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaf nodes.
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, ShapeNode::Leaf { .. }))
            .count()
    }

    /// Whether [`free`](Self::free) has released the nodes.
    pub fn is_freed(&self) -> bool {
        self.root.is_none()
    }

    /// Releases every node. Calling this on an already freed tree does nothing.
    pub fn free(&mut self) {
        if self.root.take().is_some() {
            trace!(nodes = self.nodes.len(), "Freeing shape tree");
        }
        self.nodes = Vec::new();
    }

    /// Classification of the leaf covering `(x, y)`, if any leaf covers it.
    pub fn classification_at(&self, x: u32, y: u32) -> Option<Classification> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let mut rect = self.bounds;
        let mut id = self.root?;
        loop {
            match self.node(id)? {
                ShapeNode::Leaf { classification, .. } => return Some(*classification),
                ShapeNode::Quad(children) => {
                    let quadrants = self.split.quadrants(rect);
                    let (child_rect, child) = quadrants
                        .into_iter()
                        .zip(children.to_array())
                        .find(|(r, _)| r.contains(x, y))?;
                    rect = child_rect;
                    id = child?;
                }
            }
        }
    }

    /// Whether `(x, y)` lies in an opaque leaf.
    pub fn contains_opaque(&self, x: u32, y: u32) -> bool {
        self.classification_at(x, y)
            .is_some_and(Classification::is_opaque)
    }
}
