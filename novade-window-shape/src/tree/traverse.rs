//! Leaf traversal.
//!
//! Both forms walk the tree pre-order and visit quad children up-left,
//! up-right, down-left, down-right. Region builders rely on this order to
//! union rectangles deterministically.

use super::{NodeId, ShapeNode, ShapeTree};
use crate::types::Rect;

impl ShapeTree {
    /// Calls `visitor(rect, is_opaque)` for every leaf.
    ///
    /// A freed tree has no leaves.
    pub fn traverse<F>(&self, mut visitor: F)
    where
        F: FnMut(Rect, bool),
    {
        if let Some(root) = self.root {
            self.visit(root, &mut visitor);
        }
    }

    fn visit<F>(&self, id: NodeId, visitor: &mut F)
    where
        F: FnMut(Rect, bool),
    {
        match self.node(id) {
            Some(ShapeNode::Leaf {
                classification,
                rect,
            }) => visitor(*rect, classification.is_opaque()),
            Some(ShapeNode::Quad(children)) => {
                for child in children.iter() {
                    self.visit(child, visitor);
                }
            }
            None => {}
        }
    }

    /// Lazy iterator over `(rect, is_opaque)` for every leaf, in traversal order.
    ///
    /// Each call starts a fresh walk.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            tree: self,
            stack: self.root.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ShapeTree {
    type Item = (Rect, bool);
    type IntoIter = Leaves<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.leaves()
    }
}

/// Iterator returned by [`ShapeTree::leaves`].
#[derive(Debug, Clone)]
pub struct Leaves<'a> {
    tree: &'a ShapeTree,
    stack: Vec<NodeId>,
}

impl Iterator for Leaves<'_> {
    type Item = (Rect, bool);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            match self.tree.node(id) {
                Some(ShapeNode::Leaf {
                    classification,
                    rect,
                }) => return Some((*rect, classification.is_opaque())),
                Some(ShapeNode::Quad(children)) => {
                    // Reversed so the up-left child is popped first.
                    self.stack
                        .extend(children.to_array().into_iter().rev().flatten());
                }
                None => {}
            }
        }
        None
    }
}
