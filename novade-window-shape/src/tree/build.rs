//! Recursive quadtree construction.

use tracing::{debug, instrument};

use super::{NodeId, QuadSplit, Quadrants, ShapeNode, ShapeTree};
use crate::error::{ShapeError, ShapeResult};
use crate::mode::{Classification, ShapeMode};
use crate::surface::{ensure_shapeable, PixelAccess, ShapeSurface};
use crate::types::Rect;

/// Builds the shape tree of `surface` with the default [`QuadSplit::Cover`] split.
pub fn build_tree<S: ShapeSurface>(surface: &S, mode: ShapeMode) -> ShapeResult<ShapeTree> {
    build_tree_with(surface, mode, QuadSplit::default())
}

/// Builds the shape tree of `surface` classified by `mode`.
///
/// Each rectangle is scanned row-major. The scan stops at the first pixel
/// whose classification differs from the first pixel's, and the rectangle is
/// split into quadrants which are built the same way. A scan that completes
/// yields a leaf.
///
/// # Errors
/// - [`ShapeError::InvalidArgument`] if the surface is empty or its format
///   cannot express `mode`.
/// - [`ShapeError::OutOfMemory`] if the node arena cannot grow; the partially
///   built arena is released before returning.
#[instrument(
    level = "debug",
    skip(surface),
    fields(width = surface.width(), height = surface.height())
)]
pub fn build_tree_with<S: ShapeSurface>(
    surface: &S,
    mode: ShapeMode,
    split: QuadSplit,
) -> ShapeResult<ShapeTree> {
    ensure_shapeable(surface, mode)?;
    let bounds = Rect::from_size(surface.width(), surface.height());

    let pixels = surface.lock()?;
    let mut builder = Builder {
        pixels: &pixels,
        mode,
        split,
        nodes: Vec::new(),
    };
    let root = builder.build(bounds)?;
    let nodes = builder.nodes;
    drop(pixels);

    debug!(nodes = nodes.len(), %mode, ?split, "Built shape tree");
    Ok(ShapeTree::from_parts(bounds, split, nodes, root))
}

enum Scan {
    Uniform(Classification),
    Mixed,
}

struct Builder<'p, P> {
    pixels: &'p P,
    mode: ShapeMode,
    split: QuadSplit,
    nodes: Vec<ShapeNode>,
}

impl<P: PixelAccess> Builder<'_, P> {
    fn build(&mut self, rect: Rect) -> ShapeResult<NodeId> {
        match self.scan(rect) {
            Scan::Uniform(classification) => self.push(ShapeNode::Leaf {
                classification,
                rect,
            }),
            Scan::Mixed => {
                let [up_left, up_right, down_left, down_right] = self.split.quadrants(rect);
                let quadrants = Quadrants {
                    up_left: self.build_quadrant(up_left)?,
                    up_right: self.build_quadrant(up_right)?,
                    down_left: self.build_quadrant(down_left)?,
                    down_right: self.build_quadrant(down_right)?,
                };
                self.push(ShapeNode::Quad(quadrants))
            }
        }
    }

    fn build_quadrant(&mut self, rect: Rect) -> ShapeResult<Option<NodeId>> {
        if rect.is_empty() {
            return Ok(None);
        }
        self.build(rect).map(Some)
    }

    /// `rect` is non-empty.
    fn scan(&self, rect: Rect) -> Scan {
        let first = self.mode.classify(self.pixels.pixel(rect.x, rect.y));
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                if self.mode.classify(self.pixels.pixel(x, y)) != first {
                    return Scan::Mixed;
                }
            }
        }
        Scan::Uniform(first.into())
    }

    fn push(&mut self, node: ShapeNode) -> ShapeResult<NodeId> {
        self.nodes
            .try_reserve(1)
            .map_err(|_| ShapeError::OutOfMemory)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        Ok(id)
    }
}
