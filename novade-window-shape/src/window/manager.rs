use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::data_types::{ShapeState, WindowId, WindowParams, WindowShape};
use super::host::WindowHost;
use crate::bitmap::build_bitmap_with;
use crate::config::ShapeConfig;
use crate::error::{ShapeError, ShapeResult};
use crate::mode::ShapeMode;
use crate::region::RectRegion;
use crate::surface::ShapeSurface;
use crate::tree::{build_tree_with, ShapeTree};
use crate::types::{Position, Size};

/// Tracks the shape state of windows and applies their shapes through a [`WindowHost`].
///
/// Every operation runs synchronously on the caller's thread. Swapping a
/// window's shape (build the new tree, hand its region to the host, drop the
/// old tree) happens under `&mut self`, so it cannot interleave with another
/// shape change of the same manager.
#[derive(Debug)]
pub struct ShapedWindowManager<H: WindowHost> {
    host: H,
    config: ShapeConfig,
    windows: HashMap<WindowId, WindowShape>,
}

impl<H: WindowHost> ShapedWindowManager<H> {
    /// Creates a manager with the default [`ShapeConfig`].
    pub fn new(host: H) -> Self {
        Self::with_config(host, ShapeConfig::default())
    }

    /// Creates a manager with an explicit configuration.
    pub fn with_config(host: H, config: ShapeConfig) -> Self {
        Self {
            host,
            config,
            windows: HashMap::new(),
        }
    }

    /// The window host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the window host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The active configuration.
    pub fn config(&self) -> &ShapeConfig {
        &self.config
    }

    /// Creates an ordinary, non-shapeable window at its requested position.
    pub fn create_window(&mut self, params: WindowParams) -> ShapeResult<WindowId> {
        let id = WindowId::new_unique();
        self.host.create_window(id, &params)?;
        self.windows.insert(id, WindowShape::plain(&params));
        debug!(window = %id, title = %params.title, "Created non-shapeable window");
        Ok(id)
    }

    /// Creates a shapeable window.
    ///
    /// The host window is created at the configured parked position; the
    /// requested position is applied by the first successful
    /// [`set_shape`](Self::set_shape).
    pub fn create_shapeable(&mut self, params: WindowParams) -> ShapeResult<WindowId> {
        let id = WindowId::new_unique();
        let parked_at = self.config.parked_position;
        let host_params = WindowParams {
            position: parked_at,
            ..params.clone()
        };
        self.host.create_window(id, &host_params)?;
        self.windows
            .insert(id, WindowShape::parked(&params, parked_at));
        info!(
            window = %id,
            title = %params.title,
            requested = %params.position,
            parked = %parked_at,
            "Created shapeable window"
        );
        Ok(id)
    }

    /// Forgets the window, releasing its shape tree, and destroys it on the host.
    pub fn destroy_window(&mut self, id: WindowId) -> ShapeResult<()> {
        let window = self
            .windows
            .remove(&id)
            .ok_or(ShapeError::UnknownWindow(id))?;
        drop(window);
        self.host.destroy_window(id);
        debug!(window = %id, "Destroyed window");
        Ok(())
    }

    /// Applies a new shape to a shapeable window.
    ///
    /// `surface` must have exactly the window's client size and a pixel format
    /// able to express `mode`. The new tree (and, for hosts that
    /// [want one](WindowHost::wants_mask), a packed mask at the configured
    /// density) is built and handed to the host before the previous tree is
    /// released, so a failure up to that point leaves the current shape, mode
    /// and state untouched.
    ///
    /// The first success after creation or a resize moves the window from its
    /// parked position to the position the caller asked for.
    ///
    /// # Errors
    /// - [`ShapeError::UnknownWindow`] if `id` is not tracked.
    /// - [`ShapeError::NotShapeable`] if the window was not created shapeable.
    /// - [`ShapeError::InvalidShapeArgument`] on a size or format mismatch.
    /// - [`ShapeError::OutOfMemory`] or [`ShapeError::Host`] from building and applying.
    /// - [`ShapeError::Host`] from the deferred move. This one is returned after
    ///   the new shape is already active; the window stays parked and the next
    ///   `set_shape` retries the move.
    pub fn set_shape<S: ShapeSurface>(
        &mut self,
        id: WindowId,
        surface: &S,
        mode: ShapeMode,
    ) -> ShapeResult<()> {
        let window = self.windows.get(&id).ok_or(ShapeError::UnknownWindow(id))?;
        if window.state == ShapeState::NotShapeable {
            return Err(ShapeError::NotShapeable(id));
        }
        if surface.size() != window.size {
            return Err(ShapeError::InvalidShapeArgument(format!(
                "shape surface is {} but {id} is {}",
                surface.size(),
                window.size
            )));
        }
        if !surface.format().supports(mode) {
            return Err(ShapeError::InvalidShapeArgument(format!(
                "{:?} surface cannot be shaped with mode {mode}",
                surface.format()
            )));
        }

        let tree = build_tree_with(surface, mode, self.config.quad_split)?;
        let region = RectRegion::from_tree(&tree, self.config.region_edges);
        let mask = if self.host.wants_mask() {
            Some(build_bitmap_with(surface, mode, self.config.pixels_per_byte)?)
        } else {
            None
        };
        self.host.apply_shape(id, &region, mask.as_ref())?;

        let window = self
            .windows
            .get_mut(&id)
            .ok_or(ShapeError::UnknownWindow(id))?;
        let previous = window.tree.replace(tree);
        window.mode = Some(mode);
        window.state = ShapeState::HasShape;
        info!(
            window = %id,
            %mode,
            rects = region.len(),
            masked = mask.is_some(),
            replaced = previous.is_some(),
            "Applied window shape"
        );
        drop(previous);

        if let Some(target) = window.deferred_position {
            // Keep the deferred position if the move fails so the next set_shape retries it.
            self.host.move_window(id, target)?;
            window.deferred_position = None;
            window.position = target;
            debug!(window = %id, position = %target, "Moved window to requested position");
        }
        Ok(())
    }

    /// [`set_shape`](Self::set_shape) with the configured
    /// [`default_mode`](ShapeConfig::default_mode).
    pub fn set_default_shape<S: ShapeSurface>(
        &mut self,
        id: WindowId,
        surface: &S,
    ) -> ShapeResult<()> {
        let mode = self.config.default_mode;
        self.set_shape(id, surface, mode)
    }

    /// The mode of the window's active shape.
    ///
    /// # Errors
    /// - [`ShapeError::NotShapeable`] if the window was not created shapeable.
    /// - [`ShapeError::NoShapeSet`] if no shape is active.
    pub fn shape_mode(&self, id: WindowId) -> ShapeResult<ShapeMode> {
        let window = self.windows.get(&id).ok_or(ShapeError::UnknownWindow(id))?;
        match (window.state, window.mode) {
            (ShapeState::NotShapeable, _) => Err(ShapeError::NotShapeable(id)),
            (ShapeState::HasShape, Some(mode)) => Ok(mode),
            _ => Err(ShapeError::NoShapeSet(id)),
        }
    }

    /// Whether the window has an active shape.
    pub fn has_shape(&self, id: WindowId) -> bool {
        self.shape_state(id) == Some(ShapeState::HasShape)
    }

    /// Shape state of the window, or `None` if it is not tracked.
    pub fn shape_state(&self, id: WindowId) -> Option<ShapeState> {
        self.windows.get(&id).map(|window| window.state)
    }

    /// The tree of the window's active shape.
    pub fn shape_tree(&self, id: WindowId) -> Option<&ShapeTree> {
        self.windows.get(&id)?.tree.as_ref()
    }

    /// The position the user asked for, even while the window is parked.
    pub fn window_position(&self, id: WindowId) -> Option<Position> {
        self.windows.get(&id).map(WindowShape::requested_position)
    }

    /// The window's current client size.
    pub fn window_size(&self, id: WindowId) -> Option<Size> {
        self.windows.get(&id).map(|window| window.size)
    }

    /// Records a new client size for the window.
    ///
    /// A shapeable window's tree no longer matches and is released. If a shape
    /// was active the window is parked off-screen again and returns to
    /// [`ShapeState::ShapeableNoShape`] until a surface of the new size is set.
    ///
    /// # Errors
    /// [`ShapeError::Host`] if the host cannot park a shaped window. The
    /// window's size, shape and state are then left as they were.
    pub fn resize_window(&mut self, id: WindowId, size: Size) -> ShapeResult<()> {
        let window = self
            .windows
            .get_mut(&id)
            .ok_or(ShapeError::UnknownWindow(id))?;
        let old_size = window.size;
        let state = window.state;
        match state {
            ShapeState::NotShapeable => {
                window.size = size;
                debug!(
                    window = %id,
                    from = %old_size,
                    to = %size,
                    "Resized non-shapeable window"
                );
                return Ok(());
            }
            ShapeState::HasShape => {
                let parked_at = self.config.parked_position;
                if let Err(e) = self.host.move_window(id, parked_at) {
                    warn!(window = %id, error = %e, "Host could not park resized window");
                    return Err(e.into());
                }
                window.deferred_position = Some(window.requested_position());
                window.position = parked_at;
                window.state = ShapeState::ShapeableNoShape;
                info!(
                    window = %id,
                    from = %old_size,
                    to = %size,
                    "Resized shaped window, parked until a new shape is set"
                );
            }
            ShapeState::ShapeableNoShape => {
                debug!(
                    window = %id,
                    from = %old_size,
                    to = %size,
                    "Resized shapeable window without shape"
                );
            }
        }

        window.size = size;
        window.mode = None;
        if let Some(mut tree) = window.tree.take() {
            tree.free();
        }
        Ok(())
    }

    /// Moves the window.
    ///
    /// While a shapeable window is parked only its deferred position changes;
    /// the host sees the move when the next shape is applied.
    pub fn move_window(&mut self, id: WindowId, position: Position) -> ShapeResult<()> {
        let window = self
            .windows
            .get_mut(&id)
            .ok_or(ShapeError::UnknownWindow(id))?;
        if window.deferred_position.is_some() {
            window.deferred_position = Some(position);
            debug!(window = %id, %position, "Deferred move of parked window");
            return Ok(());
        }
        if let Err(e) = self.host.move_window(id, position) {
            warn!(window = %id, %position, error = %e, "Host rejected window move");
            return Err(e.into());
        }
        window.position = position;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::PackedBitmap;
    use crate::error::HostError;
    use crate::surface::{MemorySurface, PixelFormat};
    use crate::types::{Rect, Rgb, Rgba};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default)]
    struct FakeHost {
        created: Vec<(WindowId, Position)>,
        moves: Vec<(WindowId, Position)>,
        shapes: Vec<(WindowId, Vec<Rect>)>,
        masks: Vec<(u8, Vec<u8>)>,
        destroyed: Vec<WindowId>,
        reject_shapes: bool,
        reject_moves: bool,
        uses_masks: bool,
    }

    impl WindowHost for FakeHost {
        fn create_window(&mut self, id: WindowId, params: &WindowParams) -> Result<(), HostError> {
            self.created.push((id, params.position));
            Ok(())
        }

        fn destroy_window(&mut self, id: WindowId) {
            self.destroyed.push(id);
        }

        fn move_window(&mut self, id: WindowId, position: Position) -> Result<(), HostError> {
            if self.reject_moves {
                return Err(HostError::new("move rejected"));
            }
            self.moves.push((id, position));
            Ok(())
        }

        fn wants_mask(&self) -> bool {
            self.uses_masks
        }

        fn apply_shape(
            &mut self,
            id: WindowId,
            region: &RectRegion,
            mask: Option<&PackedBitmap>,
        ) -> Result<(), HostError> {
            if self.reject_shapes {
                return Err(HostError::new("shape rejected"));
            }
            self.shapes.push((id, region.rects().to_vec()));
            if let Some(mask) = mask {
                self.masks.push((mask.pixels_per_byte(), mask.as_bytes().to_vec()));
            }
            Ok(())
        }
    }

    fn params() -> WindowParams {
        WindowParams::new("clock", Position::new(100, 50), Size::new(4, 4))
    }

    fn opaque_surface(size: u32) -> MemorySurface {
        MemorySurface::from_fn(size, size, PixelFormat::Argb8888, |_, _| {
            Rgba::opaque(1, 2, 3)
        })
    }

    #[test]
    fn shapeable_window_is_created_parked() {
        let mut manager = ShapedWindowManager::new(FakeHost::default());
        let id = manager.create_shapeable(params()).unwrap();
        assert_eq!(manager.host().created, vec![(id, Position::new(-1000, -1000))]);
        assert_eq!(manager.shape_state(id), Some(ShapeState::ShapeableNoShape));
        assert_eq!(manager.window_position(id), Some(Position::new(100, 50)));
        assert!(matches!(manager.shape_mode(id), Err(ShapeError::NoShapeSet(_))));
    }

    #[test]
    fn first_shape_moves_window_once() {
        let mut manager = ShapedWindowManager::new(FakeHost::default());
        let id = manager.create_shapeable(params()).unwrap();
        manager
            .set_shape(id, &opaque_surface(4), ShapeMode::Default)
            .unwrap();
        manager
            .set_shape(id, &opaque_surface(4), ShapeMode::BinarizeAlpha(9))
            .unwrap();
        assert_eq!(manager.host().moves, vec![(id, Position::new(100, 50))]);
        assert_eq!(manager.host().shapes.len(), 2);
        assert!(manager.has_shape(id));
        assert_eq!(manager.shape_mode(id).unwrap(), ShapeMode::BinarizeAlpha(9));
    }

    #[test]
    fn plain_window_rejects_shapes() {
        let mut manager = ShapedWindowManager::new(FakeHost::default());
        let id = manager.create_window(params()).unwrap();
        assert_eq!(manager.host().created, vec![(id, Position::new(100, 50))]);
        let result = manager.set_shape(id, &opaque_surface(4), ShapeMode::Default);
        assert!(matches!(result, Err(ShapeError::NotShapeable(_))));
        assert!(matches!(manager.shape_mode(id), Err(ShapeError::NotShapeable(_))));
        assert!(!manager.has_shape(id));
    }

    #[test]
    fn size_mismatch_is_an_invalid_shape_argument() {
        let mut manager = ShapedWindowManager::new(FakeHost::default());
        let id = manager.create_shapeable(params()).unwrap();
        let result = manager.set_shape(id, &opaque_surface(5), ShapeMode::Default);
        assert!(matches!(result, Err(ShapeError::InvalidShapeArgument(_))));
        assert!(manager.host().moves.is_empty());
    }

    #[test]
    fn incompatible_format_is_an_invalid_shape_argument() {
        let mut manager = ShapedWindowManager::new(FakeHost::default());
        let id = manager.create_shapeable(params()).unwrap();
        let rgb = MemorySurface::new(4, 4, PixelFormat::Rgb888);
        let result = manager.set_shape(id, &rgb, ShapeMode::Default);
        assert!(matches!(result, Err(ShapeError::InvalidShapeArgument(_))));
        let alpha_only = MemorySurface::new(4, 4, PixelFormat::A8);
        let result = manager.set_shape(id, &alpha_only, ShapeMode::ColorKey(Rgb::default()));
        assert!(matches!(result, Err(ShapeError::InvalidShapeArgument(_))));
    }

    #[test]
    fn host_failure_keeps_previous_shape() {
        let mut manager = ShapedWindowManager::new(FakeHost::default());
        let id = manager.create_shapeable(params()).unwrap();
        manager
            .set_shape(id, &opaque_surface(4), ShapeMode::Default)
            .unwrap();
        let before = manager.shape_tree(id).cloned();

        manager.host_mut().reject_shapes = true;
        let cleared = MemorySurface::new(4, 4, PixelFormat::Argb8888);
        let result = manager.set_shape(id, &cleared, ShapeMode::BinarizeAlpha(1));
        assert!(matches!(result, Err(ShapeError::Host(_))));
        assert!(manager.has_shape(id));
        assert_eq!(manager.shape_mode(id).unwrap(), ShapeMode::Default);
        assert_eq!(manager.shape_tree(id).cloned(), before);
    }

    #[test]
    fn resize_parks_shaped_window_until_next_shape() {
        let mut manager = ShapedWindowManager::new(FakeHost::default());
        let id = manager.create_shapeable(params()).unwrap();
        manager
            .set_shape(id, &opaque_surface(4), ShapeMode::Default)
            .unwrap();

        manager.resize_window(id, Size::new(6, 6)).unwrap();
        assert_eq!(manager.shape_state(id), Some(ShapeState::ShapeableNoShape));
        assert!(manager.shape_tree(id).is_none());
        assert!(matches!(manager.shape_mode(id), Err(ShapeError::NoShapeSet(_))));

        let stale = manager.set_shape(id, &opaque_surface(4), ShapeMode::Default);
        assert!(matches!(stale, Err(ShapeError::InvalidShapeArgument(_))));

        manager
            .set_shape(id, &opaque_surface(6), ShapeMode::Default)
            .unwrap();
        assert_eq!(
            manager.host().moves,
            vec![
                (id, Position::new(100, 50)),
                (id, Position::new(-1000, -1000)),
                (id, Position::new(100, 50)),
            ]
        );
    }

    #[test]
    fn moving_a_parked_window_is_deferred() {
        let mut manager = ShapedWindowManager::new(FakeHost::default());
        let id = manager.create_shapeable(params()).unwrap();
        manager.move_window(id, Position::new(7, 8)).unwrap();
        assert!(manager.host().moves.is_empty());
        manager
            .set_shape(id, &opaque_surface(4), ShapeMode::Default)
            .unwrap();
        assert_eq!(manager.host().moves, vec![(id, Position::new(7, 8))]);

        manager.move_window(id, Position::new(9, 9)).unwrap();
        assert_eq!(manager.host().moves.last(), Some(&(id, Position::new(9, 9))));
        assert_eq!(manager.window_position(id), Some(Position::new(9, 9)));
    }

    #[test]
    fn destroy_forgets_window() {
        let mut manager = ShapedWindowManager::new(FakeHost::default());
        let id = manager.create_shapeable(params()).unwrap();
        manager.destroy_window(id).unwrap();
        assert_eq!(manager.host().destroyed, vec![id]);
        assert_eq!(manager.shape_state(id), None);
        assert!(matches!(
            manager.destroy_window(id),
            Err(ShapeError::UnknownWindow(_))
        ));
    }

    #[test]
    fn failed_park_leaves_resized_window_untouched() {
        let mut manager = ShapedWindowManager::new(FakeHost::default());
        let id = manager.create_shapeable(params()).unwrap();
        manager
            .set_shape(id, &opaque_surface(4), ShapeMode::Default)
            .unwrap();

        manager.host_mut().reject_moves = true;
        let result = manager.resize_window(id, Size::new(6, 6));
        assert!(matches!(result, Err(ShapeError::Host(_))));
        assert_eq!(manager.shape_state(id), Some(ShapeState::HasShape));
        assert_eq!(manager.window_size(id), Some(Size::new(4, 4)));
        assert!(manager.shape_tree(id).is_some());
        assert_eq!(manager.shape_mode(id).unwrap(), ShapeMode::Default);

        // The window is still on screen, so moves go straight to the host.
        manager.host_mut().reject_moves = false;
        manager.move_window(id, Position::new(5, 5)).unwrap();
        assert_eq!(manager.host().moves.last(), Some(&(id, Position::new(5, 5))));
    }

    #[test]
    fn mask_hosts_receive_bitmap_at_configured_density() {
        let config = ShapeConfig {
            pixels_per_byte: 4,
            ..ShapeConfig::default()
        };
        let host = FakeHost {
            uses_masks: true,
            ..FakeHost::default()
        };
        let mut manager = ShapedWindowManager::with_config(host, config);
        let id = manager.create_shapeable(params()).unwrap();
        manager
            .set_shape(id, &opaque_surface(4), ShapeMode::Default)
            .unwrap();
        assert_eq!(manager.host().masks, vec![(4, vec![0xf0; 4])]);
    }

    #[test]
    fn region_only_hosts_get_no_mask() {
        let mut manager = ShapedWindowManager::new(FakeHost::default());
        let id = manager.create_shapeable(params()).unwrap();
        manager
            .set_shape(id, &opaque_surface(4), ShapeMode::Default)
            .unwrap();
        assert_eq!(manager.host().shapes.len(), 1);
        assert!(manager.host().masks.is_empty());
    }

    #[test]
    fn default_shape_uses_configured_mode() {
        let config = ShapeConfig {
            default_mode: ShapeMode::BinarizeAlpha(200),
            ..ShapeConfig::default()
        };
        let mut manager = ShapedWindowManager::with_config(FakeHost::default(), config);
        let id = manager.create_shapeable(params()).unwrap();
        manager.set_default_shape(id, &opaque_surface(4)).unwrap();
        assert_eq!(manager.shape_mode(id).unwrap(), ShapeMode::BinarizeAlpha(200));
    }
}
