use crate::bitmap::PackedBitmap;
use crate::error::HostError;
use crate::region::RectRegion;
use crate::types::Position;

use super::data_types::{WindowId, WindowParams};

/// The windowing system as seen by the shaped window manager.
///
/// Implementations own the native windows and turn a [`RectRegion`] into the
/// platform's clip-region primitive. All calls are made from the thread that
/// owns the manager.
pub trait WindowHost {
    /// Creates the native window for `id` at `params.position`.
    fn create_window(&mut self, id: WindowId, params: &WindowParams) -> Result<(), HostError>;

    /// Destroys the native window for `id`.
    fn destroy_window(&mut self, id: WindowId);

    /// Moves the native window's top-left corner to `position`.
    fn move_window(&mut self, id: WindowId, position: Position) -> Result<(), HostError>;

    /// Whether the host uploads bit-packed masks (for example an X11 shape
    /// pixmap) in addition to rectangle regions.
    fn wants_mask(&self) -> bool {
        false
    }

    /// Replaces the window's visible region. An empty region hides every pixel.
    ///
    /// `mask` is `Some` exactly when [`wants_mask`](Self::wants_mask) returns
    /// `true`; it describes the same pixels as `region`.
    fn apply_shape(
        &mut self,
        id: WindowId,
        region: &RectRegion,
        mask: Option<&PackedBitmap>,
    ) -> Result<(), HostError>;
}
