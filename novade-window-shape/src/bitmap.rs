//! Packed bitmap masks.
//!
//! The bitmap is the flat counterpart of the shape tree: one bit per pixel,
//! `pixels_per_byte` pixels packed into every byte. For the pixel with linear
//! index `i = y * width + x` the bit lives in byte `i / ppb` at position
//! `7 - ((ppb - 1) - (i % ppb))`, where position 0 is the least significant
//! bit. A set bit means the pixel is part of the shape.
//!
//! Hosts that upload the mask directly (for example as an X11 shape pixmap)
//! depend on this exact layout.

use tracing::{debug, instrument};

use crate::error::{ShapeError, ShapeResult};
use crate::mode::ShapeMode;
use crate::surface::{ensure_shapeable, PixelAccess, ShapeSurface};

/// Packing density used by [`build_bitmap`].
pub const DEFAULT_PIXELS_PER_BYTE: u8 = 8;

/// Packing densities accepted by [`build_bitmap_with`].
pub const SUPPORTED_PIXELS_PER_BYTE: [u8; 4] = [1, 2, 4, 8];

/// A bit-per-pixel shape mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBitmap {
    width: u32,
    height: u32,
    pixels_per_byte: u8,
    bytes: Vec<u8>,
}

impl PackedBitmap {
    /// Width of the source surface.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the source surface.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels packed into each byte.
    pub fn pixels_per_byte(&self) -> u8 {
        self.pixels_per_byte
    }

    /// The packed mask bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the mask, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Whether the pixel at `(x, y)` is part of the shape.
    /// Coordinates outside the surface are reported as not part of it.
    pub fn is_opaque(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y as usize * self.width as usize + x as usize;
        let (byte, bit) = bit_position(index, self.pixels_per_byte);
        self.bytes[byte] & (1 << bit) != 0
    }

    /// Number of pixels marked as part of the shape.
    pub fn count_opaque(&self) -> usize {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.is_opaque(x, y))
            .count()
    }
}

/// Byte index and bit position for the pixel with linear index `index`.
#[inline]
pub fn bit_position(index: usize, pixels_per_byte: u8) -> (usize, u8) {
    let ppb = usize::from(pixels_per_byte);
    let bit = 7 - ((ppb - 1) - (index % ppb));
    (index / ppb, bit as u8)
}

/// Builds an 8-pixels-per-byte mask of `surface` classified by `mode`.
pub fn build_bitmap<S: ShapeSurface>(surface: &S, mode: ShapeMode) -> ShapeResult<PackedBitmap> {
    build_bitmap_with(surface, mode, DEFAULT_PIXELS_PER_BYTE)
}

/// Builds a mask of `surface` classified by `mode` with the given packing density.
///
/// # Errors
/// - [`ShapeError::InvalidArgument`] if the surface is empty or its format cannot
///   express `mode`, and when `pixels_per_byte` is not one of
///   [`SUPPORTED_PIXELS_PER_BYTE`].
/// - [`ShapeError::OutOfMemory`] if the output buffer cannot be reserved.
#[instrument(
    level = "debug",
    skip(surface),
    fields(width = surface.width(), height = surface.height())
)]
pub fn build_bitmap_with<S: ShapeSurface>(
    surface: &S,
    mode: ShapeMode,
    pixels_per_byte: u8,
) -> ShapeResult<PackedBitmap> {
    ensure_shapeable(surface, mode)?;
    if !SUPPORTED_PIXELS_PER_BYTE.contains(&pixels_per_byte) {
        return Err(ShapeError::InvalidArgument(format!(
            "pixels_per_byte must be one of {SUPPORTED_PIXELS_PER_BYTE:?}, got {pixels_per_byte}"
        )));
    }

    let (width, height) = (surface.width(), surface.height());
    let pixel_count = (width as usize).checked_mul(height as usize).ok_or_else(|| {
        ShapeError::InvalidArgument(format!("{width}x{height} surface is too large to mask"))
    })?;
    let len = pixel_count.div_ceil(usize::from(pixels_per_byte));

    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(len)
        .map_err(|_| ShapeError::OutOfMemory)?;
    bytes.resize(len, 0);

    let pixels = surface.lock()?;
    for y in 0..height {
        for x in 0..width {
            if mode.classify(pixels.pixel(x, y)) {
                let index = y as usize * width as usize + x as usize;
                let (byte, bit) = bit_position(index, pixels_per_byte);
                bytes[byte] |= 1 << bit;
            }
        }
    }
    drop(pixels);

    debug!(len, %mode, "Built packed shape bitmap");
    Ok(PackedBitmap {
        width,
        height,
        pixels_per_byte,
        bytes,
    })
}
