//! Shape surfaces: the pixel sources the shape builders read from.
//!
//! A [`ShapeSurface`] exposes its dimensions and [`PixelFormat`] and grants
//! scoped pixel access through [`ShapeSurface::lock`]. The returned guard
//! implements [`PixelAccess`]; dropping it releases the lock, so every exit
//! path of a builder (including `?` returns) unlocks the surface.
//!
//! [`MemorySurface`] is an owned, CPU-side implementation backed by a byte
//! buffer in one of the supported pixel formats.

use std::cell::Cell;

use crate::error::{ShapeError, ShapeResult};
use crate::mode::ShapeMode;
use crate::types::{Rgba, Size};

/// Byte layout of a surface's pixels.
///
/// Two- and four-byte formats are stored as little-endian packed words; the
/// channel order in the name is most-significant first. Narrow channels are
/// widened to 8 bits by bit replication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit alpha only; color channels read as black.
    A8,
    /// 16-bit RGB, 5-6-5, no alpha.
    Rgb565,
    /// 16-bit ARGB, 4 bits per channel.
    Argb4444,
    /// 24-bit RGB stored as R, G, B bytes, no alpha.
    Rgb888,
    /// 32-bit RGB with an unused top byte.
    Xrgb8888,
    /// 32-bit ARGB, alpha in the top byte.
    Argb8888,
    /// 32-bit RGBA, alpha in the bottom byte.
    Rgba8888,
}

impl PixelFormat {
    /// Bytes occupied by one pixel (1 to 4).
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::A8 => 1,
            PixelFormat::Rgb565 | PixelFormat::Argb4444 => 2,
            PixelFormat::Rgb888 => 3,
            PixelFormat::Xrgb8888 | PixelFormat::Argb8888 | PixelFormat::Rgba8888 => 4,
        }
    }

    /// Whether the format carries an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            PixelFormat::A8 | PixelFormat::Argb4444 | PixelFormat::Argb8888 | PixelFormat::Rgba8888
        )
    }

    /// Whether the format carries color channels.
    pub const fn has_color(self) -> bool {
        !matches!(self, PixelFormat::A8)
    }

    /// Whether pixels in this format can be meaningfully classified by `mode`.
    pub const fn supports(self, mode: ShapeMode) -> bool {
        (!mode.requires_alpha() || self.has_alpha()) && (!mode.requires_color() || self.has_color())
    }

    /// Decodes one pixel.
    ///
    /// `bytes` must hold at least [`bytes_per_pixel`](Self::bytes_per_pixel) bytes.
    pub fn decode(self, bytes: &[u8]) -> Rgba {
        match self {
            PixelFormat::A8 => Rgba::new(0, 0, 0, bytes[0]),
            PixelFormat::Rgb565 => {
                let v = u16::from_le_bytes([bytes[0], bytes[1]]);
                let r = ((v >> 11) & 0x1f) as u8;
                let g = ((v >> 5) & 0x3f) as u8;
                let b = (v & 0x1f) as u8;
                Rgba::opaque((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
            }
            PixelFormat::Argb4444 => {
                let v = u16::from_le_bytes([bytes[0], bytes[1]]);
                let nibble = |shift: u16| ((v >> shift) & 0xf) as u8 * 0x11;
                Rgba::new(nibble(8), nibble(4), nibble(0), nibble(12))
            }
            PixelFormat::Rgb888 => Rgba::opaque(bytes[0], bytes[1], bytes[2]),
            PixelFormat::Xrgb8888 => {
                let [b, g, r, _] = [bytes[0], bytes[1], bytes[2], bytes[3]];
                Rgba::opaque(r, g, b)
            }
            PixelFormat::Argb8888 => {
                let [b, g, r, a] = [bytes[0], bytes[1], bytes[2], bytes[3]];
                Rgba::new(r, g, b, a)
            }
            PixelFormat::Rgba8888 => {
                let [a, b, g, r] = [bytes[0], bytes[1], bytes[2], bytes[3]];
                Rgba::new(r, g, b, a)
            }
        }
    }

    /// Encodes one pixel into `out`, dropping precision the format cannot hold.
    pub fn encode(self, pixel: Rgba, out: &mut [u8]) {
        let Rgba { r, g, b, a } = pixel;
        match self {
            PixelFormat::A8 => out[0] = a,
            PixelFormat::Rgb565 => {
                let v = (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3);
                out[..2].copy_from_slice(&v.to_le_bytes());
            }
            PixelFormat::Argb4444 => {
                let v = (u16::from(a >> 4) << 12)
                    | (u16::from(r >> 4) << 8)
                    | (u16::from(g >> 4) << 4)
                    | u16::from(b >> 4);
                out[..2].copy_from_slice(&v.to_le_bytes());
            }
            PixelFormat::Rgb888 => out[..3].copy_from_slice(&[r, g, b]),
            PixelFormat::Xrgb8888 => out[..4].copy_from_slice(&[b, g, r, 0xff]),
            PixelFormat::Argb8888 => out[..4].copy_from_slice(&[b, g, r, a]),
            PixelFormat::Rgba8888 => out[..4].copy_from_slice(&[a, b, g, r]),
        }
    }
}

/// Read access to a locked surface's pixels.
pub trait PixelAccess {
    /// Returns the decoded pixel at `(x, y)`. Callers stay within the surface bounds.
    fn pixel(&self, x: u32, y: u32) -> Rgba;
}

/// A rectangular pixel source that can be turned into a window shape.
pub trait ShapeSurface {
    /// Guard granting pixel access for as long as it is alive.
    type Pixels<'a>: PixelAccess
    where
        Self: 'a;

    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Byte layout of the pixels.
    fn format(&self) -> PixelFormat;

    /// Acquires the pixel buffer. The lock is held until the guard is dropped.
    fn lock(&self) -> ShapeResult<Self::Pixels<'_>>;

    /// Width and height as a [`Size`].
    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}

/// Rejects empty surfaces and formats that cannot express `mode`.
pub(crate) fn ensure_shapeable<S: ShapeSurface>(surface: &S, mode: ShapeMode) -> ShapeResult<()> {
    if surface.width() == 0 || surface.height() == 0 {
        return Err(ShapeError::InvalidArgument(format!(
            "shape surface must not be empty, got {}",
            surface.size()
        )));
    }
    if !surface.format().supports(mode) {
        return Err(ShapeError::InvalidArgument(format!(
            "{:?} surface cannot be classified with mode {mode}",
            surface.format()
        )));
    }
    Ok(())
}

/// A shape surface held in memory.
///
/// Rows are `stride` bytes apart; a row may carry padding past its last pixel.
/// The surface counts outstanding locks so callers can verify that every
/// builder released its access.
#[derive(Debug)]
pub struct MemorySurface {
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    data: Vec<u8>,
    locks: Cell<usize>,
}

impl MemorySurface {
    /// Creates a zero-filled surface with tightly packed rows.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let stride = width as usize * format.bytes_per_pixel();
        Self {
            width,
            height,
            stride,
            format,
            data: vec![0; stride * height as usize],
            locks: Cell::new(0),
        }
    }

    /// Wraps an existing pixel buffer.
    ///
    /// Fails with [`ShapeError::InvalidArgument`] when `stride` is shorter than a
    /// row or `data` does not hold `height` rows.
    pub fn from_bytes(
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> ShapeResult<Self> {
        let row = width as usize * format.bytes_per_pixel();
        if stride < row {
            return Err(ShapeError::InvalidArgument(format!(
                "stride {stride} is shorter than a {width}-pixel {format:?} row"
            )));
        }
        let needed = match height {
            0 => 0,
            h => stride * (h as usize - 1) + row,
        };
        if data.len() < needed {
            return Err(ShapeError::InvalidArgument(format!(
                "pixel buffer holds {} bytes, {needed} required",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            stride,
            format,
            data,
            locks: Cell::new(0),
        })
    }

    /// Creates a surface whose pixels are produced by `pixel(x, y)`.
    pub fn from_fn(
        width: u32,
        height: u32,
        format: PixelFormat,
        mut pixel: impl FnMut(u32, u32) -> Rgba,
    ) -> Self {
        let mut surface = Self::new(width, height, format);
        for y in 0..height {
            for x in 0..width {
                surface.set_pixel(x, y, pixel(x, y));
            }
        }
        surface
    }

    /// Creates an [`PixelFormat::Argb8888`] surface from row-major pixels.
    pub fn from_rgba(width: u32, height: u32, pixels: &[Rgba]) -> ShapeResult<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(ShapeError::InvalidArgument(format!(
                "{} pixels supplied for a {width}x{height} surface",
                pixels.len()
            )));
        }
        Ok(Self::from_fn(width, height, PixelFormat::Argb8888, |x, y| {
            pixels[(y * width + x) as usize]
        }))
    }

    /// Overwrites the pixel at `(x, y)`.
    ///
    /// # Panics
    /// Panics if the coordinates are outside the surface.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Rgba) {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} surface",
            self.width,
            self.height
        );
        let offset = self.offset(x, y);
        let bpp = self.format.bytes_per_pixel();
        self.format.encode(pixel, &mut self.data[offset..offset + bpp]);
    }

    /// Number of pixel guards currently alive.
    pub fn lock_count(&self) -> usize {
        self.locks.get()
    }

    /// Bytes between the starts of consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The raw pixel bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride + x as usize * self.format.bytes_per_pixel()
    }
}

impl Clone for MemorySurface {
    /// Copies the pixels. The clone starts with no outstanding locks.
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            stride: self.stride,
            format: self.format,
            data: self.data.clone(),
            locks: Cell::new(0),
        }
    }
}

impl ShapeSurface for MemorySurface {
    type Pixels<'a> = MemoryPixels<'a>;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn lock(&self) -> ShapeResult<MemoryPixels<'_>> {
        self.locks.set(self.locks.get() + 1);
        Ok(MemoryPixels { surface: self })
    }
}

/// Pixel guard for a [`MemorySurface`]; releases its lock on drop.
#[derive(Debug)]
pub struct MemoryPixels<'a> {
    surface: &'a MemorySurface,
}

impl PixelAccess for MemoryPixels<'_> {
    #[inline]
    fn pixel(&self, x: u32, y: u32) -> Rgba {
        debug_assert!(
            x < self.surface.width && y < self.surface.height,
            "pixel read outside surface bounds"
        );
        let offset = self.surface.offset(x, y);
        let bpp = self.surface.format.bytes_per_pixel();
        self.surface
            .format
            .decode(&self.surface.data[offset..offset + bpp])
    }
}

impl Drop for MemoryPixels<'_> {
    fn drop(&mut self) {
        self.surface.locks.set(self.surface.locks.get() - 1);
    }
}
