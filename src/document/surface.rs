//! Drawable view over a caller-owned BGR pixel buffer

use super::error::{Result, ViewerError};
use super::geometry::IRect;

/// Bytes per pixel (B, G, R)
pub const BGR_CHANNELS: usize = 3;

/// Caller buffer wrapped as a surface covering `bbox` in target space.
///
/// The buffer is row-major with no padding; pixel `(bbox.x0, bbox.y0)` is at
/// offset 0. The surface only borrows the buffer, so it is released when it
/// goes out of scope regardless of how the draw exits.
pub struct PixelSurface<'a> {
    data: &'a mut [u8],
    bbox: IRect,
}

impl<'a> PixelSurface<'a> {
    /// Wrap `data` as a `width` by `height` surface with its origin at `(x, y)`.
    pub fn wrap(data: &'a mut [u8], x: i32, y: i32, width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(ViewerError::InvalidArgument);
        }
        let needed = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(BGR_CHANNELS))
            .ok_or(ViewerError::InvalidArgument)?;
        if data.len() < needed {
            log::warn!(
                "pixel buffer too small: {} bytes for {width}x{height}",
                data.len()
            );
            return Err(ViewerError::InvalidArgument);
        }
        let (Some(x1), Some(y1)) = (x.checked_add(width), y.checked_add(height)) else {
            log::warn!("target rectangle at ({x}, {y}) overflows device space");
            return Err(ViewerError::InvalidArgument);
        };
        Ok(Self {
            data: &mut data[..needed],
            bbox: IRect::new(x, y, x1, y1),
        })
    }

    #[must_use]
    pub fn bbox(&self) -> IRect {
        self.bbox
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.bbox.width() as usize
    }

    /// Bytes per row
    #[must_use]
    pub fn stride(&self) -> usize {
        self.width() * BGR_CHANNELS
    }

    /// Set every channel of every pixel to `value`
    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// Set every channel inside `rect` (clipped to the surface) to `value`
    pub fn fill_rect(&mut self, rect: IRect, value: u8) {
        self.for_each_row(rect, |row| row.fill(value));
    }

    /// Write one colour to every pixel inside `rect`
    pub fn fill_rect_bgr(&mut self, rect: IRect, bgr: [u8; 3]) {
        self.for_each_row(rect, |row| {
            for px in row.chunks_exact_mut(BGR_CHANNELS) {
                px.copy_from_slice(&bgr);
            }
        });
    }

    pub fn invert(&mut self) {
        for b in self.data.iter_mut() {
            *b = !*b;
        }
    }

    /// Invert colour channels inside `rect` only
    pub fn invert_rect(&mut self, rect: IRect) {
        self.for_each_row(rect, |row| {
            for b in row.iter_mut() {
                *b = !*b;
            }
        });
    }

    /// Pixel at target coordinates, `None` outside the surface
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 3]> {
        if !self.bbox.contains(x, y) {
            return None;
        }
        let offset = self.offset_of(x, y);
        let px = &self.data[offset..offset + BGR_CHANNELS];
        Some([px[0], px[1], px[2]])
    }

    fn offset_of(&self, x: i32, y: i32) -> usize {
        let col = (x - self.bbox.x0) as usize;
        let row = (y - self.bbox.y0) as usize;
        row * self.stride() + col * BGR_CHANNELS
    }

    /// Run `f` over the byte span of each row of `rect` clipped to the surface
    pub fn for_each_row(&mut self, rect: IRect, mut f: impl FnMut(&mut [u8])) {
        let clipped = rect.intersect(&self.bbox);
        if clipped.is_empty() {
            return;
        }
        let row_bytes = clipped.width() as usize * BGR_CHANNELS;
        for y in clipped.y0..clipped.y1 {
            let start = self.offset_of(clipped.x0, y);
            f(&mut self.data[start..start + row_bytes]);
        }
    }
}
