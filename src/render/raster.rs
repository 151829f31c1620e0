//! 1-bit raster images in printer polarity.
//!
//! A [`RasterImage`] is the hand-off between the rasterizer and the command
//! encoder. Every pixel is one byte holding `0` (blank paper) or `1` (ink),
//! stored row-major from the top-left corner.

use image::{GrayImage, Luma};

/// Monochrome image where `1` means "burn a dot".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Create an image with no ink.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    /// Build an image from a predicate returning `true` for ink.
    pub fn from_fn<F>(width: u32, height: u32, ink: F) -> Self
    where
        F: Fn(u32, u32) -> bool,
    {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(ink(x, y) as u8);
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Read a canvas that has already been polarity-inverted.
    ///
    /// After inversion ink carries a high sample value, so any sample at or
    /// above mid-gray becomes a set pixel.
    pub fn from_inverted(canvas: &GrayImage) -> Self {
        let (width, height) = canvas.dimensions();
        let pixels = canvas.pixels().map(|p| (p.0[0] >= 128) as u8).collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at (x, y) is ink. Out-of-bounds reads are blank.
    #[inline]
    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.pixels[self.index(x, y)] != 0
    }

    /// Set or clear a pixel. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, ink: bool) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.pixels[idx] = ink as u8;
        }
    }

    /// One row of pixels (0/1 bytes).
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    /// Number of ink pixels, handy for sanity checks.
    pub fn ink_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p != 0).count()
    }

    /// Copy `src` onto `self` with its top-left corner at column `x_offset`.
    /// Columns falling outside `self` are dropped.
    pub fn paste(&mut self, src: &RasterImage, x_offset: i64) {
        let rows = self.height.min(src.height);
        for y in 0..rows {
            for sx in 0..src.width {
                let dx = sx as i64 + x_offset;
                if dx >= 0 && dx < self.width as i64 && src.is_ink(sx, y) {
                    self.set(dx as u32, y, true);
                }
            }
        }
    }

    /// Render as a grayscale preview: ink is black on white paper.
    pub fn to_preview(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.is_ink(x, y) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
