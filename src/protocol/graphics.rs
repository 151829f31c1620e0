//! # Raster Bit Image Commands
//!
//! This module implements the ESC/POS raster bit image command (`GS v 0`)
//! and the pixel packing it expects.
//!
//! ## Coordinate System
//!
//! ```text
//! (0,0) ──────────────────────► X (horizontal, 384 dots max)
//!   │
//!   │   ████████  ← one dot per bit
//!   │   ████████
//!   ▼
//!   Y (vertical, paper feed direction)
//! ```
//!
//! ## Bit Packing
//!
//! Graphics data is packed as bytes where each bit represents one dot:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! ```

use std::borrow::Cow;

use super::commands::{GS, u16_le};
use crate::error::TinyPrintError;
use crate::render::RasterImage;

/// Raster mode `m` for normal density.
pub const MODE_NORMAL: u8 = 0;

/// # Print Raster Bit Image (GS v 0 m xL xH yL yH d1...dk)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS v 0 m xL xH yL yH d1...dk |
/// | Hex     | 1D 76 30 m xL xH yL yH d1...dk |
///
/// ## Parameters
///
/// - `m`: Mode (0 = normal)
/// - `xL, xH`: Width in bytes, little-endian
/// - `yL, yH`: Height in dots, little-endian
/// - `d1...dk`: Image data, k = width_bytes × height bytes
///
/// ## Example
///
/// ```
/// use tinyprint::protocol::graphics;
///
/// let data = vec![0x00; 48 * 300];
/// let cmd = graphics::raster(48, 300, &data);
///
/// assert_eq!(&cmd[0..8], &[0x1D, 0x76, 0x30, 0x00, 0x30, 0x00, 0x2C, 0x01]);
/// assert_eq!(cmd.len(), 8 + 48 * 300);
/// ```
pub fn raster(width_bytes: u16, height: u16, data: &[u8]) -> Vec<u8> {
    debug_assert!(
        data.len() == width_bytes as usize * height as usize,
        "Raster data length mismatch. Expected {} ({} bytes × {} rows), got {}",
        width_bytes as usize * height as usize,
        width_bytes,
        height,
        data.len()
    );

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(8 + data.len());
    cmd.push(GS);
    cmd.push(b'v');
    cmd.push(b'0');
    cmd.push(MODE_NORMAL);
    cmd.push(xl);
    cmd.push(xh);
    cmd.push(yl);
    cmd.push(yh);
    cmd.extend_from_slice(data);
    cmd
}

/// Bring an image to exactly `width` dots.
///
/// Narrower images are centered on blank paper; wider images keep their
/// leftmost `width` columns. Height is never changed.
pub fn normalize_width(image: &RasterImage, width: u32) -> Cow<'_, RasterImage> {
    if image.width() == width {
        return Cow::Borrowed(image);
    }

    let mut canvas = RasterImage::blank(width, image.height());
    let offset = if image.width() < width {
        ((width - image.width()) / 2) as i64
    } else {
        0
    };
    canvas.paste(image, offset);
    Cow::Owned(canvas)
}

/// Pack an image into row-major bytes, 8 dots per byte, MSB first.
///
/// The width must be a whole number of bytes.
pub fn pack(image: &RasterImage) -> Result<Vec<u8>, TinyPrintError> {
    let width = image.width();
    if width % 8 != 0 {
        return Err(TinyPrintError::UnalignedWidth { width });
    }

    let width_bytes = (width / 8) as usize;
    let mut data = Vec::with_capacity(width_bytes * image.height() as usize);

    for y in 0..image.height() {
        for chunk in image.row(y).chunks_exact(8) {
            let byte = chunk
                .iter()
                .fold(0u8, |acc, &px| (acc << 1) | (px != 0) as u8);
            data.push(byte);
        }
    }

    Ok(data)
}

/// Reverse of [`pack`]: expand packed rows back into a raster image.
///
/// Missing trailing bytes read as blank.
pub fn unpack(data: &[u8], width: u32, height: u32) -> RasterImage {
    let width_bytes = width.div_ceil(8) as usize;
    RasterImage::from_fn(width, height, |x, y| {
        let byte_idx = y as usize * width_bytes + x as usize / 8;
        let bit_idx = 7 - (x % 8);
        data.get(byte_idx)
            .is_some_and(|byte| (byte >> bit_idx) & 1 == 1)
    })
}

// ============================================================================
// TESTS
// ============================================================================
