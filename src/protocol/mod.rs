//! # ESC/POS Raster Protocol
//!
//! This module turns a [`RasterImage`] into the byte stream a BLE mini
//! printer understands.
//!
//! ## Module Structure
//!
//! - [`commands`]: Basic printer commands (init, feed)
//! - [`graphics`]: Raster bit image command and pixel packing
//!
//! ## Print Job Layout
//!
//! ```text
//! 1B 40             ESC @      reset
//! 1D 76 30 00       GS v 0 0   raster bit image, normal mode
//! xL xH             width in bytes, little-endian
//! yL yH             height in dots, little-endian
//! d1 ... dk         packed rows, MSB = leftmost dot
//! 0A 0A 0A          three line feeds
//! ```
//!
//! ## Usage Example
//!
//! ```
//! use tinyprint::{PrinterConfig, RasterImage, protocol};
//!
//! let image = RasterImage::blank(384, 300);
//! let job = protocol::encode(&image, &PrinterConfig::PPG)?;
//!
//! assert_eq!(&job[..10], &[0x1B, 0x40, 0x1D, 0x76, 0x30, 0x00, 0x30, 0x00, 0x2C, 0x01]);
//! assert_eq!(&job[job.len() - 3..], b"\n\n\n");
//! # Ok::<(), tinyprint::TinyPrintError>(())
//! ```

pub mod commands;
pub mod graphics;

use crate::error::TinyPrintError;
use crate::printer::PrinterConfig;
use crate::render::RasterImage;

/// Line feeds appended after the image.
pub const TRAILING_FEEDS: usize = 3;

/// Encode an image as a complete print job for `config`'s printer.
///
/// The image is first normalized to the printer width (centered when
/// narrower, cropped from the left when wider). Height is checked against
/// the 16-bit header field before any payload is produced.
pub fn encode(image: &RasterImage, config: &PrinterConfig) -> Result<Vec<u8>, TinyPrintError> {
    let width = config.width_dots;
    if width % 8 != 0 {
        return Err(TinyPrintError::UnalignedWidth { width });
    }
    let width_bytes = u16::try_from(width / 8).map_err(|_| {
        TinyPrintError::Image(format!("print width {} does not fit the raster header", width))
    })?;

    let height = image.height();
    let height_field =
        u16::try_from(height).map_err(|_| TinyPrintError::HeightOverflow { height })?;

    let normalized = graphics::normalize_width(image, width);
    let data = graphics::pack(&normalized)?;

    let mut job = Vec::with_capacity(2 + 8 + data.len() + TRAILING_FEEDS);
    job.extend(commands::init());
    job.extend(graphics::raster(width_bytes, height_field, &data));
    job.extend(commands::feed_lines(TRAILING_FEEDS));

    log::debug!(
        "encoded {}x{} image as {} byte job",
        image.width(),
        height,
        job.len()
    );

    Ok(job)
}
