//! Fixed-size layout for chat-style text.
//!
//! Text is drawn at one size onto a tall scratch canvas, reduced to 1-bit,
//! and cropped to the rows that actually received ink. The canvas keeps the
//! full print width.

use image::{GrayImage, Luma, imageops};

use super::dither::{self, DitheringAlgorithm};
use super::fonts::{Coverage, FontSet};
use super::raster::RasterImage;
use super::text;

/// Font size used for every line.
pub const FONT_SIZE: u32 = 24;

/// Height of the scratch canvas; text beyond it is clipped.
pub const SCRATCH_HEIGHT: u32 = 2000;

/// Offset of the first line box from the top-left corner.
pub const TEXT_ORIGIN: (i32, i32) = (10, 10);

/// Extra pixels between line boxes.
pub const LINE_SPACING: u32 = 4;

/// Lay out `text` at [`FONT_SIZE`] and return it in printer polarity.
///
/// Blank output (nothing but whitespace) comes back as the whole uncropped
/// scratch canvas.
pub fn render(fonts: &FontSet, text: &str, width: u32) -> RasterImage {
    let cleaned = text::desymbolize(text);
    let face = fonts.face(FONT_SIZE);

    let mut canvas = GrayImage::from_pixel(width, SCRATCH_HEIGHT, Luma([255]));
    face.draw_multiline(
        &mut canvas,
        TEXT_ORIGIN.0,
        TEXT_ORIGIN.1,
        &cleaned,
        LINE_SPACING,
        Coverage::AntiAliased,
    );
    dither::apply(&mut canvas, DitheringAlgorithm::FloydSteinberg);

    let mut canvas = match dither::ink_rows(&canvas) {
        Some((top, bottom)) => {
            imageops::crop_imm(&canvas, 0, top, width, bottom - top + 1).to_image()
        }
        None => {
            log::debug!("markdown render produced no ink; keeping scratch canvas");
            canvas
        }
    };

    imageops::invert(&mut canvas);
    RasterImage::from_inverted(&canvas)
}
