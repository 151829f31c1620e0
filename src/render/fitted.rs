//! Fit-to-width text layout.
//!
//! The longest line (by character count) picks the font size: a binary
//! search over [8, 200] finds the largest size whose ink width stays within
//! the target. Every line is then drawn at that size, each centered on its
//! own width, one below the other.

use image::{GrayImage, Luma, imageops};

use super::dither::{self, DitheringAlgorithm};
use super::fonts::{Coverage, FontSet};
use super::raster::RasterImage;
use super::text;
use crate::error::TinyPrintError;

/// Smallest font size tried; used even when it does not fit.
pub const MIN_FONT_SIZE: u32 = 8;

/// Largest font size tried.
pub const MAX_FONT_SIZE: u32 = 200;

/// Blank rows above the first line.
pub const TOP_MARGIN: u32 = 10;

/// Blank rows below the last line.
pub const BOTTOM_MARGIN: u32 = 10;

/// Gap between consecutive lines.
pub const LINE_GAP: u32 = 5;

/// Largest size in [MIN_FONT_SIZE, MAX_FONT_SIZE] at which `line` measures
/// no wider than `target_width`, or `MIN_FONT_SIZE` if none does.
pub fn fit_font_size(fonts: &FontSet, line: &str, target_width: u32) -> u32 {
    let mut lo = MIN_FONT_SIZE;
    let mut hi = MAX_FONT_SIZE;
    let mut best = MIN_FONT_SIZE;

    while lo <= hi {
        let size = (lo + hi) / 2;
        let width = fonts.face(size).bounds(line).width();

        if width <= target_width {
            best = size;
            lo = size + 1;
        } else {
            hi = size - 1;
        }
    }

    best
}

/// Left edge that centers `line_width` on `width`, rounding down.
pub fn centered_x(width: u32, line_width: u32) -> i32 {
    (width as i32 - line_width as i32).div_euclid(2)
}

/// Lay out `text` to fill `width` and return it in printer polarity.
pub fn render(fonts: &FontSet, text: &str, width: u32) -> Result<RasterImage, TinyPrintError> {
    let cleaned = text::desymbolize(text);
    let lines = text::printable_lines(&cleaned);
    let anchor = text::longest_line(&lines).ok_or(TinyPrintError::EmptyInput)?;

    let target = width.saturating_sub(super::FIT_MARGIN);
    let size = fit_font_size(fonts, anchor, target);
    let face = fonts.face(size);
    log::debug!(
        "fitted {} line(s) at size {} (anchor {:?})",
        lines.len(),
        size,
        anchor
    );

    let bounds: Vec<_> = lines.iter().map(|line| face.bounds(line)).collect();
    let height = TOP_MARGIN
        + bounds.iter().map(|b| b.height() + LINE_GAP).sum::<u32>()
        + BOTTOM_MARGIN;

    let mut canvas = GrayImage::from_pixel(width, height, Luma([255]));
    let mut y = TOP_MARGIN as i32;
    for (line, b) in lines.iter().zip(&bounds) {
        let x = centered_x(width, b.width());
        face.draw(&mut canvas, x, y, line, Coverage::Binary);
        y += (b.height() + LINE_GAP) as i32;
    }

    dither::apply(&mut canvas, DitheringAlgorithm::Threshold);
    imageops::invert(&mut canvas);
    Ok(RasterImage::from_inverted(&canvas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fonts::{BUILTIN_CHAR_HEIGHT, BUILTIN_CHAR_WIDTH};

    #[test]
    fn test_empty_input_is_rejected() {
        let fonts = FontSet::builtin_only();
        assert!(matches!(
            render(&fonts, "  \n \n", 384),
            Err(TinyPrintError::EmptyInput)
        ));
        // Only stripped punctuation left
        assert!(matches!(
            render(&fonts, "###\\n**", 384),
            Err(TinyPrintError::EmptyInput)
        ));
    }

    #[test]
    fn test_fixed_font_that_fits_climbs_to_max() {
        // The builtin face reports the same width at every size
        let fonts = FontSet::builtin_only();
        assert_eq!(fit_font_size(&fonts, "short", 364), MAX_FONT_SIZE);
    }

    #[test]
    fn test_fixed_font_that_never_fits_uses_min() {
        let fonts = FontSet::builtin_only();
        let line = "x".repeat(46); // 368 dots > 364
        assert_eq!(fit_font_size(&fonts, &line, 364), MIN_FONT_SIZE);
    }

    #[test]
    fn test_search_finds_largest_fitting_size() {
        let fonts = crate::render::fonts::dejavu_sans();
        for line in ["Hello", "Shopping list", "A much longer line that needs a small font"] {
            let size = fit_font_size(&fonts, line, 364);
            assert!(fonts.face(size).bounds(line).width() <= 364, "{:?}", line);
            assert!(
                size == MAX_FONT_SIZE || fonts.face(size + 1).bounds(line).width() > 364,
                "{:?}: size {} is not the largest fit",
                line,
                size
            );
        }
    }

    #[test]
    fn test_short_scalable_line_caps_at_max() {
        let fonts = crate::render::fonts::dejavu_sans();
        assert_eq!(fit_font_size(&fonts, "i", 364), MAX_FONT_SIZE);
    }

    #[test]
    fn test_centered_x_rounds_down() {
        assert_eq!(centered_x(384, 16), 184);
        assert_eq!(centered_x(384, 17), 183);
        // Wider than the canvas by an odd amount
        assert_eq!(centered_x(384, 385), -1);
        assert_eq!(centered_x(384, 387), -2);
    }

    #[test]
    fn test_scalable_render_keeps_ink_inside_target() {
        let fonts = crate::render::fonts::dejavu_sans();
        let img = &render(&fonts, "Hello\nworld", 384).unwrap();
        let ink_columns: Vec<u32> = (0..img.width())
            .filter(|&x| (0..img.height()).any(|y| img.is_ink(x, y)))
            .collect();
        let span = ink_columns[ink_columns.len() - 1] - ink_columns[0] + 1;
        assert!(span <= 364, "ink spans {} columns", span);
        assert!(span > 300, "font did not grow to fill the line: {}", span);
    }

    #[test]
    fn test_canvas_height_from_line_heights() {
        let fonts = FontSet::builtin_only();
        let img = render(&fonts, "one\ntwo\nthree", 384).unwrap();
        assert_eq!(img.width(), 384);
        assert_eq!(
            img.height(),
            TOP_MARGIN + 3 * (BUILTIN_CHAR_HEIGHT + LINE_GAP) + BOTTOM_MARGIN
        );
    }

    #[test]
    fn test_lines_are_centered_individually() {
        let fonts = FontSet::builtin_only();
        let img = &render(&fonts, "WWWWWWWWWW\nW", 384).unwrap();

        // Second line: one 8-dot cell centered at (384 - 8) / 2 = 188
        let row_top = TOP_MARGIN + BUILTIN_CHAR_HEIGHT + LINE_GAP;
        let ink_columns: Vec<u32> = (row_top..row_top + BUILTIN_CHAR_HEIGHT)
            .flat_map(|y| (0..384).filter(move |&x| img.is_ink(x, y)))
            .collect();
        assert!(!ink_columns.is_empty());
        let start = 188;
        assert!(
            ink_columns
                .iter()
                .all(|&x| (start..start + BUILTIN_CHAR_WIDTH).contains(&x))
        );
    }

    #[test]
    fn test_margins_stay_blank() {
        let fonts = FontSet::builtin_only();
        let img = render(&fonts, "margin check", 384).unwrap();
        assert!(img.ink_count() > 0);
        for y in 0..TOP_MARGIN {
            assert!(img.row(y).iter().all(|&p| p == 0));
        }
        for y in img.height() - BOTTOM_MARGIN..img.height() {
            assert!(img.row(y).iter().all(|&p| p == 0));
        }
    }

    #[test]
    fn test_desymbolized_before_layout() {
        let fonts = FontSet::builtin_only();
        // "# a\nb" collapses to two lines after cleanup
        let img = render(&fonts, "# a\\n*b*", 384).unwrap();
        assert_eq!(
            img.height(),
            TOP_MARGIN + 2 * (BUILTIN_CHAR_HEIGHT + LINE_GAP) + BOTTOM_MARGIN
        );
    }
}
