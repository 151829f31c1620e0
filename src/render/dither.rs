//! # Bilevel Conversion
//!
//! Thermal heads only burn or skip a dot, so every canvas is reduced to pure
//! black (0) and pure white (255) before it is cropped and inverted.
//!
//! ## Algorithms
//!
//! | Method | Use | Behavior on anti-aliased edges |
//! |--------|-----|-------------------------------|
//! | Threshold | fitted text (already drawn 1-bit) | hard cut at mid-gray |
//! | Floyd-Steinberg | markdown text (drawn anti-aliased) | error diffusion, softer strokes |
//!
//! ## Usage Example
//!
//! ```
//! use image::{GrayImage, Luma};
//! use tinyprint::render::dither::{self, DitheringAlgorithm};
//!
//! let mut canvas = GrayImage::from_pixel(4, 1, Luma([200]));
//! dither::apply(&mut canvas, DitheringAlgorithm::Threshold);
//! assert!(canvas.pixels().all(|p| p.0[0] == 255));
//! ```

use image::GrayImage;
use image::imageops::{self, BiLevel};

/// Midpoint between black and white.
pub const THRESHOLD: u8 = 128;

/// Available bilevel conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitheringAlgorithm {
    /// Samples below mid-gray become black, the rest white.
    Threshold,
    /// Floyd-Steinberg error diffusion.
    #[default]
    FloydSteinberg,
}

/// Reduce a grayscale canvas to 0/255 in place.
pub fn apply(canvas: &mut GrayImage, algorithm: DitheringAlgorithm) {
    match algorithm {
        DitheringAlgorithm::Threshold => {
            for px in canvas.pixels_mut() {
                px.0[0] = if px.0[0] < THRESHOLD { 0 } else { 255 };
            }
        }
        DitheringAlgorithm::FloydSteinberg => imageops::dither(canvas, &BiLevel),
    }
}

/// First and last rows containing any black sample, inclusive.
///
/// Returns `None` for a blank canvas.
pub fn ink_rows(canvas: &GrayImage) -> Option<(u32, u32)> {
    let has_ink = |y: u32| (0..canvas.width()).any(|x| canvas.get_pixel(x, y).0[0] < THRESHOLD);
    let top = (0..canvas.height()).find(|&y| has_ink(y))?;
    let bottom = (top..canvas.height()).rev().find(|&y| has_ink(y))?;
    Some((top, bottom))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn is_bilevel(canvas: &GrayImage) -> bool {
        canvas.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255)
    }

    #[test]
    fn test_threshold_splits_at_midpoint() {
        let mut canvas = GrayImage::from_fn(4, 1, |x, _| Luma([[0, 127, 128, 255][x as usize]]));
        apply(&mut canvas, DitheringAlgorithm::Threshold);
        let samples: Vec<u8> = canvas.pixels().map(|p| p.0[0]).collect();
        assert_eq!(samples, vec![0, 0, 255, 255]);
    }

    #[test]
    fn test_black_and_white_survive_diffusion() {
        let mut canvas = GrayImage::from_fn(16, 16, |x, _| Luma([if x < 8 { 0 } else { 255 }]));
        let original = canvas.clone();
        apply(&mut canvas, DitheringAlgorithm::FloydSteinberg);
        assert_eq!(canvas, original);
    }

    #[test]
    fn test_gray_diffuses_to_mixed_dots() {
        let mut canvas = GrayImage::from_pixel(32, 32, Luma([128]));
        apply(&mut canvas, DitheringAlgorithm::FloydSteinberg);
        assert!(is_bilevel(&canvas));
        let black = canvas.pixels().filter(|p| p.0[0] == 0).count();
        // Roughly half of 1024 dots
        assert!(black > 400 && black < 624, "got {} black dots", black);
    }

    #[test]
    fn test_ink_rows() {
        let mut canvas = GrayImage::from_pixel(8, 10, Luma([255]));
        assert_eq!(ink_rows(&canvas), None);
        canvas.put_pixel(3, 2, Luma([0]));
        canvas.put_pixel(7, 6, Luma([0]));
        assert_eq!(ink_rows(&canvas), Some((2, 6)));
    }
}
