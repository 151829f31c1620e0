//! Font loading and glyph rasterization.
//!
//! Fonts are tried in a fixed priority order:
//!
//! | Family | Source | Honors size |
//! |--------|--------|-------------|
//! | Primary | scalable font file (Helvetica / DejaVu Sans) | yes |
//! | Fallback | scalable font file (Arial / Liberation Sans) | yes |
//! | Builtin | Spleen 8×16 bitmap, compiled in | no |
//!
//! The builtin face cannot fail, so font lookup never produces an error.
//! When only the builtin face is available the fitting search still runs,
//! it just sees the same metrics at every size.

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, FontVec, PxScale, ScaleFont, point};
use image::{GrayImage, Luma};
use spleen_font::{FONT_8X16, PSF2Font};

/// Cell width of the builtin bitmap font.
pub const BUILTIN_CHAR_WIDTH: u32 = 8;

/// Cell height of the builtin bitmap font.
pub const BUILTIN_CHAR_HEIGHT: u32 = 16;

/// Font families in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    Primary,
    Fallback,
    Builtin,
}

impl FontFamily {
    /// Lookup order; the last entry always loads.
    pub const PRIORITY: [FontFamily; 3] = [Self::Primary, Self::Fallback, Self::Builtin];
}

/// Where to look for the scalable fonts.
#[derive(Debug, Clone)]
pub struct FontPaths {
    pub primary: PathBuf,
    pub fallback: PathBuf,
}

impl Default for FontPaths {
    #[cfg(target_os = "macos")]
    fn default() -> Self {
        Self {
            primary: PathBuf::from("/System/Library/Fonts/Helvetica.ttc"),
            fallback: PathBuf::from("/System/Library/Fonts/Supplemental/Arial.ttf"),
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn default() -> Self {
        Self {
            primary: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
            fallback: PathBuf::from(
                "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            ),
        }
    }
}

/// The set of fonts available to the rasterizer.
#[derive(Clone, Default)]
pub struct FontSet {
    primary: Option<FontArc>,
    fallback: Option<FontArc>,
}

impl FontSet {
    /// Load scalable fonts from disk. Missing or unreadable files are
    /// logged and skipped.
    pub fn load(paths: &FontPaths) -> Self {
        Self {
            primary: load_font_file(&paths.primary),
            fallback: load_font_file(&paths.fallback),
        }
    }

    /// Only the compiled-in bitmap font.
    pub fn builtin_only() -> Self {
        Self::default()
    }

    /// Build from already-parsed fonts.
    pub fn from_fonts(primary: Option<FontArc>, fallback: Option<FontArc>) -> Self {
        Self { primary, fallback }
    }

    /// Probe one family at one size.
    ///
    /// `size` is the em size in pixels.
    pub fn try_load(&self, family: FontFamily, size: u32) -> Option<Face<'_>> {
        let font = match family {
            FontFamily::Primary => self.primary.as_ref()?,
            FontFamily::Fallback => self.fallback.as_ref()?,
            FontFamily::Builtin => return Some(Face::Builtin),
        };
        Some(Face::Scalable {
            font,
            scale: em_scale(font, size),
        })
    }

    /// The best available face at `size`.
    pub fn face(&self, size: u32) -> Face<'_> {
        FontFamily::PRIORITY
            .iter()
            .find_map(|&family| self.try_load(family, size))
            .unwrap_or(Face::Builtin)
    }

    /// Which family [`FontSet::face`] will pick.
    pub fn active_family(&self) -> FontFamily {
        if self.primary.is_some() {
            FontFamily::Primary
        } else if self.fallback.is_some() {
            FontFamily::Fallback
        } else {
            FontFamily::Builtin
        }
    }
}

/// ab_glyph scales by ascent-to-descent height; convert a pixel em to that.
fn em_scale(font: &FontArc, size: u32) -> PxScale {
    match font.units_per_em() {
        Some(upem) if upem > 0.0 => PxScale::from(size as f32 * font.height_unscaled() / upem),
        _ => PxScale::from(size as f32),
    }
}

/// DejaVu Sans, compiled into tests so metrics do not depend on the host.
#[cfg(test)]
pub(crate) fn dejavu_sans() -> FontSet {
    let font = FontArc::try_from_slice(include_bytes!("../../tests/fonts/DejaVuSans.ttf"))
        .expect("bundled test font parses");
    FontSet::from_fonts(Some(font), None)
}

fn load_font_file(path: &Path) -> Option<FontArc> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::debug!("font {} unavailable: {}", path.display(), e);
            return None;
        }
    };
    // Index 0 also covers font collections (.ttc)
    match FontVec::try_from_vec_and_index(bytes, 0) {
        Ok(font) => {
            log::info!("loaded font {}", path.display());
            Some(FontArc::new(font))
        }
        Err(e) => {
            log::warn!("font {} could not be parsed: {}", path.display(), e);
            None
        }
    }
}

/// Ink bounding box of a string, relative to the drawing origin.
///
/// The origin is the top-left of the line box (top of the ascender), so
/// `top` is usually positive and `left` is the first glyph's side bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TextBounds {
    #[inline]
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }
}

/// How glyph coverage turns into canvas samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// Pixels at least half covered are black, the rest untouched.
    Binary,
    /// Coverage darkens the canvas proportionally.
    AntiAliased,
}

/// A font at a specific size, ready to measure and draw.
#[derive(Clone, Copy)]
pub enum Face<'a> {
    Scalable { font: &'a FontArc, scale: PxScale },
    Builtin,
}

impl Face<'_> {
    /// Ink bounds of a single line of text.
    pub fn bounds(&self, text: &str) -> TextBounds {
        match *self {
            Face::Scalable { font, scale } => {
                let scaled = font.as_scaled(scale);
                let ascent = scaled.ascent();
                let mut caret = 0.0f32;
                let mut ink: Option<(f32, f32, f32, f32)> = None;

                for ch in text.chars() {
                    let id = font.glyph_id(ch);
                    let glyph = id.with_scale_and_position(scale, point(caret, ascent));
                    caret += scaled.h_advance(id);

                    if let Some(outlined) = font.outline_glyph(glyph) {
                        let b = outlined.px_bounds();
                        ink = Some(match ink {
                            None => (b.min.x, b.min.y, b.max.x, b.max.y),
                            Some((l, t, r, bt)) => {
                                (l.min(b.min.x), t.min(b.min.y), r.max(b.max.x), bt.max(b.max.y))
                            }
                        });
                    }
                }

                match ink {
                    Some((l, t, r, b)) => TextBounds {
                        left: l.floor() as i32,
                        top: t.floor() as i32,
                        right: r.ceil() as i32,
                        bottom: b.ceil() as i32,
                    },
                    // Whitespace only: advance without ink
                    None => TextBounds {
                        right: caret.ceil() as i32,
                        ..TextBounds::default()
                    },
                }
            }
            Face::Builtin => TextBounds {
                left: 0,
                top: 0,
                right: (text.chars().count() as u32 * BUILTIN_CHAR_WIDTH) as i32,
                bottom: BUILTIN_CHAR_HEIGHT as i32,
            },
        }
    }

    /// Distance between baselines for multi-line text, without extra spacing.
    pub fn line_height(&self) -> u32 {
        match *self {
            Face::Scalable { font, scale } => {
                let scaled = font.as_scaled(scale);
                (scaled.ascent() - scaled.descent()).ceil().max(1.0) as u32
            }
            Face::Builtin => BUILTIN_CHAR_HEIGHT,
        }
    }

    /// Draw one line of black text with its line box at (x, y).
    ///
    /// Pixels outside the canvas are clipped.
    pub fn draw(&self, canvas: &mut GrayImage, x: i32, y: i32, text: &str, coverage: Coverage) {
        match *self {
            Face::Scalable { font, scale } => {
                let scaled = font.as_scaled(scale);
                let baseline = point(x as f32, y as f32 + scaled.ascent());
                let mut caret = baseline.x;

                for ch in text.chars() {
                    let id = font.glyph_id(ch);
                    let glyph = id.with_scale_and_position(scale, point(caret, baseline.y));
                    caret += scaled.h_advance(id);

                    if let Some(outlined) = font.outline_glyph(glyph) {
                        let bounds = outlined.px_bounds();
                        outlined.draw(|gx, gy, cov| {
                            let px = gx as i32 + bounds.min.x as i32;
                            let py = gy as i32 + bounds.min.y as i32;
                            darken(canvas, px, py, cov, coverage);
                        });
                    }
                }
            }
            Face::Builtin => draw_builtin(canvas, x, y, text),
        }
    }

    /// Draw text containing line breaks, each line `spacing` pixels below
    /// the previous line box.
    pub fn draw_multiline(
        &self,
        canvas: &mut GrayImage,
        x: i32,
        y: i32,
        text: &str,
        spacing: u32,
        coverage: Coverage,
    ) {
        let step = (self.line_height() + spacing) as i32;
        for (i, line) in text.split('\n').enumerate() {
            let line_y = y + i as i32 * step;
            if line_y >= canvas.height() as i32 {
                break;
            }
            self.draw(canvas, x, line_y, line, coverage);
        }
    }
}

/// Blend ink into a white-background canvas; darker always wins.
fn darken(canvas: &mut GrayImage, x: i32, y: i32, cov: f32, coverage: Coverage) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    let sample = match coverage {
        Coverage::Binary if cov >= 0.5 => 0u8,
        Coverage::Binary => return,
        Coverage::AntiAliased => (255.0 * (1.0 - cov.clamp(0.0, 1.0))).round() as u8,
    };
    let px = canvas.get_pixel_mut(x as u32, y as u32);
    px.0[0] = px.0[0].min(sample);
}

fn draw_builtin(canvas: &mut GrayImage, x: i32, y: i32, text: &str) {
    let mut spleen = PSF2Font::new(FONT_8X16).ok();

    for (i, ch) in text.chars().enumerate() {
        let cell_x = x + (i as u32 * BUILTIN_CHAR_WIDTH) as i32;
        let utf8 = ch.to_string();
        let glyph = spleen
            .as_mut()
            .and_then(|font| font.glyph_for_utf8(utf8.as_bytes()));

        match glyph {
            Some(rows) => {
                for (row_y, row) in rows.enumerate() {
                    for (col_x, on) in row.enumerate() {
                        if on {
                            put_black(canvas, cell_x + col_x as i32, y + row_y as i32);
                        }
                    }
                }
            }
            None if ch.is_whitespace() => {}
            None => draw_box(canvas, cell_x, y),
        }
    }
}

/// Outline a cell for characters the bitmap font lacks.
fn draw_box(canvas: &mut GrayImage, x: i32, y: i32) {
    let w = BUILTIN_CHAR_WIDTH as i32;
    let h = BUILTIN_CHAR_HEIGHT as i32;
    for dx in 1..w - 1 {
        put_black(canvas, x + dx, y + 2);
        put_black(canvas, x + dx, y + h - 3);
    }
    for dy in 2..h - 2 {
        put_black(canvas, x + 1, y + dy);
        put_black(canvas, x + w - 2, y + dy);
    }
}

#[inline]
fn put_black(canvas: &mut GrayImage, x: i32, y: i32) {
    if x >= 0 && y >= 0 && x < canvas.width() as i32 && y < canvas.height() as i32 {
        canvas.put_pixel(x as u32, y as u32, Luma([0]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_pixels(canvas: &GrayImage) -> usize {
        canvas.pixels().filter(|p| p.0[0] == 0).count()
    }

    #[test]
    fn test_builtin_always_loads() {
        let fonts = FontSet::builtin_only();
        assert!(fonts.try_load(FontFamily::Primary, 24).is_none());
        assert!(fonts.try_load(FontFamily::Fallback, 24).is_none());
        assert!(matches!(
            fonts.try_load(FontFamily::Builtin, 24),
            Some(Face::Builtin)
        ));
        assert!(matches!(fonts.face(24), Face::Builtin));
        assert_eq!(fonts.active_family(), FontFamily::Builtin);
    }

    #[test]
    fn test_missing_font_files_fall_back() {
        let paths = FontPaths {
            primary: PathBuf::from("/nonexistent/primary.ttf"),
            fallback: PathBuf::from("/nonexistent/fallback.ttf"),
        };
        let fonts = FontSet::load(&paths);
        assert!(matches!(fonts.face(40), Face::Builtin));
    }

    #[test]
    fn test_builtin_bounds_ignore_size() {
        let fonts = FontSet::builtin_only();
        let small = fonts.face(8).bounds("Hello");
        let large = fonts.face(200).bounds("Hello");
        assert_eq!(small, large);
        assert_eq!(small.width(), 5 * BUILTIN_CHAR_WIDTH);
        assert_eq!(small.height(), BUILTIN_CHAR_HEIGHT);
    }

    #[test]
    fn test_builtin_draw_puts_ink_inside_cells() {
        let mut canvas = GrayImage::from_pixel(64, 32, Luma([255]));
        Face::Builtin.draw(&mut canvas, 4, 4, "AB", Coverage::Binary);
        assert!(black_pixels(&canvas) > 0);
        for (x, y, p) in canvas.enumerate_pixels() {
            if p.0[0] == 0 {
                assert!((4..20).contains(&x), "ink at x={} outside cells", x);
                assert!((4..20).contains(&y), "ink at y={} outside cells", y);
            }
        }
    }

    #[test]
    fn test_builtin_draw_clips_at_edges() {
        let mut canvas = GrayImage::from_pixel(10, 10, Luma([255]));
        Face::Builtin.draw(&mut canvas, -4, -4, "WWWW", Coverage::Binary);
        Face::Builtin.draw(&mut canvas, 6, 6, "WWWW", Coverage::Binary);
    }

    #[test]
    fn test_multiline_advances_by_line_height() {
        let mut canvas = GrayImage::from_pixel(32, 64, Luma([255]));
        Face::Builtin.draw_multiline(&mut canvas, 0, 0, "I\nI", 4, Coverage::Binary);
        let rows_with_ink: Vec<u32> = (0..64)
            .filter(|&y| (0..32).any(|x| canvas.get_pixel(x, y).0[0] == 0))
            .collect();
        assert!(rows_with_ink.iter().any(|&y| y < 16));
        assert!(rows_with_ink.iter().any(|&y| (20..36).contains(&y)));
    }

    #[test]
    fn test_size_is_pixel_em() {
        // DejaVu Sans: cap height 1493 of 2048 units per em
        let fonts = dejavu_sans();
        let cap_24 = fonts.face(24).bounds("H").height();
        let cap_100 = fonts.face(100).bounds("H").height();
        assert!((17..=19).contains(&cap_24), "cap height {} at 24", cap_24);
        assert!((72..=75).contains(&cap_100), "cap height {} at 100", cap_100);
    }

    #[test]
    fn test_scalable_line_height_tracks_size() {
        // (1901 + 483) / 2048 em between ascender and descender
        let fonts = dejavu_sans();
        assert!((27..=29).contains(&fonts.face(24).line_height()));
        assert!((115..=118).contains(&fonts.face(100).line_height()));
    }

    #[test]
    fn test_scalable_draw_matches_bounds() {
        let fonts = dejavu_sans();
        let face = fonts.face(24);
        let b = face.bounds("H");
        let mut canvas = GrayImage::from_pixel(64, 64, Luma([255]));
        face.draw(&mut canvas, 0, 0, "H", Coverage::Binary);

        let ink: Vec<(u32, u32)> = canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] == 0)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!ink.is_empty());
        for (x, y) in ink {
            assert!((b.left..b.right).contains(&(x as i32)));
            assert!((b.top..b.bottom).contains(&(y as i32)));
        }
    }

    #[test]
    fn test_text_bounds_dimensions() {
        let b = TextBounds {
            left: 2,
            top: 5,
            right: 12,
            bottom: 25,
        };
        assert_eq!(b.width(), 10);
        assert_eq!(b.height(), 20);
        assert_eq!(TextBounds::default().width(), 0);
    }
}
