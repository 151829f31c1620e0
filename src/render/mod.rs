//! # Rendering Module
//!
//! This module turns text into 1-bit raster images sized to the printer.
//!
//! ## Modules
//!
//! - [`text`]: Character-level cleanup of incoming text
//! - [`fonts`]: Font lookup chain and glyph rasterization
//! - [`fitted`]: Largest-font-that-fits layout, lines centered
//! - [`markdown`]: Fixed-size layout cropped to content
//! - [`dither`]: Bilevel conversion
//! - [`raster`]: The [`RasterImage`] handed to the encoder
//!
//! ## Usage Example
//!
//! ```
//! use tinyprint::render::{FontSet, Rasterizer};
//!
//! let rasterizer = Rasterizer::new(FontSet::builtin_only(), 384);
//!
//! let image = rasterizer.render_fitted("Hello\nthermal world")?;
//! assert_eq!(image.width(), 384);
//! # Ok::<(), tinyprint::TinyPrintError>(())
//! ```

pub mod dither;
pub mod fitted;
pub mod fonts;
pub mod markdown;
pub mod raster;
pub mod text;

pub use fonts::{FontFamily, FontPaths, FontSet};
pub use raster::RasterImage;

use crate::error::TinyPrintError;
use crate::printer::PrinterConfig;

/// Dots kept free across the line on the fitted path.
pub const FIT_MARGIN: u32 = 20;

/// Which layout to use for a print request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Fixed font size, cropped to content.
    #[default]
    Markdown,
    /// Font scaled so the longest line fills the width.
    Fitted,
}

/// Renders text at a fixed print width.
#[derive(Clone)]
pub struct Rasterizer {
    fonts: FontSet,
    width: u32,
}

impl Rasterizer {
    pub fn new(fonts: FontSet, width: u32) -> Self {
        Self { fonts, width }
    }

    /// A rasterizer matching `config`'s print width.
    pub fn for_printer(fonts: FontSet, config: &PrinterConfig) -> Self {
        Self::new(fonts, config.width_dots)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    /// Fit the longest line to the width and center every line.
    ///
    /// Fails with [`TinyPrintError::EmptyInput`] when no line has content.
    pub fn render_fitted(&self, text: &str) -> Result<RasterImage, TinyPrintError> {
        fitted::render(&self.fonts, text, self.width)
    }

    /// Draw at a fixed size and crop to the inked rows.
    pub fn render_markdown(&self, text: &str) -> RasterImage {
        markdown::render(&self.fonts, text, self.width)
    }

    /// Render with the chosen layout.
    pub fn render(&self, text: &str, layout: Layout) -> Result<RasterImage, TinyPrintError> {
        match layout {
            Layout::Markdown => Ok(self.render_markdown(text)),
            Layout::Fitted => self.render_fitted(text),
        }
    }
}
