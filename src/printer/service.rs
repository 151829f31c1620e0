//! Text-to-paper pipeline.
//!
//! ```text
//! text ──► Rasterizer ──► protocol::encode ──► PrinterManager ──► printer
//!          (pure)          (pure)               (locked, async)
//! ```
//!
//! Rendering and encoding happen before the printer lock is taken, so a bad
//! request never holds up a job that is already printing.

use crate::error::TinyPrintError;
use crate::protocol;
use crate::render::{Layout, Rasterizer};

use super::config::PrinterConfig;
use super::manager::PrinterManager;

pub struct PrintService {
    rasterizer: Rasterizer,
    config: PrinterConfig,
    manager: PrinterManager,
}

impl PrintService {
    pub fn new(rasterizer: Rasterizer, config: PrinterConfig, manager: PrinterManager) -> Self {
        Self {
            rasterizer,
            config,
            manager,
        }
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    pub fn manager(&self) -> &PrinterManager {
        &self.manager
    }

    /// Render and encode `text` into a complete print job.
    pub fn prepare(&self, text: &str, layout: Layout) -> Result<Vec<u8>, TinyPrintError> {
        let image = self.rasterizer.render(text, layout)?;
        log::debug!(
            "rendered {:?} layout at {}x{}",
            layout,
            image.width(),
            image.height()
        );
        protocol::encode(&image, &self.config)
    }

    /// Render, encode and send `text`.
    pub async fn print(&self, text: &str, layout: Layout) -> Result<(), TinyPrintError> {
        let job = self.prepare(text, layout)?;
        self.manager.send(&job).await
    }
}
