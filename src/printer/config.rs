//! # Printer Configuration
//!
//! This module defines hardware specifications for supported thermal printers.
//!
//! ## Supported Printers
//!
//! | Model | Width (dots) | Link | Name marker |
//! |-------|--------------|------|-------------|
//! | PPG mini printer | 384 | BLE GATT | `PPG` |
//!
//! ## Usage
//!
//! ```
//! use tinyprint::printer::PrinterConfig;
//!
//! let config = PrinterConfig::PPG;
//! println!("Print width: {} dots ({} bytes)",
//!          config.width_dots,
//!          config.width_dots / 8);
//! ```

use std::borrow::Cow;
use std::time::Duration;

use uuid::Uuid;

/// # Printer Configuration
///
/// Defines the hardware characteristics of a thermal printer and the
/// parameters used to reach it over Bluetooth Low Energy.
///
/// ## Physical Properties
///
/// - **width_dots**: Printable width in dots (pixels). Must be a multiple of 8
///   for the raster command to pack whole bytes.
///
/// ## BLE Tuning
///
/// - **name_marker**: Substring of the advertised name that identifies the printer
/// - **write_characteristic**: GATT characteristic that accepts print data
/// - **max_write_len**: Largest payload sent in one write-without-response
/// - **write_delay**: Pause after every write so the printer buffer can drain
#[derive(Debug, Clone)]
pub struct PrinterConfig {
    /// Printer model name
    pub name: &'static str,

    /// Print width in dots (pixels)
    pub width_dots: u32,

    /// Substring matched against advertised device names during discovery
    pub name_marker: Cow<'static, str>,

    /// Characteristic receiving raster commands
    pub write_characteristic: Uuid,

    /// Maximum bytes per BLE write
    pub max_write_len: usize,

    /// Delay after each chunked write
    pub write_delay: Duration,

    /// How long discovery scans before giving up
    pub scan_timeout: Duration,

    /// Pause after connecting before the first write
    pub settle_delay: Duration,
}

impl PrinterConfig {
    /// # PPG Mini Printer
    ///
    /// 58mm paper, 384-dot head, advertises itself over BLE with "PPG" in
    /// its name and takes ESC/POS `GS v 0` raster commands on characteristic
    /// `0000ff02-0000-1000-8000-00805f9b34fb`.
    ///
    /// ## Print Area
    ///
    /// ```text
    /// ├─ 5mm ─┼──── 48mm printable ────┼─ 5mm ─┤
    /// │       │        384 dots        │       │
    /// ```
    pub const PPG: Self = Self {
        name: "PPG mini printer",
        width_dots: 384,
        name_marker: Cow::Borrowed("PPG"),
        write_characteristic: Uuid::from_u128(0x0000ff02_0000_1000_8000_00805f9b34fb),
        max_write_len: 180,
        write_delay: Duration::from_millis(20),
        scan_timeout: Duration::from_secs(10),
        settle_delay: Duration::from_secs(1),
    };

    /// Override the discovery name marker.
    pub fn with_name_marker(mut self, marker: impl Into<String>) -> Self {
        self.name_marker = Cow::Owned(marker.into());
        self
    }

    /// Override the discovery timeout.
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// Width available to text on the fitted path (print width minus a 20-dot margin).
    #[inline]
    pub fn fit_width(&self) -> u32 {
        self.width_dots.saturating_sub(crate::render::FIT_MARGIN)
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::PPG
    }
}

// ============================================================================
// TESTS
// ============================================================================
