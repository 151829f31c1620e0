//! # tinyprint - Mini Thermal Printer Library
//!
//! tinyprint prints text on the small 58mm BLE thermal printers sold as
//! "PPG" mini printers. It provides:
//!
//! - **Rendering**: text to a 384-dot 1-bit raster, either fitted and
//!   centered or at a fixed size cropped to content
//! - **Protocol implementation**: ESC/POS `GS v 0` raster framing
//! - **Transport**: Bluetooth LE GATT writes and Bluetooth RFCOMM
//! - **MCP server**: `print_markdown` and `print_text` tools
//!
//! ## Quick Start
//!
//! ```no_run
//! use tinyprint::{
//!     PrinterConfig, Rasterizer,
//!     printer::{PrintService, PrinterManager},
//!     render::{FontPaths, FontSet, Layout},
//!     transport::RfcommConnector,
//! };
//!
//! # async fn example() -> Result<(), tinyprint::TinyPrintError> {
//! let config = PrinterConfig::PPG;
//! let rasterizer = Rasterizer::for_printer(FontSet::load(&FontPaths::default()), &config);
//! let manager = PrinterManager::new(RfcommConnector::new("/dev/rfcomm0"));
//!
//! let service = PrintService::new(rasterizer, config, manager);
//! service.print("HELLO\nworld", Layout::Fitted).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`render`] | Text layout, fonts and 1-bit conversion |
//! | [`protocol`] | Raster command encoder |
//! | [`transport`] | Communication backends |
//! | [`printer`] | Printer profile, connection manager, print pipeline |
//! | [`server`] | MCP tool server |
//! | [`error`] | Error types |

pub mod error;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod server;
pub mod transport;

// Re-exports for convenience
pub use error::TinyPrintError;
pub use printer::PrinterConfig;
pub use render::{RasterImage, Rasterizer};
