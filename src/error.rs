//! # Error Types
//!
//! This module defines error types used throughout the tinyprint library.

use thiserror::Error;

/// Main error type for tinyprint operations
#[derive(Debug, Error)]
pub enum TinyPrintError {
    /// The input text has no renderable line
    #[error("Nothing to print: input has no non-empty lines")]
    EmptyInput,

    /// Print width that cannot be packed into whole bytes
    #[error("Print width {width} is not a multiple of 8")]
    UnalignedWidth { width: u32 },

    /// Image taller than the 16-bit height field of the raster command
    #[error("Image height {height} exceeds the 65535-row raster limit")]
    HeightOverflow { height: u32 },

    /// No printer matched during discovery
    #[error("Printer not found: {0}")]
    NotFound(String),

    /// Transport-level errors (connection, I/O)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Bluetooth LE stack error
    #[cfg(feature = "ble")]
    #[error("Bluetooth error: {0}")]
    Ble(#[from] btleplug::Error),

    /// MCP server failed to start or stopped abnormally
    #[error("Server error: {0}")]
    Server(String),

    /// Image processing error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
