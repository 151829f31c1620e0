//! # Printer Module
//!
//! Hardware profile, connection ownership and the print pipeline.
//!
//! ## Modules
//!
//! - [`config`]: Printer hardware specifications
//! - [`manager`]: Lazily connected, reusable printer link
//! - [`service`]: Render, encode and send in one call

pub mod config;
pub mod manager;
pub mod service;

pub use config::PrinterConfig;
pub use manager::{PrintSession, PrinterManager};
pub use service::PrintService;
