//! # Printer Transport Layer
//!
//! This module provides communication backends for sending print jobs.
//!
//! ## Available Transports
//!
//! - [`ble`]: Bluetooth Low Energy GATT writes (default feature `ble`)
//! - [`bluetooth`]: Bluetooth RFCOMM serial device for SPP printers (Linux)
//!
//! A [`Connector`] knows how to reach a printer and hands back a live
//! [`Transport`]. The printer manager keeps that transport around and
//! reuses it for later jobs.

#[cfg(feature = "ble")]
pub mod ble;
pub mod bluetooth;

#[cfg(feature = "ble")]
pub use ble::{BleConnector, BleTransport};
pub use bluetooth::{BluetoothTransport, RfcommConnector};

use async_trait::async_trait;

use crate::error::TinyPrintError;

/// A connected link that accepts raw print bytes.
///
/// Implementations split large payloads to the link's write size and pace
/// the writes themselves; callers hand over the whole job at once.
#[async_trait]
pub trait Transport: Send {
    /// Send every byte of `data`, in order.
    async fn write_all(&mut self, data: &[u8]) -> Result<(), TinyPrintError>;

    /// Release the link. The default does nothing.
    async fn close(&mut self) -> Result<(), TinyPrintError> {
        Ok(())
    }

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Opens a [`Transport`] to a printer.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Transport>, TinyPrintError>;
}

/// Split a payload into writes of at most `max_len` bytes.
///
/// A zero `max_len` is treated as one byte per write.
pub fn write_chunks(data: &[u8], max_len: usize) -> std::slice::Chunks<'_, u8> {
    data.chunks(max_len.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_chunks_preserve_order() {
        let data: Vec<u8> = (0..=9).collect();
        let chunks: Vec<&[u8]> = write_chunks(&data, 4).collect();
        assert_eq!(chunks, vec![&[0, 1, 2, 3][..], &[4, 5, 6, 7], &[8, 9]]);
    }

    #[test]
    fn test_write_chunks_zero_len() {
        assert_eq!(write_chunks(&[1, 2, 3], 0).count(), 3);
    }

    #[test]
    fn test_write_chunks_empty() {
        assert_eq!(write_chunks(&[], 180).count(), 0);
    }
}
