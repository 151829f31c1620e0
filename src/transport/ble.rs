//! # Bluetooth Low Energy Transport
//!
//! Mini thermal printers expose a vendor GATT service with one
//! write-without-response characteristic for print data.
//!
//! ## Discovery
//!
//! The first adapter scans for [`PrinterConfig::scan_timeout`], then the
//! first peripheral whose advertised local name contains
//! [`PrinterConfig::name_marker`] is picked:
//!
//! ```text
//! scan 10s ──► [ "Pixel 7", "PPG-A1-3F2C", "MX10" ]
//!                              ▲
//!                     contains "PPG" → connect
//! ```
//!
//! ## Pacing
//!
//! Writes without response are not flow-controlled by the link layer. Each
//! job is split into [`PrinterConfig::max_write_len`] packets with
//! [`PrinterConfig::write_delay`] after every packet so the printer's small
//! receive buffer never overflows.

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral};

use super::{Connector, Transport, write_chunks};
use crate::error::TinyPrintError;
use crate::printer::PrinterConfig;

/// Whether an advertised name identifies the printer.
pub fn matches_marker(name: &str, marker: &str) -> bool {
    !marker.is_empty() && name.contains(marker)
}

/// Discovers and connects to a BLE printer.
pub struct BleConnector {
    config: PrinterConfig,
}

impl BleConnector {
    pub fn new(config: PrinterConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for BleConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, TinyPrintError> {
        let transport = BleTransport::discover(&self.config).await?;
        Ok(Box::new(transport))
    }
}

/// A connected BLE printer.
pub struct BleTransport {
    peripheral: Peripheral,
    characteristic: Characteristic,
    name: String,
    max_write_len: usize,
    write_delay: Duration,
}

impl BleTransport {
    /// Scan, connect, and locate the write characteristic.
    ///
    /// ## Errors
    ///
    /// - [`TinyPrintError::NotFound`] when no advertised name matches
    /// - [`TinyPrintError::Transport`] when there is no adapter or the
    ///   printer lacks the write characteristic
    /// - [`TinyPrintError::Ble`] for stack errors
    pub async fn discover(config: &PrinterConfig) -> Result<Self, TinyPrintError> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TinyPrintError::Transport("No Bluetooth adapter found".to_string()))?;

        let (peripheral, name) =
            scan_for(&adapter, &config.name_marker, config.scan_timeout).await?;

        log::info!("connecting to {}", name);
        peripheral.connect().await?;
        peripheral.discover_services().await?;

        let characteristic = peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == config.write_characteristic)
            .ok_or_else(|| {
                TinyPrintError::Transport(format!(
                    "{} has no write characteristic {}",
                    name, config.write_characteristic
                ))
            })?;

        // Give the printer time to finish its own connection setup
        tokio::time::sleep(config.settle_delay).await;

        Ok(Self {
            peripheral,
            characteristic,
            name,
            max_write_len: config.max_write_len,
            write_delay: config.write_delay,
        })
    }
}

async fn scan_for(
    adapter: &Adapter,
    marker: &str,
    timeout: Duration,
) -> Result<(Peripheral, String), TinyPrintError> {
    log::info!("scanning {:?} for a printer named *{}*", timeout, marker);
    adapter.start_scan(ScanFilter::default()).await?;
    tokio::time::sleep(timeout).await;

    let peripherals = adapter.peripherals().await?;
    if let Err(e) = adapter.stop_scan().await {
        log::warn!("failed to stop scan: {}", e);
    }

    for peripheral in peripherals {
        let Some(props) = peripheral.properties().await? else {
            continue;
        };
        if let Some(name) = props.local_name {
            if matches_marker(&name, marker) {
                return Ok((peripheral, name));
            }
            log::debug!("skipping {}", name);
        }
    }

    Err(TinyPrintError::NotFound(format!(
        "no device advertising a name containing {:?}",
        marker
    )))
}

#[async_trait]
impl Transport for BleTransport {
    async fn write_all(&mut self, data: &[u8]) -> Result<(), TinyPrintError> {
        let mut sent = 0usize;
        for chunk in write_chunks(data, self.max_write_len) {
            self.peripheral
                .write(&self.characteristic, chunk, WriteType::WithoutResponse)
                .await?;
            sent += chunk.len();
            if !self.write_delay.is_zero() {
                tokio::time::sleep(self.write_delay).await;
            }
        }
        log::debug!("wrote {} bytes to {}", sent, self.name);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TinyPrintError> {
        self.peripheral.disconnect().await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.name, self.peripheral.address())
    }
}
