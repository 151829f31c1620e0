//! Connection manager.
//!
//! Holds at most one live [`Transport`]. The first job connects through the
//! [`Connector`]; later jobs reuse the same link. A failed write drops the
//! link so the next job starts with a fresh connection.
//!
//! Jobs are serialized: a [`PrintSession`] holds the lock until it is
//! dropped, so one job's writes and pacing delays finish before the next
//! job touches the printer.

use tokio::sync::{Mutex, MutexGuard};

use crate::error::TinyPrintError;
use crate::transport::{Connector, Transport};

type Link = Option<Box<dyn Transport>>;

/// Owns the printer connection.
pub struct PrinterManager {
    connector: Box<dyn Connector>,
    link: Mutex<Link>,
}

impl PrinterManager {
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self::with_connector(Box::new(connector))
    }

    /// Build from a connector chosen at runtime.
    pub fn with_connector(connector: Box<dyn Connector>) -> Self {
        Self {
            connector,
            link: Mutex::new(None),
        }
    }

    /// Lock the printer, connecting first if there is no live link.
    pub async fn session(&self) -> Result<PrintSession<'_>, TinyPrintError> {
        let mut guard = self.link.lock().await;
        if guard.is_none() {
            log::info!("connecting to printer");
            let transport = self.connector.connect().await?;
            log::info!("printer connected: {}", transport.describe());
            *guard = Some(transport);
        }
        Ok(PrintSession { guard })
    }

    /// Send one job on its own session.
    pub async fn send(&self, job: &[u8]) -> Result<(), TinyPrintError> {
        self.session().await?.send(job).await
    }

    /// Whether a link is currently held.
    pub async fn is_connected(&self) -> bool {
        self.link.lock().await.is_some()
    }

    /// Close and forget the current link, if any.
    pub async fn disconnect(&self) {
        let mut guard = self.link.lock().await;
        if let Some(mut transport) = guard.take() {
            if let Err(e) = transport.close().await {
                log::warn!("error closing {}: {}", transport.describe(), e);
            }
        }
    }
}

/// Exclusive access to a connected printer.
pub struct PrintSession<'a> {
    guard: MutexGuard<'a, Link>,
}

impl PrintSession<'_> {
    /// Write a complete job. On failure the link is discarded.
    pub async fn send(&mut self, job: &[u8]) -> Result<(), TinyPrintError> {
        let transport = self
            .guard
            .as_mut()
            .ok_or_else(|| TinyPrintError::Transport("printer link is closed".to_string()))?;

        log::info!("sending {} bytes to {}", job.len(), transport.describe());
        let result = transport.write_all(job).await;
        if let Err(e) = &result {
            log::warn!("write failed, dropping connection: {}", e);
            *self.guard = None;
        }
        result
    }
}
