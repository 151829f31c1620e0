//! # Bluetooth RFCOMM Transport
//!
//! Some mini printers also speak Bluetooth Serial Port Profile (SPP). Once
//! paired and bound with `rfcomm`, they show up as a TTY and the same
//! ESC/POS job can be written to it directly.
//!
//! ## Bluetooth Setup (Linux)
//!
//! ```bash
//! # 1. Pair with the printer
//! $ bluetoothctl
//! [bluetooth]# scan on
//! [bluetooth]# pair 66:22:XX:XX:XX:XX
//!
//! # 2. Bind to RFCOMM device
//! $ sudo rfcomm bind 0 66:22:XX:XX:XX:XX
//! # This creates /dev/rfcomm0
//! ```
//!
//! ## TTY Configuration
//!
//! The RFCOMM device is opened in raw mode so binary data is transmitted
//! without modification: no input or output processing, 8-bit characters,
//! no echo, non-canonical mode, and no XON/XOFF flow control (0x11 and 0x13
//! occur in raster data).
//!
//! ## Chunked Writes
//!
//! Large jobs are written in chunks with a small delay between them to avoid
//! overwhelming the Bluetooth buffer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::{Connector, Transport, write_chunks};
use crate::error::TinyPrintError;

/// Default RFCOMM device path
pub const DEFAULT_DEVICE: &str = "/dev/rfcomm0";

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// # Bluetooth Printer Transport
///
/// Manages a connection to a printer over a bound RFCOMM TTY.
pub struct BluetoothTransport {
    file: File,
    path: PathBuf,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl BluetoothTransport {
    /// Open a Bluetooth connection to the printer.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The device doesn't exist
    /// - Permission denied (may need root or dialout group)
    /// - TTY configuration fails
    pub async fn open<P: AsRef<Path>>(device: P) -> Result<Self, TinyPrintError> {
        let path = device.as_ref();

        let file = OpenOptions::new().write(true).open(path).await.map_err(|e| {
            TinyPrintError::Transport(format!("Failed to open {}: {}", path.display(), e))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            configure_tty_raw(file.as_raw_fd())?;
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        })
    }
}

#[async_trait]
impl Transport for BluetoothTransport {
    async fn write_all(&mut self, data: &[u8]) -> Result<(), TinyPrintError> {
        for chunk in write_chunks(data, self.chunk_size) {
            self.file
                .write_all(chunk)
                .await
                .map_err(|e| TinyPrintError::Transport(format!("Write failed: {}", e)))?;

            if !self.chunk_delay.is_zero() {
                tokio::time::sleep(self.chunk_delay).await;
            }
        }

        self.file
            .flush()
            .await
            .map_err(|e| TinyPrintError::Transport(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Opens an RFCOMM device path on demand.
pub struct RfcommConnector {
    device: PathBuf,
}

impl RfcommConnector {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
        }
    }

    /// Use the RFCOMM device already bound to `mac`.
    pub fn for_mac(mac: &str) -> Result<Self, TinyPrintError> {
        if !is_valid_mac(mac) {
            return Err(TinyPrintError::Transport(format!(
                "Invalid MAC address '{}'",
                mac
            )));
        }
        let device = find_rfcomm_for_mac(mac)?.ok_or_else(|| {
            TinyPrintError::NotFound(format!(
                "no RFCOMM device bound to {} (try `sudo rfcomm bind 0 {}`)",
                mac, mac
            ))
        })?;
        Ok(Self::new(device))
    }
}

impl Default for RfcommConnector {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE)
    }
}

#[async_trait]
impl Connector for RfcommConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, TinyPrintError> {
        let transport = BluetoothTransport::open(&self.device).await?;
        Ok(Box::new(transport))
    }
}

/// Configure a file descriptor for raw TTY mode.
///
/// Note: IXON/IXOFF/IXANY disable XON/XOFF software flow control. This is critical
/// because 0x11 (XON/DC1) and 0x13 (XOFF/DC3) can appear in binary raster data.
#[cfg(unix)]
fn configure_tty_raw(fd: i32) -> Result<(), TinyPrintError> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(TinyPrintError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(TinyPrintError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

// ============================================================================
// RFCOMM LOOKUP HELPERS
// ============================================================================

/// Validate a Bluetooth MAC address format (XX:XX:XX:XX:XX:XX).
pub fn is_valid_mac(mac: &str) -> bool {
    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() != 6 {
        return false;
    }
    parts
        .iter()
        .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Find the device name bound to `mac` in an RFCOMM listing.
///
/// Lines look like `rfcomm0: 66:22:AA:BB:CC:DD channel 1 clean`, the same
/// in `/proc/net/rfcomm` and `rfcomm -a` output.
pub fn parse_rfcomm_listing(listing: &str, mac: &str) -> Option<String> {
    let mac_upper = mac.to_uppercase();
    listing
        .lines()
        .filter(|line| line.to_uppercase().contains(&mac_upper))
        .filter_map(|line| line.split(':').next())
        .map(|dev| dev.trim().to_string())
        .find(|dev| !dev.is_empty())
}

/// Find an existing RFCOMM device bound to the given MAC address.
///
/// Checks `/proc/net/rfcomm` and falls back to `rfcomm -a`.
/// Returns the device path (e.g., "/dev/rfcomm0") if found.
pub fn find_rfcomm_for_mac(mac: &str) -> Result<Option<PathBuf>, TinyPrintError> {
    let existing = |dev: String| {
        let path = PathBuf::from(format!("/dev/{}", dev));
        path.exists().then_some(path)
    };

    if let Ok(contents) = fs::read_to_string("/proc/net/rfcomm") {
        if let Some(path) = parse_rfcomm_listing(&contents, mac).and_then(existing) {
            return Ok(Some(path));
        }
    }

    let output = Command::new("rfcomm")
        .arg("-a")
        .output()
        .map_err(|e| TinyPrintError::Transport(format!("Failed to run 'rfcomm -a': {}", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_rfcomm_listing(&stdout, mac).and_then(existing))
}

// ============================================================================
// TESTS
// ============================================================================
