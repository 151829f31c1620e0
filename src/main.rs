//! # tinyprint CLI
//!
//! Command-line interface for a BLE mini thermal printer.
//!
//! ## Usage
//!
//! ```bash
//! # Run the MCP server on stdio (what desktop MCP clients launch)
//! tinyprint serve
//!
//! # Run the MCP server over HTTP on 127.0.0.1:3100
//! tinyprint serve --http
//!
//! # Print markdown directly
//! tinyprint print "# Groceries\n☐ milk\n☐ eggs"
//!
//! # Print a centered banner, largest font that fits
//! tinyprint print --fitted "HAPPY\nBIRTHDAY"
//!
//! # Preview without a printer
//! tinyprint render --png preview.png "# Groceries"
//!
//! # Use a printer bound to an RFCOMM TTY instead of BLE
//! tinyprint --transport rfcomm --device /dev/rfcomm0 print "hello"
//! ```
//!
//! Logs go to stderr (`RUST_LOG=debug` for more); stdout stays clean for
//! the MCP stdio stream.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tinyprint::{
    PrinterConfig, RasterImage, Rasterizer, TinyPrintError,
    printer::{PrintService, PrinterManager},
    render::{FontPaths, FontSet, Layout},
    server,
    transport::{Connector, RfcommConnector},
};

/// tinyprint - print text on a BLE mini thermal printer
#[derive(Parser, Debug)]
#[command(name = "tinyprint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// How to reach the printer
    #[arg(long, value_enum, default_value_t = TransportKind::Ble, global = true)]
    transport: TransportKind,

    /// RFCOMM device path (rfcomm transport)
    #[arg(long, default_value = "/dev/rfcomm0", global = true)]
    device: PathBuf,

    /// Printer MAC address; looks up the bound RFCOMM device (rfcomm transport)
    #[arg(long, global = true)]
    mac: Option<String>,

    /// Substring of the advertised BLE name to connect to
    #[arg(long, global = true)]
    name_marker: Option<String>,

    /// BLE scan duration in seconds
    #[arg(long, value_name = "SECS", global = true)]
    scan_timeout: Option<u64>,

    /// Primary font file (TTF/OTF/TTC)
    #[arg(long, value_name = "FILE", global = true)]
    font: Option<PathBuf>,

    /// Fallback font file, used when the primary is missing
    #[arg(long, value_name = "FILE", global = true)]
    fallback_font: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server exposing print_markdown and print_text
    Serve {
        /// Serve streamable HTTP on localhost instead of stdio
        #[arg(long)]
        http: bool,

        /// HTTP port (used with --http)
        #[arg(long, default_value_t = server::DEFAULT_HTTP_PORT)]
        port: u16,
    },

    /// Print text once and exit
    Print {
        /// Text to print; `\n` sequences become line breaks
        text: String,

        /// Scale the longest line to the paper width and center every line
        #[arg(long)]
        fitted: bool,
    },

    /// Render text to a PNG preview instead of printing
    Render {
        /// Text to render
        text: String,

        /// Output PNG file
        #[arg(long, value_name = "FILE")]
        png: PathBuf,

        /// Use the fitted layout
        #[arg(long)]
        fitted: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TransportKind {
    /// Bluetooth Low Energy, discovered by name
    Ble,
    /// Bluetooth serial port bound with `rfcomm`
    Rfcomm,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), TinyPrintError> {
    let config = printer_config(&cli);
    let rasterizer = Rasterizer::for_printer(FontSet::load(&font_paths(&cli)), &config);
    log::debug!("text font: {:?}", rasterizer.fonts().active_family());

    match &cli.command {
        Commands::Serve { http, port } => {
            let service = Arc::new(print_service(&cli, rasterizer, config)?);
            if *http {
                server::serve_http(service, *port).await
            } else {
                server::serve_stdio(service).await
            }
        }

        Commands::Print { text, fitted } => {
            let service = print_service(&cli, rasterizer, config)?;
            service.print(text, layout(*fitted)).await?;
            service.manager().disconnect().await;
            println!("Printed successfully!");
            Ok(())
        }

        Commands::Render { text, png, fitted } => {
            let image = rasterizer.render(text, layout(*fitted))?;
            save_png(png, &image)?;
            println!(
                "Saved {}x{} preview to {}",
                image.width(),
                image.height(),
                png.display()
            );
            Ok(())
        }
    }
}

fn layout(fitted: bool) -> Layout {
    if fitted {
        Layout::Fitted
    } else {
        Layout::Markdown
    }
}

fn printer_config(cli: &Cli) -> PrinterConfig {
    let mut config = PrinterConfig::PPG;
    if let Some(marker) = &cli.name_marker {
        config = config.with_name_marker(marker.clone());
    }
    if let Some(secs) = cli.scan_timeout {
        config = config.with_scan_timeout(Duration::from_secs(secs));
    }
    config
}

fn font_paths(cli: &Cli) -> FontPaths {
    let defaults = FontPaths::default();
    FontPaths {
        primary: cli.font.clone().unwrap_or(defaults.primary),
        fallback: cli.fallback_font.clone().unwrap_or(defaults.fallback),
    }
}

fn print_service(
    cli: &Cli,
    rasterizer: Rasterizer,
    config: PrinterConfig,
) -> Result<PrintService, TinyPrintError> {
    let connector = connector(cli, &config)?;
    Ok(PrintService::new(
        rasterizer,
        config,
        PrinterManager::with_connector(connector),
    ))
}

fn connector(cli: &Cli, config: &PrinterConfig) -> Result<Box<dyn Connector>, TinyPrintError> {
    match cli.transport {
        TransportKind::Rfcomm => {
            let connector = match &cli.mac {
                Some(mac) => RfcommConnector::for_mac(mac)?,
                None => RfcommConnector::new(&cli.device),
            };
            Ok(Box::new(connector))
        }
        #[cfg(feature = "ble")]
        TransportKind::Ble => Ok(Box::new(tinyprint::transport::BleConnector::new(
            config.clone(),
        ))),
        #[cfg(not(feature = "ble"))]
        TransportKind::Ble => {
            let _ = config;
            Err(TinyPrintError::Transport(
                "built without BLE support; use --transport rfcomm".to_string(),
            ))
        }
    }
}

/// Save a raster as a PNG, ink drawn black.
fn save_png(path: &PathBuf, image: &RasterImage) -> Result<(), TinyPrintError> {
    image
        .to_preview()
        .save(path)
        .map_err(|e| TinyPrintError::Image(format!("Failed to save PNG: {}", e)))
}
