//! # Pipeline Tests
//!
//! End-to-end checks of text → raster → print job → transport. Most use the
//! built-in bitmap font; scalable-font checks use DejaVu Sans from
//! `tests/fonts`, so no test depends on fonts installed on the machine.

use std::sync::{Arc, Mutex};

use ab_glyph::FontArc;
use async_trait::async_trait;
use pretty_assertions::assert_eq;

use tinyprint::printer::{PrintService, PrinterManager};
use tinyprint::protocol::{self, graphics};
use tinyprint::render::fitted::{MAX_FONT_SIZE, MIN_FONT_SIZE, fit_font_size};
use tinyprint::render::text::desymbolize;
use tinyprint::render::{FontSet, Layout};
use tinyprint::transport::{Connector, Transport};
use tinyprint::{PrinterConfig, RasterImage, Rasterizer, TinyPrintError};

/// Bytes before the payload: ESC @ then GS v 0 m xL xH yL yH.
const HEADER_LEN: usize = 10;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn rasterizer() -> Rasterizer {
    Rasterizer::for_printer(FontSet::builtin_only(), &PrinterConfig::PPG)
}

fn dejavu_sans() -> FontSet {
    let font = FontArc::try_from_slice(include_bytes!("fonts/DejaVuSans.ttf")).unwrap();
    FontSet::from_fonts(Some(font), None)
}

fn payload(job: &[u8]) -> &[u8] {
    &job[HEADER_LEN..job.len() - protocol::TRAILING_FEEDS]
}

fn row_has_ink(image: &RasterImage, y: u32) -> bool {
    image.row(y).iter().any(|&p| p != 0)
}

type Jobs = Arc<Mutex<Vec<Vec<u8>>>>;

struct RecordingTransport {
    jobs: Jobs,
    fail: bool,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn write_all(&mut self, data: &[u8]) -> Result<(), TinyPrintError> {
        if self.fail {
            return Err(TinyPrintError::Transport("printer went away".to_string()));
        }
        self.jobs.lock().unwrap().push(data.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "recorder".to_string()
    }
}

/// Hands out transports; the first `failing` connections fail their writes.
struct RecordingConnector {
    jobs: Jobs,
    connects: Arc<Mutex<usize>>,
    failing: usize,
}

#[async_trait]
impl Connector for RecordingConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, TinyPrintError> {
        let mut connects = self.connects.lock().unwrap();
        *connects += 1;
        Ok(Box::new(RecordingTransport {
            jobs: self.jobs.clone(),
            fail: *connects <= self.failing,
        }))
    }
}

// ============================================================================
// RASTERIZER
// ============================================================================

#[test]
fn fitted_size_fits_or_is_minimum() {
    let fonts = FontSet::builtin_only();
    let target = PrinterConfig::PPG.fit_width();
    let lines = vec![
        "hi".to_string(),
        "Shopping list".to_string(),
        "w".repeat(45),
        "w".repeat(46),
        "w".repeat(120),
    ];

    for line in lines.iter().map(String::as_str) {
        let size = fit_font_size(&fonts, line, target);
        let width = fonts.face(size).bounds(line).width();
        assert!(
            width <= target || size == MIN_FONT_SIZE,
            "{:?}: size {} measures {}",
            line,
            size,
            width
        );
    }
}

#[test]
fn fitted_size_is_largest_that_fits_scalable_font() {
    let fonts = dejavu_sans();
    let target = PrinterConfig::PPG.fit_width();

    for anchor in ["Hi", "Hello", "Buy milk and eggs", "The quick brown fox jumps over the lazy dog"] {
        let size = fit_font_size(&fonts, anchor, target);
        assert!(fonts.face(size).bounds(anchor).width() <= target);
        assert!(size == MAX_FONT_SIZE || fonts.face(size + 1).bounds(anchor).width() > target);
    }
}

#[test]
fn markdown_draws_at_pixel_em() {
    let rasterizer = Rasterizer::for_printer(dejavu_sans(), &PrinterConfig::PPG);
    // Cap height of a 24 px em DejaVu Sans is about 17.5 px
    let image = rasterizer.render_markdown("H");
    assert!(
        (16..=20).contains(&image.height()),
        "cropped height {}",
        image.height()
    );
}

#[test]
fn fitted_height_follows_line_count() {
    let image = rasterizer().render_fitted("Hello\n\n  World!  \nbye").unwrap();

    // 10 + 3 * (16 + 5) + 10
    assert_eq!(image.width(), 384);
    assert_eq!(image.height(), 83);
    assert!(!row_has_ink(&image, 0));
    assert!(!row_has_ink(&image, image.height() - 1));
}

#[test]
fn fitted_lines_are_centered() {
    let image = rasterizer().render_fitted("ab\nabcdef").unwrap();

    let columns = |y_range: std::ops::Range<u32>| {
        let ink: Vec<u32> = (0..image.width())
            .filter(|&x| y_range.clone().any(|y| image.is_ink(x, y)))
            .collect();
        (ink[0], ink[ink.len() - 1])
    };

    // Cells: "ab" at x = (384 - 16) / 2 = 184, "abcdef" at (384 - 48) / 2 = 168
    let (first_left, first_right) = columns(10..26);
    let (second_left, second_right) = columns(31..47);
    assert!(first_left >= 184 && first_right < 200);
    assert!(second_left >= 168 && second_right < 216);
}

#[test]
fn markdown_is_cropped_to_ink() {
    let image = rasterizer().render_markdown("# Groceries\\n☐ milk\\n☐ eggs");

    assert_eq!(image.width(), 384);
    assert!(image.height() < 2000);
    assert!(row_has_ink(&image, 0));
    assert!(row_has_ink(&image, image.height() - 1));
}

#[test]
fn markdown_blank_keeps_scratch_canvas() {
    let image = rasterizer().render_markdown("  \n ");
    assert_eq!((image.width(), image.height()), (384, 2000));
    assert_eq!(image.ink_count(), 0);
}

#[test]
fn desymbolize_markdown_input() {
    assert_eq!(
        desymbolize("## **Todo**\\n□ milk\\n☐ eggs"),
        " Todo\n\u{2022}  milk\n\u{2022}  eggs"
    );
}

// ============================================================================
// ENCODER
// ============================================================================

#[test]
fn encode_header_fields() {
    let job = protocol::encode(&RasterImage::blank(384, 300), &PrinterConfig::PPG).unwrap();

    assert_eq!(
        &job[..HEADER_LEN],
        &[0x1B, 0x40, 0x1D, 0x76, 0x30, 0x00, 0x30, 0x00, 0x2C, 0x01]
    );
    assert_eq!(&job[job.len() - 3..], &[0x0A, 0x0A, 0x0A]);
    assert_eq!(payload(&job).len(), 48 * 300);
}

#[test]
fn encode_round_trip() {
    let image = RasterImage::from_fn(384, 8, |_, y| y < 2);
    let job = protocol::encode(&image, &PrinterConfig::PPG).unwrap();
    let data = payload(&job);

    let mut expected = vec![0xFF; 96];
    expected.extend(vec![0x00; 48 * 6]);
    assert_eq!(data, expected.as_slice());
    assert_eq!(graphics::unpack(data, 384, 8), image);
}

#[test]
fn encode_rejects_tall_image() {
    let err = protocol::encode(&RasterImage::blank(384, 70_000), &PrinterConfig::PPG).unwrap_err();
    assert!(matches!(err, TinyPrintError::HeightOverflow { height: 70_000 }));
}

#[test]
fn encode_crops_wide_image_from_left() {
    // Ink only beyond column 384
    let image = RasterImage::from_fn(400, 4, |x, _| x >= 384);
    let job = protocol::encode(&image, &PrinterConfig::PPG).unwrap();
    assert!(payload(&job).iter().all(|&b| b == 0));
}

#[test]
fn rendered_text_encodes_at_print_width() {
    let image = rasterizer().render_fitted("HELLO").unwrap();
    let job = protocol::encode(&image, &PrinterConfig::PPG).unwrap();

    assert_eq!(payload(&job).len(), 48 * image.height() as usize);
    assert_eq!(graphics::unpack(payload(&job), 384, image.height()), image);
}

// ============================================================================
// PRINT SERVICE
// ============================================================================

fn service(failing: usize) -> (PrintService, Jobs, Arc<Mutex<usize>>) {
    let jobs: Jobs = Arc::new(Mutex::new(Vec::new()));
    let connects = Arc::new(Mutex::new(0));
    let connector = RecordingConnector {
        jobs: jobs.clone(),
        connects: connects.clone(),
        failing,
    };
    let service = PrintService::new(
        rasterizer(),
        PrinterConfig::PPG,
        PrinterManager::new(connector),
    );
    (service, jobs, connects)
}

#[tokio::test]
async fn print_reuses_connection() {
    let (service, jobs, connects) = service(0);

    service.print("# Note", Layout::Markdown).await.unwrap();
    service.print("BIG", Layout::Fitted).await.unwrap();

    assert_eq!(*connects.lock().unwrap(), 1);
    let jobs = jobs.lock().unwrap();
    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().all(|job| job.starts_with(&[0x1B, 0x40, 0x1D, 0x76])));
}

#[tokio::test]
async fn print_reconnects_after_failed_write() {
    let (service, jobs, connects) = service(1);

    let err = service.print("first", Layout::Markdown).await.unwrap_err();
    assert!(matches!(err, TinyPrintError::Transport(_)));
    assert!(!service.manager().is_connected().await);

    service.print("second", Layout::Markdown).await.unwrap();
    assert_eq!(*connects.lock().unwrap(), 2);
    assert_eq!(jobs.lock().unwrap().len(), 1);
}
