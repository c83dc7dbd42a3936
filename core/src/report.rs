//! Structured progress and diagnostic events
//!
//! Components receive a `&dyn Reporter` and emit user-facing [`Event`]s
//! through it. The binary plugs in [`LogReporter`], tests use
//! [`MemoryReporter`] to assert on what happened.

use dicom_core::Tag;
use log::{debug, error, info, warn};
use std::cell::RefCell;
use std::path::PathBuf;

use crate::extraction::tags::tag_key;

/// Something worth telling the user about
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A source file was decomposed or recombined successfully
    FileProcessed { path: PathBuf },
    /// A source file failed; the batch moves on
    FileFailed { path: PathBuf, reason: String },
    /// The data set has no Pixel Data element
    MissingPixelData { path: PathBuf },
    /// One element could not be rebuilt and was left out
    ElementSkipped { tag: Tag, reason: String },
    /// Pixel payload statistics of an extracted file
    CompressionStats {
        transfer_syntax: String,
        is_compressed: bool,
        pixel_data_size: u64,
        theoretical_size: u64,
        ratio: f64,
    },
    /// A file was written by the recombiner
    Recombined {
        path: PathBuf,
        elements: usize,
        skipped: usize,
    },
    /// Free-form progress message
    Info(String),
}

/// Receiver of [`Event`]s
pub trait Reporter {
    fn report(&self, event: Event);
}

/// Forwards events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, event: Event) {
        match event {
            Event::FileProcessed { path } => info!("Processed: {}", path.display()),
            Event::FileFailed { path, reason } => {
                error!("Failed to process {}: {}", path.display(), reason)
            }
            Event::MissingPixelData { path } => {
                warn!("No pixel data found in {}", path.display())
            }
            Event::ElementSkipped { tag, reason } => {
                warn!("Skipping element {}: {}", tag_key(tag), reason)
            }
            Event::CompressionStats {
                transfer_syntax,
                is_compressed,
                pixel_data_size,
                theoretical_size,
                ratio,
            } => {
                info!("Transfer syntax: {}", transfer_syntax);
                if is_compressed {
                    info!(
                        "Compressed pixel data: {} bytes (uncompressed {} bytes, ratio {:.2}:1)",
                        pixel_data_size, theoretical_size, ratio
                    );
                } else {
                    debug!("Uncompressed pixel data: {} bytes", pixel_data_size);
                }
            }
            Event::Recombined {
                path,
                elements,
                skipped,
            } => info!(
                "Recombined {} ({} elements, {} skipped)",
                path.display(),
                elements,
                skipped
            ),
            Event::Info(message) => info!("{}", message),
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: RefCell<Vec<Event>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Number of skipped-element events
    pub fn skipped_count(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::ElementSkipped { .. }))
            .count()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}
