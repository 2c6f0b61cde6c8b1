//! Progress-callback trait for per-page pipeline events.
//!
//! Inject an [`Arc<dyn EmbedProgressCallback>`] via
//! [`crate::config::EmbedConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline works through each page.
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a database record, or a terminal progress bar
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` because the rasterisation stage
//! runs on a blocking worker thread.

use std::fmt;
use std::sync::Arc;

/// The three page-by-page stages of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Rendering pages to PNG images.
    Rasterize,
    /// Running the external OCR command over page images.
    Ocr,
    /// Injecting invisible text runs into the output PDF.
    Inject,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Rasterize => write!(f, "rasterize"),
            PipelineStage::Ocr => write!(f, "ocr"),
            PipelineStage::Inject => write!(f, "inject"),
        }
    }
}

/// Called by the pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Pages are processed strictly in order within each
/// stage, so events arrive ordered; implementations still must be
/// `Send + Sync` because stages run on different threads.
pub trait EmbedProgressCallback: Send + Sync {
    /// Called once, after the PDF has been opened and the page count is known.
    fn on_run_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a stage begins work on a page.
    ///
    /// `page_num` is 1-indexed for display purposes.
    fn on_page_start(&self, stage: PipelineStage, page_num: usize, total_pages: usize) {
        let _ = (stage, page_num, total_pages);
    }

    /// Called when a stage finishes a page.
    fn on_page_done(&self, stage: PipelineStage, page_num: usize, total_pages: usize) {
        let _ = (stage, page_num, total_pages);
    }

    /// Called once after the output PDF has been saved.
    fn on_run_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl EmbedProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::EmbedConfig`].
pub type ProgressCallback = Arc<dyn EmbedProgressCallback>;
