//! Output types: run summary and document metadata.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary of a completed embedding run.
///
/// Returned by [`crate::embed`] once the output PDF has been saved and the
/// workspace cleaned up. Serialisable for `--json` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedSummary {
    /// Number of pages in the input document (and therefore in the output).
    pub page_count: usize,

    /// Where the output PDF was written.
    pub output_path: PathBuf,

    /// Wall-clock time spent rasterising pages.
    pub render_duration_ms: u64,

    /// Wall-clock time spent in external OCR processes.
    pub ocr_duration_ms: u64,

    /// Wall-clock time spent injecting text and saving the output.
    pub inject_duration_ms: u64,

    /// Total wall-clock time for the run.
    pub total_duration_ms: u64,
}

/// PDF document metadata, extracted without running the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}
