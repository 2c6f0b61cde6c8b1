//! Error types for the pdf-textlayer library.
//!
//! Every pipeline stage reports failure through [`TextLayerError`] and the
//! driver halts on the first error, so a stage never runs against artifacts a
//! previous stage failed to produce. Variants are grouped by the stage that
//! raises them; any variant carrying a `page` field refers to the zero-based
//! index of the page whose artifact was being produced or consumed.
//!
//! One deliberate consequence of halt-on-first-error: a single failing page
//! means no output PDF is written at all. The save only happens after every
//! page has been injected, so there is never a partially-embedded output
//! file on disk.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf-textlayer library.
#[derive(Debug, Error)]
pub enum TextLayerError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium returned an error while rendering a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The rendered page image could not be written to the workspace.
    #[error("Failed to write page image '{path}': {source}")]
    ImageWriteFailed {
        page: usize,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The OCR command could not be spawned (typically: binary not on PATH).
    #[error("Failed to run OCR command '{command}': {source}\nIs it installed and on your PATH?")]
    OcrSpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The OCR process exited with a non-zero status.
    #[error("OCR failed for page {page}: {stderr}")]
    OcrFailed { page: usize, stderr: String },

    /// The OCR process ran past the configured per-page timeout.
    #[error("OCR timed out after {secs}s on page {page}\nIncrease --ocr-timeout or check the image.")]
    OcrTimeout { page: usize, secs: u64 },

    /// A page image expected by the OCR stage is missing from the workspace.
    #[error("Page image for page {page} was never written: '{path}'")]
    MissingPageImage { page: usize, path: PathBuf },

    // ── Injection errors ──────────────────────────────────────────────────
    /// A per-page OCR text file expected by the injection stage is missing.
    ///
    /// Raised before anything is written, so no output PDF is produced.
    #[error("OCR text for page {page} is missing: '{path}'\nNo output PDF was written.")]
    MissingPageText { page: usize, path: PathBuf },

    /// Building or encoding the invisible-text content stream failed.
    #[error("Failed to build text layer for page {page}: {detail}")]
    ContentStreamFailed { page: usize, detail: String },

    /// Could not save the final output PDF.
    #[error("Failed to save output PDF '{path}': {detail}")]
    SaveFailed { path: PathBuf, detail: String },

    // ── Workspace errors ──────────────────────────────────────────────────
    /// The transient workspace directory could not be created or reset.
    #[error("Failed to prepare workspace directory '{path}': {source}")]
    WorkspaceFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH to a directory containing libpdfium, or install\n\
pdfium as a system library.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ocr_timeout_display() {
        let e = TextLayerError::OcrTimeout { page: 3, secs: 120 };
        let msg = e.to_string();
        assert!(msg.contains("120s"), "got: {msg}");
        assert!(msg.contains("page 3"));
    }

    #[test]
    fn missing_page_text_display() {
        let e = TextLayerError::MissingPageText {
            page: 1,
            path: PathBuf::from("/tmp/ws/text_1.txt"),
        };
        let msg = e.to_string();
        assert!(msg.contains("text_1.txt"));
        assert!(msg.contains("No output PDF"));
    }

    #[test]
    fn ocr_failed_display() {
        let e = TextLayerError::OcrFailed {
            page: 0,
            stderr: "Error opening data file eng.traineddata".into(),
        };
        assert!(e.to_string().contains("eng.traineddata"));
    }

    #[test]
    fn not_a_pdf_display() {
        let e = TextLayerError::NotAPdf {
            path: PathBuf::from("notes.txt"),
            magic: *b"hell",
        };
        assert!(e.to_string().contains("notes.txt"));
    }
}
