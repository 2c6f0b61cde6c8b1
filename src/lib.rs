//! # pdf-textlayer
//!
//! Make scanned PDFs searchable by embedding an invisible OCR text layer.
//!
//! ## Why this crate?
//!
//! A scanned PDF is a stack of page images: nothing to search, nothing to
//! select, nothing for indexers to read. This crate rasterises each page,
//! runs an external OCR engine (tesseract by default) over the image, and
//! writes the recognised text back into the same page as an invisible text
//! run. The document looks exactly as before, but its text can now be
//! searched, selected and extracted.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      validate the path and PDF magic bytes
//!  ├─ 2. Rasterize  render each page to a 300-DPI PNG via pdfium
//!  ├─ 3. OCR        one external tesseract process per page, sequential
//!  ├─ 4. Inject     append an invisible text run (render mode 3) per page
//!  └─ 5. Output     single save of the modified PDF; workspace removed
//! ```
//!
//! Stages hand off through a transient workspace directory holding
//! `image_<i>.png` and `text_<i>.txt` per page; the zero-based page index is
//! the only correlation key. The pipeline halts on the first stage failure,
//! so a single bad page means no output PDF rather than a silently
//! half-embedded one.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_textlayer::{embed, EmbedConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EmbedConfig::default();
//!     let summary = embed("scan.pdf", "scan-searchable.pdf", &config).await?;
//!     eprintln!("{} pages in {}ms", summary.page_count, summary.total_duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Requirements
//!
//! * A pdfium shared library (system copy, or point `PDFIUM_LIB_PATH` at a
//!   directory containing one).
//! * An OCR binary on `PATH`, `tesseract` by default, configurable via
//!   [`EmbedConfig`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `textlayer` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf-textlayer = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod embed;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod workspace;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{EmbedConfig, EmbedConfigBuilder};
pub use embed::{embed, embed_sync, inspect};
pub use error::TextLayerError;
pub use output::{DocumentMetadata, EmbedSummary};
pub use progress::{EmbedProgressCallback, NoopProgressCallback, PipelineStage, ProgressCallback};
pub use workspace::Workspace;
