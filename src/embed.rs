//! Top-level driver: run the full rasterize → OCR → inject pipeline.
//!
//! Stages run strictly in sequence and the driver halts on the first stage
//! error, so a later stage never runs against artifacts an earlier stage
//! failed to produce. The workspace guard cleans up the transient directory
//! on every exit path.

use crate::config::EmbedConfig;
use crate::error::TextLayerError;
use crate::output::{DocumentMetadata, EmbedSummary};
use crate::pipeline::{inject, input, ocr, rasterize};
use crate::workspace::Workspace;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Embed an invisible OCR text layer into a PDF.
///
/// This is the primary entry point for the library: rasterise every page of
/// `input_path`, OCR each page image with the configured external command,
/// and save a copy of the input with per-page invisible text runs to
/// `output_path`.
///
/// # Errors
/// Returns the first stage failure encountered; in that case no output PDF
/// is written. The transient workspace is removed on success and failure
/// alike (unless [`EmbedConfig::keep_workdir`] is set).
pub async fn embed(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &EmbedConfig,
) -> Result<EmbedSummary, TextLayerError> {
    let total_start = Instant::now();
    let input_path = input::resolve_input(input_path.as_ref())?;
    let output_path = output_path.as_ref().to_path_buf();
    info!(
        "Starting text-layer embedding: {} → {}",
        input_path.display(),
        output_path.display()
    );

    let workspace = Arc::new(Workspace::create(
        config.workdir.as_deref(),
        config.keep_workdir,
    )?);

    // ── Stage 1: rasterise every page ────────────────────────────────────
    let render_start = Instant::now();
    let page_count = rasterize::rasterize_pages(&input_path, &workspace, config).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!("Rendered {} pages in {}ms", page_count, render_duration_ms);

    // ── Stage 2: OCR each page image ─────────────────────────────────────
    let ocr_start = Instant::now();
    ocr::ocr_pages(page_count, &workspace, config).await?;
    let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;

    // ── Stage 3: inject text runs and save ───────────────────────────────
    let inject_start = Instant::now();
    {
        let input = input_path.clone();
        let output = output_path.clone();
        let ws = Arc::clone(&workspace);
        let config = config.clone();
        tokio::task::spawn_blocking(move || {
            inject::inject_text(page_count, &input, &ws, &output, &config)
        })
        .await
        .map_err(|e| TextLayerError::Internal(format!("Inject task panicked: {}", e)))??;
    }
    let inject_duration_ms = inject_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(page_count);
    }

    // Remove the workspace before the summary is returned.
    drop(workspace);

    let summary = EmbedSummary {
        page_count,
        output_path,
        render_duration_ms,
        ocr_duration_ms,
        inject_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Embedding complete: {} pages in {}ms",
        summary.page_count, summary.total_duration_ms
    );
    Ok(summary)
}

/// Synchronous wrapper around [`embed`].
///
/// Creates a temporary tokio runtime internally.
pub fn embed_sync(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &EmbedConfig,
) -> Result<EmbedSummary, TextLayerError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| TextLayerError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(embed(input_path, output_path, config))
}

/// Extract PDF metadata without running OCR.
///
/// Does not require the OCR binary to be installed. `password` is needed
/// only for encrypted documents; it is ignored otherwise.
pub async fn inspect(
    input_path: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, TextLayerError> {
    let path = input::resolve_input(input_path.as_ref())?;
    rasterize::extract_metadata(&path, password).await
}
