//! PDF rasterisation: render every page to a PNG in the workspace.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread designed for blocking operations.
//!
//! ## DPI handling
//!
//! The target pixel size is computed per page from its media box
//! (`points / 72 × dpi`), so mixed-size documents come out at a uniform
//! physical resolution. The document handle lives entirely inside the
//! blocking call and is released before this function returns, on error
//! paths included.

use crate::config::EmbedConfig;
use crate::error::TextLayerError;
use crate::output::DocumentMetadata;
use crate::progress::PipelineStage;
use crate::workspace::Workspace;
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Rasterise every page of `pdf_path` into `workspace` as `image_<i>.png`.
///
/// Returns the page count. A zero-page document is not an error; the
/// remaining stages simply have nothing to do.
pub async fn rasterize_pages(
    pdf_path: &Path,
    workspace: &Arc<Workspace>,
    config: &EmbedConfig,
) -> Result<usize, TextLayerError> {
    let path = pdf_path.to_path_buf();
    let ws = Arc::clone(workspace);
    let config = config.clone();

    tokio::task::spawn_blocking(move || rasterize_blocking(&path, &ws, &config))
        .await
        .map_err(|e| TextLayerError::Internal(format!("Render task panicked: {}", e)))?
}

/// Blocking implementation of page rasterisation.
fn rasterize_blocking(
    pdf_path: &Path,
    workspace: &Workspace,
    config: &EmbedConfig,
) -> Result<usize, TextLayerError> {
    let pdfium = bind_pdfium()?;
    let document = load_document(&pdfium, pdf_path, config.password.as_deref())?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total_pages);
    }

    for (idx, page) in pages.iter().enumerate() {
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(PipelineStage::Rasterize, idx + 1, total_pages);
        }

        let scale = config.dpi as f32 / 72.0;
        let width_px = (page.width().value * scale).round() as i32;
        let height_px = (page.height().value * scale).round() as i32;

        let render_config = PdfRenderConfig::new()
            .set_target_width(width_px)
            .set_maximum_height(height_px);

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| TextLayerError::RasterisationFailed {
                    page: idx,
                    detail: format!("{:?}", e),
                })?;

        let image = bitmap.as_image();
        let image_path = workspace.image_path(idx);
        image
            .save(&image_path)
            .map_err(|e| TextLayerError::ImageWriteFailed {
                page: idx,
                path: image_path.clone(),
                source: e,
            })?;

        debug!(
            "Rendered page {} → {}x{} px → {}",
            idx + 1,
            image.width(),
            image.height(),
            image_path.display()
        );

        if let Some(ref cb) = config.progress_callback {
            cb.on_page_done(PipelineStage::Rasterize, idx + 1, total_pages);
        }
    }

    Ok(total_pages)
}

/// Extract document metadata from a PDF without rendering pages.
pub async fn extract_metadata(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, TextLayerError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || extract_metadata_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| TextLayerError::Internal(format!("Metadata task panicked: {}", e)))?
}

/// Blocking implementation of metadata extraction.
fn extract_metadata_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, TextLayerError> {
    let pdfium = bind_pdfium()?;
    let document = load_document(&pdfium, pdf_path, password)?;

    let metadata = document.metadata();
    let pages = document.pages();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: pages.len() as usize,
        pdf_version: format!("{:?}", document.version()),
    })
}

/// Bind to a pdfium library: `PDFIUM_LIB_PATH` first, then the system copy.
fn bind_pdfium() -> Result<Pdfium, TextLayerError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(dir) if !dir.is_empty() => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
                .or_else(|_| Pdfium::bind_to_system_library())
        }
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| TextLayerError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Open the document, mapping pdfium's opaque errors onto our taxonomy.
///
/// The password borrow is tied to the document handle because pdfium keeps
/// it for lazy decryption.
fn load_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, TextLayerError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                TextLayerError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                TextLayerError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            TextLayerError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}
