//! Injection stage: append an invisible text run to every page.
//!
//! The original PDF is reopened with lopdf and, for each page, a new content
//! stream is appended (existing page content is untouched, so the visible
//! rendering cannot change). The stream holds a single text object drawn in
//! rendering mode 3 (`3 Tr`, no fill, no stroke): invisible, but present in
//! the page's text layer for search, selection and extraction.
//!
//! The text anchor is fixed at `(50, pageHeight − 250)` in default user
//! space, font Helvetica at size 1.0. The anchor does not adapt to text
//! length or page content; text extractors do not care where the run sits,
//! only that it is inside the media box.
//!
//! The document is saved once, after all pages: a failure on any page means
//! no output file is produced at all.

use crate::config::EmbedConfig;
use crate::error::TextLayerError;
use crate::progress::PipelineStage;
use crate::workspace::Workspace;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::path::Path;
use tracing::{debug, info};

/// X coordinate of the invisible text anchor, in points.
const TEXT_X: f32 = 50.0;
/// The anchor sits this far below the top of the media box, in points.
const TEXT_Y_OFFSET: f32 = 250.0;
/// Font size of the invisible run. Extraction ignores it; 1.0 keeps the
/// run's bounding box negligible.
const FONT_SIZE: f32 = 1.0;
/// Resource name under which the Helvetica font is registered on each page.
const FONT_NAME: &str = "TL1";
/// Text rendering mode 3: neither filled nor stroked.
const INVISIBLE_RENDER_MODE: i64 = 3;

/// Reopen `pdf_path`, append one invisible text run per page from the
/// workspace's `text_<i>.txt` files, and save to `output_path`.
///
/// `page_count` is the count reported by the rasteriser; it must match the
/// document's own page count (the per-page index is the only correlation
/// between OCR output and pages, so a mismatch would mis-assign text).
pub fn inject_text(
    page_count: usize,
    pdf_path: &Path,
    workspace: &Workspace,
    output_path: &Path,
    config: &EmbedConfig,
) -> Result<(), TextLayerError> {
    let mut doc = Document::load(pdf_path).map_err(|e| map_load_error(e, pdf_path))?;

    let pages: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    if pages.len() != page_count {
        return Err(TextLayerError::Internal(format!(
            "page count mismatch: rasteriser saw {} pages, document has {}",
            page_count,
            pages.len()
        )));
    }

    // Shared across pages; referenced from each page's resources.
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    for (idx, page_id) in pages.iter().copied().enumerate() {
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(PipelineStage::Inject, idx + 1, page_count);
        }

        let text_path = workspace.text_path(idx);
        if !text_path.exists() {
            return Err(TextLayerError::MissingPageText {
                page: idx,
                path: text_path,
            });
        }
        let single_line = read_page_text(&text_path).map_err(|e| {
            TextLayerError::ContentStreamFailed {
                page: idx,
                detail: format!("reading '{}': {}", text_path.display(), e),
            }
        })?;

        let page_height = page_height(&doc, page_id);
        let content = text_layer_content(&single_line, page_height);
        let encoded = content
            .encode()
            .map_err(|e| TextLayerError::ContentStreamFailed {
                page: idx,
                detail: e.to_string(),
            })?;

        let stream_id = doc.add_object(lopdf::Stream::new(dictionary! {}, encoded));

        register_font(&mut doc, page_id, font_id).map_err(|e| {
            TextLayerError::ContentStreamFailed {
                page: idx,
                detail: format!("font resource: {}", e),
            }
        })?;
        append_content(&mut doc, page_id, stream_id).map_err(|e| {
            TextLayerError::ContentStreamFailed {
                page: idx,
                detail: format!("contents: {}", e),
            }
        })?;

        debug!(
            "Injected {} chars into page {} (height {:.1})",
            single_line.len(),
            idx + 1,
            page_height
        );

        if let Some(ref cb) = config.progress_callback {
            cb.on_page_done(PipelineStage::Inject, idx + 1, page_count);
        }
    }

    doc.save(output_path)
        .map_err(|e| TextLayerError::SaveFailed {
            path: output_path.to_path_buf(),
            detail: e.to_string(),
        })?;

    info!(
        "Saved output PDF: {} ({} pages)",
        output_path.display(),
        page_count
    );
    Ok(())
}

/// Read a page's OCR text and join all lines into one unbroken string.
///
/// Line breaks are deliberately dropped with no separator: the embedded run
/// is a single logical line. Joining with spaces instead would change what a
/// search for a hyphen-split word finds, so the historical join-with-nothing
/// behaviour is kept as the contract.
pub(crate) fn read_page_text(path: &Path) -> std::io::Result<String> {
    let raw = std::fs::read_to_string(path)?;
    Ok(raw.lines().collect())
}

/// Build the invisible text object for one page.
fn text_layer_content(single_line: &str, page_height: f32) -> Content {
    Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![FONT_NAME.into(), FONT_SIZE.into()]),
            Operation::new("Tr", vec![INVISIBLE_RENDER_MODE.into()]),
            Operation::new("Td", vec![TEXT_X.into(), (page_height - TEXT_Y_OFFSET).into()]),
            // Literal string: fine for the Latin output of a tesseract run
            // against a standard Helvetica; codepoints outside WinAnsi will
            // not extract cleanly.
            Operation::new("Tj", vec![Object::string_literal(single_line)]),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ],
    }
}

/// Media-box height for a page, following the Parent chain for inherited
/// boxes. Falls back to US Letter when absent.
fn page_height(doc: &Document, page_id: ObjectId) -> f32 {
    const LETTER_HEIGHT: f32 = 792.0;
    // Depth cap guards against Parent cycles in malformed files.
    const MAX_TREE_DEPTH: usize = 64;

    let Ok(mut dict) = doc.get_dictionary(page_id) else {
        return LETTER_HEIGHT;
    };
    for _ in 0..MAX_TREE_DEPTH {
        if let Some(h) = media_box_height(dict) {
            return h;
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => match doc.get_dictionary(*parent_id) {
                Ok(parent) => dict = parent,
                Err(_) => break,
            },
            _ => break,
        }
    }
    LETTER_HEIGHT
}

fn media_box_height(dict: &Dictionary) -> Option<f32> {
    let Ok(Object::Array(arr)) = dict.get(b"MediaBox") else {
        return None;
    };
    let values: Vec<f32> = arr
        .iter()
        .filter_map(|o| match o {
            Object::Integer(i) => Some(*i as f32),
            Object::Real(r) => Some(*r),
            _ => None,
        })
        .collect();
    if values.len() == 4 {
        // [llx lly urx ury]
        Some(values[3] - values[1])
    } else {
        None
    }
}

/// Make the shared Helvetica available as `/TL1` in the page's resources.
///
/// Resources and the Font sub-dictionary may each live inline or behind an
/// indirect reference; all four combinations occur in the wild.
fn register_font(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
) -> Result<(), lopdf::Error> {
    #[derive(Clone, Copy)]
    enum Loc {
        Direct,
        Indirect(ObjectId),
    }

    let resources_loc = {
        let page = doc.get_dictionary(page_id)?;
        match page.get(b"Resources") {
            Ok(Object::Reference(id)) => Loc::Indirect(*id),
            Ok(Object::Dictionary(_)) => Loc::Direct,
            _ => {
                // Missing on the page itself. A page-level Resources shadows
                // the inherited one entirely, so start from a clone of the
                // inherited dict, not from empty, or the page's existing
                // content loses its fonts and XObjects.
                let inherited =
                    inherited_resources(doc, page_id).unwrap_or_else(Dictionary::new);
                let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
                page.set("Resources", inherited);
                Loc::Direct
            }
        }
    };

    let font_dict_ref = {
        let resources = match resources_loc {
            Loc::Indirect(id) => doc.get_dictionary(id)?,
            Loc::Direct => doc.get_dictionary(page_id)?.get(b"Resources")?.as_dict()?,
        };
        match resources.get(b"Font") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        }
    };

    match font_dict_ref {
        Some(id) => {
            let fonts = doc.get_object_mut(id)?.as_dict_mut()?;
            fonts.set(FONT_NAME, Object::Reference(font_id));
        }
        None => {
            let resources = match resources_loc {
                Loc::Indirect(id) => doc.get_object_mut(id)?.as_dict_mut()?,
                Loc::Direct => doc
                    .get_object_mut(page_id)?
                    .as_dict_mut()?
                    .get_mut(b"Resources")?
                    .as_dict_mut()?,
            };
            let mut fonts = match resources.get(b"Font") {
                Ok(Object::Dictionary(d)) => d.clone(),
                _ => Dictionary::new(),
            };
            fonts.set(FONT_NAME, Object::Reference(font_id));
            resources.set("Font", Object::Dictionary(fonts));
        }
    }
    Ok(())
}

/// Nearest `Resources` dictionary inherited through the page's Parent chain.
fn inherited_resources(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    const MAX_TREE_DEPTH: usize = 64;

    let mut dict = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") else {
            return None;
        };
        let parent = doc.get_dictionary(*parent_id).ok()?;
        match parent.get(b"Resources") {
            Ok(Object::Dictionary(d)) => return Some(d.clone()),
            Ok(Object::Reference(id)) => return doc.get_dictionary(*id).ok().cloned(),
            _ => dict = parent,
        }
    }
    None
}

/// Append the new stream to the page's Contents, preserving what is there.
fn append_content(
    doc: &mut Document,
    page_id: ObjectId,
    stream_id: ObjectId,
) -> Result<(), lopdf::Error> {
    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    let contents = page.get(b"Contents").ok().cloned();
    let new = match contents {
        Some(Object::Reference(existing)) => Object::Array(vec![
            Object::Reference(existing),
            Object::Reference(stream_id),
        ]),
        Some(Object::Array(mut streams)) => {
            streams.push(Object::Reference(stream_id));
            Object::Array(streams)
        }
        // No prior content (blank page).
        _ => Object::Reference(stream_id),
    };
    page.set("Contents", new);
    Ok(())
}

fn map_load_error(e: lopdf::Error, path: &Path) -> TextLayerError {
    match e {
        lopdf::Error::Decryption(_) => TextLayerError::PasswordRequired {
            path: path.to_path_buf(),
        },
        other => TextLayerError::CorruptPdf {
            path: path.to_path_buf(),
            detail: other.to_string(),
        },
    }
}
