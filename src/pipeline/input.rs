//! Input validation: confirm the user-supplied path is a readable PDF.
//!
//! We validate the PDF magic bytes (`%PDF`) up front so callers get a
//! meaningful error rather than a pdfium crash three stages in.

use crate::error::TextLayerError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local PDF path, checking existence, readability and magic bytes.
pub fn resolve_input(path_str: impl AsRef<Path>) -> Result<PathBuf, TextLayerError> {
    let path = path_str.as_ref().to_path_buf();

    if !path.exists() {
        return Err(TextLayerError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(TextLayerError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(TextLayerError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(TextLayerError::FileNotFound { path });
        }
    }

    debug!("Resolved input PDF: {}", path.display());
    Ok(path)
}
