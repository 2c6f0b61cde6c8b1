//! Transient workspace holding per-page artifacts.
//!
//! The workspace is the hand-off medium between pipeline stages: the
//! rasteriser writes `image_<i>.png`, the OCR stage reads it and writes
//! `text_<i>.txt`, the injection stage reads that. The zero-based page index
//! in the file name is the sole correlation key across stages.
//!
//! By default each run gets its own temporary directory, so two simultaneous
//! runs never collide. A fixed directory can be requested instead; it is
//! destroyed and recreated on entry (any prior contents are lost). Either
//! way the directory is removed when the [`Workspace`] is dropped, on success
//! and failure paths alike, unless the caller asked to keep it.

use crate::error::TextLayerError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// RAII guard over the scratch directory for one pipeline run.
pub struct Workspace {
    root: PathBuf,
    /// Present only for per-run temporary directories; its `Drop` removes
    /// the tree. Fixed directories are removed by our own `Drop` instead.
    temp: Option<TempDir>,
    keep: bool,
}

impl Workspace {
    /// Create the workspace directory.
    ///
    /// With `fixed = Some(dir)` the directory is deleted and recreated;
    /// otherwise a unique `textlayer-*` temporary directory is used.
    pub fn create(fixed: Option<&Path>, keep: bool) -> Result<Self, TextLayerError> {
        match fixed {
            Some(dir) => {
                if dir.exists() {
                    fs::remove_dir_all(dir).map_err(|e| TextLayerError::WorkspaceFailed {
                        path: dir.to_path_buf(),
                        source: e,
                    })?;
                }
                fs::create_dir_all(dir).map_err(|e| TextLayerError::WorkspaceFailed {
                    path: dir.to_path_buf(),
                    source: e,
                })?;
                debug!("Workspace (fixed): {}", dir.display());
                Ok(Self {
                    root: dir.to_path_buf(),
                    temp: None,
                    keep,
                })
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("textlayer-")
                    .tempdir()
                    .map_err(|e| TextLayerError::WorkspaceFailed {
                        path: std::env::temp_dir(),
                        source: e,
                    })?;
                let root = temp.path().to_path_buf();
                debug!("Workspace (temp): {}", root.display());
                Ok(Self {
                    root,
                    temp: Some(temp),
                    keep,
                })
            }
        }
    }

    /// The workspace directory itself.
    pub fn dir(&self) -> &Path {
        &self.root
    }

    /// Path of the rendered image for a page (zero-based index).
    pub fn image_path(&self, page: usize) -> PathBuf {
        self.root.join(format!("image_{page}.png"))
    }

    /// Output stem handed to the OCR command; the tool appends `.txt`.
    pub fn text_stem(&self, page: usize) -> PathBuf {
        self.root.join(format!("text_{page}"))
    }

    /// Path of the OCR text file for a page (zero-based index).
    pub fn text_path(&self, page: usize) -> PathBuf {
        self.root.join(format!("text_{page}.txt"))
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.keep {
            if let Some(temp) = self.temp.take() {
                let kept = temp.keep();
                warn!("Keeping workspace directory: {}", kept.display());
            } else {
                warn!("Keeping workspace directory: {}", self.root.display());
            }
            return;
        }
        match self.temp.take() {
            // TempDir removes its tree on drop.
            Some(temp) => drop(temp),
            // Drop cannot propagate errors; log and move on.
            None => {
                if let Err(e) = fs::remove_dir_all(&self.root) {
                    warn!("Failed to remove workspace {}: {}", self.root.display(), e);
                }
            }
        }
    }
}
