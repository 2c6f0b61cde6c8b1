//! Pipeline stages for text-layer embedding.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. switch the rendering backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ rasterize ──▶ ocr ──▶ inject
//! (path)    (pdfium)      (proc)  (lopdf)
//! ```
//!
//! 1. [`input`]     - validate the user-supplied path is a readable PDF
//! 2. [`rasterize`] - render every page to `image_<i>.png`; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`ocr`]       - spawn the external OCR command once per page, strictly
//!    sequentially, each bounded by a timeout; produces `text_<i>.txt`
//! 4. [`inject`]    - append one invisible text run per page to the original
//!    PDF and save it to the output path
//!
//! Stages communicate only through the workspace directory plus the page
//! count; the zero-based page index in the artifact file names is the sole
//! correlation key.

pub mod inject;
pub mod input;
pub mod ocr;
pub mod rasterize;
