//! Configuration for a text-layer embedding run.
//!
//! All behaviour is controlled through [`EmbedConfig`], built via its
//! [`EmbedConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs across threads and to diff two runs to understand why
//! their outputs differ.

use crate::error::TextLayerError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Configuration for embedding an OCR text layer into a PDF.
///
/// Built via [`EmbedConfig::builder()`] or [`EmbedConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf_textlayer::EmbedConfig;
///
/// let config = EmbedConfig::builder()
///     .dpi(300)
///     .ocr_language("deu")
///     .ocr_timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct EmbedConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–600. Default: 300.
    ///
    /// 300 DPI is what tesseract's own documentation recommends for reliable
    /// recognition. Going lower loses small print; going higher inflates the
    /// per-page PNGs without measurably improving accuracy.
    pub dpi: u32,

    /// External OCR command invoked once per page. Default: `"tesseract"`.
    ///
    /// Called as `<command> <image path> <output stem> -l <language>`; the
    /// tool is expected to write `<output stem>.txt`. Any binary with a
    /// tesseract-compatible argument shape works.
    pub ocr_command: String,

    /// Language passed to the OCR command via `-l`. Default: `"eng"`.
    pub ocr_language: String,

    /// Per-page OCR timeout in seconds. Default: 120.
    ///
    /// The OCR process blocks the pipeline, so a hung invocation would hang
    /// the run indefinitely without this bound. On expiry the child process
    /// is killed and the run fails with [`TextLayerError::OcrTimeout`].
    pub ocr_timeout_secs: u64,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Fixed workspace directory for page images and OCR text.
    ///
    /// When set, the directory is destroyed and recreated at run start (any
    /// prior contents are lost) and removed at run end. When `None` (the
    /// default) a unique temporary directory is created per run, so
    /// concurrent invocations never race on a shared path.
    pub workdir: Option<PathBuf>,

    /// Keep the workspace directory after the run instead of deleting it.
    /// Default: false. Useful for inspecting intermediate images and text.
    pub keep_workdir: bool,

    /// Progress callback invoked as the pipeline processes each page.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            ocr_command: "tesseract".to_string(),
            ocr_language: "eng".to_string(),
            ocr_timeout_secs: 120,
            password: None,
            workdir: None,
            keep_workdir: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for EmbedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedConfig")
            .field("dpi", &self.dpi)
            .field("ocr_command", &self.ocr_command)
            .field("ocr_language", &self.ocr_language)
            .field("ocr_timeout_secs", &self.ocr_timeout_secs)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("workdir", &self.workdir)
            .field("keep_workdir", &self.keep_workdir)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl EmbedConfig {
    /// Create a new builder for `EmbedConfig`.
    pub fn builder() -> EmbedConfigBuilder {
        EmbedConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`EmbedConfig`].
#[derive(Debug)]
pub struct EmbedConfigBuilder {
    config: EmbedConfig,
}

impl EmbedConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn ocr_command(mut self, command: impl Into<String>) -> Self {
        self.config.ocr_command = command.into();
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn ocr_timeout_secs(mut self, secs: u64) -> Self {
        self.config.ocr_timeout_secs = secs;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.workdir = Some(dir.into());
        self
    }

    pub fn keep_workdir(mut self, v: bool) -> Self {
        self.config.keep_workdir = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<EmbedConfig, TextLayerError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(TextLayerError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.ocr_command.trim().is_empty() {
            return Err(TextLayerError::InvalidConfig(
                "OCR command must not be empty".into(),
            ));
        }
        if c.ocr_timeout_secs == 0 {
            return Err(TextLayerError::InvalidConfig(
                "OCR timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
