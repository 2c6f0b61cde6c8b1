//! CLI binary for pdf-textlayer.
//!
//! A thin shim over the library crate that maps CLI flags to `EmbedConfig`
//! and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_textlayer::{
    embed, inspect, EmbedConfig, EmbedProgressCallback, PipelineStage, ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar across all three stages. Each page
/// passes through rasterize, ocr and inject, so the bar length is
/// `3 × pages` and any stage's completion advances it.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl EmbedProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_pages: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len}  {msg}  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length((total_pages * 3) as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Embedding");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Embedding text layer into {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, stage: PipelineStage, page_num: usize, total_pages: usize) {
        self.bar
            .set_message(format!("{stage} page {page_num}/{total_pages}"));
    }

    fn on_page_done(&self, _stage: PipelineStage, _page_num: usize, _total_pages: usize) {
        self.bar.inc(1);
    }

    fn on_run_complete(&self, _total_pages: usize) {
        // The final summary line comes from main.
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic: make a scanned PDF searchable
  textlayer -i scan.pdf -o scan-searchable.pdf

  # German document at 400 DPI
  textlayer -i brief.pdf -o brief-ocr.pdf --lang deu --dpi 400

  # Keep the intermediate images and OCR text for inspection
  textlayer -i scan.pdf -o out.pdf --workdir ./ocr-work --keep-workdir

  # Encrypted input
  textlayer -i locked.pdf -o out.pdf --password secret

  # Page count and metadata only (no OCR binary needed)
  textlayer -i scan.pdf -o unused.pdf --inspect-only

  # Machine-readable run summary
  textlayer -i scan.pdf -o out.pdf --json --no-progress

REQUIREMENTS:
  tesseract  (or any OCR tool with the same argument shape) on your PATH.
             Called per page as: <tool> <image.png> <output stem> -l <lang>
  pdfium     as a system library, or set PDFIUM_LIB_PATH to a directory
             containing libpdfium.

ENVIRONMENT VARIABLES:
  TEXTLAYER_OCR_COMMAND   Override the OCR command (default: tesseract)
  TEXTLAYER_LANG          Override the OCR language (default: eng)
  PDFIUM_LIB_PATH         Directory containing an existing libpdfium
"#;

/// Embed an invisible OCR text layer into a PDF document.
#[derive(Parser, Debug)]
#[command(
    name = "textlayer",
    version,
    about = "Make scanned PDFs searchable by embedding an invisible OCR text layer",
    long_about = "Rasterise each page of a PDF, run an external OCR engine over the images, \
and write the recognised text back into the document as invisible per-page text runs. \
The output renders identically to the input but is searchable and selectable.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF input file.
    #[arg(short, long)]
    input: PathBuf,

    /// PDF output file.
    #[arg(short, long)]
    output: PathBuf,

    /// Rendering DPI (72–600).
    #[arg(long, env = "TEXTLAYER_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// OCR language, passed to the OCR command via -l.
    #[arg(long, env = "TEXTLAYER_LANG", default_value = "eng")]
    lang: String,

    /// External OCR command to invoke once per page.
    #[arg(long, env = "TEXTLAYER_OCR_COMMAND", default_value = "tesseract")]
    ocr_command: String,

    /// Per-page OCR timeout in seconds.
    #[arg(long, env = "TEXTLAYER_OCR_TIMEOUT", default_value_t = 120)]
    ocr_timeout: u64,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "TEXTLAYER_PASSWORD")]
    password: Option<String>,

    /// Fixed workspace directory (destroyed and recreated per run).
    /// Default: a unique temporary directory.
    #[arg(long, env = "TEXTLAYER_WORKDIR")]
    workdir: Option<PathBuf>,

    /// Keep the workspace directory (page images + OCR text) after the run.
    #[arg(long, env = "TEXTLAYER_KEEP_WORKDIR")]
    keep_workdir: bool,

    /// Print PDF metadata only, no OCR.
    #[arg(long)]
    inspect_only: bool,

    /// Output a structured JSON summary instead of human-readable text.
    #[arg(long, env = "TEXTLAYER_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "TEXTLAYER_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TEXTLAYER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "TEXTLAYER_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input, cli.password.as_deref())
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialise metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn EmbedProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run the pipeline ─────────────────────────────────────────────────
    let summary = embed(&cli.input, &cli.output, &config)
        .await
        .context("Embedding failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            green("✔"),
            summary.page_count,
            summary.total_duration_ms,
            bold(&cli.output.display().to_string()),
        );
        eprintln!(
            "   {}",
            dim(&format!(
                "render {}ms / ocr {}ms / inject {}ms",
                summary.render_duration_ms, summary.ocr_duration_ms, summary.inject_duration_ms
            )),
        );
    }

    Ok(())
}

/// Map CLI args to `EmbedConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<EmbedConfig> {
    let mut builder = EmbedConfig::builder()
        .dpi(cli.dpi)
        .ocr_command(cli.ocr_command.as_str())
        .ocr_language(cli.lang.as_str())
        .ocr_timeout_secs(cli.ocr_timeout)
        .keep_workdir(cli.keep_workdir);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.as_str());
    }
    if let Some(ref dir) = cli.workdir {
        builder = builder.workdir(dir.as_path());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
