//! End-to-end integration tests for pdf-textlayer.
//!
//! These tests need a pdfium shared library (and, for the OCR round-trip, a
//! tesseract binary on PATH), so they are gated behind the `TEXTLAYER_E2E`
//! environment variable and do not run in CI unless explicitly requested.
//!
//! Run with:
//!   TEXTLAYER_E2E=1 cargo test --test e2e -- --nocapture
//!
//! To restrict to a specific test:
//!   TEXTLAYER_E2E=1 cargo test --test e2e roundtrip -- --nocapture

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdf_textlayer::{embed, inspect, EmbedConfig, TextLayerError};
use std::path::{Path, PathBuf};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless TEXTLAYER_E2E is set.
macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("TEXTLAYER_E2E").is_err() {
            println!("SKIP: set TEXTLAYER_E2E=1 to run e2e tests");
            return;
        }
    }};
}

/// Build a one-page PDF drawing "HELLO WORLD" in large Courier type.
///
/// Rendered by pdfium, the text is crisp enough that any working tesseract
/// install reads it back verbatim.
fn hello_world_pdf(dir: &Path) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 48.into()]),
            Operation::new("Td", vec![100.into(), 600.into()]),
            Operation::new("Tj", vec![Object::string_literal("HELLO WORLD")]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join("hello.pdf");
    doc.save(&path).unwrap();
    path
}

/// Collect the text of every `Tj`/`TJ` operand across all page content
/// streams of a saved PDF.
fn extract_embedded_text(path: &Path) -> String {
    let doc = Document::load(path).unwrap();
    let mut out = String::new();
    for (_num, page_id) in doc.get_pages() {
        let data = doc.get_page_content(page_id).unwrap();
        let content = Content::decode(&data).unwrap();
        for op in content.operations {
            if op.operator == "Tj" {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    out.push_str(&String::from_utf8_lossy(bytes));
                }
            }
        }
    }
    out
}

/// An `EmbedConfig` whose "OCR tool" is a shell script writing fixed text,
/// so pipeline mechanics can be tested without a tesseract install.
#[cfg(unix)]
fn fake_ocr_config(dir: &Path, text: &str) -> EmbedConfig {
    use std::os::unix::fs::PermissionsExt;
    let script = dir.join("fake-ocr.sh");
    std::fs::write(
        &script,
        format!("#!/bin/sh\nprintf '%s\\n' \"{text}\" > \"$2.txt\"\n"),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    EmbedConfig::builder()
        .ocr_command(script.to_string_lossy().to_string())
        .ocr_timeout_secs(10)
        .build()
        .unwrap()
}

fn has_tesseract() -> bool {
    std::process::Command::new("tesseract")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

// ── Inspect tests (pdfium only) ──────────────────────────────────────────────

#[tokio::test]
async fn inspect_reports_page_count() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let input = hello_world_pdf(dir.path());

    let meta = inspect(&input, None).await.expect("inspect() should succeed");
    assert_eq!(meta.page_count, 1);
    assert!(!meta.pdf_version.is_empty());
}

#[tokio::test]
async fn inspect_passes_password_through() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let input = hello_world_pdf(dir.path());

    // pdfium ignores a password on unencrypted input; the call must still
    // succeed rather than discard the password before it reaches pdfium.
    let meta = inspect(&input, Some("secret")).await.unwrap();
    assert_eq!(meta.page_count, 1);
}

#[tokio::test]
async fn inspect_nonexistent_fails() {
    e2e_skip_unless_enabled!();
    let result = inspect("/definitely/not/a/real/file.pdf", None).await;
    assert!(matches!(result, Err(TextLayerError::FileNotFound { .. })));
}

// ── Pipeline mechanics (pdfium + fake OCR script) ────────────────────────────

#[cfg(unix)]
#[tokio::test]
async fn pipeline_embeds_fake_ocr_output() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let input = hello_world_pdf(dir.path());
    let output = dir.path().join("out.pdf");
    let config = fake_ocr_config(dir.path(), "FAKE OCR RESULT");

    let summary = embed(&input, &output, &config).await.unwrap();
    assert_eq!(summary.page_count, 1);
    assert!(output.exists());

    let text = extract_embedded_text(&output);
    // The visible run plus the injected invisible run.
    assert!(text.contains("HELLO WORLD"), "got: {text:?}");
    assert!(text.contains("FAKE OCR RESULT"), "got: {text:?}");
}

#[cfg(unix)]
#[tokio::test]
async fn workspace_is_removed_after_success_and_failure() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let input = hello_world_pdf(dir.path());

    // Success path, fixed workdir.
    let workdir = dir.path().join("work-ok");
    let output = dir.path().join("out.pdf");
    let mut config = fake_ocr_config(dir.path(), "TEXT");
    config.workdir = Some(workdir.clone());
    embed(&input, &output, &config).await.unwrap();
    assert!(!workdir.exists(), "workspace must be gone after success");

    // Failure path: OCR command exits non-zero.
    let workdir = dir.path().join("work-fail");
    let output2 = dir.path().join("out2.pdf");
    let config = EmbedConfig::builder()
        .ocr_command("false")
        .workdir(workdir.clone())
        .build()
        .unwrap();
    let err = embed(&input, &output2, &config).await.unwrap_err();
    assert!(matches!(err, TextLayerError::OcrFailed { .. }));
    assert!(!output2.exists(), "failed run must not produce an output PDF");
    assert!(!workdir.exists(), "workspace must be gone after failure");
}

#[cfg(unix)]
#[tokio::test]
async fn keep_workdir_retains_page_artifacts() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let input = hello_world_pdf(dir.path());
    let workdir = dir.path().join("kept");
    let output = dir.path().join("out.pdf");

    let mut config = fake_ocr_config(dir.path(), "TEXT");
    config.workdir = Some(workdir.clone());
    config.keep_workdir = true;

    embed(&input, &output, &config).await.unwrap();

    assert!(workdir.join("image_0.png").exists());
    assert!(workdir.join("text_0.txt").exists());

    std::fs::remove_dir_all(&workdir).ok();
}

#[cfg(unix)]
#[tokio::test]
async fn second_run_produces_equivalent_output() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let input = hello_world_pdf(dir.path());
    let config = fake_ocr_config(dir.path(), "STABLE TEXT");

    let out1 = dir.path().join("out1.pdf");
    let out2 = dir.path().join("out2.pdf");
    let s1 = embed(&input, &out1, &config).await.unwrap();
    let s2 = embed(&input, &out2, &config).await.unwrap();

    assert_eq!(s1.page_count, s2.page_count);
    assert_eq!(extract_embedded_text(&out1), extract_embedded_text(&out2));
}

// ── OCR round-trip (pdfium + real tesseract) ─────────────────────────────────

#[tokio::test]
async fn roundtrip_hello_world_becomes_searchable() {
    e2e_skip_unless_enabled!();
    if !has_tesseract() {
        println!("SKIP: tesseract not found on PATH");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let input = hello_world_pdf(dir.path());
    let output = dir.path().join("searchable.pdf");
    let config = EmbedConfig::default();

    let summary = embed(&input, &output, &config).await.unwrap();
    assert_eq!(summary.page_count, 1);

    // Case/spacing tolerance: OCR may vary spacing, never the letters.
    let text = extract_embedded_text(&output)
        .to_uppercase()
        .replace(char::is_whitespace, "");
    assert!(
        text.contains("HELLOWORLD"),
        "expected OCR'd HELLO WORLD in text layer, got: {text:?}"
    );
}
