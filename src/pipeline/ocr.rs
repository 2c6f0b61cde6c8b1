//! OCR stage: spawn the external OCR command once per page.
//!
//! Invocations are strictly sequential; each blocks the pipeline until the
//! process exits or the per-page timeout fires. The command is called with
//! the tesseract argument shape:
//!
//! ```text
//! <command> <image path> <output stem> -l <language>
//! ```
//!
//! and is expected to write `<output stem>.txt`. The exit status is checked
//! and a non-zero exit fails the run; so does a process that exits zero
//! without producing its text file.
//!
//! `kill_on_drop` ensures a timed-out child is killed rather than left
//! running after the pipeline has given up on it.

use crate::config::EmbedConfig;
use crate::error::TextLayerError;
use crate::progress::PipelineStage;
use crate::workspace::Workspace;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, info};

/// Run the OCR command over `image_0.png .. image_{page_count-1}.png`,
/// producing `text_0.txt .. text_{page_count-1}.txt` in the workspace.
pub async fn ocr_pages(
    page_count: usize,
    workspace: &Workspace,
    config: &EmbedConfig,
) -> Result<(), TextLayerError> {
    for page in 0..page_count {
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(PipelineStage::Ocr, page + 1, page_count);
        }
        ocr_single_page(page, workspace, config).await?;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_done(PipelineStage::Ocr, page + 1, page_count);
        }
    }
    if page_count > 0 {
        info!("OCR complete: {} pages", page_count);
    }
    Ok(())
}

/// Run one OCR invocation, bounded by the configured timeout.
async fn ocr_single_page(
    page: usize,
    workspace: &Workspace,
    config: &EmbedConfig,
) -> Result<(), TextLayerError> {
    let image_path = workspace.image_path(page);
    if !image_path.exists() {
        return Err(TextLayerError::MissingPageImage {
            page,
            path: image_path,
        });
    }

    let stem = workspace.text_stem(page);
    let start = Instant::now();

    let mut cmd = Command::new(&config.ocr_command);
    cmd.arg(&image_path)
        .arg(&stem)
        .args(["-l", &config.ocr_language])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(
        "OCR page {}: {} {} {} -l {}",
        page,
        config.ocr_command,
        image_path.display(),
        stem.display(),
        config.ocr_language
    );

    let child = cmd.spawn().map_err(|e| TextLayerError::OcrSpawnFailed {
        command: config.ocr_command.clone(),
        source: e,
    })?;

    let timeout = Duration::from_secs(config.ocr_timeout_secs);
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|e| TextLayerError::OcrSpawnFailed {
            command: config.ocr_command.clone(),
            source: e,
        })?,
        // Dropping the future kills the child (kill_on_drop).
        Err(_) => {
            return Err(TextLayerError::OcrTimeout {
                page,
                secs: config.ocr_timeout_secs,
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(TextLayerError::OcrFailed { page, stderr });
    }

    let text_path = workspace.text_path(page);
    if !text_path.exists() {
        // Zero exit but no output file.
        return Err(TextLayerError::MissingPageText {
            page,
            path: text_path,
        });
    }

    debug!(
        "OCR page {} done in {}ms",
        page,
        start.elapsed().as_millis()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_command(command: &str, timeout_secs: u64) -> EmbedConfig {
        EmbedConfig::builder()
            .ocr_command(command)
            .ocr_timeout_secs(timeout_secs)
            .build()
            .unwrap()
    }

    fn workspace_with_image(page: usize) -> (Workspace, std::path::PathBuf) {
        let ws = Workspace::create(None, false).unwrap();
        let image = ws.image_path(page);
        std::fs::write(&image, b"not a real png, the fake tool ignores it").unwrap();
        (ws, image)
    }

    #[tokio::test]
    async fn missing_image_is_a_precondition_failure() {
        let ws = Workspace::create(None, false).unwrap();
        let config = config_with_command("true", 5);

        let err = ocr_pages(1, &ws, &config).await.unwrap_err();
        assert!(matches!(err, TextLayerError::MissingPageImage { page: 0, .. }));
    }

    #[tokio::test]
    async fn unknown_command_is_spawn_failure() {
        let (ws, _img) = workspace_with_image(0);
        let config = config_with_command("textlayer-no-such-ocr-binary", 5);

        let err = ocr_pages(1, &ws, &config).await.unwrap_err();
        assert!(matches!(err, TextLayerError::OcrSpawnFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_ocr_failure() {
        let (ws, _img) = workspace_with_image(0);
        // `false` exits 1 and writes nothing.
        let config = config_with_command("false", 5);

        let err = ocr_pages(1, &ws, &config).await.unwrap_err();
        assert!(matches!(err, TextLayerError::OcrFailed { page: 0, .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_without_text_file_is_missing_text() {
        let (ws, _img) = workspace_with_image(0);
        // `true` exits 0 but produces no text_0.txt.
        let config = config_with_command("true", 5);

        let err = ocr_pages(1, &ws, &config).await.unwrap_err();
        assert!(matches!(err, TextLayerError::MissingPageText { page: 0, .. }));
    }

    /// Write an executable shell script acting as a stand-in OCR tool.
    #[cfg(unix)]
    fn fake_ocr_script(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let script = dir.join("fake-ocr.sh");
        std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fake_ocr_tool_produces_text_files() {
        let (ws, _img) = workspace_with_image(0);
        let dir = tempfile::tempdir().unwrap();
        // $1 = image path, $2 = output stem; the tool appends .txt.
        let script = fake_ocr_script(dir.path(), r#"echo "HELLO WORLD" > "$2.txt""#);

        let config = config_with_command(&script.to_string_lossy(), 5);
        ocr_pages(1, &ws, &config).await.unwrap();

        let text = std::fs::read_to_string(ws.text_path(0)).unwrap();
        assert_eq!(text.trim(), "HELLO WORLD");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_command_times_out() {
        let (ws, _img) = workspace_with_image(0);
        let dir = tempfile::tempdir().unwrap();
        let script = fake_ocr_script(dir.path(), "sleep 600");

        let config = config_with_command(&script.to_string_lossy(), 1);

        let start = Instant::now();
        let err = ocr_pages(1, &ws, &config).await.unwrap_err();
        assert!(matches!(err, TextLayerError::OcrTimeout { page: 0, secs: 1 }));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn zero_pages_is_a_no_op() {
        let ws = Workspace::create(None, false).unwrap();
        let config = config_with_command("textlayer-no-such-ocr-binary", 5);
        // No pages means the command is never spawned, so its absence is fine.
        ocr_pages(0, &ws, &config).await.unwrap();
    }
}
