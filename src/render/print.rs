//! Print rendering — rasterizes the report markup to a paginated PDF.
//!
//! The pixel and paging work is delegated to a headless Chromium process;
//! this module only stages the markup, runs the backend as one awaited unit,
//! and reads the finished document back. No partial output ever escapes: any
//! backend fault surfaces as a single `RenderError`.

use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::config;
use crate::error::RenderError;
use crate::model::ReportModel;
use crate::render::markup;

/// Virtual-time budget handed to the backend, bounding its layout-settling
/// wait. This is the only unbounded step in report generation.
const SETTLE_BUDGET_MS: u32 = 10_000;

/// Render one report to A4 PDF bytes.
pub async fn render(model: &ReportModel) -> Result<Vec<u8>, RenderError> {
    let html = markup::render(model);

    let dir = tempfile::tempdir()
        .map_err(|e| RenderError::PrintBackend(format!("staging dir: {e}")))?;
    let input = dir.path().join("report.html");
    let output = dir.path().join("report.pdf");

    tokio::fs::write(&input, &html)
        .await
        .map_err(|e| RenderError::PrintBackend(format!("markup write: {e}")))?;

    debug!(bytes = html.len(), "print markup staged");

    run_backend(&config::chromium_binary(), &input, &output).await?;

    let pdf = tokio::fs::read(&output)
        .await
        .map_err(|e| RenderError::PrintBackend(format!("output missing: {e}")))?;

    info!(bytes = pdf.len(), "print render complete");
    Ok(pdf)
}

/// Run the backend process to completion as one awaited unit.
async fn run_backend(binary: &str, input: &Path, output: &Path) -> Result<(), RenderError> {
    let result = tokio::process::Command::from(print_command(binary, input, output))
        .output()
        .await
        .map_err(|e| RenderError::PrintBackend(format!("{binary} spawn failed: {e}")))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        tracing::error!(stderr = %stderr, "print backend failed");
        return Err(RenderError::PrintBackendExit(
            result.status.code().unwrap_or(-1),
        ));
    }
    Ok(())
}

/// Backend invocation. Page size, margins and backgrounds are controlled by
/// the markup's CSS; the flags only suppress browser chrome and bound the
/// settling wait.
fn print_command(binary: &str, input: &Path, output: &Path) -> Command {
    let mut cmd = Command::new(binary);
    cmd.arg("--headless=new")
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--no-pdf-header-footer")
        .arg(format!("--virtual-time-budget={SETTLE_BUDGET_MS}"))
        .arg(format!("--print-to-pdf={}", output.display()))
        .arg(input.display().to_string());
    cmd
}
