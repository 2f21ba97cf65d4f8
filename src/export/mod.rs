//! Export the current result as a downloadable report or to the clipboard.
//!
//! Both exports carry the same two-space indented JSON: the service payload
//! in the order it arrived, followed by the `action` tag.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::controller::AnalysisResult;

pub const CLIPBOARD_SUCCESS: &str = "Results copied to clipboard!";

/// `cloud-cost-report-YYYY-MM-DD.json`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("cloud-cost-report-{}.json", date.format("%Y-%m-%d"))
}

/// Write the report into `dir`, named after `date`. Returns the path.
pub fn download_report(result: &AnalysisResult, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    let body = result
        .to_pretty_json()
        .context("failed to serialize report")?;

    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(report_file_name(date));
    fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))?;

    Ok(path)
}

/// Today's date in UTC, matching the ISO date of a browser download.
pub fn report_date() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Copy the report JSON to the system clipboard.
///
/// Failures are reported on stderr only. Returns whether the copy happened;
/// callers show [`CLIPBOARD_SUCCESS`] on `true`.
pub fn copy_to_clipboard(result: &AnalysisResult) -> bool {
    let outcome = result
        .to_pretty_json()
        .context("failed to serialize report")
        .and_then(|text| write_clipboard(&text));

    match outcome {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Failed to copy: {e:#}");
            false
        }
    }
}

/// Pipe `text` into the first clipboard helper that accepts it.
fn write_clipboard(text: &str) -> Result<()> {
    let mut last_err = None;
    for (program, args) in clipboard_commands() {
        match pipe_into(program, args, text) {
            Ok(()) => return Ok(()),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("no clipboard command available")))
}

fn pipe_into(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start {program}"))?;

    child
        .stdin
        .take()
        .context("clipboard stdin unavailable")?
        .write_all(text.as_bytes())
        .with_context(|| format!("failed to write to {program}"))?;

    let status = child.wait().with_context(|| format!("{program} did not finish"))?;
    if !status.success() {
        anyhow::bail!("{program} exited with {status}");
    }
    Ok(())
}

fn clipboard_commands() -> &'static [(&'static str, &'static [&'static str])] {
    #[cfg(target_os = "windows")]
    {
        &[("clip", &[])]
    }

    #[cfg(target_os = "macos")]
    {
        &[("pbcopy", &[])]
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        &[
            ("wl-copy", &[]),
            ("xclip", &["-selection", "clipboard"]),
            ("xsel", &["--clipboard", "--input"]),
        ]
    }
}
