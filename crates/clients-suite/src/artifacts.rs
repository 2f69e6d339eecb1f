// crates/clients-suite/src/artifacts.rs
// ============================================================================
// Module: Run Artifacts
// Description: On-disk summaries and transcripts for a completed run.
// Purpose: Write deterministic JSON and Markdown reports under a run root.
// Dependencies: serde, serde_jcs
// ============================================================================

//! ## Overview
//! A run root receives `summary.json` (canonical JCS), `summary.md`, and
//! `transcript.json`. When no root is configured a timestamped directory under
//! `target/clients-suite` is used.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::api::TranscriptEntry;
use crate::runner::RunReport;
use crate::runner::now_millis;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Canonical JSON run summary.
pub const SUMMARY_JSON: &str = "summary.json";
/// Human-readable run summary.
pub const SUMMARY_MARKDOWN: &str = "summary.md";
/// Ordered HTTP exchanges.
pub const TRANSCRIPT_JSON: &str = "transcript.json";

/// Returns a fresh timestamped run root.
#[must_use]
pub fn default_run_root() -> PathBuf {
    PathBuf::from("target/clients-suite").join(format!("run_{}", now_millis()))
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Artifact writer for one run.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    /// Directory receiving the artifacts.
    root: PathBuf,
}

impl RunArtifacts {
    /// Creates the run root, defaulting to [`default_run_root`].
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created.
    pub fn create(root: Option<&Path>) -> io::Result<Self> {
        let root = root.map_or_else(default_run_root, Path::to_path_buf);
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Returns the run root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when serialization or the write fails.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        let bytes = serde_jcs::to_vec(value).map_err(|err| io::Error::other(err.to_string()))?;
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes a UTF-8 text artifact.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the write fails.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, value.as_bytes())?;
        Ok(path)
    }

    /// Writes the summary pair and the transcript.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when any artifact cannot be written.
    pub fn write_run(
        &self,
        report: &RunReport,
        transcript: &[TranscriptEntry],
    ) -> io::Result<Vec<PathBuf>> {
        Ok(vec![
            self.write_json(SUMMARY_JSON, report)?,
            self.write_text(SUMMARY_MARKDOWN, &summary_markdown(report))?,
            self.write_json(TRANSCRIPT_JSON, &transcript)?,
        ])
    }
}

// ============================================================================
// SECTION: Markdown
// ============================================================================

/// Renders the human-readable run summary.
#[must_use]
pub fn summary_markdown(report: &RunReport) -> String {
    let status = if report.passed() { "passed" } else { "failed" };
    let mut out = String::new();
    out.push_str("# Clients Suite Summary\n\n");
    out.push_str("## Status\n\n");
    out.push_str(&format!("- Target: {}\n", report.base_url));
    out.push_str(&format!("- Token source: {}\n", report.token_source.as_str()));
    out.push_str(&format!("- Status: {status}\n"));
    out.push_str(&format!(
        "- Passed / failed / skipped: {} / {} / {}\n",
        report.passed_count(),
        report.failed_count(),
        report.skipped_count()
    ));
    out.push_str(&format!("- Duration (ms): {}\n", report.duration_ms()));
    out.push_str("\n## Scenarios\n\n");
    out.push_str("| Scenario | Result | Duration (ms) | Requests |\n");
    out.push_str("|----------|--------|---------------|----------|\n");
    for result in &report.results {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            result.name,
            result.outcome.label(),
            result.duration_ms,
            result.requests
        ));
    }
    out.push_str("\n## Notes\n\n");
    let notes: Vec<_> = report
        .results
        .iter()
        .filter_map(|result| result.outcome.reason().map(|reason| (result.name, reason)))
        .collect();
    if notes.is_empty() {
        out.push_str("- None\n");
    } else {
        for (name, reason) in notes {
            out.push_str(&format!("- {name}: {}\n", reason.replace('\n', " ")));
        }
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
