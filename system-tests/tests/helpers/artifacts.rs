// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Per-test artifact roots backed by the suite's run writer.
// Purpose: Guard reused roots and always leave a test summary behind.
// Dependencies: clients-suite, serde, system-tests
// ============================================================================

use std::fs;
use std::io;
use std::path::PathBuf;

use clients_suite::artifacts::RunArtifacts;
use clients_suite::artifacts::SUMMARY_JSON;
use clients_suite::artifacts::SUMMARY_MARKDOWN;
use clients_suite::runner::now_millis;
use serde::Serialize;
use system_tests::config::SystemTestConfig;

/// How a system test ended.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
enum TestStatus {
    /// Every check held.
    Pass,
    /// A check failed and the test returned an error.
    Fail,
    /// The test panicked before writing a summary.
    Panic,
    /// The test returned without writing a summary.
    Unfinished,
}

impl TestStatus {
    /// Stable lowercase name.
    const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Panic => "panic",
            Self::Unfinished => "unfinished",
        }
    }
}

/// Contents of a test's `summary.json`.
#[derive(Debug, Serialize)]
struct TestSummary<'a> {
    /// Test function name.
    test_name: &'a str,
    /// Final status.
    status: TestStatus,
    /// Reporter creation time.
    started_at_ms: u64,
    /// Summary write time.
    ended_at_ms: u64,
    /// Free-form observations.
    notes: Vec<String>,
    /// Files written under the test root.
    artifacts: Vec<String>,
}

/// Resolves `<run root>/<test name>`, refusing a non-empty directory unless
/// overwrites are allowed.
fn test_root(test_name: &str) -> io::Result<PathBuf> {
    let config = SystemTestConfig::load().map_err(io::Error::other)?;
    let base = config
        .run_root
        .unwrap_or_else(|| PathBuf::from("target/system-tests").join(format!("run_{}", now_millis())));
    let root = base.join(test_name);
    let occupied = fs::read_dir(&root).is_ok_and(|mut entries| entries.next().is_some());
    if occupied && !config.allow_overwrite {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("run root {} is not empty", root.display()),
        ));
    }
    Ok(root)
}

/// Owns a test's artifact directory and writes its summary on drop.
pub struct TestReporter {
    /// Writer rooted at the test directory.
    artifacts: RunArtifacts,
    /// Test function name.
    test_name: String,
    /// Reporter creation time.
    started_at_ms: u64,
    /// Whether a summary has been written.
    finalized: bool,
}

impl TestReporter {
    /// Creates a reporter for the named test.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let root = test_root(test_name)?;
        Ok(Self {
            artifacts: RunArtifacts::create(Some(&root))?,
            test_name: test_name.to_string(),
            started_at_ms: now_millis(),
            finalized: false,
        })
    }

    /// Returns the artifact writer rooted at this test's directory.
    pub const fn artifacts(&self) -> &RunArtifacts {
        &self.artifacts
    }

    /// Writes a passing summary.
    pub fn finish(&mut self, notes: Vec<String>, artifacts: Vec<String>) -> io::Result<()> {
        self.write_summary(TestStatus::Pass, notes, artifacts)
    }

    /// Writes a failing summary.
    pub fn fail(&mut self, notes: Vec<String>, artifacts: Vec<String>) -> io::Result<()> {
        self.write_summary(TestStatus::Fail, notes, artifacts)
    }

    /// Writes `summary.json` and `summary.md`.
    fn write_summary(
        &mut self,
        status: TestStatus,
        notes: Vec<String>,
        artifacts: Vec<String>,
    ) -> io::Result<()> {
        let summary = TestSummary {
            test_name: &self.test_name,
            status,
            started_at_ms: self.started_at_ms,
            ended_at_ms: now_millis(),
            notes,
            artifacts,
        };
        self.artifacts.write_json(SUMMARY_JSON, &summary)?;
        self.artifacts.write_text(SUMMARY_MARKDOWN, &render_summary(&summary))?;
        self.finalized = true;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let status =
            if std::thread::panicking() { TestStatus::Panic } else { TestStatus::Unfinished };
        let _ = self.write_summary(status, vec!["no explicit summary".to_string()], Vec::new());
    }
}

/// Renders the Markdown test summary.
fn render_summary(summary: &TestSummary<'_>) -> String {
    let status = summary.status.as_str();
    let mut lines = vec![
        format!("# {}", summary.test_name),
        String::new(),
        format!("Status: {status} ({} ms)", summary.ended_at_ms.saturating_sub(summary.started_at_ms)),
        String::new(),
    ];
    lines.extend(summary.notes.iter().map(|note| format!("- note: {note}")));
    lines.extend(summary.artifacts.iter().map(|name| format!("- artifact: {name}")));
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
