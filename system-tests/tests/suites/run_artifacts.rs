// system-tests/tests/suites/run_artifacts.rs
// ============================================================================
// Module: Run Artifact Tests
// Description: Artifact output of a completed stub run.
// Purpose: Validate summary and transcript files written by the suite.
// Dependencies: clients-suite, system-tests helpers
// ============================================================================

//! Run artifact system tests for the Clients suite.

use std::fs;

use clients_suite::ScenarioPlan;
use clients_suite::ScenarioRunner;
use clients_suite::artifacts::RunArtifacts;
use clients_suite::artifacts::SUMMARY_JSON;
use clients_suite::artifacts::SUMMARY_MARKDOWN;
use clients_suite::artifacts::TRANSCRIPT_JSON;
use serde_json::Value;

use crate::helpers::artifacts::TestReporter;
use crate::helpers::clients_stub::spawn_clients_stub;

#[tokio::test(flavor = "multi_thread")]
async fn run_writes_summary_and_transcript() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("run_writes_summary_and_transcript")?;
    let stub = spawn_clients_stub().await?;
    let runner = ScenarioRunner::new(stub.suite_config())?;
    let report = runner.run(&ScenarioPlan::full()).await?;

    let run_root = reporter.artifacts().root().join("suite-run");
    let artifacts = RunArtifacts::create(Some(&run_root))?;
    artifacts.write_run(&report, &runner.api().transcript())?;

    let summary: Value = serde_json::from_slice(&fs::read(run_root.join(SUMMARY_JSON))?)?;
    let results = summary["results"].as_array().ok_or("summary missing results")?;
    if results.len() != 13 {
        return Err(format!("summary lists {} results", results.len()).into());
    }
    let markdown = fs::read_to_string(run_root.join(SUMMARY_MARKDOWN))?;
    if !markdown.contains("| delete_client | PASS |") {
        return Err("markdown summary missing delete_client row".into());
    }

    let transcript: Value = serde_json::from_slice(&fs::read(run_root.join(TRANSCRIPT_JSON))?)?;
    let entries = transcript.as_array().ok_or("transcript is not an array")?;
    let login = entries.first().ok_or("transcript is empty")?;
    if login["request"]["password"] != "<redacted>" || !login["response"].is_null() {
        return Err(format!("login exchange not redacted: {login}").into());
    }
    let expected_requests: usize = report.results.iter().map(|result| result.requests).sum();
    if entries.len() != expected_requests + 1 {
        return Err(format!("transcript has {} entries", entries.len()).into());
    }

    reporter.finish(
        vec!["summary.json, summary.md, and transcript.json written".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string(), "suite-run/".to_string()],
    )?;
    Ok(())
}

#[test]
fn reporter_summary_is_canonical_and_drop_safe() -> Result<(), Box<dyn std::error::Error>> {
    let root = {
        let mut reporter = TestReporter::new("reporter_summary_is_canonical_and_drop_safe")?;
        reporter.artifacts().write_text("notes.txt", "scratch")?;
        reporter.finish(vec!["reporter writes through the run writer".to_string()], Vec::new())?;
        reporter.artifacts().root().to_path_buf()
    };

    let raw = fs::read_to_string(root.join(SUMMARY_JSON))?;
    if !raw.starts_with("{\"artifacts\":[],") {
        return Err(format!("summary is not canonical JSON: {raw}").into());
    }
    let summary: Value = serde_json::from_str(&raw)?;
    if summary["status"] != "pass" {
        return Err(format!("finalized summary was overwritten on drop: {summary}").into());
    }
    let markdown = fs::read_to_string(root.join(SUMMARY_MARKDOWN))?;
    if !markdown.contains("Status: pass") || !markdown.contains("- note: reporter writes") {
        return Err(format!("unexpected markdown summary: {markdown}").into());
    }

    let unfinished_root = {
        let reporter = TestReporter::new("reporter_summary_unfinished")?;
        reporter.artifacts().root().to_path_buf()
    };
    let unfinished: Value =
        serde_json::from_str(&fs::read_to_string(unfinished_root.join(SUMMARY_JSON))?)?;
    if unfinished["status"] != "unfinished" {
        return Err(format!("drop should record an unfinished test: {unfinished}").into());
    }
    Ok(())
}
