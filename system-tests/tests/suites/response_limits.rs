// system-tests/tests/suites/response_limits.rs
// ============================================================================
// Module: Response Limit Tests
// Description: Oversized bodies and redirects from the API.
// Purpose: Validate the body size cap and that redirects surface unfollowed.
// Dependencies: clients-suite, system-tests helpers
// ============================================================================

//! Response handling system tests for the Clients suite.

use std::time::Duration;

use clients_suite::ApiError;
use clients_suite::ClientsApi;
use clients_suite::ScenarioName;
use clients_suite::ScenarioPlan;
use clients_suite::ScenarioRunner;
use clients_suite::Session;
use clients_suite::api::MAX_RESPONSE_BYTES;
use clients_suite::runner::ScenarioOutcome;

use crate::helpers::artifacts::TestReporter;
use crate::helpers::clients_stub::MOVED_COUNT_PATH;
use crate::helpers::clients_stub::StubOptions;
use crate::helpers::clients_stub::spawn_clients_stub_with;

#[tokio::test(flavor = "multi_thread")]
async fn oversized_body_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("oversized_body_is_rejected")?;
    let stub = spawn_clients_stub_with(StubOptions {
        oversized_list: true,
        ..StubOptions::default()
    })
    .await?;
    let config = stub.suite_config();
    let api = ClientsApi::new(stub.base_url(), Duration::from_secs(5))?;
    let session = Session::bootstrap(&api, &config).await?;

    match api.list_clients(session.auth()).await {
        Err(ApiError::ResponseTooLarge {
            actual,
            limit,
        }) => {
            if limit != MAX_RESPONSE_BYTES || actual <= limit {
                return Err(format!("unexpected limit report: {actual} > {limit}").into());
            }
        }
        Err(other) => return Err(format!("expected size limit error, got {other}").into()),
        Ok(response) => {
            return Err(format!("oversized body accepted with status {}", response.status).into());
        }
    }

    let runner = ScenarioRunner::new(config)?;
    let report = runner.run(&ScenarioPlan::select(&[ScenarioName::ListClients])).await?;
    let list = report.result(ScenarioName::ListClients).ok_or("missing list result")?;
    let Some(reason) = list.outcome.reason() else {
        return Err("list should fail on an oversized body".into());
    };
    if !reason.contains("size limit") {
        return Err(format!("unexpected list failure: {reason}").into());
    }

    reporter.finish(
        vec!["bodies over the size cap are rejected".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn redirect_reaches_scenario_unfollowed() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("redirect_reaches_scenario_unfollowed")?;
    let stub = spawn_clients_stub_with(StubOptions {
        redirect_count: true,
        ..StubOptions::default()
    })
    .await?;
    let config = stub.suite_config();
    let api = ClientsApi::new(stub.base_url(), Duration::from_secs(5))?;
    let session = Session::bootstrap(&api, &config).await?;

    let response = api.count_clients(session.auth()).await?;
    if response.status != 302 {
        return Err(format!("expected raw 302, got {}", response.status).into());
    }

    let runner = ScenarioRunner::new(config)?;
    let report = runner.run(&ScenarioPlan::select(&[ScenarioName::CountClients])).await?;
    let count = report.result(ScenarioName::CountClients).ok_or("missing count result")?;
    let ScenarioOutcome::Failed {
        reason,
    } = &count.outcome
    else {
        return Err("count should fail on a redirect".into());
    };
    if !reason.contains("got 302") {
        return Err(format!("unexpected count failure: {reason}").into());
    }
    if stub.requests().iter().any(|request| request.path == MOVED_COUNT_PATH) {
        return Err("redirect target was requested".into());
    }

    reporter.finish(
        vec!["redirects surface as the raw status".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    Ok(())
}
