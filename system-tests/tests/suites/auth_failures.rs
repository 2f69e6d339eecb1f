// system-tests/tests/suites/auth_failures.rs
// ============================================================================
// Module: Authentication Tests
// Description: Session bootstrap and unauthorized-request coverage.
// Purpose: Validate fatal setup failures and bearer handling over HTTP.
// Dependencies: clients-suite, system-tests helpers
// ============================================================================

//! Authentication system tests for the Clients suite.

use clients_suite::RunError;
use clients_suite::ScenarioName;
use clients_suite::ScenarioPlan;
use clients_suite::ScenarioRunner;
use clients_suite::session::SessionError;
use clients_suite::session::TokenSource;

use crate::helpers::artifacts::TestReporter;
use crate::helpers::clients_stub::STUB_PASSWORD;
use crate::helpers::clients_stub::STUB_TOKEN;
use crate::helpers::clients_stub::StubOptions;
use crate::helpers::clients_stub::spawn_clients_stub;
use crate::helpers::clients_stub::spawn_clients_stub_with;

#[tokio::test(flavor = "multi_thread")]
async fn rejected_login_aborts_run() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("rejected_login_aborts_run")?;
    let stub = spawn_clients_stub_with(StubOptions {
        reject_login: true,
        ..StubOptions::default()
    })
    .await?;
    let runner = ScenarioRunner::new(stub.suite_config())?;

    let Err(error) = runner.run(&ScenarioPlan::full()).await else {
        return Err("run should abort when login is rejected".into());
    };
    if !matches!(
        error,
        RunError::Setup(SessionError::LoginRejected {
            status: 401,
            ..
        })
    ) {
        return Err(format!("unexpected error: {error}").into());
    }
    if stub.requests().len() != 1 {
        return Err(format!("no scenario may run after setup failure: {:?}", stub.requests()).into());
    }

    reporter.finish(
        vec!["login rejection is fatal before any scenario".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn login_without_token_aborts_run() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("login_without_token_aborts_run")?;
    let stub = spawn_clients_stub_with(StubOptions {
        omit_token: true,
        ..StubOptions::default()
    })
    .await?;
    let runner = ScenarioRunner::new(stub.suite_config())?;

    let Err(error) = runner.run(&ScenarioPlan::full()).await else {
        return Err("run should abort when no token is issued".into());
    };
    if !matches!(error, RunError::Setup(SessionError::MissingToken)) {
        return Err(format!("unexpected error: {error}").into());
    }

    reporter.finish(
        vec!["a 200 login without Token is fatal".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn preissued_token_skips_login() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("preissued_token_skips_login")?;
    let stub = spawn_clients_stub().await?;
    let mut config = stub.suite_config();
    config.credentials = None;
    config.auth_token = Some(STUB_TOKEN.to_string());
    let runner = ScenarioRunner::new(config)?;

    let report = runner.run(&ScenarioPlan::full()).await?;
    if report.token_source != TokenSource::Preissued || !report.passed() {
        return Err(format!("preissued run failed: {report:?}").into());
    }
    if stub.requests().iter().any(|request| request.path.ends_with("/Account/login")) {
        return Err("login must not be called with a preissued token".into());
    }

    reporter.finish(
        vec!["AUTH_TOKEN fallback runs the full plan without login".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unauthorized_scenarios_send_no_bearer() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("unauthorized_scenarios_send_no_bearer")?;
    let stub = spawn_clients_stub().await?;
    let runner = ScenarioRunner::new(stub.suite_config())?;

    let plan = ScenarioPlan::select(&[
        ScenarioName::ListClientsUnauthorized,
        ScenarioName::CountClientsUnauthorized,
        ScenarioName::CreateClientUnauthorized,
        ScenarioName::GetClientUnauthorized,
    ]);
    let report = runner.run(&plan).await?;
    if !report.passed() || report.passed_count() != 5 {
        return Err(format!("unauthorized checks failed: {report:?}").into());
    }

    let requests = stub.requests();
    let anonymous = requests.iter().filter(|request| !request.has_authorization_header).count();
    // login plus the four unauthorized probes
    if anonymous != 5 {
        return Err(format!("expected 5 requests without Authorization, saw {anonymous}").into());
    }

    let transcript = serde_json::to_string(&runner.api().transcript())?;
    if transcript.contains(STUB_TOKEN) || transcript.contains(STUB_PASSWORD) {
        return Err("transcript leaked a secret".into());
    }
    reporter.artifacts().write_text("transcript.json", &transcript)?;

    reporter.finish(
        vec!["unauthorized probes omit the bearer and secrets stay out of the transcript".into()],
        vec!["summary.json".to_string(), "summary.md".to_string(), "transcript.json".to_string()],
    )?;
    Ok(())
}
