// crates/clients-suite/src/runner.rs
// ============================================================================
// Module: Scenario Runner
// Description: Sequential executor for a scenario plan.
// Purpose: Bootstrap the session, run scenarios in order, and build a report.
// Dependencies: serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! The runner authenticates once, then executes each planned scenario to
//! completion before starting the next. A failed scenario never stops its
//! siblings; scenarios that need the created client are skipped when no
//! client exists. Only a setup failure aborts the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::time::Instant;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use thiserror::Error;
use tracing::info;
use tracing::warn;

use crate::api::ApiError;
use crate::artifacts::RunArtifacts;
use crate::api::ClientsApi;
use crate::config::SuiteConfig;
use crate::scenario::ScenarioContext;
use crate::scenario::ScenarioName;
use crate::scenario::ScenarioPlan;
use crate::scenario::ScenarioSettings;
use crate::scenario::execute;
use crate::session::Session;
use crate::session::SessionError;
use crate::session::TokenSource;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Run-level failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// HTTP client could not be built.
    #[error("client setup failed: {0}")]
    Client(#[from] ApiError),
    /// Session bootstrap failed; no scenario ran.
    #[error("session setup failed: {0}")]
    Setup(#[from] SessionError),
    /// Artifacts could not be written.
    #[error("artifact write failed: {0}")]
    Artifacts(#[from] io::Error),
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    /// All assertions held.
    Passed,
    /// An assertion or request failed.
    Failed {
        /// Failure description.
        reason: String,
    },
    /// Not executed because a prerequisite was missing.
    Skipped {
        /// Skip description.
        reason: String,
    },
}

impl ScenarioOutcome {
    /// Returns the short console label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Failed {
                ..
            } => "FAIL",
            Self::Skipped {
                ..
            } => "SKIP",
        }
    }

    /// Returns the failure or skip reason.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Passed => None,
            Self::Failed {
                reason,
            }
            | Self::Skipped {
                reason,
            } => Some(reason),
        }
    }
}

/// Recorded result of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioResult {
    /// Scenario name.
    pub name: ScenarioName,
    /// Scenario outcome.
    pub outcome: ScenarioOutcome,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Number of HTTP exchanges issued.
    pub requests: usize,
}

/// Report for a complete run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// API origin exercised.
    pub base_url: String,
    /// Origin of the session token.
    pub token_source: TokenSource,
    /// Run start, milliseconds since the Unix epoch.
    pub started_at_ms: u64,
    /// Run end, milliseconds since the Unix epoch.
    pub ended_at_ms: u64,
    /// Results in execution order.
    pub results: Vec<ScenarioResult>,
}

impl RunReport {
    /// Returns true when no scenario failed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Number of passed scenarios.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, ScenarioOutcome::Passed))
    }

    /// Number of failed scenarios.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, ScenarioOutcome::Failed { .. }))
    }

    /// Number of skipped scenarios.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, ScenarioOutcome::Skipped { .. }))
    }

    /// Run duration in milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.ended_at_ms.saturating_sub(self.started_at_ms)
    }

    /// Returns the result for a scenario, if it was planned.
    #[must_use]
    pub fn result(&self, name: ScenarioName) -> Option<&ScenarioResult> {
        self.results.iter().find(|result| result.name == name)
    }

    /// Counts results whose outcome matches the predicate.
    fn count(&self, predicate: impl Fn(&ScenarioOutcome) -> bool) -> usize {
        self.results.iter().filter(|result| predicate(&result.outcome)).count()
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Executes scenario plans against one API origin.
#[derive(Clone)]
pub struct ScenarioRunner {
    /// Shared HTTP client and transcript.
    api: ClientsApi,
    /// Suite configuration.
    config: SuiteConfig,
}

impl ScenarioRunner {
    /// Builds a runner and its HTTP client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Client`] when the HTTP client cannot be built.
    pub fn new(config: SuiteConfig) -> Result<Self, RunError> {
        let api = ClientsApi::from_config(&config)?;
        Ok(Self {
            api,
            config,
        })
    }

    /// Returns the HTTP client, including its transcript.
    #[must_use]
    pub const fn api(&self) -> &ClientsApi {
        &self.api
    }

    /// Returns the suite configuration.
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Runs every scenario in the plan.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Setup`] when the session cannot be established.
    /// Scenario failures are reported in the [`RunReport`], not as errors.
    pub async fn run(&self, plan: &ScenarioPlan) -> Result<RunReport, RunError> {
        let started_at_ms = now_millis();
        let session = Session::bootstrap(&self.api, &self.config).await?;
        let settings = ScenarioSettings::from_config(&self.config);
        let mut context = ScenarioContext::new();
        let mut results = Vec::with_capacity(plan.len());

        for name in plan.names().iter().copied() {
            let result = self.run_one(name, &session, settings, &mut context).await;
            results.push(result);
        }

        let report = RunReport {
            base_url: self.api.base_url().to_string(),
            token_source: session.source(),
            started_at_ms,
            ended_at_ms: now_millis(),
            results,
        };
        info!(
            passed = report.passed_count(),
            failed = report.failed_count(),
            skipped = report.skipped_count(),
            duration_ms = report.duration_ms(),
            "run finished"
        );
        Ok(report)
    }

    /// Writes the report and transcript under the configured run root.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Artifacts`] when the root or any file cannot be
    /// written.
    pub fn write_artifacts(&self, report: &RunReport) -> Result<RunArtifacts, RunError> {
        let artifacts = RunArtifacts::create(self.config.run_root.as_deref())?;
        artifacts.write_run(report, &self.api.transcript())?;
        info!(run_root = %artifacts.root().display(), "artifacts written");
        Ok(artifacts)
    }

    /// Runs or skips one scenario and records its result.
    async fn run_one(
        &self,
        name: ScenarioName,
        session: &Session,
        settings: ScenarioSettings,
        context: &mut ScenarioContext,
    ) -> ScenarioResult {
        if name.needs_created_client() && context.created_client_id().is_none() {
            let reason = "create_client did not produce a client id".to_string();
            warn!(scenario = name.as_str(), %reason, "scenario skipped");
            return ScenarioResult {
                name,
                outcome: ScenarioOutcome::Skipped {
                    reason,
                },
                duration_ms: 0,
                requests: 0,
            };
        }

        info!(scenario = name.as_str(), "scenario started");
        let exchanges_before = self.api.exchange_count();
        let started = Instant::now();
        let outcome = match execute(name, &self.api, session, settings, context).await {
            Ok(()) => ScenarioOutcome::Passed,
            Err(err) => ScenarioOutcome::Failed {
                reason: err.to_string(),
            },
        };
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let requests = self.api.exchange_count().saturating_sub(exchanges_before);

        match outcome.reason() {
            None => info!(scenario = name.as_str(), duration_ms, requests, "scenario passed"),
            Some(reason) => {
                warn!(scenario = name.as_str(), duration_ms, requests, reason, "scenario failed");
            }
        }
        ScenarioResult {
            name,
            outcome,
            duration_ms,
            requests,
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> u64 {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    u64::try_from(millis).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
