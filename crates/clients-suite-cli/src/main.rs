// crates/clients-suite-cli/src/main.rs
// ============================================================================
// Module: Clients Suite CLI Entry Point
// Description: Command dispatcher for running and inspecting the Clients suite.
// Purpose: Run scenario batches, list the plan, and validate configuration.
// Dependencies: clap, clients-suite, serde_jcs, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! `clients-suite run` authenticates once, executes the selected scenarios in
//! canonical order, prints one line per scenario (or the JSON report), and
//! then writes run artifacts. The exit code is non-zero when setup fails or any
//! scenario fails. Logs go to stderr; reports go to stdout.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clients_suite::RunReport;
use clients_suite::ScenarioName;
use clients_suite::ScenarioPlan;
use clients_suite::ScenarioRunner;
use clients_suite::SuiteConfig;
use clients_suite::logging::init_logging;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "clients-suite", version, disable_help_subcommand = true)]
struct Cli {
    /// Enable debug logging, including every HTTP exchange.
    #[arg(long, global = true)]
    verbose: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scenario batch against the configured API.
    Run(RunCommand),
    /// Print the canonical scenario plan.
    List,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Config file path (overrides `CLIENTS_SUITE_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Scenario to run; repeatable. Defaults to the full plan.
    #[arg(long = "scenario", value_name = "NAME")]
    scenarios: Vec<ScenarioName>,
    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Artifact directory (overrides configuration).
    #[arg(long = "run-root", value_name = "DIR")]
    run_root: Option<PathBuf>,
    /// Skip writing run artifacts.
    #[arg(long = "no-artifacts")]
    no_artifacts: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate configuration, printing a redacted summary.
    Check {
        /// Config file path (overrides `CLIENTS_SUITE_CONFIG`).
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

/// Output formats for run reports.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// One line per scenario plus a totals line.
    Text,
    /// Canonical JSON report.
    Json,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose).map_err(|err| CliError::new(err.to_string()))?;

    match cli.command {
        Commands::Run(command) => command_run(command).await,
        Commands::List => command_list(),
        Commands::Config {
            command: ConfigCommand::Check {
                config,
            },
        } => command_config_check(config),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `run`.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let mut config = load_config(command.config)?;
    if let Some(run_root) = command.run_root {
        config.run_root = Some(run_root);
    }
    let plan = ScenarioPlan::select(&command.scenarios);
    debug!(scenarios = plan.len(), "plan selected");
    let runner = ScenarioRunner::new(config)
        .map_err(|err| CliError::new(format!("run failed: {err}")))?;
    let report =
        runner.run(&plan).await.map_err(|err| CliError::new(format!("run aborted: {err}")))?;

    let mut stdout = std::io::stdout();
    finish_run(&runner, &report, command.format, !command.no_artifacts, &mut stdout)
}

/// Prints the report, then writes artifacts when requested.
///
/// The report reaches `out` even when the artifact write fails.
fn finish_run(
    runner: &ScenarioRunner,
    report: &RunReport,
    format: OutputFormat,
    write_artifacts: bool,
    out: &mut impl Write,
) -> CliResult<ExitCode> {
    for line in render_report(report, format)? {
        writeln!(out, "{line}").map_err(|err| output_error("stdout", &err))?;
    }
    if write_artifacts {
        runner.write_artifacts(report).map_err(|err| CliError::new(err.to_string()))?;
    }
    Ok(if report.passed() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Executes `list`.
fn command_list() -> CliResult<ExitCode> {
    for line in render_plan_listing() {
        write_stdout_line(&line).map_err(|err| output_error("stdout", &err))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `config check`.
fn command_config_check(path: Option<PathBuf>) -> CliResult<ExitCode> {
    let config = load_config(path)?;
    write_stdout_line("config ok").map_err(|err| output_error("stdout", &err))?;
    for (key, value) in config.describe() {
        write_stdout_line(&format!("  {key}: {value}"))
            .map_err(|err| output_error("stdout", &err))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Loads suite configuration.
fn load_config(path: Option<PathBuf>) -> CliResult<SuiteConfig> {
    SuiteConfig::load(path.as_deref()).map_err(|err| CliError::new(format!("config error: {err}")))
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the report in the requested format.
fn render_report(report: &RunReport, format: OutputFormat) -> CliResult<Vec<String>> {
    match format {
        OutputFormat::Text => Ok(render_report_text(report)),
        OutputFormat::Json => {
            let bytes = serde_jcs::to_vec(report)
                .map_err(|err| CliError::new(format!("report serialization failed: {err}")))?;
            Ok(vec![String::from_utf8_lossy(&bytes).into_owned()])
        }
    }
}

/// Renders one line per scenario plus a totals line.
fn render_report_text(report: &RunReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .results
        .iter()
        .map(|result| {
            let mut line = format!(
                "{} {} ({} ms)",
                result.outcome.label(),
                result.name,
                result.duration_ms
            );
            if let Some(reason) = result.outcome.reason() {
                line.push_str(": ");
                line.push_str(reason);
            }
            line
        })
        .collect();
    lines.push(format!(
        "{} scenarios: {} passed, {} failed, {} skipped",
        report.results.len(),
        report.passed_count(),
        report.failed_count(),
        report.skipped_count()
    ));
    lines
}

/// Renders the canonical plan with dependency markers.
fn render_plan_listing() -> Vec<String> {
    ScenarioName::ALL
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let marker = if name.needs_created_client() { " [needs create_client]" } else { "" };
            format!("{:>2}. {:<30} {}{marker}", index + 1, name.as_str(), name.description())
        })
        .collect()
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Wraps an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> CliError {
    CliError::new(format!("failed to write to {stream}: {error}"))
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
