// crates/clients-suite/src/logging.rs
// ============================================================================
// Module: Logging
// Description: Tracing subscriber setup for suite binaries.
// Purpose: Route structured events to stderr with an env-driven filter.
// Dependencies: thiserror, tracing-subscriber
// ============================================================================

//! ## Overview
//! Events go to stderr so stdout stays reserved for reports. A non-blank
//! `RUST_LOG` selects the filter; otherwise verbose mode picks `debug`, which
//! includes one event per HTTP exchange, and the default is `info`.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Default filter directive.
pub const DEFAULT_FILTER: &str = "info";
/// Filter directive used in verbose mode.
pub const VERBOSE_FILTER: &str = "debug";

/// Logging setup failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Filter directive could not be parsed.
    #[error("invalid log filter '{directive}': {reason}")]
    Filter {
        /// Offending directive.
        directive: String,
        /// Parser message.
        reason: String,
    },
    /// A global subscriber is already installed.
    #[error("logging already initialized: {0}")]
    Install(String),
}

/// Chooses the filter directive.
///
/// A non-blank `RUST_LOG` wins; verbose mode only replaces the default.
#[must_use]
pub fn filter_directive(verbose: bool, rust_log: Option<&str>) -> String {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    rust_log.map(str::trim).filter(|value| !value.is_empty()).unwrap_or(fallback).to_string()
}

/// Installs the global stderr subscriber.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_logging(verbose: bool) -> Result<(), LoggingError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(verbose, rust_log.as_deref());
    let filter = EnvFilter::try_new(&directive).map_err(|err| LoggingError::Filter {
        directive: directive.clone(),
        reason: err.to_string(),
    })?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| LoggingError::Install(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
