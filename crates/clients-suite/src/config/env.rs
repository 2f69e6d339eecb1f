// crates/clients-suite/src/config/env.rs
// ============================================================================
// Module: Suite Environment
// Description: Environment keys and strict parsing helpers for the suite.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 and empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use super::ConfigError;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for suite configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteEnv {
    /// API origin, for example `https://api.example.com`.
    BaseUrl,
    /// Login username.
    Username,
    /// Login password.
    Password,
    /// Pre-issued bearer token used when no credentials are configured.
    AuthToken,
    /// HTTP request timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Minimum list length the fixture data must exceed.
    MinListLen,
    /// Artifact directory override.
    RunRoot,
    /// Config file path used when no explicit path is given.
    ConfigPath,
}

impl SuiteEnv {
    /// All keys in a stable order.
    pub const ALL: [Self; 8] = [
        Self::BaseUrl,
        Self::Username,
        Self::Password,
        Self::AuthToken,
        Self::TimeoutSeconds,
        Self::MinListLen,
        Self::RunRoot,
        Self::ConfigPath,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseUrl => "BASE_URL",
            Self::Username => "API_USERNAME",
            Self::Password => "API_PASSWORD",
            Self::AuthToken => "AUTH_TOKEN",
            Self::TimeoutSeconds => "CLIENTS_SUITE_TIMEOUT_SEC",
            Self::MinListLen => "CLIENTS_SUITE_MIN_LIST_LEN",
            Self::RunRoot => "CLIENTS_SUITE_RUN_ROOT",
            Self::ConfigPath => "CLIENTS_SUITE_CONFIG",
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUtf8`] when the variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| ConfigError::InvalidUtf8(name.to_string()))
    })
}

/// Reads a suite environment key and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
pub(super) fn read_env_nonempty(key: SuiteEnv) -> Result<Option<String>, ConfigError> {
    let name = key.as_str();
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(name.to_string())),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value in seconds.
///
/// # Errors
///
/// Returns an error when the value is blank, non-numeric, or zero.
pub(super) fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs = parse_positive(name, raw, "a positive integer number of seconds")?;
    Ok(Duration::from_secs(secs))
}

/// Parses a non-negative list length threshold.
///
/// # Errors
///
/// Returns an error when the value is blank or non-numeric.
pub(super) fn parse_min_list_len(name: &str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name: name.to_string(),
        reason: "must be a non-negative integer".to_string(),
    })
}

/// Parses a strictly positive integer.
fn parse_positive(name: &str, raw: &str, expected: &str) -> Result<u64, ConfigError> {
    let trimmed = raw.trim();
    let invalid = || ConfigError::Invalid {
        name: name.to_string(),
        reason: format!("must be {expected}"),
    };
    if trimmed.is_empty() {
        return Err(invalid());
    }
    let value: u64 = trimmed.parse().map_err(|_| invalid())?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            name: name.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
