// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Parse artifact settings with strict UTF-8 validation.
// Dependencies: clients-suite
// ============================================================================

//! ## Overview
//! Values are read through the suite's strict reader, so invalid UTF-8 and
//! empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use clients_suite::config::read_env_strict;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional artifact root override.
    RunRoot,
    /// Allow reusing a non-empty run root (`true`/`false` or `1`/`0`).
    AllowOverwrite,
}

impl SystemTestEnv {
    /// Every key, for guards that reset the environment.
    pub const ALL: [Self; 2] = [Self::RunRoot, Self::AllowOverwrite];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "CLIENTS_SYSTEM_TEST_RUN_ROOT",
            Self::AllowOverwrite => "CLIENTS_SYSTEM_TEST_ALLOW_OVERWRITE",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional artifact root override.
    pub run_root: Option<PathBuf>,
    /// Allow reusing a non-empty run root.
    pub allow_overwrite: bool,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when a value is not valid UTF-8, is empty, or is not
    /// a recognized boolean.
    pub fn load() -> Result<Self, String> {
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot)?.map(PathBuf::from);
        let allow_overwrite = parse_bool_env(
            SystemTestEnv::AllowOverwrite.as_str(),
            read_env_nonempty(SystemTestEnv::AllowOverwrite)?,
        )?;
        Ok(Self {
            run_root,
            allow_overwrite,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and rejects empty values.
fn read_env_nonempty(key: SystemTestEnv) -> Result<Option<String>, String> {
    let name = key.as_str();
    let Some(value) = read_env_strict(name).map_err(|err| err.to_string())? else {
        return Ok(None);
    };
    if value.trim().is_empty() {
        return Err(format!("{name} must not be empty"));
    }
    Ok(Some(value))
}

/// Parses a boolean literal, defaulting to false when unset.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}
