// crates/clients-suite/src/config/dotenv.rs
// ============================================================================
// Module: Dotenv Layer
// Description: Reads `KEY=value` files as the lowest-priority config source.
// Purpose: Keep existing `.env` files working without touching process env.
// Dependencies: dotenvy
// ============================================================================

//! ## Overview
//! A `.env` file in the working directory supplies values for any
//! [`SuiteEnv`] key the process environment leaves unset. The file is parsed
//! into a map; process variables are never modified. A missing file is an
//! empty layer, while a malformed one fails closed.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use super::SuiteEnv;
use super::suite::ConfigError;

/// Dotenv file probed in the working directory.
pub const DEFAULT_DOTENV_FILE: &str = ".env";

/// Parsed dotenv values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DotenvValues {
    /// Raw key/value pairs; later assignments replace earlier ones.
    values: BTreeMap<String, String>,
}

impl fmt::Debug for DotenvValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

impl DotenvValues {
    /// Reads `path`, treating a missing file as empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Dotenv`] when the file exists but cannot be
    /// read or parsed.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let dotenv_error = |err: dotenvy::Error| ConfigError::Dotenv {
            path: path.display().to_string(),
            error: err.to_string(),
        };
        let mut values = BTreeMap::new();
        for item in dotenvy::from_path_iter(path).map_err(dotenv_error)? {
            let (key, value) = item.map_err(dotenv_error)?;
            values.insert(key, value);
        }
        Ok(Self {
            values,
        })
    }

    /// Returns the value assigned to `key`, if any.
    #[must_use]
    pub fn get(&self, key: SuiteEnv) -> Option<&str> {
        self.values.get(key.as_str()).map(String::as_str)
    }

    /// Number of assignments read.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing was read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Combines a process lookup with dotenv values; the process wins.
pub(super) fn layered_lookup<'a, P>(
    process: P,
    dotenv: &'a DotenvValues,
) -> impl Fn(SuiteEnv) -> Result<Option<String>, ConfigError> + 'a
where
    P: Fn(SuiteEnv) -> Result<Option<String>, ConfigError> + 'a,
{
    move |key| match process(key)? {
        Some(value) => Ok(Some(value)),
        None => Ok(dotenv.get(key).map(str::to_string)),
    }
}
