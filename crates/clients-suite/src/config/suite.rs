// crates/clients-suite/src/config/suite.rs
// ============================================================================
// Module: Suite Configuration Model
// Description: Typed suite configuration merged from TOML and environment.
// Purpose: Resolve endpoint, credentials, and run settings with strict checks.
// Dependencies: dotenvy, serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! [`SuiteConfig`] is resolved from three sources, highest priority first:
//! the process environment, an optional `.env` file, and an optional TOML
//! file. Resolution fails closed on
//! empty values, malformed numbers, unsupported URL schemes, and half-set
//! credentials.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::SuiteEnv;
use super::dotenv::DEFAULT_DOTENV_FILE;
use super::dotenv::DotenvValues;
use super::dotenv::layered_lookup;
use super::env::parse_min_list_len;
use super::env::parse_timeout_seconds;
use super::env::read_env_nonempty;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Config file name probed in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "clients-suite.toml";
/// Maximum accepted config file size in bytes.
pub const MAX_CONFIG_FILE_BYTES: usize = 1024 * 1024;
/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default list length the fixture data is expected to exceed.
pub const DEFAULT_MIN_LIST_LEN: usize = 10;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Messages name the offending key and never include secret values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment value is not valid UTF-8.
    #[error("{0} must be valid UTF-8")]
    InvalidUtf8(String),
    /// Value is set but empty.
    #[error("{0} must not be empty")]
    Empty(String),
    /// Required value is absent from every source.
    #[error("{0} is required")]
    Missing(String),
    /// Value failed validation.
    #[error("{name} {reason}")]
    Invalid {
        /// Offending key.
        name: String,
        /// Validation failure description.
        reason: String,
    },
    /// Config file could not be read.
    #[error("config file io error ({path}): {error}")]
    Io {
        /// Config file path.
        path: String,
        /// Underlying I/O error text.
        error: String,
    },
    /// Config file exceeds the size limit.
    #[error("config file exceeds size limit ({actual} > {limit})")]
    TooLarge {
        /// Observed size in bytes.
        actual: u64,
        /// Maximum size in bytes.
        limit: usize,
    },
    /// Config file is not UTF-8.
    #[error("config file must be utf-8")]
    FileNotUtf8,
    /// Dotenv file could not be read or parsed.
    #[error("dotenv file error ({path}): {error}")]
    Dotenv {
        /// Dotenv file path.
        path: String,
        /// Reader or parser error text.
        error: String,
    },
    /// Config file is not valid TOML for the suite schema.
    #[error("invalid config file: {0}")]
    Parse(String),
}

// ============================================================================
// SECTION: File Schema
// ============================================================================

/// On-disk TOML layout.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    /// API endpoint and credential settings.
    #[serde(default)]
    api: FileApiSection,
    /// Run behavior settings.
    #[serde(default)]
    run: FileRunSection,
}

/// `[api]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileApiSection {
    /// API origin.
    base_url: Option<String>,
    /// Login username.
    username: Option<String>,
    /// Login password.
    password: Option<String>,
    /// Pre-issued bearer token.
    auth_token: Option<String>,
}

/// `[run]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileRunSection {
    /// HTTP request timeout in seconds.
    timeout_secs: Option<u64>,
    /// List length the fixture data must exceed.
    min_list_len: Option<usize>,
    /// Artifact directory.
    run_root: Option<PathBuf>,
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Login credentials for the authentication endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login username.
    pub username: String,
    /// Login password.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Typed suite configuration.
///
/// # Invariants
/// - `base_url` is an absolute `http`/`https` URL without a trailing slash.
/// - At least one of `credentials` or `auth_token` is present.
/// - `timeout` is non-zero.
#[derive(Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    /// API origin without trailing slash.
    pub base_url: String,
    /// Login credentials, when configured.
    pub credentials: Option<Credentials>,
    /// Pre-issued bearer token, when configured.
    pub auth_token: Option<String>,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// List length the fixture data must exceed.
    pub min_list_len: usize,
    /// Artifact directory override.
    pub run_root: Option<PathBuf>,
}

impl fmt::Debug for SuiteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteConfig")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("min_list_len", &self.min_list_len)
            .field("run_root", &self.run_root)
            .finish()
    }
}

impl SuiteConfig {
    /// Loads configuration from the environment, `./.env`, and an optional
    /// TOML file.
    ///
    /// When `path` is `None`, `CLIENTS_SUITE_CONFIG` is consulted, then
    /// [`DEFAULT_CONFIG_FILE`] in the working directory if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a file cannot be read or parsed, or a
    /// value is missing or invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_dotenv(path, Path::new(DEFAULT_DOTENV_FILE))
    }

    /// Same as [`SuiteConfig::load`] with an explicit dotenv path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a file cannot be read or parsed, or a
    /// value is missing or invalid.
    pub fn load_with_dotenv(path: Option<&Path>, dotenv_path: &Path) -> Result<Self, ConfigError> {
        let dotenv = DotenvValues::read(dotenv_path)?;
        let lookup = layered_lookup(read_env_nonempty, &dotenv);
        let text = match resolve_config_path(path, &lookup)? {
            Some(path) => Some(read_config_file(&path)?),
            None => None,
        };
        Self::from_sources(text.as_deref(), lookup)
    }

    /// Resolves configuration from TOML text and an environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the TOML is invalid or a value is missing
    /// or fails validation.
    pub fn from_sources<F>(file_text: Option<&str>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(SuiteEnv) -> Result<Option<String>, ConfigError>,
    {
        let file: FileConfig = match file_text {
            Some(text) => toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?,
            None => FileConfig::default(),
        };
        let env = |key: SuiteEnv| -> Result<Option<String>, ConfigError> {
            reject_empty(key.as_str(), lookup(key)?)
        };

        let base_url = env(SuiteEnv::BaseUrl)?
            .or(reject_empty("api.base_url", file.api.base_url)?)
            .ok_or_else(|| ConfigError::Missing(SuiteEnv::BaseUrl.as_str().to_string()))?;
        let base_url = normalize_base_url(&base_url)?;

        let username = env(SuiteEnv::Username)?.or(reject_empty("api.username", file.api.username)?);
        let password = env(SuiteEnv::Password)?.or(reject_empty("api.password", file.api.password)?);
        let credentials = match (username, password) {
            (Some(username), Some(password)) => Some(Credentials {
                username,
                password,
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    name: format!(
                        "{}/{}",
                        SuiteEnv::Username.as_str(),
                        SuiteEnv::Password.as_str()
                    ),
                    reason: "must be set together".to_string(),
                });
            }
        };
        let auth_token =
            env(SuiteEnv::AuthToken)?.or(reject_empty("api.auth_token", file.api.auth_token)?);
        if credentials.is_none() && auth_token.is_none() {
            return Err(ConfigError::Missing(format!(
                "{} and {} (or {})",
                SuiteEnv::Username.as_str(),
                SuiteEnv::Password.as_str(),
                SuiteEnv::AuthToken.as_str()
            )));
        }

        let timeout = match env(SuiteEnv::TimeoutSeconds)? {
            Some(raw) => parse_timeout_seconds(SuiteEnv::TimeoutSeconds.as_str(), &raw)?,
            None => match file.run.timeout_secs {
                Some(0) => {
                    return Err(ConfigError::Invalid {
                        name: "run.timeout_secs".to_string(),
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Some(secs) => Duration::from_secs(secs),
                None => DEFAULT_TIMEOUT,
            },
        };
        let min_list_len = match env(SuiteEnv::MinListLen)? {
            Some(raw) => parse_min_list_len(SuiteEnv::MinListLen.as_str(), &raw)?,
            None => file.run.min_list_len.unwrap_or(DEFAULT_MIN_LIST_LEN),
        };
        let run_root = env(SuiteEnv::RunRoot)?.map(PathBuf::from).or(file.run.run_root);

        Ok(Self {
            base_url,
            credentials,
            auth_token,
            timeout,
            min_list_len,
            run_root,
        })
    }

    /// Returns a redacted key/value description suitable for display.
    #[must_use]
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        let auth = match (&self.credentials, &self.auth_token) {
            (Some(credentials), Some(_)) => {
                format!("login as {} (pre-issued token also set)", credentials.username)
            }
            (Some(credentials), None) => format!("login as {}", credentials.username),
            (None, _) => "pre-issued token".to_string(),
        };
        vec![
            ("base_url", self.base_url.clone()),
            ("auth", auth),
            ("timeout_secs", self.timeout.as_secs().to_string()),
            ("min_list_len", self.min_list_len.to_string()),
            (
                "run_root",
                self.run_root
                    .as_ref()
                    .map_or_else(|| "<default>".to_string(), |path| path.display().to_string()),
            ),
        ]
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Picks the config file path from the explicit argument, env, or default.
fn resolve_config_path<F>(explicit: Option<&Path>, lookup: F) -> Result<Option<PathBuf>, ConfigError>
where
    F: Fn(SuiteEnv) -> Result<Option<String>, ConfigError>,
{
    if let Some(path) = explicit {
        return Ok(Some(path.to_path_buf()));
    }
    if let Some(path) = reject_empty(SuiteEnv::ConfigPath.as_str(), lookup(SuiteEnv::ConfigPath)?)? {
        return Ok(Some(PathBuf::from(path)));
    }
    let default = Path::new(DEFAULT_CONFIG_FILE);
    Ok(default.is_file().then(|| default.to_path_buf()))
}

/// Reads a config file with size and encoding limits.
fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    let io_error = |err: std::io::Error| ConfigError::Io {
        path: path.display().to_string(),
        error: err.to_string(),
    };
    let file = File::open(path).map_err(io_error)?;
    let limit = u64::try_from(MAX_CONFIG_FILE_BYTES).unwrap_or(u64::MAX);
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(io_error)?;
    let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    if actual > limit {
        return Err(ConfigError::TooLarge {
            actual,
            limit: MAX_CONFIG_FILE_BYTES,
        });
    }
    String::from_utf8(bytes).map_err(|_| ConfigError::FileNotUtf8)
}

/// Rejects blank values while passing absent ones through.
fn reject_empty(name: &str, value: Option<String>) -> Result<Option<String>, ConfigError> {
    match value {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(name.to_string())),
        other => Ok(other),
    }
}

/// Validates the API origin and strips trailing slashes.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let name = SuiteEnv::BaseUrl.as_str();
    let invalid = |reason: String| ConfigError::Invalid {
        name: name.to_string(),
        reason,
    };
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|err| invalid(format!("must be an absolute URL: {err}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("scheme {other} is not supported"))),
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("must not include a query or fragment".to_string()));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(invalid("must not embed credentials".to_string()));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
