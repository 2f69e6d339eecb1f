// crates/clients-suite/src/session.rs
// ============================================================================
// Module: Session Bootstrap
// Description: One-time authentication handshake for a scenario batch.
// Purpose: Obtain and hold the bearer token used by every scenario.
// Dependencies: serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! A [`Session`] is created once before any scenario runs and is read-only
//! afterward. Login failures are fatal to the whole batch and are never
//! retried. Only a short token prefix is ever logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::api::ApiError;
use crate::api::Auth;
use crate::api::ClientsApi;
use crate::config::Credentials;
use crate::config::SuiteConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of token characters kept in diagnostic output.
pub const TOKEN_PREFIX_CHARS: usize = 15;

// ============================================================================
// SECTION: Token
// ============================================================================

/// Opaque bearer credential.
///
/// # Invariants
/// - Never empty or whitespace.
/// - `Debug` output never includes the token value.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps a token, rejecting blank values.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() { None } else { Some(Self(trimmed.to_string())) }
    }

    /// Returns the full token for use in an Authorization header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns the diagnostic prefix (`abcdefghijklmno....`).
    #[must_use]
    pub fn prefix(&self) -> String {
        let mut out: String = self.0.chars().take(TOKEN_PREFIX_CHARS).collect();
        out.push_str("....");
        out
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Where the session token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    /// Issued by the login endpoint for this run.
    Login,
    /// Supplied through configuration.
    Preissued,
}

impl TokenSource {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Preissued => "preissued",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Session setup failures. All variants are fatal to the run.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Login endpoint returned a non-success status.
    #[error("login rejected with status {status}: {body}")]
    LoginRejected {
        /// Returned status code.
        status: u16,
        /// Response body preview.
        body: String,
    },
    /// Login succeeded but the response carried no usable token.
    #[error("login response missing Token")]
    MissingToken,
    /// Neither credentials nor a pre-issued token are configured.
    #[error("no login credentials or pre-issued token configured")]
    NoCredentials,
    /// Login exchange could not be completed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Login response payload.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    /// Issued bearer token.
    #[serde(rename = "Token", alias = "token")]
    token: Option<String>,
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Authenticated session shared by a scenario batch.
#[derive(Debug, Clone)]
pub struct Session {
    /// API origin the token was issued for.
    base_url: String,
    /// Bearer token.
    token: BearerToken,
    /// Token origin.
    source: TokenSource,
}

impl Session {
    /// Establishes a session from configuration.
    ///
    /// Credentials take precedence; a pre-issued token is adopted only when no
    /// credentials are configured.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when login fails or nothing is configured.
    pub async fn bootstrap(api: &ClientsApi, config: &SuiteConfig) -> Result<Self, SessionError> {
        if let Some(credentials) = &config.credentials {
            return Self::login(api, credentials).await;
        }
        let token = config
            .auth_token
            .as_deref()
            .and_then(BearerToken::new)
            .ok_or(SessionError::NoCredentials)?;
        Ok(Self::established(api.base_url(), token, TokenSource::Preissued))
    }

    /// Performs the login handshake.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the exchange fails, the status is not
    /// 2xx, or the response lacks a token.
    pub async fn login(api: &ClientsApi, credentials: &Credentials) -> Result<Self, SessionError> {
        let response = api.login(credentials).await?;
        if !response.is_success() {
            return Err(SessionError::LoginRejected {
                status: response.status,
                body: response.preview(),
            });
        }
        let payload: LoginResponse = response.json().map_err(|_| SessionError::MissingToken)?;
        let token =
            payload.token.and_then(BearerToken::new).ok_or(SessionError::MissingToken)?;
        Ok(Self::established(api.base_url(), token, TokenSource::Login))
    }

    /// Builds the session and logs the token prefix.
    fn established(base_url: &str, token: BearerToken, source: TokenSource) -> Self {
        info!(
            token_prefix = %token.prefix(),
            token_source = source.as_str(),
            base_url,
            "session established"
        );
        Self {
            base_url: base_url.to_string(),
            token,
            source,
        }
    }

    /// Returns the API origin.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the bearer token.
    #[must_use]
    pub const fn token(&self) -> &BearerToken {
        &self.token
    }

    /// Returns the token origin.
    #[must_use]
    pub const fn source(&self) -> TokenSource {
        self.source
    }

    /// Returns authenticated request mode.
    #[must_use]
    pub const fn auth(&self) -> Auth<'_> {
        Auth::Bearer(&self.token)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
