// crates/clients-suite/src/api.rs
// ============================================================================
// Module: Clients API Client
// Description: HTTP client for the login and Clients resource endpoints.
// Purpose: Issue bounded JSON requests and capture a redacted transcript.
// Dependencies: reqwest, serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`ClientsApi`] issues one HTTP request per call and returns the raw status
//! and body as an [`ApiResponse`]. It never interprets status codes: deciding
//! whether a 401 or 404 is correct is the scenario's job. Every exchange is
//! appended to a transcript; authorization headers, login secrets, and issued
//! tokens are never recorded.
//!
//! Security posture: response bodies are untrusted and size-limited;
//! redirects are not followed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::config::Credentials;
use crate::config::SuiteConfig;
use crate::records::ClientId;
use crate::session::BearerToken;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum response body size accepted from the API.
pub const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;
/// Maximum characters of a response body kept in previews and transcripts.
pub const PREVIEW_CHARS: usize = 512;
/// Authentication endpoint.
pub const LOGIN_PATH: &str = "/api/v1/Account/login";
/// Collection endpoint used for listing.
pub const CLIENTS_LIST_PATH: &str = "/api/v1/clients/";
/// Count endpoint.
pub const CLIENTS_COUNT_PATH: &str = "/api/v1/Clients/$count";
/// Collection endpoint used for create and per-record routes.
pub const CLIENTS_PATH: &str = "/api/v1/Clients";

/// Returns the per-record path for an identifier.
#[must_use]
pub fn client_path(id: ClientId) -> String {
    format!("{CLIENTS_PATH}/{id}")
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// API client errors.
///
/// # Invariants
/// - Variants describe failures to complete an exchange, never unexpected
///   status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client construction or header error.
    #[error("api client config error: {0}")]
    Config(String),
    /// Network, TLS, or timeout failure.
    #[error("api transport error: {0}")]
    Transport(String),
    /// Request or response JSON error.
    #[error("api json error: {0}")]
    Json(String),
    /// Response body exceeds limits.
    #[error("api response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Actual size in bytes.
        actual: usize,
        /// Maximum size in bytes.
        limit: usize,
    },
}

/// HTTP methods used by the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET.
    Get,
    /// POST.
    Post,
    /// PATCH.
    Patch,
    /// PUT.
    Put,
    /// DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the canonical method label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Maps to the reqwest method.
    fn to_reqwest(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Patch => Method::PATCH,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }
}

/// Authorization mode for a request.
#[derive(Debug, Clone, Copy)]
pub enum Auth<'a> {
    /// No Authorization header.
    Anonymous,
    /// `Authorization: Bearer <token>`.
    Bearer(&'a BearerToken),
}

impl Auth<'_> {
    /// Returns true when a token is attached.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Bearer(_))
    }
}

/// Completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Request method.
    pub method: HttpMethod,
    /// Request path relative to the base URL.
    pub path: String,
    /// Response status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns the body as lossy UTF-8 text.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Returns a trimmed, length-bounded body preview.
    #[must_use]
    pub fn preview(&self) -> String {
        preview_text(&self.text())
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Json`] when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|err| {
            ApiError::Json(format!("{} {}: {err}", self.method.as_str(), self.path))
        })
    }
}

/// One recorded HTTP exchange.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    /// 1-based order of the exchange.
    pub sequence: u64,
    /// Request method.
    pub method: HttpMethod,
    /// Request path relative to the base URL.
    pub path: String,
    /// Whether a bearer token was attached.
    pub authenticated: bool,
    /// Request body as sent, or a redacted stand-in.
    pub request: Option<Value>,
    /// Response status when one was received.
    pub status: Option<u16>,
    /// Response body preview, omitted for redacted exchanges.
    pub response: Option<String>,
    /// Transport error when no response was received.
    pub error: Option<String>,
}

/// Request description passed to the shared send path.
struct Exchange<'a> {
    /// Request method.
    method: HttpMethod,
    /// Request path relative to the base URL.
    path: String,
    /// Authorization mode.
    auth: Auth<'a>,
    /// Serialized JSON body.
    body: Option<Value>,
    /// Body recorded in the transcript instead of `body`.
    recorded_body: Option<Value>,
    /// Omits the response body from the transcript.
    redact_response: bool,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// HTTP client for the Clients API with transcript capture.
///
/// # Invariants
/// - `base_url` has no trailing slash; paths start with `/`.
/// - Transcript sequence numbers are strictly increasing.
#[derive(Clone)]
pub struct ClientsApi {
    /// Reqwest client instance.
    client: Client,
    /// API origin.
    base_url: String,
    /// Recorded exchanges shared across clones.
    transcript: Arc<Mutex<Vec<TranscriptEntry>>>,
}

impl ClientsApi {
    /// Builds a client for the given origin with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| ApiError::Config(err.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            transcript: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Builds a client from suite configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the HTTP client cannot be constructed.
    pub fn from_config(config: &SuiteConfig) -> Result<Self, ApiError> {
        Self::new(config.base_url.clone(), config.timeout)
    }

    /// Returns the API origin.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a snapshot of the transcript entries.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Returns the number of recorded exchanges.
    #[must_use]
    pub fn exchange_count(&self) -> usize {
        self.transcript.lock().map_or(0, |entries| entries.len())
    }

    /// Posts credentials to the login endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the exchange cannot be completed.
    pub async fn login(&self, credentials: &Credentials) -> Result<ApiResponse, ApiError> {
        let body = json!({
            "username": credentials.username,
            "password": credentials.password,
        });
        self.send(Exchange {
            method: HttpMethod::Post,
            path: LOGIN_PATH.to_string(),
            auth: Auth::Anonymous,
            body: Some(body),
            recorded_body: Some(json!({
                "username": credentials.username,
                "password": "<redacted>",
            })),
            redact_response: true,
        })
        .await
    }

    /// Lists clients.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the exchange cannot be completed.
    pub async fn list_clients(&self, auth: Auth<'_>) -> Result<ApiResponse, ApiError> {
        self.send(Exchange::without_body(HttpMethod::Get, CLIENTS_LIST_PATH.to_string(), auth)).await
    }

    /// Fetches the client count as plain text.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the exchange cannot be completed.
    pub async fn count_clients(&self, auth: Auth<'_>) -> Result<ApiResponse, ApiError> {
        self.send(Exchange::without_body(HttpMethod::Get, CLIENTS_COUNT_PATH.to_string(), auth))
            .await
    }

    /// Creates a client from any JSON-serializable body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the body cannot be serialized or the exchange
    /// cannot be completed.
    pub async fn create_client<T: Serialize + ?Sized>(
        &self,
        auth: Auth<'_>,
        body: &T,
    ) -> Result<ApiResponse, ApiError> {
        let body = to_json(body)?;
        self.send(Exchange::with_body(HttpMethod::Post, CLIENTS_PATH.to_string(), auth, body)).await
    }

    /// Fetches a client by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the exchange cannot be completed.
    pub async fn get_client(&self, auth: Auth<'_>, id: ClientId) -> Result<ApiResponse, ApiError> {
        self.send(Exchange::without_body(HttpMethod::Get, client_path(id), auth)).await
    }

    /// Partially updates a client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the body cannot be serialized or the exchange
    /// cannot be completed.
    pub async fn patch_client<T: Serialize + ?Sized>(
        &self,
        auth: Auth<'_>,
        id: ClientId,
        body: &T,
    ) -> Result<ApiResponse, ApiError> {
        let body = to_json(body)?;
        self.send(Exchange::with_body(HttpMethod::Patch, client_path(id), auth, body)).await
    }

    /// Replaces a client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the body cannot be serialized or the exchange
    /// cannot be completed.
    pub async fn replace_client<T: Serialize + ?Sized>(
        &self,
        auth: Auth<'_>,
        id: ClientId,
        body: &T,
    ) -> Result<ApiResponse, ApiError> {
        let body = to_json(body)?;
        self.send(Exchange::with_body(HttpMethod::Put, client_path(id), auth, body)).await
    }

    /// Deletes a client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the exchange cannot be completed.
    pub async fn delete_client(
        &self,
        auth: Auth<'_>,
        id: ClientId,
    ) -> Result<ApiResponse, ApiError> {
        self.send(Exchange::without_body(HttpMethod::Delete, client_path(id), auth)).await
    }

    /// Sends one exchange and records it.
    async fn send(&self, exchange: Exchange<'_>) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, exchange.path);
        let headers = request_headers(exchange.auth, exchange.body.is_some())?;
        let mut request =
            self.client.request(exchange.method.to_reqwest(), &url).headers(headers);
        if let Some(body) = &exchange.body {
            let payload = serde_json::to_vec(body)
                .map_err(|err| ApiError::Json(format!("request serialization failed: {err}")))?;
            request = request.body(payload);
        }
        let recorded_body = exchange.recorded_body.clone().or_else(|| exchange.body.clone());

        let outcome = match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                read_response_body_with_limit(response, MAX_RESPONSE_BYTES)
                    .await
                    .map(|body| (status, body))
            }
            Err(err) => Err(ApiError::Transport(err.to_string())),
        };

        match outcome {
            Ok((status, body)) => {
                debug!(
                    method = exchange.method.as_str(),
                    path = %exchange.path,
                    status,
                    bytes = body.len(),
                    "http exchange"
                );
                let response = ApiResponse {
                    method: exchange.method,
                    path: exchange.path,
                    status,
                    body,
                };
                let preview = (!exchange.redact_response).then(|| response.preview());
                self.record(
                    &response.path,
                    response.method,
                    exchange.auth,
                    recorded_body,
                    Some(status),
                    preview,
                    None,
                );
                Ok(response)
            }
            Err(err) => {
                debug!(
                    method = exchange.method.as_str(),
                    path = %exchange.path,
                    error = %err,
                    "http exchange failed"
                );
                self.record(
                    &exchange.path,
                    exchange.method,
                    exchange.auth,
                    recorded_body,
                    None,
                    None,
                    Some(err.to_string()),
                );
                Err(err)
            }
        }
    }

    /// Appends a transcript entry.
    #[allow(clippy::too_many_arguments, reason = "Transcript fields are recorded positionally.")]
    fn record(
        &self,
        path: &str,
        method: HttpMethod,
        auth: Auth<'_>,
        request: Option<Value>,
        status: Option<u16>,
        response: Option<String>,
        error: Option<String>,
    ) {
        let Ok(mut guard) = self.transcript.lock() else {
            return;
        };
        let sequence = u64::try_from(guard.len()).unwrap_or(u64::MAX).saturating_add(1);
        guard.push(TranscriptEntry {
            sequence,
            method,
            path: path.to_string(),
            authenticated: auth.is_authenticated(),
            request,
            status,
            response,
            error,
        });
    }
}

impl<'a> Exchange<'a> {
    /// Builds a body-less exchange.
    fn without_body(method: HttpMethod, path: String, auth: Auth<'a>) -> Self {
        Self {
            method,
            path,
            auth,
            body: None,
            recorded_body: None,
            redact_response: false,
        }
    }

    /// Builds an exchange carrying a JSON body.
    fn with_body(method: HttpMethod, path: String, auth: Auth<'a>, body: Value) -> Self {
        Self {
            method,
            path,
            auth,
            body: Some(body),
            recorded_body: None,
            redact_response: false,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serializes a request body to JSON.
fn to_json<T: Serialize + ?Sized>(body: &T) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|err| ApiError::Json(format!("request serialization failed: {err}")))
}

/// Builds request headers for an exchange.
///
/// # Errors
///
/// Returns [`ApiError::Config`] when the token is not a valid header value.
fn request_headers(auth: Auth<'_>, has_body: bool) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    if has_body {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    if let Auth::Bearer(token) = auth {
        let value = format!("Bearer {}", token.expose());
        let mut header = HeaderValue::from_str(&value)
            .map_err(|_| ApiError::Config("invalid bearer token header".to_string()))?;
        header.set_sensitive(true);
        headers.insert(AUTHORIZATION, header);
    }
    Ok(headers)
}

/// Reads a response body while enforcing a hard byte limit.
async fn read_response_body_with_limit(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    let mut body = Vec::new();
    let mut total: usize = 0;
    while let Some(chunk) =
        response.chunk().await.map_err(|err| ApiError::Transport(err.to_string()))?
    {
        let next_total = total.checked_add(chunk.len()).ok_or(ApiError::ResponseTooLarge {
            actual: usize::MAX,
            limit,
        })?;
        if next_total > limit {
            return Err(ApiError::ResponseTooLarge {
                actual: next_total,
                limit,
            });
        }
        body.extend_from_slice(&chunk);
        total = next_total;
    }
    Ok(body)
}

/// Trims text and bounds it to [`PREVIEW_CHARS`] characters.
#[must_use]
pub fn preview_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= PREVIEW_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(PREVIEW_CHARS).collect();
    out.push_str("...");
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
