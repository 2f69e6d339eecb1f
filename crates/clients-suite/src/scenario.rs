// crates/clients-suite/src/scenario.rs
// ============================================================================
// Module: Scenario Catalog
// Description: Ordered request/assert scenarios for the Clients resource.
// Purpose: Define scenario identity, shared run context, and assertions.
// Dependencies: serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! Each scenario issues one or two requests and asserts on status and, where
//! relevant, body shape. Scenarios share state only through a
//! [`ScenarioContext`], which carries the identifier produced by
//! `create_client` to the scenarios that read, modify, and delete it.
//!
//! The canonical order in [`ScenarioName::ALL`] is significant: dependents
//! always follow the scenario that produces the identifier.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::api::ApiError;
use crate::api::ApiResponse;
use crate::api::Auth;
use crate::api::ClientsApi;
use crate::config::SuiteConfig;
use crate::records::ClientDraft;
use crate::records::ClientId;
use crate::records::ClientList;
use crate::records::ClientRecord;
use crate::records::ClientReplacement;
use crate::records::RecordError;
use crate::records::parse_count;
use crate::session::Session;

// ============================================================================
// SECTION: Scenario Identity
// ============================================================================

/// Named scenario in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioName {
    /// List without a token, expect 401.
    ListClientsUnauthorized,
    /// List with a token, expect more than the minimum entries.
    ListClients,
    /// Count with a token, expect a non-negative integer.
    CountClients,
    /// Count without a token, expect 401.
    CountClientsUnauthorized,
    /// Create a client and remember its identifier.
    CreateClient,
    /// Create with an empty body, expect 400.
    CreateClientInvalidPayload,
    /// Create without a token, expect 401.
    CreateClientUnauthorized,
    /// Read the created client.
    GetClient,
    /// Read the created client without a token, expect 401.
    GetClientUnauthorized,
    /// Patch recognised fields of the created client.
    UpdateClientPartial,
    /// Patch an unrecognised field, expect 400.
    UpdateClientPartialInvalid,
    /// Replace the created client.
    ReplaceClient,
    /// Delete the created client, then expect 404 on read.
    DeleteClient,
}

impl ScenarioName {
    /// Every scenario in canonical execution order.
    pub const ALL: [Self; 13] = [
        Self::ListClientsUnauthorized,
        Self::ListClients,
        Self::CountClients,
        Self::CountClientsUnauthorized,
        Self::CreateClient,
        Self::CreateClientInvalidPayload,
        Self::CreateClientUnauthorized,
        Self::GetClient,
        Self::GetClientUnauthorized,
        Self::UpdateClientPartial,
        Self::UpdateClientPartialInvalid,
        Self::ReplaceClient,
        Self::DeleteClient,
    ];

    /// Returns the stable scenario name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListClientsUnauthorized => "list_clients_unauthorized",
            Self::ListClients => "list_clients",
            Self::CountClients => "count_clients",
            Self::CountClientsUnauthorized => "count_clients_unauthorized",
            Self::CreateClient => "create_client",
            Self::CreateClientInvalidPayload => "create_client_invalid_payload",
            Self::CreateClientUnauthorized => "create_client_unauthorized",
            Self::GetClient => "get_client",
            Self::GetClientUnauthorized => "get_client_unauthorized",
            Self::UpdateClientPartial => "update_client_partial",
            Self::UpdateClientPartialInvalid => "update_client_partial_invalid",
            Self::ReplaceClient => "replace_client",
            Self::DeleteClient => "delete_client",
        }
    }

    /// One-line description for listings.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ListClientsUnauthorized => "GET /api/v1/clients/ without token returns 401",
            Self::ListClients => "GET /api/v1/clients/ returns more than the minimum entries",
            Self::CountClients => "GET /api/v1/Clients/$count returns a non-negative integer",
            Self::CountClientsUnauthorized => "GET /api/v1/Clients/$count without token returns 401",
            Self::CreateClient => "POST /api/v1/Clients returns a clientID",
            Self::CreateClientInvalidPayload => "POST /api/v1/Clients with {} returns 400",
            Self::CreateClientUnauthorized => "POST /api/v1/Clients without token returns 401",
            Self::GetClient => "GET /api/v1/Clients/{id} returns the created client",
            Self::GetClientUnauthorized => "GET /api/v1/Clients/{id} without token returns 401",
            Self::UpdateClientPartial => "PATCH /api/v1/Clients/{id} with known fields succeeds",
            Self::UpdateClientPartialInvalid => {
                "PATCH /api/v1/Clients/{id} with an unknown field returns 400"
            }
            Self::ReplaceClient => "PUT /api/v1/Clients/{id} with a full body succeeds",
            Self::DeleteClient => "DELETE /api/v1/Clients/{id} succeeds and the id then 404s",
        }
    }

    /// Returns true when the scenario operates on the created client.
    #[must_use]
    pub const fn needs_created_client(self) -> bool {
        matches!(
            self,
            Self::GetClient
                | Self::GetClientUnauthorized
                | Self::UpdateClientPartial
                | Self::UpdateClientPartialInvalid
                | Self::ReplaceClient
                | Self::DeleteClient
        )
    }
}

impl fmt::Display for ScenarioName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown scenario name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown scenario: {0}")]
pub struct UnknownScenario(
    /// Rejected name.
    pub String,
);

impl FromStr for ScenarioName {
    type Err = UnknownScenario;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == value)
            .ok_or_else(|| UnknownScenario(value.to_string()))
    }
}

// ============================================================================
// SECTION: Plan
// ============================================================================

/// Ordered set of scenarios to execute.
///
/// # Invariants
/// - Names appear in canonical order without duplicates.
/// - `CreateClient` is present whenever a dependent scenario is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioPlan {
    /// Scenarios in execution order.
    names: Vec<ScenarioName>,
}

impl ScenarioPlan {
    /// Plan containing every scenario.
    #[must_use]
    pub fn full() -> Self {
        Self {
            names: ScenarioName::ALL.to_vec(),
        }
    }

    /// Plan containing the selected scenarios plus their prerequisite.
    ///
    /// An empty selection yields the full plan.
    #[must_use]
    pub fn select(selected: &[ScenarioName]) -> Self {
        if selected.is_empty() {
            return Self::full();
        }
        let needs_create = selected.iter().any(|name| name.needs_created_client());
        let names = ScenarioName::ALL
            .into_iter()
            .filter(|name| {
                selected.contains(name) || (needs_create && *name == ScenarioName::CreateClient)
            })
            .collect();
        Self {
            names,
        }
    }

    /// Scenarios in execution order.
    #[must_use]
    pub fn names(&self) -> &[ScenarioName] {
        &self.names
    }

    /// Number of scenarios in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true when the plan is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Mutable state shared across scenarios of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioContext {
    /// Identifier produced by `create_client`, cleared after deletion.
    created_client_id: Option<ClientId>,
}

impl ScenarioContext {
    /// Creates an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            created_client_id: None,
        }
    }

    /// Returns the created identifier, if any.
    #[must_use]
    pub const fn created_client_id(&self) -> Option<ClientId> {
        self.created_client_id
    }

    /// Records the identifier produced by the create scenario.
    pub const fn record_created(&mut self, id: ClientId) {
        self.created_client_id = Some(id);
    }

    /// Forgets the identifier once the record is gone.
    pub const fn clear_created(&mut self) {
        self.created_client_id = None;
    }

    /// Returns the created identifier or a prerequisite error.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::MissingPrerequisite`] when no client was created.
    pub fn require_created(&self) -> Result<ClientId, ScenarioError> {
        self.created_client_id.ok_or(ScenarioError::MissingPrerequisite(
            "no client was created earlier in this run",
        ))
    }
}

/// Per-run tunables consumed by scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioSettings {
    /// `list_clients` requires strictly more entries than this.
    pub min_list_len: usize,
}

impl ScenarioSettings {
    /// Extracts settings from suite configuration.
    #[must_use]
    pub const fn from_config(config: &SuiteConfig) -> Self {
        Self {
            min_list_len: config.min_list_len,
        }
    }
}

// ============================================================================
// SECTION: Assertions
// ============================================================================

/// Scenario assertion failures.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Status code did not match the expectation.
    #[error("expected {expected} from {request}, got {actual}: {body}")]
    UnexpectedStatus {
        /// Method and path of the request.
        request: String,
        /// Expected status label.
        expected: String,
        /// Actual status code.
        actual: u16,
        /// Response body preview.
        body: String,
    },
    /// Response body did not have the asserted shape.
    #[error("unexpected response body: {0}")]
    BodyShape(String),
    /// A required earlier scenario did not produce its output.
    #[error("missing prerequisite: {0}")]
    MissingPrerequisite(&'static str),
    /// Request could not be completed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<RecordError> for ScenarioError {
    fn from(err: RecordError) -> Self {
        Self::BodyShape(err.to_string())
    }
}

/// Status expectation for one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Any 2xx status.
    Success,
    /// Exactly this status.
    Status(u16),
}

impl Expect {
    /// Expected 401 Unauthorized.
    pub const UNAUTHORIZED: Self = Self::Status(401);
    /// Expected 400 Bad Request.
    pub const BAD_REQUEST: Self = Self::Status(400);
    /// Expected 404 Not Found.
    pub const NOT_FOUND: Self = Self::Status(404);

    /// Returns true when the status satisfies the expectation.
    #[must_use]
    pub const fn matches(self, status: u16) -> bool {
        match self {
            Self::Success => status >= 200 && status < 300,
            Self::Status(expected) => status == expected,
        }
    }

    /// Returns the expectation label used in failure messages.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Success => "2xx".to_string(),
            Self::Status(status) => status.to_string(),
        }
    }

    /// Checks a response against the expectation.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::UnexpectedStatus`] on mismatch.
    pub fn check(self, response: &ApiResponse) -> Result<(), ScenarioError> {
        if self.matches(response.status) {
            return Ok(());
        }
        Err(ScenarioError::UnexpectedStatus {
            request: format!("{} {}", response.method.as_str(), response.path),
            expected: self.label(),
            actual: response.status,
            body: response.preview(),
        })
    }
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs one scenario to completion.
///
/// # Errors
///
/// Returns [`ScenarioError`] on the first failed assertion or request.
pub async fn execute(
    name: ScenarioName,
    api: &ClientsApi,
    session: &Session,
    settings: ScenarioSettings,
    context: &mut ScenarioContext,
) -> Result<(), ScenarioError> {
    let auth = session.auth();
    match name {
        ScenarioName::ListClientsUnauthorized => {
            Expect::UNAUTHORIZED.check(&api.list_clients(Auth::Anonymous).await?)
        }
        ScenarioName::ListClients => list_clients(api, auth, settings).await,
        ScenarioName::CountClients => count_clients(api, auth).await,
        ScenarioName::CountClientsUnauthorized => {
            Expect::UNAUTHORIZED.check(&api.count_clients(Auth::Anonymous).await?)
        }
        ScenarioName::CreateClient => create_client(api, auth, context).await,
        ScenarioName::CreateClientInvalidPayload => {
            Expect::BAD_REQUEST.check(&api.create_client(auth, &json!({})).await?)
        }
        ScenarioName::CreateClientUnauthorized => {
            let draft = ClientDraft::unauthorized_probe();
            Expect::UNAUTHORIZED.check(&api.create_client(Auth::Anonymous, &draft).await?)
        }
        ScenarioName::GetClient => {
            let id = context.require_created()?;
            Expect::Success.check(&api.get_client(auth, id).await?)
        }
        ScenarioName::GetClientUnauthorized => {
            let id = context.require_created()?;
            Expect::UNAUTHORIZED.check(&api.get_client(Auth::Anonymous, id).await?)
        }
        ScenarioName::UpdateClientPartial => {
            let id = context.require_created()?;
            let draft = ClientDraft::partial_update();
            Expect::Success.check(&api.patch_client(auth, id, &draft).await?)
        }
        ScenarioName::UpdateClientPartialInvalid => {
            let id = context.require_created()?;
            let body = json!({ "InvalidFieldName": "test9999" });
            Expect::BAD_REQUEST.check(&api.patch_client(auth, id, &body).await?)
        }
        ScenarioName::ReplaceClient => {
            let id = context.require_created()?;
            let body = ClientReplacement {
                client_id: id,
                draft: ClientDraft::replacement_body(),
            };
            Expect::Success.check(&api.replace_client(auth, id, &body).await?)
        }
        ScenarioName::DeleteClient => delete_client(api, auth, context).await,
    }
}

/// Lists clients and checks the fixture size.
async fn list_clients(
    api: &ClientsApi,
    auth: Auth<'_>,
    settings: ScenarioSettings,
) -> Result<(), ScenarioError> {
    let response = api.list_clients(auth).await?;
    Expect::Success.check(&response)?;
    let list = ClientList::from_body(&response.body)?;
    if list.len() <= settings.min_list_len {
        return Err(ScenarioError::BodyShape(format!(
            "expected more than {} clients, got {}",
            settings.min_list_len,
            list.len()
        )));
    }
    Ok(())
}

/// Counts clients.
async fn count_clients(api: &ClientsApi, auth: Auth<'_>) -> Result<(), ScenarioError> {
    let response = api.count_clients(auth).await?;
    Expect::Success.check(&response)?;
    let count = parse_count(&response.body)?;
    debug!(count, "client count");
    Ok(())
}

/// Creates the run's client and records its identifier.
async fn create_client(
    api: &ClientsApi,
    auth: Auth<'_>,
    context: &mut ScenarioContext,
) -> Result<(), ScenarioError> {
    let response = api.create_client(auth, &ClientDraft::automation()).await?;
    Expect::Success.check(&response)?;
    let record = ClientRecord::from_body(&response.body)?;
    debug!(client_id = record.client_id.get(), "client created");
    context.record_created(record.client_id);
    Ok(())
}

/// Deletes the run's client and confirms it is gone.
async fn delete_client(
    api: &ClientsApi,
    auth: Auth<'_>,
    context: &mut ScenarioContext,
) -> Result<(), ScenarioError> {
    let id = context.require_created()?;
    Expect::Success.check(&api.delete_client(auth, id).await?)?;
    context.clear_created();
    Expect::NOT_FOUND.check(&api.get_client(auth, id).await?)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
