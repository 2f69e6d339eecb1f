// crates/clients-suite/src/records.rs
// ============================================================================
// Module: Client Wire Records
// Description: Request and response shapes for the Clients resource.
// Purpose: Encode outgoing payloads and decode identifiers, lists, and counts.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The Clients resource is owned by the remote API; this module only models
//! the wire shapes the suite sends and inspects. Outgoing field names are
//! PascalCase, the assigned identifier comes back as `clientID`, and list
//! responses use an OData-style `{ "value": [...] }` envelope.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Response body shape errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// Body is not JSON of the expected shape.
    #[error("invalid {what} body: {reason}")]
    Malformed {
        /// Which payload was being decoded.
        what: &'static str,
        /// Decoder message.
        reason: String,
    },
    /// Count body is not a non-negative integer.
    #[error("count body is not a non-negative integer: '{0}'")]
    InvalidCount(String),
}

// ============================================================================
// SECTION: Identifier
// ============================================================================

/// Identifier assigned to a client by the API.
///
/// # Invariants
/// - Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ClientId(u64);

impl ClientId {
    /// Creates an identifier, rejecting zero.
    #[must_use]
    pub const fn new(value: u64) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for ClientId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        /// Identifier as sent on the wire.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            /// JSON number.
            Number(i64),
            /// Numeric string.
            Text(String),
        }

        let value = match Raw::deserialize(deserializer)? {
            Raw::Number(value) => u64::try_from(value).ok(),
            Raw::Text(text) => text.trim().parse::<u64>().ok(),
        };
        value
            .and_then(Self::new)
            .ok_or_else(|| de::Error::custom("client identifier must be a positive integer"))
    }
}

// ============================================================================
// SECTION: Outgoing Payloads
// ============================================================================

/// Payload for creating or partially updating a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClientDraft {
    /// Last name or company name.
    pub last_name_or_company: String,
    /// First name.
    pub first_name: String,
    /// Contact email.
    pub email: String,
    /// Mobile number.
    pub mobile: String,
    /// Client type code.
    pub client_type_code: u32,
}

impl ClientDraft {
    /// Draft used by the create scenario.
    #[must_use]
    pub fn automation() -> Self {
        Self {
            last_name_or_company: "QA".to_string(),
            first_name: "AutomationNEW".to_string(),
            email: "qa@test.com".to_string(),
            mobile: "12312323".to_string(),
            client_type_code: 1,
        }
    }

    /// Draft used by the create-without-credentials scenario.
    #[must_use]
    pub fn unauthorized_probe() -> Self {
        Self {
            first_name: "Automation".to_string(),
            ..Self::automation()
        }
    }

    /// Draft used by the partial update scenario.
    #[must_use]
    pub fn partial_update() -> Self {
        Self {
            last_name_or_company: "QA2".to_string(),
            first_name: "Automation".to_string(),
            mobile: "12312323111".to_string(),
            ..Self::automation()
        }
    }

    /// Draft used by the full replace scenario.
    #[must_use]
    pub fn replacement_body() -> Self {
        Self {
            first_name: "AutomationPUT".to_string(),
            email: "qa@put.com".to_string(),
            mobile: "999888777".to_string(),
            ..Self::automation()
        }
    }
}

/// Full-replace payload: a draft carrying the target identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientReplacement {
    /// Identifier of the replaced record.
    #[serde(rename = "clientID")]
    pub client_id: ClientId,
    /// Replacement field values.
    #[serde(flatten)]
    pub draft: ClientDraft,
}

// ============================================================================
// SECTION: Incoming Payloads
// ============================================================================

/// Client record returned by create and get-by-id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientRecord {
    /// Assigned identifier.
    #[serde(rename = "clientID", alias = "ClientID", alias = "clientId")]
    pub client_id: ClientId,
    /// Remaining fields, preserved as returned.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ClientRecord {
    /// Decodes a record from a response body.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Malformed`] when the body is not a client object
    /// with a positive identifier.
    pub fn from_body(body: &[u8]) -> Result<Self, RecordError> {
        serde_json::from_slice(body).map_err(|err| RecordError::Malformed {
            what: "client",
            reason: err.to_string(),
        })
    }
}

/// List envelope returned by the collection endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientList {
    /// Returned entries.
    pub value: Vec<Value>,
}

impl ClientList {
    /// Decodes a list envelope from a response body.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Malformed`] when the body lacks a `value` array.
    pub fn from_body(body: &[u8]) -> Result<Self, RecordError> {
        serde_json::from_slice(body).map_err(|err| RecordError::Malformed {
            what: "client list",
            reason: err.to_string(),
        })
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Returns true when no entries were returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Parses the plain-text body of the count endpoint.
///
/// # Errors
///
/// Returns [`RecordError::InvalidCount`] when the text is not a non-negative
/// integer.
pub fn parse_count(body: &[u8]) -> Result<u64, RecordError> {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim().trim_start_matches('\u{feff}').trim();
    trimmed.parse::<u64>().map_err(|_| RecordError::InvalidCount(trimmed.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
