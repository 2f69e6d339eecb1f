// crates/clients-suite/src/lib.rs
// ============================================================================
// Module: Clients Suite Library
// Description: End-to-end scenario runner for the Clients REST resource.
// Purpose: Provide configuration, HTTP plumbing, and ordered CRUD scenarios.
// Dependencies: reqwest, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! This crate drives an ordered batch of request/assert scenarios against the
//! Clients resource of a remote business-management API. A single session is
//! bootstrapped before the batch runs; scenarios share state only through an
//! explicit [`scenario::ScenarioContext`].
//!
//! Security posture: API responses are untrusted; bodies are size-limited and
//! bearer tokens are never logged in full.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod artifacts;
pub mod config;
pub mod logging;
pub mod records;
pub mod runner;
pub mod scenario;
pub mod session;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use api::ApiError;
pub use api::ApiResponse;
pub use api::ClientsApi;
pub use config::SuiteConfig;
pub use runner::RunError;
pub use runner::RunReport;
pub use runner::ScenarioRunner;
pub use scenario::ScenarioContext;
pub use scenario::ScenarioName;
pub use scenario::ScenarioPlan;
pub use session::BearerToken;
pub use session::Session;
