// system-tests/src/lib.rs
// ============================================================================
// Module: Clients Suite System Tests Library
// Description: Shared configuration for system test binaries.
// Purpose: Provide common settings for the stub and live suites.
// Dependencies: clients-suite
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the system-test binaries in
//! `system-tests/tests`. The stub suite always runs; the live suite requires
//! the `live-api` feature and a reachable API.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
