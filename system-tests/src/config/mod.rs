// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Environment settings for system-test artifacts.
// Purpose: Provide typed access to run root and overwrite settings.
// Dependencies: clients-suite
// ============================================================================

//! ## Overview
//! System-test configuration is read from environment variables and mapped into
//! a small typed structure for reuse across test helpers.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
