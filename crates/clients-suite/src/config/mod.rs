// crates/clients-suite/src/config/mod.rs
// ============================================================================
// Module: Suite Configuration
// Description: Centralized configuration for the Clients API suite.
// Purpose: Provide typed access to endpoint, credentials, and run settings.
// Dependencies: dotenvy, serde, toml, url
// ============================================================================

//! ## Overview
//! Suite configuration is read from environment variables, an optional
//! `.env` file, and an optional TOML file, then mapped into a small typed
//! structure. Process environment beats `.env`, which beats TOML.
//! Security posture: environment and file inputs are untrusted; secrets are
//! redacted from debug output.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod dotenv;
mod env;
mod suite;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use dotenv::DEFAULT_DOTENV_FILE;
pub use dotenv::DotenvValues;
pub use env::SuiteEnv;
pub use env::read_env_strict;
pub use suite::ConfigError;
pub use suite::Credentials;
pub use suite::DEFAULT_CONFIG_FILE;
pub use suite::DEFAULT_MIN_LIST_LEN;
pub use suite::DEFAULT_TIMEOUT;
pub use suite::MAX_CONFIG_FILE_BYTES;
pub use suite::SuiteConfig;
