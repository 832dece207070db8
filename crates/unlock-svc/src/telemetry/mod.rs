//! Structured logging for the unlock service.
//!
//! # Telemetry invariants
//!
//! - **No passwords, key material, envelope plaintext or contact details** may
//!   appear in any log field.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   takes precedence when set.

pub mod init;

pub use init::init_telemetry;
