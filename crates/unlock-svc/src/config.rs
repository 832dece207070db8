//! Configuration loading and validation for the unlock service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is present but invalid.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated unlock service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// How long (seconds) a viewer session, and any contact cached in it, lives.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// How often (seconds) expired sessions are swept from memory.
    #[serde(default = "default_session_sweep_interval")]
    pub session_sweep_interval_secs: u64,

    /// Longest envelope string accepted by the unlock endpoint, in bytes.
    #[serde(default = "default_max_envelope_len")]
    pub max_envelope_len: usize,

    /// Most sessions held at once, expired-but-unswept ones included.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Most key derivations allowed to run at the same time across all sessions.
    #[serde(default = "default_max_concurrent_decrypts")]
    pub max_concurrent_decrypts: usize,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8080
}
fn default_session_ttl() -> u64 {
    1800
}
fn default_session_sweep_interval() -> u64 {
    60
}
fn default_max_envelope_len() -> usize {
    8192
}
fn default_max_sessions() -> usize {
    10_000
}
fn default_max_concurrent_decrypts() -> usize {
    4
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            session_ttl_secs: default_session_ttl(),
            session_sweep_interval_secs: default_session_sweep_interval(),
            max_envelope_len: default_max_envelope_len(),
            max_sessions: default_max_sessions(),
            max_concurrent_decrypts: default_max_concurrent_decrypts(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_secs)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        if self.session_ttl_secs == 0 {
            anyhow::bail!("SESSION_TTL_SECS must be > 0");
        }
        if self.session_sweep_interval_secs == 0 {
            anyhow::bail!("SESSION_SWEEP_INTERVAL_SECS must be > 0");
        }
        if self.max_envelope_len == 0 {
            anyhow::bail!("MAX_ENVELOPE_LEN must be > 0");
        }
        if self.max_sessions == 0 {
            anyhow::bail!("MAX_SESSIONS must be > 0");
        }
        if self.max_concurrent_decrypts == 0 {
            anyhow::bail!("MAX_CONCURRENT_DECRYPTS must be > 0");
        }
        // tokio::sync::Semaphore panics above this.
        if self.max_concurrent_decrypts > tokio::sync::Semaphore::MAX_PERMITS {
            anyhow::bail!("MAX_CONCURRENT_DECRYPTS is too large");
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_listen_port(), 8080);
        assert_eq!(default_session_ttl(), 1800);
        assert_eq!(default_session_sweep_interval(), 60);
        assert_eq!(default_max_envelope_len(), 8192);
        assert_eq!(default_max_sessions(), 10_000);
        assert_eq!(default_max_concurrent_decrypts(), 4);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_ttl() {
        let cfg = Config {
            session_ttl_secs: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_sweep_interval() {
        let cfg = Config {
            session_sweep_interval_secs: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_envelope_limit() {
        let cfg = Config {
            max_envelope_len: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_session_cap() {
        let cfg = Config {
            max_sessions: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_decrypt_limit() {
        let cfg = Config {
            max_concurrent_decrypts: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn durations_follow_seconds() {
        let cfg = Config {
            session_ttl_secs: 5,
            session_sweep_interval_secs: 2,
            ..Config::default()
        };
        assert_eq!(cfg.session_ttl(), Duration::from_secs(5));
        assert_eq!(cfg.session_sweep_interval(), Duration::from_secs(2));
    }
}
