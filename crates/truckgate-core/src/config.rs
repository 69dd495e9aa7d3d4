// ── Runtime configuration ──
//
// These types describe *where* the gate backend lives and *how* the
// coordinator paces itself. They never touch disk: the CLI (via
// truckgate-config) builds them and hands them in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs on the gate PC).
    DangerAcceptInvalid,
}

/// Where and how to reach the gate backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend root URL (e.g., `http://localhost:5001`).
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout for every call except detection polling,
    /// which uses [`CoordinatorConfig::fetch_timeout`].
    pub timeout: Duration,
    /// Optional key for an authenticating reverse proxy.
    pub api_key: Option<SecretString>,
}

/// Pacing of a detection session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Delay between "fetch latest result" requests.
    pub poll_interval: Duration,
    /// Upper bound on a single fetch; a slower response counts as a failed tick.
    pub fetch_timeout: Duration,
    /// Wait between camera start and detection start, letting the sensor settle.
    pub grace_delay: Duration,
    /// How long Success/Denied is held before reverting to Ready.
    pub reset_dwell: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            fetch_timeout: Duration::from_millis(3000),
            grace_delay: Duration::from_millis(1000),
            reset_dwell: Duration::from_millis(5000),
        }
    }
}

impl CoordinatorConfig {
    /// Reject values the scheduler cannot honour.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.poll_interval.is_zero() {
            return Err(CoreError::Config {
                message: "poll interval must be greater than zero".into(),
            });
        }
        if self.fetch_timeout.is_zero() {
            return Err(CoreError::Config {
                message: "fetch timeout must be greater than zero".into(),
            });
        }
        if self.reset_dwell.is_zero() {
            return Err(CoreError::Config {
                message: "reset dwell must be greater than zero".into(),
            });
        }
        Ok(())
    }
}
