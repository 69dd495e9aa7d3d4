//! CLI configuration: thin wrapper around `truckgate_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--backend, --api-key, --insecure, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use truckgate_core::{BackendConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use truckgate_config::{
    Config, ConfigError, Profile, config_path, load_config_or_default, parse_backend_url,
    save_config, store_api_key,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `BackendConfig` from the config file, active profile and flags.
///
/// Flags win over the profile. Without a profile, `--backend` alone is
/// enough; with neither, the user is pointed at `config init`.
pub fn resolve_backend_config(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<BackendConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut backend = if let Some(profile) = cfg.profiles.get(&profile_name) {
        truckgate_config::profile_to_backend_config(profile, &profile_name, &cfg.defaults)?
    } else if let Some(ref name) = global.profile {
        // An explicitly requested profile must exist, even alongside --backend.
        return Err(ConfigError::UnknownProfile { name: name.clone() }.into());
    } else {
        let raw = global.backend.as_deref().ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
        BackendConfig {
            url: parse_backend_url(raw)?,
            timeout: Duration::from_secs(cfg.defaults.timeout),
            tls: if cfg.defaults.insecure {
                TlsVerification::DangerAcceptInvalid
            } else {
                TlsVerification::SystemDefaults
            },
            api_key: None,
        }
    };

    if let Some(ref raw) = global.backend {
        backend.url = parse_backend_url(raw)?;
    }
    if let Some(ref key) = global.api_key {
        backend.api_key = Some(SecretString::from(key.clone()));
    }
    if global.insecure {
        backend.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        backend.timeout = Duration::from_secs(secs);
    }

    Ok(backend)
}

/// Camera `monitor` falls back to when `--camera` is omitted.
pub fn default_camera(global: &GlobalOpts, cfg: &Config) -> Option<u32> {
    let name = active_profile_name(global, cfg);
    cfg.profiles.get(&name).and_then(|p| p.default_camera)
}
