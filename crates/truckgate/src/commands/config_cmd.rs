//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Password, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

/// Replace plaintext secrets so `config show` never prints them.
fn redact(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some("****".into());
        }
    }
    cfg
}

fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

fn available(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn invalid(field: &str, reason: &str) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Offer to store the API key in the system keyring, or return it for
/// plaintext config.
fn prompt_key_storage(profile_name: &str, key: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the API key?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_api_key(profile_name, key)?;
        eprintln!("   ✓ API key stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(key.to_owned()))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = redact(config::load_config_or_default());
            let out = output::render_single(global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "backend" => {
                    config::parse_backend_url(&value)?;
                    profile.backend = value;
                }
                "api_key" | "api-key" => profile.api_key = Some(value),
                "api_key_env" | "api-key-env" => profile.api_key_env = Some(value),
                "insecure" => {
                    profile.insecure = Some(
                        value
                            .parse()
                            .map_err(|_| invalid("insecure", "must be 'true' or 'false'"))?,
                    );
                }
                "timeout" => {
                    profile.timeout = Some(
                        value
                            .parse()
                            .map_err(|_| invalid("timeout", "must be a number (seconds)"))?,
                    );
                }
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                "default_camera" | "default-camera" => {
                    profile.default_camera = Some(
                        value
                            .parse()
                            .map_err(|_| invalid("default_camera", "must be a camera index"))?,
                    );
                }
                other => {
                    return Err(invalid(
                        other,
                        &format!(
                            "unknown config key '{other}'. Valid keys: backend, api_key, \
                             api_key_env, insecure, timeout, ca_cert, default_camera"
                        ),
                    ));
                }
            }

            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: truckgate config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::SetDefault { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: available(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetKey { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    available: available(&cfg),
                    name: profile_name,
                });
            }

            let key = Password::new()
                .with_prompt("API key")
                .interact()
                .map_err(prompt_err)?;
            if key.is_empty() {
                return Err(invalid("api_key", "API key cannot be empty"));
            }
            config::store_api_key(&profile_name, &key)?;
            eprintln!("✓ API key stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

/// Interactive wizard. Adds (or replaces) one profile and makes it the default.
fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("✨ truckgate configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let backend: String = Input::new()
        .with_prompt("Backend URL")
        .default("http://localhost:5001".into())
        .validate_with(|s: &String| {
            config::parse_backend_url(s)
                .map(drop)
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    let default_camera: u32 = Input::new()
        .with_prompt("Default camera index")
        .default(0)
        .interact_text()
        .map_err(prompt_err)?;

    let behind_proxy = Confirm::new()
        .with_prompt("Does an authenticating proxy require an API key?")
        .default(false)
        .interact()
        .map_err(prompt_err)?;

    let api_key = if behind_proxy {
        let key = Password::new()
            .with_prompt("API key")
            .interact()
            .map_err(prompt_err)?;
        if key.is_empty() {
            return Err(invalid("api_key", "API key cannot be empty"));
        }
        prompt_key_storage(&profile_name, &key)?
    } else {
        None
    };

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(
        profile_name.clone(),
        Profile {
            backend,
            api_key,
            default_camera: Some(default_camera),
            ..Profile::default()
        },
    );
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: truckgate health");
    Ok(())
}
