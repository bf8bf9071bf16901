//! CLI configuration: thin wrapper around `postline_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--endpoint, --api-token, --timeout, ...).

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;
use tracing::warn;

use postline_core::{ControllerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use postline_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Location of the persisted search query.
pub fn state_path(global: &GlobalOpts) -> PathBuf {
    postline_config::state_path(global.state_file.as_deref())
}

/// Fill `--output` and `--color` from `[defaults]` when neither the flag
/// nor its environment variable was given.
pub fn apply_display_defaults(global: &mut GlobalOpts, defaults: &Defaults) {
    if global.output.is_none() {
        global.output = parse_default("output", &defaults.output);
    }
    if global.color.is_none() {
        global.color = parse_default("color", &defaults.color);
    }
}

fn parse_default<T: ValueEnum>(field: &str, raw: &str) -> Option<T> {
    T::from_str(raw, true)
        .inspect_err(|_| warn!(field, value = raw, "ignoring unrecognised config default"))
        .ok()
}

/// Build a `ControllerConfig` from the config file, profile, and CLI flags.
///
/// Flags take priority over profile values. With no matching profile,
/// `--endpoint` alone is enough.
pub fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut config = if let Some(profile) = cfg.profiles.get(&profile_name) {
        postline_config::profile_to_controller_config(profile, &profile_name, &cfg.defaults)?
    } else if global.endpoint.is_some() {
        ControllerConfig {
            timeout: Duration::from_secs(cfg.defaults.timeout),
            debounce: Duration::from_millis(cfg.defaults.debounce_ms),
            tls: if cfg.defaults.insecure {
                TlsVerification::DangerAcceptInvalid
            } else {
                TlsVerification::SystemDefaults
            },
            ..ControllerConfig::default()
        }
    } else if global.profile.is_some() {
        let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    } else {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    };

    apply_overrides(&mut config, global)?;
    Ok(config)
}

fn apply_overrides(config: &mut ControllerConfig, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(ref raw) = global.endpoint {
        config.endpoint = raw.parse().map_err(|_| CliError::Validation {
            field: "endpoint".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
    }
    if let Some(ref token) = global.api_token {
        config.api_token = Some(SecretString::from(token.clone()));
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(debounce) = global.debounce {
        config.debounce = debounce;
    }
    Ok(())
}
