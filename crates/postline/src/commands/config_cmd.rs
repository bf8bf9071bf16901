//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Select};
use serde::Serialize;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "********";

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),
        ConfigCommand::Show => show(global),
        ConfigCommand::Path => {
            #[derive(Serialize)]
            struct Paths {
                config: String,
                state: String,
            }
            let paths = Paths {
                config: config::config_path().display().to_string(),
                state: config::state_path(global).display().to_string(),
            };
            let out = output::render_single(
                global.output_format(),
                &paths,
                |p| Ok(format!("config: {}\nstate:  {}", p.config, p.state)),
                |p| p.config.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("postline configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let endpoint: String = Input::new()
        .with_prompt("Collection URL")
        .default("https://jsonplaceholder.typicode.com/posts".into())
        .validate_with(|input: &String| -> Result<(), String> {
            url::Url::parse(input)
                .map(|_| ())
                .map_err(|e| format!("not a valid URL: {e}"))
        })
        .interact_text()
        .map_err(prompt_err)?;

    let token_choices = &[
        "No token (public endpoint)",
        "Store token in system keyring (recommended)",
        "Save token to config file (plaintext)",
    ];
    let token_selection = Select::new()
        .with_prompt("Bearer token")
        .items(token_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let api_token = if token_selection == 0 {
        None
    } else {
        let token = rpassword::prompt_password("API token: ").map_err(prompt_err)?;
        if token.is_empty() {
            return Err(CliError::Validation {
                field: "api_token".into(),
                reason: "token cannot be empty".into(),
            });
        }
        if token_selection == 1 {
            postline_config::store_api_token(&profile_name, &token)?;
            eprintln!("   Token stored in system keyring");
            None
        } else {
            Some(token)
        }
    };

    let profile = Profile {
        endpoint,
        api_token,
        ..Profile::default()
    };

    let mut cfg = config::load_config_or_default();
    if cfg.profiles.contains_key(&profile_name) {
        eprintln!("   Replacing existing profile '{profile_name}'");
    }
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());

    config::save_config(&cfg)?;

    eprintln!("\nConfiguration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Try it: postline list");

    Ok(())
}

// ── Show ────────────────────────────────────────────────────────────

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = masked(config::load_config_or_default());
    let out = output::render_single(
        global.output_format(),
        &cfg,
        |c| Ok(toml::to_string_pretty(c)?),
        |c| c.default_profile.clone().unwrap_or_default(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn masked(cfg: Config) -> Config {
    let profiles: HashMap<String, Profile> = cfg
        .profiles
        .into_iter()
        .map(|(name, mut profile)| {
            if profile.api_token.is_some() {
                profile.api_token = Some(MASK.into());
            }
            (name, profile)
        })
        .collect();
    Config { profiles, ..cfg }
}
