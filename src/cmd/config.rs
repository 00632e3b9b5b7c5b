//! Configuration view and validation commands: `kong config`.

use anyhow::Result;
use std::path::PathBuf;

use kong::config::{CONFIG_FILE_NAME, KongConfig, KongToml};

use super::super::ConfigCommands;

pub fn cmd_config(config: &KongConfig, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Kong Configuration");
            println!("==================");
            println!();

            match &config.path {
                Some(path) => println!("Config file: {}", path.display()),
                None => println!("No kong.toml found. Using default configuration."),
            }
            println!();

            let section = &config.toml.runtime_schema;
            println!("[runtime_schema]");
            println!("  backend = \"{}\"", section.backend);
            println!("  view = \"{}\"", section.view);
            if let Some(path) = &section.sqlite_path {
                println!("  sqlite_path = \"{}\"", path.display());
            }
            if let Some(url) = &section.rest_url {
                println!("  rest_url = \"{}\"", url);
            }
            if section.api_key.is_some() {
                println!("  api_key = \"***\"");
            }
            println!("  timeout_secs = {}", section.timeout_secs);
            println!();

            println!("[activity]");
            println!("  enabled = {}", config.toml.activity.enabled);
            println!();

            println!("[logging]");
            println!("  level = \"{}\"", config.toml.logging.level);
            println!("  format = \"{}\"", config.toml.logging.format);
            println!();

            println!("Effective values (with env/CLI overrides):");
            println!("  backend = \"{}\"", config.backend());
            println!("  sqlite_path = \"{}\"", config.sqlite_path().display());
            match config.toml.rest_url() {
                Some(url) => println!("  rest_url = \"{}\"", url),
                None => println!("  rest_url = (unset)"),
            }
            println!(
                "  api_key = {}",
                if config.toml.api_key().is_some() { "(set)" } else { "(unset)" }
            );
            println!("  log_level = \"{}\"", config.toml.log_level());
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if config.path.is_none() {
                println!("No kong.toml found. Using defaults (valid).");
                return Ok(());
            }

            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init { force }) => {
            let config_path = PathBuf::from(CONFIG_FILE_NAME);
            if config_path.exists() && !force {
                println!("kong.toml already exists at {}", config_path.display());
                println!("Use --force to overwrite it.");
                return Ok(());
            }

            KongToml::default().save(&config_path)?;

            println!("Created kong.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [runtime_schema] backend, rest_url, sqlite_path, timeout_secs");
            println!("  - [activity] enabled");
            println!("  - [logging] level, format");
            println!();
        }
    }

    Ok(())
}
