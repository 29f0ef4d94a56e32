//! Interactive setup wizard for cloudfiles configuration

use anyhow::Result;
use cloudfiles_core::auth::{DEFAULT_AUTH_URL, UK_AUTH_URL};
use cloudfiles_core::validation::validate_container_name;
use cloudfiles_core::{get_config_path, save_config, validate_config, ConfigFile};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};

/// Run the interactive setup wizard
pub async fn run_init_wizard() -> Result<()> {
    println!("🚀 Welcome to cloudfiles setup!\n");

    println!("This wizard will guide you through the configuration process.");
    println!("You will need:");
    println!("  1. Your account user name");
    println!("  2. Your API key");
    println!("  3. Optionally, a default container name\n");

    // Step 1: Credentials
    let username = prompt_username()?;
    let api_key = prompt_api_key()?;

    // Step 2: Auth endpoint
    let auth_url = prompt_auth_url()?;

    // Step 3: ServiceNet
    let service_net = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Use ServiceNet (only from servers in the same data center)?")
        .default(false)
        .interact()?;

    // Step 4: Default container
    let default_container = prompt_container_name()?;

    // Summary
    println!("\n📋 Configuration summary:");
    println!("  Username: {}", username);
    println!("  Auth URL: {}", auth_url);
    println!("  ServiceNet: {}", if service_net { "yes" } else { "no" });
    println!(
        "  Default container: {}",
        default_container.as_deref().unwrap_or("(none)")
    );

    // Confirmation
    let confirm = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Save this configuration?")
        .default(false)
        .interact()?;

    if !confirm {
        println!("❌ Configuration cancelled");
        return Ok(());
    }

    let mut config = ConfigFile::new(username, api_key);
    config.account.auth_url = auth_url;
    config.account.service_net = service_net;
    config.storage.default_container = default_container;
    validate_config(&config)?;

    // Save config
    let pb = ProgressBar::new(2);
    pb.set_style(
        ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message("Saving configuration...");

    save_config(&config)?;

    pb.inc(1);
    pb.finish_with_message("✅ Configuration saved!");

    println!("\n🎉 Setup complete!");
    println!("\nConfiguration saved to: {}", get_config_path()?.display());
    println!("\nYou can now use cloudfiles:");
    println!("  $ cloudfiles doctor test-connection");
    println!("  $ cloudfiles containers list");
    println!("  $ cloudfiles objects upload file.txt");

    Ok(())
}

/// Prompt for the account user name
fn prompt_username() -> Result<String> {
    Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Username")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Username cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to get username: {}", e))
}

/// Prompt for the API key
fn prompt_api_key() -> Result<String> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API key")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("API key cannot be empty")
            } else if input.chars().any(char::is_whitespace) {
                Err("API key cannot contain whitespace")
            } else {
                Ok(())
            }
        })
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to get API key: {}", e))
}

/// Prompt for the authentication endpoint
fn prompt_auth_url() -> Result<String> {
    let endpoints = vec![
        "US (auth.api.rackspacecloud.com)",
        "UK (lon.auth.api.rackspacecloud.com)",
        "Custom URL",
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Authentication endpoint")
        .items(&endpoints)
        .default(0)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to select endpoint: {}", e))?;

    match selection {
        0 => Ok(DEFAULT_AUTH_URL.to_string()),
        1 => Ok(UK_AUTH_URL.to_string()),
        _ => Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Auth URL")
            .validate_with(|input: &String| -> Result<(), &str> {
                if input.starts_with("https://") || input.starts_with("http://") {
                    Ok(())
                } else {
                    Err("Auth URL must start with http:// or https://")
                }
            })
            .interact()
            .map_err(|e| anyhow::anyhow!("Failed to get auth URL: {}", e)),
    }
}

/// Prompt for an optional default container
fn prompt_container_name() -> Result<Option<String>> {
    let name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Default container (leave empty for none)")
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.is_empty() || validate_container_name(input) {
                Ok(())
            } else {
                Err("Container names are 1-256 characters without '/' or '?'")
            }
        })
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to get container name: {}", e))?;

    Ok((!name.is_empty()).then_some(name))
}
