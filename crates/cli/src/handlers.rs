//! Command handlers for the cloudfiles CLI

use crate::wizard::run_init_wizard;
use crate::{AccountAction, CdnAction, ConfigAction, ContainerAction, DoctorAction, ObjectAction};
use anyhow::{Context, Result};
use clap::Command;
use clap_complete::{generate, Shell as ClapShell};
use cloudfiles_core::validation::{validate_container_name, validate_object_name};
use cloudfiles_core::{
    get_config_path, load_config, validate_config, ConfigFile, Connection, ContainerCreation,
    ListParameters, ProgressCallback, RequestHeader,
};
use cloudfiles_core::request::PutStorageItem;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::HashMap;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tabled::{Table, Tabled};

/// Handle init command
pub async fn handle_init() -> Result<()> {
    run_init_wizard().await
}

/// Handle config commands
pub async fn handle_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!();

            let config = load_config()?;
            let advanced = config.advanced();

            println!("Account:");
            println!("  Username: {}", config.account.username);
            println!("  API key: {}", mask_secret(&config.account.api_key));
            println!("  Auth URL: {}", config.account.auth_url);
            println!("  ServiceNet: {}", if config.account.service_net { "yes" } else { "no" });
            println!();
            println!("Storage:");
            println!(
                "  Default container: {}",
                config.storage.default_container.as_deref().unwrap_or("(none)")
            );
            println!("  CDN TTL: {}s", config.storage.cdn_ttl);
            println!();
            println!("Advanced:");
            println!("  Timeout: {}s (connect {}s)", advanced.timeout, advanced.connect_timeout);
            println!("  Upload chunk size: {}", format_bytes(advanced.upload_chunk_size as u64));
            println!("  User agent: {}", advanced.user_agent);

            Ok(())
        }
        ConfigAction::Validate => {
            println!("Validating configuration...");

            let config = load_config()?;
            validate_config(&config)?;
            println!("  ✅ Valid configuration");
            println!("  Run 'cloudfiles doctor test-connection' to check the credentials");

            Ok(())
        }
        ConfigAction::Edit => {
            let config_path = get_config_path()?;
            println!("Opening editor...");
            println!("  File: {}", config_path.display());
            println!();

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
            let status = std::process::Command::new(editor)
                .arg(&config_path)
                .status()?;

            if status.success() {
                println!("  ✅ Configuration edited");

                // Validate after edit
                let config = load_config()?;
                validate_config(&config)?;
                println!("  ✅ Configuration valid");
            } else {
                println!("  ⚠️  Editor exited with error");
            }

            Ok(())
        }
    }
}

/// Handle account commands
pub async fn handle_account(action: AccountAction, output: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let connection = connect(&config).await?;

    match action {
        AccountAction::Info => {
            let info = connection.get_account_information().await?;

            if is_json(&config, output) {
                return print_json(&info);
            }
            println!("Account {}", config.account.username);
            println!("  Containers: {}", info.container_count);
            println!("  Bytes used: {}", format_bytes(info.bytes_used));
            println!(
                "  CDN: {}",
                if connection.endpoint().cdn_management_url().is_some() {
                    "available"
                } else {
                    "not available"
                }
            );

            Ok(())
        }
    }
}

/// Handle containers commands
pub async fn handle_containers(action: ContainerAction, output: Option<&str>) -> Result<()> {
    let config = load_config()?;

    match action {
        ContainerAction::List {
            detailed,
            prefix,
            limit,
            marker,
        } => {
            let connection = connect(&config).await?;
            let parameters = list_parameters(prefix, limit, marker);

            if detailed {
                let containers = connection.get_containers_detailed(parameters).await?;
                if is_json(&config, output) {
                    return print_json(&containers);
                }
                if containers.is_empty() {
                    println!("  No containers found");
                } else {
                    #[derive(Tabled)]
                    struct ContainerRow {
                        name: String,
                        objects: u64,
                        size: String,
                    }

                    let rows: Vec<ContainerRow> = containers
                        .iter()
                        .map(|c| ContainerRow {
                            name: c.name.clone(),
                            objects: c.count,
                            size: format_bytes(c.bytes),
                        })
                        .collect();

                    println!("{}", Table::new(rows));
                }
            } else {
                let containers = connection.get_containers(parameters).await?;
                if is_json(&config, output) {
                    return print_json(&containers);
                }
                if containers.is_empty() {
                    println!("  No containers found");
                }
                for name in &containers {
                    println!("{}", name);
                }
            }

            if let Some(default) = &config.storage.default_container {
                println!();
                println!("Default container: {}", default);
            }

            Ok(())
        }
        ContainerAction::Create { name } => {
            ensure_container_name(&name)?;
            let connection = connect(&config).await?;

            println!("Creating container '{}'...", name);
            match connection.create_container(&name).await? {
                ContainerCreation::Created => println!("  ✅ Container created: {}", name),
                ContainerCreation::AlreadyExisted => {
                    println!("  ℹ️  Container already exists: {}", name)
                }
            }

            Ok(())
        }
        ContainerAction::Delete { name } => {
            ensure_container_name(&name)?;

            // Prevent accidental deletion of the default container
            if config.storage.default_container.as_deref() == Some(name.as_str()) {
                return Err(anyhow::anyhow!(
                    "Cannot delete default container '{}'.\n\
                     Change the default container in your configuration first.",
                    name
                ));
            }

            let connection = connect(&config).await?;

            println!("⚠️  Warning: you are about to delete container '{}'", name);
            connection
                .delete_container(&name)
                .await
                .map_err(|e| match e {
                    cloudfiles_core::Error::Conflict(_) => {
                        anyhow::anyhow!("Container '{}' is not empty; delete its objects first", name)
                    }
                    other => other.into(),
                })?;
            println!("  ✅ Container deleted: {}", name);

            Ok(())
        }
        ContainerAction::Info { name } => {
            ensure_container_name(&name)?;
            let connection = connect(&config).await?;

            let info = connection.get_container_information(&name).await?;
            if is_json(&config, output) {
                return print_json(&info);
            }
            println!("Container '{}'", info.name);
            println!("  Objects: {}", info.object_count);
            println!("  Bytes used: {}", format_bytes(info.bytes_used));

            Ok(())
        }
    }
}

/// Handle objects commands
pub async fn handle_objects(action: ObjectAction, output: Option<&str>) -> Result<()> {
    let config = load_config()?;

    match action {
        ObjectAction::Ls {
            prefix,
            container,
            detailed,
            limit,
            marker,
        } => {
            let container = resolve_container(&config, container)?;
            let connection = connect(&config).await?;
            let parameters = list_parameters(prefix, limit, marker);

            if detailed {
                let objects = connection
                    .get_container_item_list_detailed(&container, parameters)
                    .await?;
                if is_json(&config, output) {
                    return print_json(&objects);
                }
                if objects.is_empty() {
                    println!("  No objects found");
                } else {
                    #[derive(Tabled)]
                    struct ObjectRow {
                        name: String,
                        size: String,
                        content_type: String,
                        modified: String,
                    }

                    let rows: Vec<ObjectRow> = objects
                        .iter()
                        .map(|o| ObjectRow {
                            name: o.name.clone(),
                            size: format_bytes(o.bytes),
                            content_type: o.content_type.clone(),
                            modified: format_date(&o.last_modified),
                        })
                        .collect();

                    println!("{}", Table::new(rows));
                }
            } else {
                let objects = connection.get_container_item_list(&container, parameters).await?;
                if is_json(&config, output) {
                    return print_json(&objects);
                }
                if objects.is_empty() {
                    println!("  No objects found");
                }
                for name in &objects {
                    println!("{}", name);
                }
            }

            Ok(())
        }
        ObjectAction::Upload {
            file,
            object,
            container,
            meta,
            content_type,
            quiet,
        } => {
            let path = Path::new(&file);
            if !path.is_file() {
                return Err(anyhow::anyhow!("File not found: {}", file));
            }
            let object = match object {
                Some(object) => object,
                None => path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .ok_or_else(|| anyhow::anyhow!("Cannot derive an object name from {}", file))?,
            };
            let container = resolve_container(&config, container)?;
            ensure_object_name(&object)?;
            let metadata = parse_metadata(&meta)?;
            let file_size = path.metadata()?.len();

            let connection = connect(&config).await?;

            println!("Uploading {} -> {}/{}...", file, container, object);
            println!("  Size: {}", format_bytes(file_size));

            let pb = if quiet {
                ProgressBar::hidden()
            } else {
                let pb = ProgressBar::new(file_size);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template(bar_template(color_enabled(&config)))?
                        .progress_chars("#>-"),
                );
                pb
            };
            let sink = pb.clone();
            let progress: ProgressCallback = Arc::new(move |sent, _total| sink.set_position(sent));

            let endpoint = connection.endpoint();
            let mut request = PutStorageItem::from_file(
                endpoint.storage_url(),
                &container,
                &object,
                path,
                non_empty(&metadata),
            )?
            .with_progress(progress);
            if let Some(content_type) = content_type {
                request = request.with_content_type(content_type);
            }
            println!("  Content type: {}", request.content_type());

            let info = connection.execute(request).await;
            pb.finish_and_clear();
            let info = info?;

            println!("  ✅ Upload complete");
            if let Some(etag) = info.etag {
                println!("  ETag: {}", etag);
            }

            Ok(())
        }
        ObjectAction::Download {
            object,
            dest,
            container,
            range,
        } => {
            let container = resolve_container(&config, container)?;
            ensure_object_name(&object)?;
            let dest = dest.unwrap_or_else(|| object.trim_start_matches('/').to_string());

            let mut headers = HashMap::new();
            if let Some(range) = range {
                headers.insert(RequestHeader::Range, range);
            }

            let connection = connect(&config).await?;

            println!("Downloading {}/{} -> {}...", container, object, dest);
            let pb = spinner("Downloading...", color_enabled(&config))?;
            let written = connection
                .download_storage_item(&container, &object, Path::new(&dest), Some(&headers))
                .await;
            pb.finish_and_clear();

            println!("  ✅ Download complete ({})", format_bytes(written?));

            Ok(())
        }
        ObjectAction::Delete { object, container } => {
            let container = resolve_container(&config, container)?;
            ensure_object_name(&object)?;
            let connection = connect(&config).await?;

            println!("Deleting {}/{}...", container, object);
            connection.delete_storage_item(&container, &object).await?;
            println!("  ✅ Object deleted");

            Ok(())
        }
        ObjectAction::Info { object, container } => {
            let container = resolve_container(&config, container)?;
            ensure_object_name(&object)?;
            let connection = connect(&config).await?;

            let info = connection
                .get_storage_item_information(&container, &object)
                .await?;
            if is_json(&config, output) {
                return print_json(&info);
            }

            println!("Object '{}/{}'", container, object);
            println!("  Content type: {}", info.content_type.as_deref().unwrap_or("-"));
            println!(
                "  Size: {}",
                info.content_length.map(format_bytes).unwrap_or_else(|| "-".to_string())
            );
            println!("  ETag: {}", info.etag.as_deref().unwrap_or("-"));
            println!(
                "  Last modified: {}",
                info.last_modified.as_deref().map(format_date).unwrap_or_else(|| "-".to_string())
            );
            if !info.metadata.is_empty() {
                #[derive(Tabled)]
                struct MetaRow {
                    key: String,
                    value: String,
                }

                let mut rows: Vec<MetaRow> = info
                    .metadata
                    .iter()
                    .map(|(key, value)| MetaRow {
                        key: key.clone(),
                        value: value.clone(),
                    })
                    .collect();
                rows.sort_by(|a, b| a.key.cmp(&b.key));

                println!();
                println!("{}", Table::new(rows));
            }

            Ok(())
        }
        ObjectAction::SetMeta {
            object,
            meta,
            container,
        } => {
            let container = resolve_container(&config, container)?;
            ensure_object_name(&object)?;
            let metadata = parse_metadata(&meta)?;
            let connection = connect(&config).await?;

            println!("Updating metadata on {}/{}...", container, object);
            connection
                .set_storage_item_meta_information(&container, &object, &metadata)
                .await?;
            println!("  ✅ {} metadata key(s) set", metadata.len());

            Ok(())
        }
        ObjectAction::Copy {
            source,
            destination,
            container,
            to_container,
        } => {
            let container = resolve_container(&config, container)?;
            let to_container = to_container.unwrap_or_else(|| container.clone());
            ensure_container_name(&to_container)?;
            ensure_object_name(&source)?;
            ensure_object_name(&destination)?;
            let connection = connect(&config).await?;

            println!(
                "Copying {}/{} -> {}/{}...",
                container, source, to_container, destination
            );
            connection
                .copy_storage_item(&container, &source, &to_container, &destination, None)
                .await?;
            println!("  ✅ Copy complete");

            Ok(())
        }
    }
}

/// Handle cdn commands
pub async fn handle_cdn(action: CdnAction, output: Option<&str>) -> Result<()> {
    let config = load_config()?;

    match action {
        CdnAction::List { enabled_only } => {
            let connection = connect(&config).await?;
            let containers = connection.get_public_containers(enabled_only).await?;

            if is_json(&config, output) {
                return print_json(&containers);
            }
            if containers.is_empty() {
                println!("  No CDN containers found");
            }
            for name in &containers {
                println!("{}", name);
            }

            Ok(())
        }
        CdnAction::Enable { name, ttl } => {
            ensure_container_name(&name)?;
            let connection = connect(&config).await?;
            let ttl = ttl.unwrap_or(config.storage.cdn_ttl);

            println!("Publishing container '{}' (TTL {}s)...", name, ttl);
            let uri = connection.mark_container_as_public(&name, Some(ttl)).await?;
            println!("  ✅ Container published");
            if let Some(uri) = uri {
                println!("  Public URI: {}", uri);
            }

            Ok(())
        }
        CdnAction::Disable { name } => {
            ensure_container_name(&name)?;
            let connection = connect(&config).await?;

            println!("Unpublishing container '{}'...", name);
            connection.mark_container_as_private(&name).await?;
            println!("  ✅ Container is no longer published");

            Ok(())
        }
        CdnAction::Info { name } => {
            ensure_container_name(&name)?;
            let connection = connect(&config).await?;

            let info = connection.get_public_container_information(&name).await?;
            if is_json(&config, output) {
                return print_json(&info);
            }

            println!("CDN container '{}'", name);
            println!("  Enabled: {}", if info.cdn_enabled { "✅ yes" } else { "❌ no" });
            println!("  URI: {}", info.cdn_uri.as_deref().unwrap_or("-"));
            println!(
                "  TTL: {}",
                info.ttl.map(|ttl| format!("{}s", ttl)).unwrap_or_else(|| "-".to_string())
            );
            println!(
                "  Log retention: {}",
                match info.log_retention {
                    Some(true) => "on",
                    Some(false) => "off",
                    None => "-",
                }
            );

            Ok(())
        }
        CdnAction::Set {
            name,
            ttl,
            log_retention,
            enabled,
        } => {
            ensure_container_name(&name)?;
            let connection = connect(&config).await?;

            println!("Updating CDN settings for '{}'...", name);
            connection
                .set_public_container_details(&name, enabled, ttl, log_retention)
                .await?;
            println!("  ✅ CDN settings updated");

            Ok(())
        }
    }
}

/// Handle doctor commands
pub async fn handle_doctor(action: DoctorAction) -> Result<()> {
    match action {
        DoctorAction::Check => {
            println!("Checking cloudfiles installation...");

            println!("  ✅ cloudfiles is installed");
            println!("  Version: {}", env!("CARGO_PKG_VERSION"));

            let config_path = get_config_path()?;
            if config_path.exists() {
                println!("  ✅ Configuration found");

                let config = load_config()?;
                validate_config(&config)?;
                println!("  ✅ Configuration valid");
            } else {
                println!("  ⚠️  Configuration not found (run 'cloudfiles init')");
            }

            Ok(())
        }
        DoctorAction::TestConnection => {
            println!("Testing Cloud Files connection...");

            let config = load_config()?;
            validate_config(&config)?;

            println!("  Authenticating against {}", config.account.auth_url);
            let connection = connect(&config).await?;
            println!("  ✅ Authentication OK");
            println!("  Storage URL: {}", connection.endpoint().storage_url());

            let info = connection.get_account_information().await?;
            println!(
                "  ✅ Storage reachable ({} containers, {})",
                info.container_count,
                format_bytes(info.bytes_used)
            );

            match connection.endpoint().cdn_management_url() {
                Some(url) => println!("  ✅ CDN management URL: {}", url),
                None => println!("  ⚠️  No CDN management URL for this account"),
            }

            println!();
            println!("  ✅ All connections are working!");

            Ok(())
        }
    }
}

/// Handle shell completion generation
pub async fn handle_completion(shell: &str, cmd: &mut Command) -> Result<()> {
    use std::io;

    let clap_shell = match shell {
        "bash" => ClapShell::Bash,
        "zsh" => ClapShell::Zsh,
        "fish" => ClapShell::Fish,
        "elvish" => ClapShell::Elvish,
        "powershell" | "pwsh" => ClapShell::PowerShell,
        _ => {
            return Err(anyhow::anyhow!(
                "Unsupported shell: {}\nSupported shells: bash, zsh, fish, elvish, powershell",
                shell
            ));
        }
    };

    // Only the script goes to stdout so it can be sourced directly
    generate(clap_shell, cmd, "cloudfiles", &mut io::stdout());

    eprintln!();
    eprintln!("Installation instructions:");

    match shell {
        "bash" => {
            eprintln!("  # Add to your ~/.bashrc:");
            eprintln!("  source <(cloudfiles completion bash)");
        }
        "zsh" => {
            eprintln!("  # Add to your ~/.zshrc:");
            eprintln!("  source <(cloudfiles completion zsh)");
        }
        "fish" => {
            eprintln!("  cloudfiles completion fish > ~/.config/fish/completions/cloudfiles.fish");
        }
        "elvish" => {
            eprintln!("  cloudfiles completion elvish > ~/.elvish/lib/cloudfiles.elv");
        }
        "powershell" | "pwsh" => {
            eprintln!("  cloudfiles completion powershell | Out-String | Invoke-Expression");
        }
        _ => {}
    }

    Ok(())
}

/// Authenticate with a spinner while the exchange runs
async fn connect(config: &ConfigFile) -> Result<Connection> {
    tracing::debug!(auth_url = %config.account.auth_url, service_net = config.account.service_net, "connecting");
    let pb = spinner("Authenticating...", color_enabled(config))?;
    let connection = Connection::from_config(config).await;
    pb.finish_and_clear();
    connection.context("Failed to authenticate (check your credentials with 'cloudfiles config show')")
}

fn spinner(message: &'static str, color: bool) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template(spinner_template(color))?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// `output.color` applied to stderr, where progress and logs go
pub(crate) fn color_enabled(config: &ConfigFile) -> bool {
    config.output().color_enabled(std::io::stderr().is_terminal())
}

fn spinner_template(color: bool) -> &'static str {
    if color {
        "{spinner:.green} {msg}"
    } else {
        "{spinner} {msg}"
    }
}

fn bar_template(color: bool) -> &'static str {
    if color {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})"
    } else {
        "{spinner} [{elapsed_precise}] [{bar:40}] {bytes}/{total_bytes} ({eta})"
    }
}

/// Container from the flag, else the configured default
fn resolve_container(config: &ConfigFile, container: Option<String>) -> Result<String> {
    let container = container
        .or_else(|| config.storage.default_container.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("No container given and no default container configured (use --container)")
        })?;
    ensure_container_name(&container)?;
    Ok(container)
}

/// Reject bad names before authenticating
fn ensure_container_name(name: &str) -> Result<()> {
    if !validate_container_name(name) {
        return Err(anyhow::anyhow!(
            "Invalid container name '{}': 1-256 characters, no '/' or '?'",
            name
        ));
    }
    Ok(())
}

fn ensure_object_name(name: &str) -> Result<()> {
    if !validate_object_name(name) {
        return Err(anyhow::anyhow!("Invalid object name '{}': 1-128 characters", name));
    }
    Ok(())
}

fn list_parameters(prefix: Option<String>, limit: Option<u32>, marker: Option<String>) -> ListParameters {
    ListParameters {
        prefix,
        limit,
        marker,
        ..ListParameters::default()
    }
}

/// Parse repeated `key=value` arguments
fn parse_metadata(pairs: &[String]) -> Result<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Metadata must be key=value, got '{}'", pair))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(anyhow::anyhow!("Metadata key cannot be empty in '{}'", pair));
            }
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

fn non_empty(metadata: &HashMap<String, String>) -> Option<&HashMap<String, String>> {
    (!metadata.is_empty()).then_some(metadata)
}

fn is_json(config: &ConfigFile, output: Option<&str>) -> bool {
    output.unwrap_or(&config.output().default_format) == "json"
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Show only the first characters of a secret
fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}{}", visible, "*".repeat(secret.chars().count().saturating_sub(4).min(12)))
}

/// Format a listing or header date to a readable form
fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc2822(date) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    // Listings carry a naive UTC timestamp with microseconds
    match chrono::NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Format bytes to human-readable size
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}
