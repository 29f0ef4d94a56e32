//! Configuration management for cloudfiles

use crate::auth::DEFAULT_AUTH_URL;
use crate::error::{Error, Result};
use crate::request::{DEFAULT_CDN_TTL, MAX_CDN_TTL, MIN_CDN_TTL};
use crate::transport::DEFAULT_CHUNK_SIZE;
use crate::validation::validate_container_name;
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration directory name
const CONFIG_DIR: &str = "cloudfiles";

/// Configuration file name
const CONFIG_FILE: &str = "config.toml";

/// User agent sent when the config does not name one
pub const DEFAULT_USER_AGENT: &str = concat!("cloudfiles-rs/", env!("CARGO_PKG_VERSION"));

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub account: AccountConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub advanced: Option<AdvancedConfig>,
    pub logging: Option<LoggingConfig>,
    pub output: Option<OutputConfig>,
}

/// Account credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub username: String,
    pub api_key: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Reach storage over the internal ServiceNet
    #[serde(default)]
    pub service_net: bool,
}

/// Storage defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_container: Option<String>,
    #[serde(default = "default_cdn_ttl")]
    pub cdn_ttl: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            default_container: None,
            cdn_ttl: default_cdn_ttl(),
        }
    }
}

/// Advanced configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Upload read size in bytes (default: 64 KiB)
    #[serde(default = "default_upload_chunk_size")]
    pub upload_chunk_size: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            upload_chunk_size: default_upload_chunk_size(),
            user_agent: default_user_agent(),
        }
    }
}

impl AdvancedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty`, `compact` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_format")]
    pub default_format: String,
    /// `auto`, `always` or `never`
    #[serde(default = "default_color")]
    pub color: String,
}

impl OutputConfig {
    /// Whether terminal output should carry ANSI styling; `auto` follows `is_terminal`
    pub fn color_enabled(&self, is_terminal: bool) -> bool {
        match self.color.as_str() {
            "always" => true,
            "never" => false,
            _ => is_terminal,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: default_output_format(),
            color: default_color(),
        }
    }
}

impl ConfigFile {
    /// Minimal configuration for a user name and API key
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            account: AccountConfig {
                username: username.into(),
                api_key: api_key.into(),
                auth_url: default_auth_url(),
                service_net: false,
            },
            storage: StorageConfig::default(),
            advanced: None,
            logging: None,
            output: None,
        }
    }

    /// Advanced settings with defaults filled in
    pub fn advanced(&self) -> AdvancedConfig {
        self.advanced.clone().unwrap_or_default()
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    pub fn output(&self) -> OutputConfig {
        self.output.clone().unwrap_or_default()
    }
}

// Default values
fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

fn default_cdn_ttl() -> u64 {
    DEFAULT_CDN_TTL // 72 hours
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_upload_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_output_format() -> String {
    "table".to_string()
}

fn default_color() -> String {
    "auto".to_string()
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let home = home_dir().ok_or_else(|| Error::Config("Cannot determine home directory".to_string()))?;
    let config_dir = home.join(".config").join(CONFIG_DIR);

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
    }

    Ok(config_dir)
}

/// Get the configuration file path
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

/// Load configuration from the default location
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&get_config_path()?)
}

/// Load configuration from a specific file
pub fn load_config_from(config_path: &Path) -> Result<ConfigFile> {
    if !config_path.exists() {
        return Err(Error::ConfigNotFound(config_path.to_path_buf()));
    }

    let content = fs::read_to_string(config_path)
        .map_err(|e| Error::InvalidConfig(format!("Failed to read config file: {}", e)))?;

    let config: ConfigFile = toml::from_str(&content)
        .map_err(|e| Error::InvalidConfig(format!("Failed to parse config file: {}", e)))?;

    Ok(config)
}

/// Save configuration to the default location
pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(config, &get_config_path()?)
}

/// Save configuration to a specific file
pub fn save_config_to(config: &ConfigFile, config_path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::InvalidConfig(format!("Failed to serialize config: {}", e)))?;

    fs::write(config_path, content)
        .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

    // The API key lives in this file: owner read/write only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(config_path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(config_path, perms)?;
    }

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &ConfigFile) -> Result<()> {
    if config.account.username.trim().is_empty() {
        return Err(Error::InvalidConfig("Username cannot be empty".to_string()));
    }

    if config.account.api_key.trim().is_empty() {
        return Err(Error::InvalidConfig("API key cannot be empty".to_string()));
    }

    let auth_url = url::Url::parse(&config.account.auth_url)
        .map_err(|e| Error::InvalidConfig(format!("Invalid auth URL: {}", e)))?;
    if !matches!(auth_url.scheme(), "http" | "https") {
        return Err(Error::InvalidConfig(format!(
            "Auth URL must use http or https, got {}",
            auth_url.scheme()
        )));
    }

    if let Some(container) = &config.storage.default_container {
        if !validate_container_name(container) {
            return Err(Error::InvalidConfig(format!(
                "Invalid default container name: {}",
                container
            )));
        }
    }

    if !(MIN_CDN_TTL..=MAX_CDN_TTL).contains(&config.storage.cdn_ttl) {
        return Err(Error::InvalidConfig(format!(
            "CDN TTL must be between {} and {} seconds",
            MIN_CDN_TTL, MAX_CDN_TTL
        )));
    }

    if let Some(advanced) = &config.advanced {
        if advanced.upload_chunk_size == 0 {
            return Err(Error::InvalidConfig(
                "Upload chunk size must be greater than zero".to_string(),
            ));
        }
    }

    if let Some(output) = &config.output {
        if !matches!(output.color.as_str(), "auto" | "always" | "never") {
            return Err(Error::InvalidConfig(format!(
                "Color must be auto, always or never, got {}",
                output.color
            )));
        }
    }

    Ok(())
}

/// Check if configuration exists
pub fn config_exists() -> bool {
    get_config_path().map(|p| p.exists()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_valid_config() -> ConfigFile {
        let mut config = ConfigFile::new("testuser", "0123456789abcdef");
        config.storage.default_container = Some("backups".to_string());
        config
    }

    #[test]
    fn test_validate_config_valid() {
        let config = make_valid_config();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_no_credentials() {
        let mut config = make_valid_config();
        config.account.api_key = "".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = make_valid_config();
        config.account.username = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_bad_auth_url() {
        let mut config = make_valid_config();
        config.account.auth_url = "not a url".to_string();
        assert!(validate_config(&config).is_err());

        config.account.auth_url = "ftp://auth.example.com/v1.0".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_bad_default_container() {
        let mut config = make_valid_config();
        config.storage.default_container = Some("has/slash".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_ttl_boundary() {
        let mut config = make_valid_config();
        config.storage.cdn_ttl = 899;
        assert!(validate_config(&config).is_err());

        config.storage.cdn_ttl = 900;
        assert!(validate_config(&config).is_ok());

        config.storage.cdn_ttl = 31_536_000;
        assert!(validate_config(&config).is_ok());

        config.storage.cdn_ttl = 31_536_001;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_zero_chunk_size() {
        let mut config = make_valid_config();
        config.advanced = Some(AdvancedConfig {
            upload_chunk_size: 0,
            ..AdvancedConfig::default()
        });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_color_setting() {
        let mut output = OutputConfig::default();
        assert!(output.color_enabled(true));
        assert!(!output.color_enabled(false));

        output.color = "never".to_string();
        assert!(!output.color_enabled(true));
        output.color = "always".to_string();
        assert!(output.color_enabled(false));

        let mut config = make_valid_config();
        config.output = Some(output.clone());
        assert!(validate_config(&config).is_ok());
        output.color = "sometimes".to_string();
        config.output = Some(output);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_minimal_toml_gets_defaults() {
        let config: ConfigFile = toml::from_str(
            r#"
            [account]
            username = "testuser"
            api_key = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.account.auth_url, DEFAULT_AUTH_URL);
        assert!(!config.account.service_net);
        assert_eq!(config.storage.cdn_ttl, 259_200);
        assert_eq!(config.advanced().timeout, 30);
        assert_eq!(config.advanced().upload_chunk_size, 64 * 1024);
        assert_eq!(config.logging().format, "pretty");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = make_valid_config();

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.account.username, "testuser");
        assert_eq!(loaded.storage.default_container.as_deref(), Some("backups"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }
}
