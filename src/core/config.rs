//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.postsapp/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::storage::default_storage_path;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PostsConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub flash_seconds: Option<u64>,
    pub search_debounce_ms: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BACKEND_URL: &str = "https://posts-backend.onrender.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FLASH_SECONDS: u64 = 5;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 750;

/// Environment variable that overrides the backend URL.
pub const BACKEND_URL_ENV: &str = "BACKENDURL";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub backend_url: String,
    pub request_timeout: Duration,
    pub storage_path: PathBuf,
    pub flash_duration: Duration,
    pub search_debounce: Duration,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.postsapp/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".postsapp").join("config.toml"))
}

/// Load config from `~/.postsapp/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `PostsConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<PostsConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(PostsConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(PostsConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: PostsConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# PostsApp Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [backend]
# base_url = "https://posts-backend.onrender.com"   # Or set BACKENDURL env var
# timeout_secs = 30

# [storage]
# path = "/home/me/.postsapp/storage.json"          # Where credentials are kept

# [ui]
# flash_seconds = 5                                 # How long flash messages stay up
# search_debounce_ms = 750                          # Pause before a search is sent
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_backend_url` is from the `--backend-url` flag (None = not specified).
pub fn resolve(config: &PostsConfig, cli_backend_url: Option<&str>) -> ResolvedConfig {
    // Backend URL: CLI → env → config → default
    let backend_url = cli_backend_url
        .map(|s| s.to_string())
        .or_else(|| std::env::var(BACKEND_URL_ENV).ok())
        .or_else(|| config.backend.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

    let storage_path = config
        .storage
        .path
        .clone()
        .or_else(default_storage_path)
        .unwrap_or_else(|| PathBuf::from("postsapp-storage.json"));

    ResolvedConfig {
        backend_url: backend_url.trim_end_matches('/').to_string(),
        request_timeout: Duration::from_secs(
            config.backend.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        ),
        storage_path,
        flash_duration: Duration::from_secs(
            config.ui.flash_seconds.unwrap_or(DEFAULT_FLASH_SECONDS),
        ),
        search_debounce: Duration::from_millis(
            config.ui.search_debounce_ms.unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS),
        ),
    }
}
