//! Configuration loading and root folder resolution
//!
//! Root folder resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`RETRONODE_ROOT`)
//! 3. TOML config file (`root_folder`)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is never fatal: loading yields compiled defaults and
//! the caller reports it once logging is up.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the data root folder
pub const ROOT_ENV_VAR: &str = "RETRONODE_ROOT";
/// Environment variable pointing at the TOML config file
pub const CONFIG_ENV_VAR: &str = "RETRONODE_CONFIG";
/// Environment variable overriding the HTTP port
pub const PORT_ENV_VAR: &str = "RETRONODE_PORT";
/// Environment variable overriding the scanner sandbox root
pub const ROMS_BASE_PATH_ENV_VAR: &str = "ROMS_BASE_PATH";

/// GitHub Models chat-completion endpoint
pub const DEFAULT_CHAT_ENDPOINT: &str = "https://models.github.ai/inference/chat/completions";
/// `tracing` level used when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Folder under the data root served as the browser UI by default
pub const STATIC_ASSETS_DIR: &str = "public";

/// Gemini generateContent endpoint
pub const DEFAULT_GENERATIVE_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Contents of `config.toml`
///
/// Every section is optional; absent keys take their compiled default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding the JSON documents (games, platforms, settings)
    pub root_folder: Option<PathBuf>,
    pub bind_address: String,
    pub port: u16,
    pub logging: LoggingConfig,
    /// Directory served as the browser UI
    pub static_assets: Option<PathBuf>,
    pub scanner: ScannerConfig,
    pub identification: IdentificationConfig,
    pub launch: LaunchConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
            logging: LoggingConfig::default(),
            static_assets: None,
            scanner: ScannerConfig::default(),
            identification: IdentificationConfig::default(),
            launch: LaunchConfig::default(),
        }
    }
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` level; `RUST_LOG` takes precedence when set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// ROM scanner section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Folder scans are confined to. Paths resolving outside it are rejected.
    pub roms_base_path: PathBuf,
    /// Prefix used when synthesizing ROM paths on import:
    /// `<rom_library_root>/<platform_id>/<filename>`
    pub rom_library_root: String,
    /// Filenames sent to the identification backend per batch
    pub batch_size: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            roms_base_path: PathBuf::from("/"),
            rom_library_root: "/roms".to_string(),
            batch_size: 20,
        }
    }
}

/// Identification backend credentials and limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentificationConfig {
    pub github_token: Option<String>,
    pub gemini_api_key: Option<String>,
    /// Chat-completion endpoint for the `chat` backend
    pub chat_endpoint: String,
    /// `generateContent` endpoint for the `generative` backend (key appended as query)
    pub generative_endpoint: String,
    /// Per-request timeout for backend calls
    pub timeout_secs: u64,
}

impl Default for IdentificationConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            gemini_api_key: None,
            chat_endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            generative_endpoint: DEFAULT_GENERATIVE_ENDPOINT.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Emulator launch section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Build and report the emulator command without executing it
    pub dry_run: bool,
}

impl TomlConfig {
    /// Apply environment variable overrides on top of file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var(PORT_ENV_VAR) {
            match port.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => warn!("Ignoring invalid {}={}", PORT_ENV_VAR, port),
            }
        }

        if let Ok(base) = std::env::var(ROMS_BASE_PATH_ENV_VAR) {
            if !base.trim().is_empty() {
                self.scanner.roms_base_path = PathBuf::from(base);
            }
        }
    }
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join("retronode"))
            .unwrap_or_else(|| PathBuf::from("./retronode_data"));

        Self { root_folder }
    }
}

/// Resolves the data root folder from CLI, environment, TOML and defaults
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, config: &TomlConfig) -> Self {
        Self {
            cli_arg,
            toml_root: config.root_folder.clone(),
        }
    }

    /// Resolve the root folder; never fails, falling back to compiled defaults
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("Root folder from command line: {}", path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
            if !path.trim().is_empty() {
                info!("Root folder from {}: {}", ROOT_ENV_VAR, path);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            info!("Root folder from config file: {}", path.display());
            return path.clone();
        }

        let default = CompiledDefaults::for_current_platform().root_folder;
        info!("Root folder from compiled default: {}", default.display());
        default
    }
}

/// Creates the root folder and locates the JSON documents inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// UI folder used when the config names none
    pub fn static_assets_path(&self) -> PathBuf {
        self.root_folder.join(STATIC_ASSETS_DIR)
    }
}

/// Default location of the TOML config file
///
/// `RETRONODE_CONFIG` wins; otherwise `<config_dir>/retronode/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir().map(|d| d.join("retronode").join("config.toml"))
}

/// Load the TOML config file
///
/// A missing file yields defaults. A file that exists but cannot be read or
/// parsed is an error. Nothing is logged here: callers usually load the
/// config before the subscriber exists.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}
