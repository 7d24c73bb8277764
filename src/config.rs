//! Configuration handling for the OpenBlu client

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Default OpenBlu API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.intellivoid.info/openblu/v1";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "openblu.toml";

/// Environment variable overriding `api.endpoint`
pub const ENDPOINT_ENV: &str = "OPENBLU_ENDPOINT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config file already exists: {0}")]
    AlreadyExists(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub vpn: VpnConfig,
    pub paths: PathsConfig,
    pub connect: ConnectConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
        }
    }
}

/// How the OpenVPN client gets launched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VpnConfig {
    pub binary: String,
    /// Prefix the command with sudo when not running as root (Linux only)
    pub use_sudo: bool,
    /// Pass `--daemon` so OpenVPN detaches itself (Linux only)
    pub daemon: bool,
    pub extra_args: Vec<String>,
}

impl Default for VpnConfig {
    fn default() -> Self {
        Self {
            binary: "openvpn".to_string(),
            use_sudo: true,
            daemon: true,
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub key_file: PathBuf,
    /// Directory receiving downloaded `<id>.ovpn` files
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            key_file: PathBuf::from("openblu.key"),
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectConfig {
    /// Retry without the country filter when no server matches it
    pub fallback_to_any_country: bool,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            fallback_to_any_country: true,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Write the defaults to `path`, refusing to replace an existing file
    pub fn init(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Resolve the config for this run.
    ///
    /// An explicit path must exist. Otherwise `./openblu.toml`, then
    /// `~/.openblu/config.toml`, then the built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                debug!("Loading config from {}", path.display());
                Config::load(path)?
            }
            None => Self::load_default_locations()?,
        };

        config.apply_env(|key| std::env::var(key));
        Ok(config)
    }

    fn load_default_locations() -> Result<Self, ConfigError> {
        // Try current directory first
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            debug!("Loading config from {}", local_config.display());
            return Config::load(&local_config);
        }

        // Try home directory
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".openblu").join("config.toml");
            if home_config.exists() {
                debug!("Loading config from {}", home_config.display());
                return Config::load(&home_config);
            }
        }

        info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Apply environment overrides using a custom getter
    pub fn apply_env<F>(&mut self, get_var: F)
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        if let Ok(endpoint) = get_var(ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                debug!("Endpoint overridden by {}", ENDPOINT_ENV);
                self.api.endpoint = endpoint.trim().to_string();
            }
        }
    }
}
