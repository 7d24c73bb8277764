//! Platform-specific implementations

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "windows")]
pub mod windows;

use crate::config::VpnConfig;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Your platform ({0}) is either unsupported or could not be determined")]
    UnsupportedPlatform(String),
    #[error("Failed to start VPN process: {0}")]
    SpawnError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Windows,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Linux => write!(f, "Linux"),
            Platform::Windows => write!(f, "Windows"),
        }
    }
}

/// Determine whether the current OS is supported
pub fn detect() -> Result<Platform, PlatformError> {
    from_os(std::env::consts::OS)
}

fn from_os(os: &str) -> Result<Platform, PlatformError> {
    match os {
        "linux" => Ok(Platform::Linux),
        "windows" => Ok(Platform::Windows),
        other => Err(PlatformError::UnsupportedPlatform(other.to_string())),
    }
}

/// Starts the external VPN client against a configuration file
pub trait ProcessLauncher {
    /// Launch and return the exit status of the launch step
    fn launch(&self, config_path: &Path) -> Result<i32, PlatformError>;
}

/// Get the OpenVPN launcher for the current platform
pub fn get_launcher(config: &VpnConfig) -> Result<Box<dyn ProcessLauncher>, PlatformError> {
    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(linux::LinuxLauncher::new(config.clone())))
    }

    #[cfg(target_os = "windows")]
    {
        Ok(Box::new(windows::WindowsLauncher::new(config.clone())))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        let _ = config;
        Err(PlatformError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}
