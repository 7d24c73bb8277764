//! Windows OpenVPN launcher
//!
//! OpenVPN has no `--daemon` mode on Windows, so the process is started
//! detached from our console and left running.

use super::{PlatformError, ProcessLauncher};
use crate::config::VpnConfig;
use std::os::windows::process::CommandExt;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

const DETACHED_PROCESS: u32 = 0x0000_0008;
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

pub struct WindowsLauncher {
    config: VpnConfig,
}

impl WindowsLauncher {
    pub fn new(config: VpnConfig) -> Self {
        Self { config }
    }
}

impl ProcessLauncher for WindowsLauncher {
    fn launch(&self, config_path: &Path) -> Result<i32, PlatformError> {
        debug!(
            "Starting {} --config {}",
            self.config.binary,
            config_path.display()
        );

        Command::new(&self.config.binary)
            .arg("--config")
            .arg(config_path)
            .args(&self.config.extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP)
            .spawn()
            .map_err(|e| PlatformError::SpawnError(format!("{}: {}", self.config.binary, e)))?;

        Ok(0)
    }
}
