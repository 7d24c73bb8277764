//! Linux OpenVPN launcher

use super::{PlatformError, ProcessLauncher};
use crate::config::VpnConfig;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

pub struct LinuxLauncher {
    config: VpnConfig,
}

impl LinuxLauncher {
    pub fn new(config: VpnConfig) -> Self {
        Self { config }
    }

    /// Program and arguments for launching OpenVPN against `config_path`
    fn command_line(&self, config_path: &Path, is_root: bool) -> (String, Vec<String>) {
        let mut args = Vec::new();
        let program = if self.config.use_sudo && !is_root {
            args.push(self.config.binary.clone());
            "sudo".to_string()
        } else {
            self.config.binary.clone()
        };

        args.push("--config".to_string());
        args.push(config_path.to_string_lossy().to_string());
        if self.config.daemon {
            args.push("--daemon".to_string());
        }
        args.extend(self.config.extra_args.iter().cloned());

        (program, args)
    }
}

impl ProcessLauncher for LinuxLauncher {
    fn launch(&self, config_path: &Path) -> Result<i32, PlatformError> {
        let is_root = nix::unistd::geteuid().is_root();
        let (program, args) = self.command_line(config_path, is_root);
        debug!("Running {} {}", program, args.join(" "));

        let status = Command::new(&program)
            .args(&args)
            .status()
            .map_err(|e| PlatformError::SpawnError(format!("{}: {}", program, e)))?;

        // Killed by a signal: no exit code
        let code = status.code().unwrap_or(-1);
        if code != 0 {
            warn!("{} exited with status {}", program, code);
        }
        Ok(code)
    }
}
