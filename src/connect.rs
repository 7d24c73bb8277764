//! Connection pipeline
//!
//! 1. Fetch the server with its configuration
//! 2. Write the configuration to `<output_dir>/<id>.ovpn`
//! 3. Launch the VPN client against that file
//!
//! Each step exits early on failure. The configuration file is kept even
//! when the launch fails.

use crate::api::{ApiClient, NetworkError, ServerLookupError, ServerSummary, Transport};
use crate::error::ValidationError;
use crate::platform::{PlatformError, ProcessLauncher};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Lookup(#[from] ServerLookupError),
    #[error("Cannot write VPN configuration to {path}: {source}")]
    Persistence { path: PathBuf, source: io::Error },
    #[error("VPN process exited with code {code}")]
    ProcessLaunch { code: i32 },
    #[error(transparent)]
    Spawn(#[from] PlatformError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectResult {
    pub server: ServerSummary,
    pub config_path: PathBuf,
}

pub struct Connector<'a, T, L: ?Sized> {
    client: &'a ApiClient<T>,
    launcher: &'a L,
    output_dir: PathBuf,
}

impl<'a, T, L> Connector<'a, T, L>
where
    T: Transport,
    L: ProcessLauncher + ?Sized,
{
    pub fn new(client: &'a ApiClient<T>, launcher: &'a L, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            launcher,
            output_dir: output_dir.into(),
        }
    }

    pub fn connect(&self, server_id: &str, key: &str) -> Result<ConnectResult, ConnectError> {
        validate_server_id(server_id)?;

        let detail = self
            .client
            .get_server(key, server_id)?
            .into_result()
            .map_err(|failure| failure.into_lookup_error(server_id))?;

        let config_path = self.output_dir.join(format!("{server_id}.ovpn"));
        write_config(&config_path, detail.configuration())?;
        info!("VPN configuration written to {}", config_path.display());

        let code = self.launcher.launch(&config_path)?;
        if code != 0 {
            return Err(ConnectError::ProcessLaunch { code });
        }
        debug!("VPN process started for {}", detail.summary.host_name);

        Ok(ConnectResult {
            server: detail.summary,
            config_path,
        })
    }
}

fn write_config(path: &Path, configuration: &str) -> Result<(), ConnectError> {
    fs::write(path, configuration).map_err(|source| ConnectError::Persistence {
        path: path.to_path_buf(),
        source,
    })
}

/// Characters no file name may contain on Windows
const RESERVED_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Server ids become file names, so they must be a single path component
fn validate_server_id(id: &str) -> Result<(), ValidationError> {
    let invalid = id.is_empty()
        || id == "."
        || id.contains("..")
        || id.contains(RESERVED_CHARS)
        || id.chars().any(char::is_control);
    if invalid {
        return Err(ValidationError::InvalidServerId(id.to_string()));
    }
    Ok(())
}
