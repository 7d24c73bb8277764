//! Top-level error type and process exit codes

use crate::api::{ApiFailure, NetworkError, ServerLookupError};
use crate::config::ConfigError;
use crate::connect::ConnectError;
use crate::credentials::CredentialError;
use crate::platform::PlatformError;
use thiserror::Error;

/// Process exit codes
pub mod exit {
    pub const SUCCESS: i32 = 0;
    /// User input, permission and validation errors
    pub const FAILURE: i32 = 1;
    pub const PLATFORM_INVALID: i32 = 3;
    pub const NETWORK_ACCESS_FAILED: i32 = 4;
    pub const UNKNOWN_ERROR: i32 = 5;
    pub const INTERRUPTED: i32 = 130;
}

/// Invalid combinations of command-line input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("--filter requires --filter-by (country or country_short)")]
    FilterWithoutField,
    #[error("--filter-by requires a --filter value")]
    FieldWithoutFilter,
    #[error("The filter value must not be empty")]
    EmptyFilter,
    #[error("--sort-by requires --order-by")]
    SortWithoutOrder,
    #[error("--country and --filter cannot be combined, use one of them")]
    ConflictingFilters,
    #[error("Filter and sort options cannot be used with {0}")]
    ListOptionsNotAllowed(&'static str),
    #[error("Only one action can be given at a time, got: {}", .0.join(", "))]
    ConflictingIntents(Vec<&'static str>),
    #[error("No action given, use --help to see the available options")]
    NoIntent,
    #[error("The access key must not be empty")]
    EmptyAccessKey,
    #[error("Invalid server id: {0:?}")]
    InvalidServerId(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error("Could not reach the OpenBlu API: {0}")]
    Network(#[from] NetworkError),
    #[error(
        "Something went wrong when contacting the API\n  HTTP Response Code: {}\n  API Error Code: {}\n  API Error Message: {}\n  API Error Type: {}",
        .0.response_code, .0.error.error_code, .0.error.message, .0.error.kind
    )]
    Api(ApiFailure),
    #[error(transparent)]
    Lookup(#[from] ServerLookupError),
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("No server available{}", country_suffix(.0))]
    NoServerAvailable(Option<String>),
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl From<ApiFailure> for AppError {
    fn from(failure: ApiFailure) -> Self {
        AppError::Api(failure)
    }
}

impl AppError {
    /// Exit code reported to the shell for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Platform(PlatformError::UnsupportedPlatform(_)) => exit::PLATFORM_INVALID,
            AppError::Platform(_) => exit::UNKNOWN_ERROR,
            AppError::Network(_) => exit::NETWORK_ACCESS_FAILED,
            AppError::Api(failure) => api_exit_code(failure.response_code),
            AppError::Lookup(ServerLookupError::NotFound { .. }) => exit::FAILURE,
            AppError::Lookup(ServerLookupError::Api { code, .. }) => api_exit_code(*code),
            AppError::Connect(err) => match err {
                ConnectError::Network(_) => exit::NETWORK_ACCESS_FAILED,
                ConnectError::Lookup(ServerLookupError::NotFound { .. }) => exit::FAILURE,
                ConnectError::Lookup(ServerLookupError::Api { code, .. }) => api_exit_code(*code),
                ConnectError::Validation(_) | ConnectError::Persistence { .. } => exit::FAILURE,
                ConnectError::ProcessLaunch { .. } | ConnectError::Spawn(_) => {
                    exit::UNKNOWN_ERROR
                }
            },
            AppError::Credential(CredentialError::Interrupted) => exit::INTERRUPTED,
            AppError::Credential(_) => exit::FAILURE,
            AppError::Config(_) => exit::FAILURE,
            AppError::Validation(_) => exit::FAILURE,
            AppError::NoServerAvailable(_) => exit::FAILURE,
            AppError::Output(_) => exit::UNKNOWN_ERROR,
        }
    }

    /// Extra guidance printed after the error message, if any
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            AppError::Connect(ConnectError::Persistence { .. })
            | AppError::Credential(CredentialError::Persistence { .. }) => Some(
                "Check the permissions of the working directory, or set paths.output_dir / paths.key_file in openblu.toml",
            ),
            AppError::Credential(CredentialError::Missing) => {
                Some("Pass --key <KEY>, set OPENBLU_ACCESS_KEY, or store one with --set-access-key")
            }
            AppError::Connect(ConnectError::ProcessLaunch { .. } | ConnectError::Spawn(_)) => {
                Some("Make sure OpenVPN is installed and that you can run it with the required privileges")
            }
            _ => None,
        }
    }
}

fn country_suffix(country: &Option<String>) -> String {
    country
        .as_deref()
        .map(|c| format!(" in {c}"))
        .unwrap_or_default()
}

fn api_exit_code(response_code: u16) -> i32 {
    if (400..500).contains(&response_code) {
        exit::FAILURE
    } else {
        exit::UNKNOWN_ERROR
    }
}
