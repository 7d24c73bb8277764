//! OpenBlu API data types
//!
//! Every API response is wrapped in an envelope:
//!
//! ```json
//! {"success": true, "response_code": 200, "servers": [...]}
//! {"success": false, "response_code": 404,
//!  "error": {"error_code": 2, "message": "...", "type": "CLIENT"}}
//! ```
//!
//! The raw envelope is validated into [`Envelope`] inside the API client,
//! so business logic never sees an unchecked payload.

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server entry as returned by `servers/list`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerSummary {
    pub id: String,
    pub host_name: String,
    pub country: String,
    pub country_short: String,
    pub score: f64,
    pub ping: u32,
    #[serde(rename = "sessions", alias = "active_sessions")]
    pub active_sessions: u32,
    pub total_sessions: u64,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub last_updated: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,
}

/// Full server record as returned by `servers/get`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerDetail {
    #[serde(flatten)]
    pub summary: ServerSummary,
    #[serde(default)]
    pub ip_address: Option<String>,
    pub openvpn: OpenVpnConfig,
}

impl ServerDetail {
    /// The `.ovpn` configuration text
    pub fn configuration(&self) -> &str {
        &self.openvpn.ovpn_configuration
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OpenVpnConfig {
    pub ovpn_configuration: String,
}

/// Error body carried by unsuccessful envelopes
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl ApiErrorBody {
    pub(crate) fn unknown() -> Self {
        Self {
            error_code: -1,
            message: "The API reported a failure without details".to_string(),
            kind: "UNKNOWN".to_string(),
        }
    }
}

/// Validated API response
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success { response_code: u16, payload: T },
    Failure { response_code: u16, error: ApiErrorBody },
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    pub fn response_code(&self) -> u16 {
        match self {
            Envelope::Success { response_code, .. } | Envelope::Failure { response_code, .. } => {
                *response_code
            }
        }
    }

    pub fn into_result(self) -> Result<T, ApiFailure> {
        match self {
            Envelope::Success { payload, .. } => Ok(payload),
            Envelope::Failure {
                response_code,
                error,
            } => Err(ApiFailure {
                response_code,
                error,
            }),
        }
    }
}

/// An unsuccessful envelope
#[derive(Error, Debug, Clone, PartialEq)]
#[error("API error {} (HTTP {}): {}", .error.error_code, .response_code, .error.message)]
pub struct ApiFailure {
    pub response_code: u16,
    pub error: ApiErrorBody,
}

impl ApiFailure {
    /// Interpret a failed `servers/get` call for `id`
    pub fn into_lookup_error(self, id: &str) -> ServerLookupError {
        if self.response_code == 404 {
            ServerLookupError::NotFound { id: id.to_string() }
        } else {
            ServerLookupError::Api {
                code: self.response_code,
                message: self.error.message,
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServerLookupError {
    #[error("Server {id} was not found")]
    NotFound { id: String },
    #[error("Server lookup failed with API error {code}: {message}")]
    Api { code: u16, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    #[value(name = "country")]
    Country,
    #[value(name = "country_short")]
    CountryShort,
}

impl FilterField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Country => "country",
            FilterField::CountryShort => "country_short",
        }
    }
}

/// Server-side filter: both parts or nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: FilterField,
    pub value: String,
}

impl Filter {
    /// Build a filter from the two optional command-line parts
    pub fn from_parts(
        field: Option<FilterField>,
        value: Option<&str>,
    ) -> Result<Option<Self>, ValidationError> {
        match (field, value) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(ValidationError::FieldWithoutFilter),
            (None, Some(_)) => Err(ValidationError::FilterWithoutField),
            (Some(field), Some(value)) => {
                let value = value.trim();
                if value.is_empty() {
                    return Err(ValidationError::EmptyFilter);
                }
                Ok(Some(Self {
                    field,
                    value: value.to_string(),
                }))
            }
        }
    }

    /// Filter for a country given by name ("Italy") or ISO code ("IT")
    pub fn for_country(country: &str) -> Result<Self, ValidationError> {
        let country = country.trim();
        if country.is_empty() {
            return Err(ValidationError::EmptyFilter);
        }
        let field = if country.len() == 2 && country.chars().all(|c| c.is_ascii_alphabetic()) {
            FilterField::CountryShort
        } else {
            FilterField::Country
        };
        Ok(Self {
            field,
            value: country.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    #[value(name = "score")]
    Score,
    #[value(name = "ping")]
    Ping,
    #[value(name = "sessions")]
    Sessions,
    #[value(name = "total_sessions")]
    TotalSessions,
    #[value(name = "last_updated")]
    LastUpdated,
    #[value(name = "created")]
    Created,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub order_by: OrderBy,
    /// `None` leaves the direction to the API
    pub direction: Option<SortDirection>,
}

impl SortSpec {
    pub fn from_parts(
        order_by: Option<OrderBy>,
        direction: Option<SortDirection>,
    ) -> Result<Option<Self>, ValidationError> {
        match (order_by, direction) {
            (None, None) => Ok(None),
            (None, Some(_)) => Err(ValidationError::SortWithoutOrder),
            (Some(order_by), direction) => Ok(Some(Self {
                order_by,
                direction,
            })),
        }
    }
}

/// Parameters of a `servers/list` request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: Option<Filter>,
    pub sort: Option<SortSpec>,
}
