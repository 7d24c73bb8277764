//! OpenBlu API client
//!
//! Two requests are supported:
//! 1. `servers/list` - list servers, optionally filtered and sorted
//! 2. `servers/get` - fetch one server including its OpenVPN configuration
//!
//! Each call is a single attempt. Transport and decoding failures surface
//! as [`NetworkError`]; API-level failures come back as
//! [`Envelope::Failure`].

use super::transport::{HttpTransport, NetworkError, Transport};
use super::types::{
    ApiErrorBody, Envelope, FilterField, ListQuery, OrderBy, ServerDetail, ServerSummary,
    SortDirection,
};
use crate::config::ApiConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct ListRequest<'a> {
    access_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<FilterField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    by: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_by: Option<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort_by: Option<SortDirection>,
}

#[derive(Debug, Serialize)]
struct GetRequest<'a> {
    access_key: &'a str,
    id: &'a str,
}

// Envelope as sent over the wire, before validation
#[derive(Debug, Deserialize)]
struct RawEnvelope<T> {
    success: bool,
    response_code: u16,
    #[serde(rename = "servers", alias = "server", default = "Option::default")]
    payload: Option<T>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

impl<T> RawEnvelope<T> {
    fn validate(self) -> Result<Envelope<T>, NetworkError> {
        let response_code = self.response_code;
        match (self.success, self.payload) {
            (true, Some(payload)) => Ok(Envelope::Success {
                response_code,
                payload,
            }),
            (true, None) => Err(NetworkError::InvalidResponse(
                "successful response without a payload".to_string(),
            )),
            (false, _) => Ok(Envelope::Failure {
                response_code,
                error: self.error.unwrap_or_else(ApiErrorBody::unknown),
            }),
        }
    }
}

pub struct ApiClient<T> {
    endpoint: String,
    transport: T,
}

impl ApiClient<HttpTransport> {
    pub fn from_config(config: &ApiConfig) -> Result<Self, NetworkError> {
        let transport = HttpTransport::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::new(&config.endpoint, transport))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(endpoint: &str, transport: T) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// List available servers
    pub fn list_servers(
        &self,
        key: &str,
        query: &ListQuery,
    ) -> Result<Envelope<Vec<ServerSummary>>, NetworkError> {
        let request = ListRequest {
            access_key: key,
            filter: query.filter.as_ref().map(|f| f.field),
            by: query.filter.as_ref().map(|f| f.value.as_str()),
            order_by: query.sort.map(|s| s.order_by),
            sort_by: query.sort.and_then(|s| s.direction),
        };
        debug!(
            "Listing servers (filter: {:?}, order: {:?}, sort: {:?})",
            request.filter, request.order_by, request.sort_by
        );

        let envelope: Envelope<Vec<ServerSummary>> = self.call("servers/list", &request)?;
        if let Envelope::Success { payload, .. } = &envelope {
            debug!("API returned {} servers", payload.len());
        }
        Ok(envelope)
    }

    /// Fetch a single server with its OpenVPN configuration
    pub fn get_server(&self, key: &str, id: &str) -> Result<Envelope<ServerDetail>, NetworkError> {
        debug!("Fetching server {}", id);
        self.call("servers/get", &GetRequest { access_key: key, id })
    }

    fn call<B, R>(&self, path: &str, body: &B) -> Result<Envelope<R>, NetworkError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.endpoint, path);
        let body = serde_json::to_value(body)?;
        let text = self.transport.post_json(&url, &body)?;
        let raw: RawEnvelope<R> = serde_json::from_str(&text)?;
        raw.validate()
    }
}
