/// OpenBlu REST API
///
/// Typed request/response handling for the server directory, with the
/// HTTP transport kept behind a trait so the client can be exercised
/// without a network.
pub mod client;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use transport::{HttpTransport, NetworkError, Transport};
pub use types::{
    ApiErrorBody, ApiFailure, Envelope, Filter, FilterField, ListQuery, OrderBy, ServerDetail,
    ServerLookupError, ServerSummary, SortDirection, SortSpec,
};
