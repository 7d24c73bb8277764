//! Server selection

use crate::api::ServerSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Most recently updated server
    Best,
    /// First server in API order
    First,
}

/// Pick a server from `servers`, or `None` when the list is empty.
///
/// For [`SelectMode::Best`], ties on `last_updated` go to the earliest entry.
pub fn select(servers: &[ServerSummary], mode: SelectMode) -> Option<&ServerSummary> {
    match mode {
        SelectMode::First => servers.first(),
        SelectMode::Best => servers.iter().fold(None, |best, server| match best {
            Some(current) if current.last_updated >= server.last_updated => Some(current),
            _ => Some(server),
        }),
    }
}
