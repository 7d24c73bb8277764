//! In-memory collaborators shared by the unit tests

use crate::api::{NetworkError, ServerSummary, Transport};
use crate::credentials::{CredentialError, KeyPrompt};
use crate::platform::{PlatformError, ProcessLauncher};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Transport that replays queued responses and records every request
pub struct MockTransport {
    responses: RefCell<VecDeque<Result<String, String>>>,
    requests: RefCell<Vec<(String, Value)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(VecDeque::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn respond(&self, body: String) {
        self.responses.borrow_mut().push_back(Ok(body));
    }

    pub fn fail(&self, message: &str) {
        self.responses
            .borrow_mut()
            .push_back(Err(message.to_string()));
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.borrow().clone()
    }
}

impl Transport for MockTransport {
    fn post_json(&self, url: &str, body: &Value) -> Result<String, NetworkError> {
        self.requests
            .borrow_mut()
            .push((url.to_string(), body.clone()));
        match self.responses.borrow_mut().pop_front() {
            Some(Ok(body)) => Ok(body),
            Some(Err(message)) => Err(NetworkError::InvalidResponse(message)),
            None => Err(NetworkError::InvalidResponse(
                "no response queued".to_string(),
            )),
        }
    }
}

/// Launcher that records config paths and returns a fixed exit code
pub struct MockLauncher {
    exit_code: i32,
    launched: RefCell<Vec<PathBuf>>,
}

impl MockLauncher {
    pub fn exiting_with(exit_code: i32) -> Self {
        Self {
            exit_code,
            launched: RefCell::new(Vec::new()),
        }
    }

    pub fn launched(&self) -> Vec<PathBuf> {
        self.launched.borrow().clone()
    }
}

impl ProcessLauncher for MockLauncher {
    fn launch(&self, config_path: &Path) -> Result<i32, PlatformError> {
        self.launched.borrow_mut().push(config_path.to_path_buf());
        Ok(self.exit_code)
    }
}

/// Prompt returning a canned answer, `None` simulates Ctrl+C
pub struct MockPrompt(pub Option<String>);

impl KeyPrompt for MockPrompt {
    fn prompt(&self, _message: &str) -> Result<String, CredentialError> {
        self.0.clone().ok_or(CredentialError::Interrupted)
    }
}

pub fn summary_json(id: &str, ping: u32, last_updated: i64) -> Value {
    json!({
        "id": id,
        "host_name": format!("{id}.vpn.example.net"),
        "country": "Italy",
        "country_short": "IT",
        "score": 1_250_000,
        "ping": ping,
        "sessions": 3,
        "total_sessions": 120,
        "last_updated": last_updated,
        "created": 1_500_000_000,
    })
}

pub fn detail_json(id: &str, configuration: &str) -> Value {
    let mut value = summary_json(id, 25, 1_600_000_000);
    value["ip_address"] = json!("1.2.3.4");
    value["openvpn"] = json!({ "ovpn_configuration": configuration });
    value
}

pub fn list_body(servers: Vec<Value>) -> String {
    json!({"success": true, "response_code": 200, "servers": servers}).to_string()
}

pub fn get_body(server: Value) -> String {
    json!({"success": true, "response_code": 200, "server": server}).to_string()
}

pub fn failure_body(response_code: u16, error_code: i64, message: &str) -> String {
    json!({
        "success": false,
        "response_code": response_code,
        "error": {"error_code": error_code, "message": message, "type": "CLIENT"},
    })
    .to_string()
}

pub fn summary(id: &str, ping: u32, last_updated: i64) -> ServerSummary {
    ServerSummary {
        id: id.to_string(),
        host_name: format!("{id}.vpn.example.net"),
        country: "Italy".to_string(),
        country_short: "IT".to_string(),
        score: 1_250_000.0,
        ping,
        active_sessions: 3,
        total_sessions: 120,
        last_updated: Utc.timestamp_opt(last_updated, 0).unwrap(),
        created: Utc.timestamp_opt(1_500_000_000, 0).unwrap(),
    }
}
