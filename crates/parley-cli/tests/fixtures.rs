//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use std::path::Path;

use serde_json::json;
use tempfile::TempDir;

/// Creates a temp PARLEY_HOME directory for test isolation.
pub fn temp_home() -> TempDir {
    TempDir::new().expect("create temp parley home")
}

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Writes a stored session id the way the client persists it.
pub fn store_session(home: &Path, id: &str) {
    let record = json!({
        "session_id": id,
        "created_at": "2026-01-01T00:00:00Z",
    });
    std::fs::write(home.join("session.json"), record.to_string()).expect("write session file");
}

pub fn stored_session(home: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(home.join("session.json")).ok()?;
    let value: serde_json::Value = serde_json::from_str(&contents).ok()?;
    value["session_id"].as_str().map(str::to_string)
}
