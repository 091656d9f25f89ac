//! Durable session identity.
//!
//! The backend correlates a conversation with an opaque session identifier.
//! Once acquired, the identifier is kept in a single file under
//! `$PARLEY_HOME` so every parley command (and every restart) resumes the
//! same conversation until the user asks for a new one.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// Opaque session identifier issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage for the current session identifier.
///
/// Implementations never fail on read: storage that cannot be read reports
/// no identifier, which sends the caller down the new-session path.
pub trait IdentityStore: Send {
    /// Stored identifier, or None when absent or unreadable.
    fn get(&self) -> Option<SessionId>;

    /// Replaces the stored identifier.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn set(&mut self, id: &SessionId) -> Result<()>;

    /// Forgets the stored identifier. Clearing an empty store succeeds.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be removed.
    fn clear(&mut self) -> Result<()>;
}

/// On-disk record. `created_at` is informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
}

/// Identity kept as JSON in a single file.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location, `$PARLEY_HOME/session.json`.
    pub fn open_default() -> Self {
        Self::new(paths::session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the full record, or None when missing or unreadable.
    pub fn record(&self) -> Option<SessionRecord> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "session file unreadable");
                return None;
            }
        };

        match serde_json::from_str::<SessionRecord>(&contents) {
            Ok(record) if !record.session_id.as_str().trim().is_empty() => Some(record),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "session file corrupt");
                None
            }
        }
    }
}

impl IdentityStore for FileIdentityStore {
    fn get(&self) -> Option<SessionId> {
        self.record().map(|record| record.session_id)
    }

    fn set(&mut self, id: &SessionId) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let record = SessionRecord {
            session_id: id.clone(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&record).context("Failed to encode session")?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("Failed to remove {}", self.path.display()))
            }
            _ => Ok(()),
        }
    }
}

/// In-memory store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityStore {
    slot: Arc<Mutex<Option<SessionId>>>,
}

impl MemoryIdentityStore {
    pub fn with_session(id: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(SessionId::new(id)))),
        }
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get(&self) -> Option<SessionId> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&mut self, id: &SessionId) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(id.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
