//! Session persistence.
//!
//! Reads/writes `~/.opencrm/session.toml` so a login survives process
//! restarts. The user payload is kept as a JSON string inside the TOML
//! file and decoded in a second step; if either step fails the whole
//! file is cleared and the console starts logged out.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use opencrm_core::{Session, SessionUser, now_rfc3339};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("session file io: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file encode: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Where a session lives between runs.
pub trait SessionStorage: Send + Sync {
    /// Restore the persisted session. Corrupt data is cleared and
    /// reported as an empty session, never as an error.
    fn load(&self) -> Result<Session, StorageError>;

    fn save(&self, session: &Session) -> Result<(), StorageError>;

    fn clear(&self) -> Result<(), StorageError>;
}

/// On-disk layout of the session file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    token: String,

    /// User payload as JSON.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    user: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    saved_at: String,
}

/// TOML-file-backed storage.
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default session file path: ~/.opencrm/session.toml.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".opencrm").join("session.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn discard(&self, why: &str) -> Result<Session, StorageError> {
        warn!(path = %self.path.display(), "clearing session file: {why}");
        self.clear()?;
        Ok(Session::empty())
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Session, StorageError> {
        if !self.path.exists() {
            return Ok(Session::empty());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let stored: StoredSession = match toml::from_str(&content) {
            Ok(stored) => stored,
            Err(err) => return self.discard(&format!("unreadable: {err}")),
        };
        if stored.token.is_empty() {
            return Ok(Session::empty());
        }
        let user = if stored.user.is_empty() {
            None
        } else {
            match serde_json::from_str::<SessionUser>(&stored.user) {
                Ok(user) => Some(user),
                Err(err) => return self.discard(&format!("corrupt user payload: {err}")),
            }
        };
        Ok(Session {
            user,
            token: Some(stored.token),
        })
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        let user = match &session.user {
            Some(user) => serde_json::to_string(user).unwrap_or_default(),
            None => String::new(),
        };
        let stored = StoredSession {
            token: session.token.clone().unwrap_or_default(),
            user,
            saved_at: now_rfc3339(),
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(&stored)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory storage for tests and non-persistent runs.
#[derive(Default)]
pub struct MemorySessionStorage {
    inner: RwLock<Session>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: RwLock::new(session),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Session, StorageError> {
        Ok(self.inner.read().unwrap().clone())
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        *self.inner.write().unwrap() = session.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.inner.write().unwrap() = Session::empty();
        Ok(())
    }
}
