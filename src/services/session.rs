//! Session persistence behind an injected store.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The stored session, if any. Expired sessions read as absent.
    async fn load(&self) -> Result<Option<Session>, ServiceError>;
    async fn save(&self, session: &Session) -> Result<(), ServiceError>;
    async fn clear(&self) -> Result<(), ServiceError>;
}

// == Memory Store ==
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>, ServiceError> {
        Ok(self.slot().clone().filter(|s| !s.is_expired()))
    }

    async fn save(&self, session: &Session) -> Result<(), ServiceError> {
        *self.slot() = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ServiceError> {
        *self.slot() = None;
        Ok(())
    }
}

// == File Store ==
/// One JSON file holding the current session.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>, ServiceError> {
        let payload = match tokio::fs::read_to_string(&self.path).await {
            Ok(payload) => payload,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session: Session = serde_json::from_str(&payload)?;
        if session.is_expired() {
            debug!("Stored session for {} has expired", session.user_id);
            return Ok(None);
        }
        Ok(Some(session))
    }

    async fn save(&self, session: &Session) -> Result<(), ServiceError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_string(session)?;
        tokio::fs::write(&self.path, payload).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), ServiceError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
