// Session context shared by every page that needs the signed-in user.
//
// The context is populated once at start-up (from a `SessionStore`), replaced
// on login and invalidated on logout or when the backend answers 401. Feature
// components only read from it.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Session data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    #[serde(default, alias = "firstName")]
    pub first_name: String,
    #[serde(default, alias = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl CurrentUser {
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: CurrentUser,
}

// Where the session survives between runs
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, SessionError>;
    fn save(&self, session: &Session) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            slot: RwLock::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.slot.read().clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.slot.write() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot.write() = None;
        Ok(())
    }
}

// JSON file holding `{ token, user }`
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SessionError::IoError(e)),
        }
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::IoError(e)),
        }
    }
}

#[derive(Clone)]
pub struct SessionContext {
    current: Arc<RwLock<Option<Session>>>,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}

impl SessionContext {
    // A signed-out context with nothing persisted
    pub fn anonymous() -> Self {
        Self::with_store(Arc::new(MemorySessionStore::new()))
    }

    fn with_store(store: Arc<dyn SessionStore>) -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            store,
        }
    }

    /// Reads the persisted session at application start. A corrupt store is
    /// treated as signed out and wiped rather than failing start-up.
    pub fn restore(store: Arc<dyn SessionStore>) -> Self {
        let context = Self::with_store(store);
        match context.store.load() {
            Ok(Some(session)) => {
                debug!(user_id = session.user.id, "Restored persisted session");
                *context.current.write() = Some(session);
            }
            Ok(None) => debug!("No persisted session"),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session");
                if let Err(e) = context.store.clear() {
                    warn!(error = %e, "Failed to clear session store");
                }
            }
        }
        context
    }

    pub fn establish(&self, session: Session) -> Result<(), SessionError> {
        info!(user_id = session.user.id, "Session established");
        self.store.save(&session)?;
        *self.current.write() = Some(session);
        Ok(())
    }

    // Logout, or the backend rejected the token
    pub fn invalidate(&self) {
        if self.current.write().take().is_some() {
            info!("Session invalidated");
        }
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear session store");
        }
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.current.read().as_ref().map(|s| s.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.token.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.read().is_some()
    }
}

#[cfg(test)]
pub(crate) fn test_session() -> Session {
    Session {
        token: "token-abc".to_string(),
        user: CurrentUser {
            id: 42,
            first_name: "Amara".to_string(),
            last_name: "Silva".to_string(),
            email: "amara@example.com".to_string(),
        },
    }
}
