//! Shared context for routes and middleware.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use super::error::ApiError;
use crate::db;
use crate::session::SessionStore;

/// Shared state for all routes and middleware: the database path (one
/// connection is opened per request and dropped with the handler) and the
/// in-memory session store.
#[derive(Clone)]
pub struct ApiContext {
    db_path: Arc<PathBuf>,
    pub sessions: Arc<Mutex<SessionStore>>,
}

impl ApiContext {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path: Arc::new(db_path),
            sessions: Arc::new(Mutex::new(SessionStore::new())),
        }
    }

    /// Open the per-request connection. Schema setup happened at startup;
    /// this is a plain open.
    pub fn open_db(&self) -> Result<Connection, ApiError> {
        db::open_connection(&self.db_path).map_err(|e| ApiError::Internal(e.to_string()))
    }

    /// Resolve a session token against the store.
    pub fn session(&self, token: &str) -> Result<Option<crate::session::Session>, ApiError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        Ok(sessions.get(token))
    }
}
