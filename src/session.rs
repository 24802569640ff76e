//! Server-side session tracking. Sessions are created by a successful
//! login, read by the route gates, and destroyed by logout — nothing else
//! touches them.

use std::collections::HashMap;

use base64::Engine;
use serde::Serialize;

use crate::models::Role;

/// Proof of a successful login, injected into request extensions by the
/// session gate for downstream handlers.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub full_name: String,
}

/// In-memory session store keyed by an opaque token. The token travels in
/// an HttpOnly cookie; only its holder can resolve the session.
#[derive(Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Store a session and return its fresh token.
    pub fn create(&mut self, session: Session) -> String {
        let token = generate_token();
        self.sessions.insert(token.clone(), session);
        token
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).cloned()
    }

    /// Destroy unconditionally; an unknown token is not an error.
    pub fn destroy(&mut self, token: &str) {
        self.sessions.remove(token);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Generate a random session token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
