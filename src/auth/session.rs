use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use rand::RngCore;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{AuthFailure, RollcallError};

/// Opaque handle proving a prior successful login.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(BASE64_URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// Tokens are credentials; keep them out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
}

/// In-memory sessions keyed by token.
///
/// Sessions have no expiry: an entry is dropped only on logout or when the
/// same browser logs in again. Abandoned logins stay resident until restart.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<SessionToken, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn issue(&self, username: &str) -> SessionToken {
        let token = SessionToken::generate();
        let session = Session {
            username: username.to_string(),
        };
        self.inner.write().await.insert(token.clone(), session);
        token
    }

    /// Resolve a token to its session, or `AuthFailure::NotAuthenticated`.
    pub async fn require(&self, token: Option<&SessionToken>) -> Result<Session, RollcallError> {
        let not_authenticated = || RollcallError::Auth(AuthFailure::NotAuthenticated);
        let token = token.ok_or_else(not_authenticated)?;
        self.inner
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or_else(not_authenticated)
    }

    /// Drop the session. Returns whether one existed.
    pub async fn revoke(&self, token: &SessionToken) -> bool {
        self.inner.write().await.remove(token).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
