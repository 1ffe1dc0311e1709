//! In-process bearer sessions.
//!
//! Tokens are 256 random bits, URL-safe base64. Only their SHA-256 digest is
//! kept, alongside the principal and the expiry instant.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use tokio::sync::RwLock;

use super::credentials::sha256_hex;
use crate::domain::foundation::{AuthError, Principal, Timestamp};
use crate::ports::{SessionIssuer, SessionValidator};

#[derive(Debug, Clone)]
struct Session {
    principal: Principal,
    expires_at: Timestamp,
}

/// Issues and validates opaque tokens with a fixed time-to-live.
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl_secs: i64,
}

impl InMemorySessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX / 2),
        }
    }

    /// Drops every expired session.
    pub async fn purge_expired(&self) -> usize {
        let now = Timestamp::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at.is_after(&now));
        before - sessions.len()
    }

    #[cfg(test)]
    async fn expire_all(&self) {
        let past = Timestamp::now().plus_seconds(-1);
        for session in self.sessions.write().await.values_mut() {
            session.expires_at = past;
        }
    }
}

fn fresh_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[async_trait]
impl SessionValidator for InMemorySessionStore {
    async fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        let key = sha256_hex(token);
        let session = self
            .sessions
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or(AuthError::InvalidToken)?;
        if !session.expires_at.is_after(&Timestamp::now()) {
            self.sessions.write().await.remove(&key);
            return Err(AuthError::TokenExpired);
        }
        Ok(session.principal)
    }
}

#[async_trait]
impl SessionIssuer for InMemorySessionStore {
    async fn issue(&self, principal: &Principal) -> Result<String, AuthError> {
        let token = fresh_token();
        let session = Session {
            principal: principal.clone(),
            expires_at: Timestamp::now().plus_seconds(self.ttl_secs),
        };
        self.sessions
            .write()
            .await
            .insert(sha256_hex(&token), session);
        Ok(token)
    }

    async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.write().await.remove(&sha256_hex(token));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn issued_token_validates_until_revoked() {
        let store = InMemorySessionStore::new(3600);
        let token = store
            .issue(&Principal::admin("admin@maturity.test", "Admin"))
            .await
            .unwrap();
        assert_eq!(token.len(), 43);

        let principal = store.validate(&token).await.unwrap();
        assert_eq!(principal.login(), "admin@maturity.test");

        store.revoke(&token).await.unwrap();
        assert_eq!(store.validate(&token).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn expired_token_is_reported_once_then_unknown() {
        let store = InMemorySessionStore::new(60);
        let token = store
            .issue(&Principal::admin("admin@maturity.test", "Admin"))
            .await
            .unwrap();
        store.expire_all().await;

        assert_eq!(store.validate(&token).await, Err(AuthError::TokenExpired));
        assert_eq!(store.validate(&token).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn purge_drops_only_expired_sessions() {
        let store = InMemorySessionStore::new(60);
        let admin = Principal::admin("admin@maturity.test", "Admin");
        store.issue(&admin).await.unwrap();
        store.expire_all().await;
        let live = store.issue(&admin).await.unwrap();

        assert_eq!(store.purge_expired().await, 1);
        assert!(store.validate(&live).await.is_ok());
    }

    #[tokio::test]
    async fn tokens_are_unique() {
        let store = InMemorySessionStore::new(60);
        let admin = Principal::admin("admin@maturity.test", "Admin");
        let a = store.issue(&admin).await.unwrap();
        let b = store.issue(&admin).await.unwrap();
        assert_ne!(a, b);
    }
}
