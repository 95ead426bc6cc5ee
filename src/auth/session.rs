//! Token-pair session state over an injected store.
//!
//! The three token fields are written and cleared only as a unit: an access
//! token never persists without its expiry, and teardown removes everything
//! including the cached current-institution record.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::store::SessionStore;

/// Storage key for the bearer access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Storage key for the access token expiry (epoch millis as string)
pub const TOKEN_EXPIRES_KEY: &str = "token_expires";

/// Storage key for the cached current-institution record, cleared with the session
pub const INSTITUTION_KEY: &str = "institution";

/// An access/refresh token pair with the access token's absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    /// Epoch milliseconds
    pub expires_at: i64,
}

/// Session state backed by a [`SessionStore`].
///
/// Clone is cheap; the store is shared behind an `Arc`.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    /// Expiry of the access token in epoch milliseconds, if stored and parseable.
    pub fn expires_at(&self) -> Option<i64> {
        self.store.get(TOKEN_EXPIRES_KEY)?.parse().ok()
    }

    /// True iff an access token and expiry exist and the current time is
    /// strictly before the expiry.
    pub fn is_valid(&self) -> bool {
        match (self.access_token(), self.expires_at()) {
            (Some(_), Some(expires_at)) => Utc::now().timestamp_millis() < expires_at,
            _ => false,
        }
    }

    /// Replace all three token fields as a single logical update.
    pub fn replace(&self, tokens: &TokenSet) {
        self.store.set(ACCESS_TOKEN_KEY, &tokens.access_token);
        self.store.set(REFRESH_TOKEN_KEY, &tokens.refresh_token);
        self.store.set(TOKEN_EXPIRES_KEY, &tokens.expires_at.to_string());
    }

    /// Clear the token fields and any session-scoped cached state.
    pub fn clear(&self) {
        self.store.remove(ACCESS_TOKEN_KEY);
        self.store.remove(REFRESH_TOKEN_KEY);
        self.store.remove(TOKEN_EXPIRES_KEY);
        self.store.remove(INSTITUTION_KEY);
    }

    /// Cached current-institution record, if any.
    pub fn institution(&self) -> Option<serde_json::Value> {
        let raw = self.store.get(INSTITUTION_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn set_institution(&self, institution: &serde_json::Value) {
        self.store.set(INSTITUTION_KEY, &institution.to_string());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryStore;

    fn session() -> Session {
        Session::new(Arc::new(MemoryStore::new()))
    }

    fn tokens(expires_at: i64) -> TokenSet {
        TokenSet {
            access_token: "access-1".to_string(),
            refresh_token: "refresh-1".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_is_valid_before_expiry() {
        let session = session();
        session.replace(&tokens(Utc::now().timestamp_millis() + 60_000));
        assert!(session.is_valid());
    }

    #[test]
    fn test_is_valid_false_at_and_after_expiry() {
        let session = session();

        session.replace(&tokens(Utc::now().timestamp_millis()));
        assert!(!session.is_valid());

        session.replace(&tokens(Utc::now().timestamp_millis() - 60_000));
        assert!(!session.is_valid());
    }

    #[test]
    fn test_is_valid_false_without_token() {
        let session = session();
        assert!(!session.is_valid());

        // Expiry alone is not enough
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_EXPIRES_KEY, "99999999999999");
        let session = Session::new(store);
        assert!(!session.is_valid());
    }

    #[test]
    fn test_is_valid_false_on_unparseable_expiry() {
        let store = Arc::new(MemoryStore::new());
        store.set(ACCESS_TOKEN_KEY, "access-1");
        store.set(TOKEN_EXPIRES_KEY, "not-a-number");
        let session = Session::new(store);
        assert!(!session.is_valid());
    }

    #[test]
    fn test_replace_writes_all_three_fields() {
        let session = session();
        let ts = tokens(1_700_000_000_000);
        session.replace(&ts);

        assert_eq!(session.access_token().as_deref(), Some("access-1"));
        assert_eq!(session.refresh_token().as_deref(), Some("refresh-1"));
        assert_eq!(session.expires_at(), Some(1_700_000_000_000));
    }

    #[test]
    fn test_clear_removes_everything() {
        let session = session();
        session.replace(&tokens(1_700_000_000_000));
        session.set_institution(&serde_json::json!({"id": 7, "name": "IE La Esperanza"}));

        session.clear();

        assert_eq!(session.access_token(), None);
        assert_eq!(session.refresh_token(), None);
        assert_eq!(session.expires_at(), None);
        assert_eq!(session.institution(), None);
    }

    #[test]
    fn test_institution_round_trip() {
        let session = session();
        let record = serde_json::json!({"id": 3, "name": "IE San José"});
        session.set_institution(&record);
        assert_eq!(session.institution(), Some(record));
    }
}
