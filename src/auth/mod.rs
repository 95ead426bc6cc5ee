//! Authentication module for managing the token-based session.
//!
//! This module provides:
//! - `SessionStore`: injected key/value storage for session state
//! - `Session`: the access/refresh token pair with expiry tracking
//! - `Identity`: user attributes and roles decoded from the access token
//! - `SessionManager`: refresh-on-401 protocol and the shared retry wrapper
//!
//! Access tokens are short-lived; the manager exchanges the refresh token
//! for a new pair whenever an authenticated request comes back 401.

pub mod identity;
pub mod manager;
pub mod session;
pub mod store;

pub use identity::Identity;
pub use manager::{with_auth_retry, SessionManager, DEFAULT_MAX_RETRIES};
pub use session::{Session, TokenSet};
pub use store::{FileStore, KeyringStore, MemoryStore, SessionStore};
