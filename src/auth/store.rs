//! Pluggable key/value storage for session state.
//!
//! The web version of this client keeps tokens in browser local storage.
//! Here the storage backend is an injected trait so the session logic is
//! testable with an in-memory fake and swappable across platforms:
//! a JSON file in the cache directory for desktop use, or the OS keychain
//! when tokens should not touch disk in the clear.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::warn;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Keyring service name for keychain-backed storage
const SERVICE_NAME: &str = "escolar";

/// Key/value storage for session state.
///
/// Writes are infallible from the caller's point of view; backends that can
/// fail (disk, keychain) log and continue, matching local-storage semantics.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// ============================================================================
// In-memory store
// ============================================================================

/// In-memory store, used by tests and short-lived tools.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().expect("store lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.lock().expect("store lock poisoned").remove(key);
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// Store persisted as a single JSON file in the cache directory.
pub struct FileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open (or create) the session file under `cache_dir`.
    pub fn open(cache_dir: PathBuf) -> Result<Self> {
        let path = cache_dir.join(SESSION_FILE);
        let values = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .context("Failed to read session file")?;
            serde_json::from_str(&contents).context("Failed to parse session file")?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn persist(&self, values: &HashMap<String, String>) {
        let result = (|| -> Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(values)?;
            std::fs::write(&self.path, contents)?;
            Ok(())
        })();
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session file");
        }
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().expect("store lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.lock().expect("store lock poisoned");
        values.insert(key.to_string(), value.to_string());
        self.persist(&values);
    }

    fn remove(&self, key: &str) {
        let mut values = self.values.lock().expect("store lock poisoned");
        values.remove(key);
        self.persist(&values);
    }
}

// ============================================================================
// Keychain-backed store
// ============================================================================

/// Store backed by the OS keychain, one entry per key.
pub struct KeyringStore;

impl KeyringStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for KeyringStore {
    fn get(&self, key: &str) -> Option<String> {
        Entry::new(SERVICE_NAME, key).ok()?.get_password().ok()
    }

    fn set(&self, key: &str, value: &str) {
        match Entry::new(SERVICE_NAME, key) {
            Ok(entry) => {
                if let Err(e) = entry.set_password(value) {
                    warn!(key, error = %e, "Failed to store value in keychain");
                }
            }
            Err(e) => warn!(key, error = %e, "Failed to create keyring entry"),
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(entry) = Entry::new(SERVICE_NAME, key) {
            // Missing entries are fine; removal only needs to be best-effort
            let _ = entry.delete_credential();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("access_token"), None);

        store.set("access_token", "abc");
        assert_eq!(store.get("access_token").as_deref(), Some("abc"));

        store.set("access_token", "def");
        assert_eq!(store.get("access_token").as_deref(), Some("def"));

        store.remove("access_token");
        assert_eq!(store.get("access_token"), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!(
            "escolar-store-test-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);

        {
            let store = FileStore::open(dir.clone()).expect("open store");
            store.set("refresh_token", "r-1");
            store.set("token_expires", "1700000000000");
        }

        // Reopen and verify the values survived
        let store = FileStore::open(dir.clone()).expect("reopen store");
        assert_eq!(store.get("refresh_token").as_deref(), Some("r-1"));
        assert_eq!(store.get("token_expires").as_deref(), Some("1700000000000"));

        store.remove("refresh_token");
        let store = FileStore::open(dir.clone()).expect("reopen store again");
        assert_eq!(store.get("refresh_token"), None);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
