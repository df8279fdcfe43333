use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::models::User;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const EXPIRY_KEY: &str = "session_expiry";

/// Sessions written at login are considered stale after this long.
pub const SESSION_TTL_HOURS: i64 = 6;

/// An authenticated session as cached on the client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// One key-value storage area. The client keeps two: an ephemeral scope that
/// lives as long as the process, and a durable scope that survives restarts.
pub trait StorageScope: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-process scope backing the ephemeral side of the store.
#[derive(Default)]
pub struct MemoryScope {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryScope {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl StorageScope for MemoryScope {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}

/// Durable scope: one file per key under a directory. Write failures are
/// logged rather than propagated so that callers see the same infallible
/// surface the ephemeral scope has.
pub struct FileScope {
    root: PathBuf,
}

impl FileScope {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to ensure session directory at {}", root.display()))?;
        Ok(Self { root })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(sanitize_filename::sanitize(key))
    }
}

impl StorageScope for FileScope {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        let path = self.key_path(key);
        if let Err(err) = fs::write(&path, value) {
            error!(?err, file = %path.display(), "failed to persist session key");
        }
    }

    fn remove(&self, key: &str) {
        let path = self.key_path(key);
        if let Err(err) = fs::remove_file(&path) {
            if err.kind() != ErrorKind::NotFound {
                error!(?err, file = %path.display(), "failed to remove session key");
            }
        }
    }
}

/// The single place session state is read or written. The ephemeral scope
/// takes precedence on reads; the durable scope is a fallback, never merged.
#[derive(Clone)]
pub struct SessionStore {
    ephemeral: Arc<dyn StorageScope>,
    durable: Arc<dyn StorageScope>,
}

impl SessionStore {
    pub fn new(ephemeral: Arc<dyn StorageScope>, durable: Arc<dyn StorageScope>) -> Self {
        Self { ephemeral, durable }
    }

    /// Store backed by two memory scopes. Used by tests and short-lived
    /// tools that should not leave a token on disk.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryScope::new()), Arc::new(MemoryScope::new()))
    }

    /// Store with a durable scope persisted under `dir`.
    pub fn with_durable_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let durable = FileScope::new(dir.as_ref())?;
        Ok(Self::new(Arc::new(MemoryScope::new()), Arc::new(durable)))
    }

    /// Current session, ephemeral scope first, durable as fallback. A scope
    /// holding a token without a parsable user record counts as empty. An
    /// expired session is cleared and reported as absent.
    pub fn read(&self) -> Option<Session> {
        if self.expired() {
            debug!("stored session is past its expiry, clearing");
            self.clear();
            return None;
        }

        read_scope(self.ephemeral.as_ref()).or_else(|| read_scope(self.durable.as_ref()))
    }

    /// Bearer token only, with the same precedence and expiry rules as
    /// `read`. The gateway uses this; it does not need the user record.
    pub fn token(&self) -> Option<String> {
        if self.expired() {
            self.clear();
            return None;
        }

        self.ephemeral
            .get(TOKEN_KEY)
            .or_else(|| self.durable.get(TOKEN_KEY))
    }

    /// Persist a session into both scopes and stamp an expiry into the
    /// ephemeral scope only.
    pub fn write(&self, session: &Session) -> Result<()> {
        let user = serde_json::to_string(&session.user)
            .context("failed to serialize user record for session storage")?;
        let expiry = (Utc::now() + Duration::hours(SESSION_TTL_HOURS)).timestamp_millis();

        for scope in [self.ephemeral.as_ref(), self.durable.as_ref()] {
            scope.set(TOKEN_KEY, &session.token);
            scope.set(USER_KEY, &user);
        }
        self.ephemeral.set(EXPIRY_KEY, &expiry.to_string());
        Ok(())
    }

    /// Drop every session key from both scopes. Safe to call repeatedly and
    /// when nothing is stored.
    pub fn clear(&self) {
        for scope in [self.ephemeral.as_ref(), self.durable.as_ref()] {
            scope.remove(TOKEN_KEY);
            scope.remove(USER_KEY);
            scope.remove(EXPIRY_KEY);
        }
    }

    fn expired(&self) -> bool {
        let Some(raw) = self.ephemeral.get(EXPIRY_KEY) else {
            return false;
        };
        match raw.trim().parse::<i64>() {
            Ok(expiry) => Utc::now().timestamp_millis() > expiry,
            // An unreadable stamp never locks the user out.
            Err(_) => false,
        }
    }
}

fn read_scope(scope: &dyn StorageScope) -> Option<Session> {
    let token = scope.get(TOKEN_KEY)?;
    let user = serde_json::from_str(&scope.get(USER_KEY)?).ok()?;
    Some(Session { token, user })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> Session {
        Session {
            token: "tok-123".to_string(),
            user: User {
                id: 1,
                name: "Sara".to_string(),
                email: "sara@example.ae".to_string(),
                role: "student".to_string(),
                status: None,
            },
        }
    }

    #[test]
    fn write_then_read_round_trips() {
        let store = SessionStore::in_memory();
        let session = sample_session();
        store.write(&session).expect("write");
        assert_eq!(store.read(), Some(session));
    }

    #[test]
    fn clear_then_read_returns_none() {
        let store = SessionStore::in_memory();
        store.write(&sample_session()).expect("write");
        store.clear();
        assert_eq!(store.read(), None);
        assert_eq!(store.token(), None);
        // Clearing an already-empty store is fine.
        store.clear();
    }

    #[test]
    fn ephemeral_scope_wins_over_durable() {
        let ephemeral = Arc::new(MemoryScope::new());
        let durable = Arc::new(MemoryScope::new());
        ephemeral.set(TOKEN_KEY, "eph-token");
        ephemeral.set(USER_KEY, r#"{"id":1,"role":"student"}"#);
        durable.set(TOKEN_KEY, "dur-token");
        durable.set(USER_KEY, r#"{"id":2,"role":"employer"}"#);

        let store = SessionStore::new(ephemeral, durable);
        let session = store.read().expect("session");
        assert_eq!(session.token, "eph-token");
        assert_eq!(session.user.id, 1);
    }

    #[test]
    fn unparsable_ephemeral_user_falls_back_to_durable() {
        let ephemeral = Arc::new(MemoryScope::new());
        let durable = Arc::new(MemoryScope::new());
        ephemeral.set(TOKEN_KEY, "eph-token");
        ephemeral.set(USER_KEY, "not json");
        durable.set(TOKEN_KEY, "dur-token");
        durable.set(USER_KEY, r#"{"id":2,"role":"employer"}"#);

        let store = SessionStore::new(ephemeral, durable);
        let session = store.read().expect("session");
        assert_eq!(session.token, "dur-token");
        assert_eq!(session.user.id, 2);
    }

    #[test]
    fn expired_session_is_cleared_on_read() {
        let store = SessionStore::in_memory();
        store.write(&sample_session()).expect("write");
        store.ephemeral.set(EXPIRY_KEY, "1");
        assert_eq!(store.read(), None);
        // Both scopes were wiped, not just the ephemeral one.
        assert_eq!(store.durable.get(TOKEN_KEY), None);
    }

    #[test]
    fn token_is_available_without_user_record() {
        let store = SessionStore::in_memory();
        store.durable.set(TOKEN_KEY, "lonely-token");
        assert_eq!(store.read(), None);
        assert_eq!(store.token(), Some("lonely-token".to_string()));
    }

    #[test]
    fn file_scope_survives_reopening() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = SessionStore::with_durable_dir(dir.path()).expect("store");
            store.write(&sample_session()).expect("write");
        }
        let reopened = SessionStore::with_durable_dir(dir.path()).expect("store");
        let session = reopened.read().expect("session persisted");
        assert_eq!(session.token, "tok-123");
    }
}
