use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::User;

/// Storage key for the bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key for the serialized user profile
pub const USER_KEY: &str = "user";

/// Durable string key-value storage for session state.
///
/// Writes and removals are idempotent; removing a missing key is not an error.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One file per key inside a directory. The directory is created on first write.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session file: {}", key))?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create session directory")?;
        let path = self.key_path(key);

        // Tokens are credentials; the file is private from the moment it exists
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&path)
            .with_context(|| format!("Failed to open session file: {}", key))?;

        // The open mode only applies to new files
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to restrict session file: {}", key))?;
        }

        file.write_all(value.as_bytes())
            .with_context(|| format!("Failed to write session file: {}", key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove session file: {}", key))?;
        }
        Ok(())
    }
}

/// Process-local storage. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// An authenticated session: the token plus the profile returned at login.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: Option<User>,
}

/// Session lifecycle notifications delivered to the hosting application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { username: String },
    /// The user logged out; hosts usually return to the public entry point.
    LoggedOut,
    /// The backend rejected the stored token. The session is already cleared.
    Expired { endpoint: String },
}

pub type SessionListener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// Token and cached profile on top of a `SessionStorage`.
///
/// Reads never fail: unreadable or malformed entries are treated as absent.
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to read session storage");
                None
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.read(TOKEN_KEY)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.storage.set(TOKEN_KEY, token)
    }

    pub fn set_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user).context("Failed to serialize user profile")?;
        self.storage.set(USER_KEY, &json)
    }

    /// The cached profile, only while a token is present.
    pub fn current_user(&self) -> Option<User> {
        self.token()?;
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                debug!(error = %e, "Ignoring malformed cached user profile");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// The current session, if a token is stored.
    pub fn session(&self) -> Option<Session> {
        let token = self.token()?;
        Some(Session {
            token,
            user: self.current_user(),
        })
    }

    /// Persist a fresh session. On failure nothing partial is left behind.
    pub fn store(&self, session: &Session) -> Result<()> {
        let result = self.set_token(&session.token).and_then(|_| match &session.user {
            Some(user) => self.set_user(user),
            None => self.storage.remove(USER_KEY),
        });
        if result.is_err() {
            let _ = self.clear();
        }
        result
    }

    /// Remove token and cached profile. Both removals are attempted even if
    /// the first one fails.
    pub fn clear(&self) -> Result<()> {
        let token = self.storage.remove(TOKEN_KEY);
        let user = self.storage.remove(USER_KEY);
        token.and(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn sample_user() -> User {
        serde_json::from_str(r#"{"_id":"u1","name":"Ana","username":"ana","email":"ana@example.com","role":"admin"}"#)
            .unwrap()
    }

    #[test]
    fn test_memory_session_roundtrip() {
        let store = SessionStore::in_memory();
        assert!(!store.is_authenticated());
        assert!(store.current_user().is_none());

        store
            .store(&Session {
                token: "abc".to_string(),
                user: Some(sample_user()),
            })
            .unwrap();

        assert_eq!(store.token().as_deref(), Some("abc"));
        let user = store.current_user().unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(user.role, Role::Admin);
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_user_without_token_is_not_trusted() {
        let storage = MemoryStorage::new();
        storage
            .set(USER_KEY, &serde_json::to_string(&sample_user()).unwrap())
            .unwrap();
        let store = SessionStore::new(storage);
        assert!(store.current_user().is_none());
        assert!(store.session().is_none());
    }

    #[test]
    fn test_malformed_user_reads_as_absent() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "abc").unwrap();
        storage.set(USER_KEY, "{not json").unwrap();
        let store = SessionStore::new(storage);
        assert!(store.is_authenticated());
        assert!(store.current_user().is_none());
    }

    #[test]
    fn test_blank_token_is_absent() {
        let store = SessionStore::in_memory();
        store.set_token("  ").unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = SessionStore::in_memory();
        store.set_token("abc").unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.token().is_none());
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let session_dir = dir.path().join("sessions").join("localhost_5000");

        let store = SessionStore::new(FileStorage::new(&session_dir));
        store
            .store(&Session {
                token: "tok-1".to_string(),
                user: Some(sample_user()),
            })
            .unwrap();

        let reopened = SessionStore::new(FileStorage::new(&session_dir));
        assert_eq!(reopened.token().as_deref(), Some("tok-1"));
        assert_eq!(reopened.current_user().map(|u| u.username), Some("ana".to_string()));

        reopened.clear().unwrap();
        assert!(!session_dir.join(TOKEN_KEY).exists());
        assert!(!session_dir.join(USER_KEY).exists());
        reopened.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_files_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let path = dir.path().join(TOKEN_KEY);

        storage.set(TOKEN_KEY, "abc").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // Existing world-readable file is tightened on overwrite
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        storage.set(TOKEN_KEY, "def").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("def"));
    }

    #[test]
    fn test_file_storage_missing_dir_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("never-created"));
        assert!(storage.get(TOKEN_KEY).unwrap().is_none());
        storage.remove(TOKEN_KEY).unwrap();
    }
}
