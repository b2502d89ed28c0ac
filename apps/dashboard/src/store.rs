//! Persistence of the signed-in session.
//!
//! The store is handed to whatever needs it (`Arc<dyn SessionStore>`); it is
//! filled on a successful sign-in and emptied on logout.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use model::{AuthUser, TokenPair};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

pub const SESSION_KEY: &str = "mokart_session";
pub const USER_KEY: &str = "mokart_user";

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct StoredSession {
    pub tokens: TokenPair,
    pub user: AuthUser,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt {key} entry: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredSession>, StoreError>;
    fn save(&self, session: &StoredSession) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;

    /// Signed in means both the token pair and the user are present and
    /// readable.
    fn is_authenticated(&self) -> bool {
        matches!(self.load(), Ok(Some(_)))
    }
}

/// One JSON file per key inside `dir`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_dir() -> PathBuf {
        dirs_next::data_dir()
            .map(|d| d.join("mokart"))
            .unwrap_or_else(|| PathBuf::from(".mokart"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn read<T: serde::de::DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, StoreError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(s) => serde_json::from_str(&s)
                .map(Some)
                .map_err(|source| StoreError::Corrupt { key, source }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write<T: Serialize>(&self, key: &'static str, value: &T) -> Result<(), StoreError> {
        let s = serde_json::to_string(value).map_err(|source| StoreError::Corrupt { key, source })?;
        std::fs::write(self.path(key), s)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Option<StoredSession>, StoreError> {
        let tokens: Option<TokenPair> = self.read(SESSION_KEY)?;
        let user: Option<AuthUser> = self.read(USER_KEY)?;
        Ok(tokens.zip(user).map(|(tokens, user)| StoredSession { tokens, user }))
    }

    fn save(&self, session: &StoredSession) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        self.write(SESSION_KEY, &session.tokens)?;
        self.write(USER_KEY, &session.user)
    }

    fn clear(&self) -> Result<(), StoreError> {
        for key in [SESSION_KEY, USER_KEY] {
            match std::fs::remove_file(self.path(key)) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Option<StoredSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<StoredSession>, StoreError> {
        Ok(self.inner.lock().clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), StoreError> {
        *self.inner.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.inner.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn demo() -> StoredSession {
        StoredSession {
            tokens: TokenPair { access_token: "demo-token".into(), refresh_token: "demo-refresh".into() },
            user: AuthUser { id: "demo-user-123".into(), email: "demo@mokart.com".into(), user_metadata: None },
        }
    }

    #[test]
    fn file_store_lifecycle() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("mokart"));
        assert_eq!(store.load().unwrap(), None);
        assert!(!store.is_authenticated());

        store.save(&demo()).unwrap();
        assert!(dir.path().join("mokart").join("mokart_session.json").exists());
        assert!(dir.path().join("mokart").join("mokart_user.json").exists());
        assert_eq!(store.load().unwrap(), Some(demo()));
        assert!(store.is_authenticated());

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn one_key_alone_is_not_a_session() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save(&demo()).unwrap();
        std::fs::remove_file(dir.path().join("mokart_user.json")).unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn corrupt_entry_is_reported() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::write(dir.path().join("mokart_session.json"), "{not json").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Corrupt { key: SESSION_KEY, .. })));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn memory_store_lifecycle() {
        let store = MemoryStore::new();
        assert!(!store.is_authenticated());
        store.save(&demo()).unwrap();
        assert_eq!(store.load().unwrap(), Some(demo()));
        store.clear().unwrap();
        assert!(!store.is_authenticated());
    }
}
