use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::error::{SessionError, StoreClientError};
use crate::id::UserId;
use crate::model::User;

/// Persistence for the authenticated user.
///
/// Unreadable or malformed records load as `None`; the user simply has to
/// log in again.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Option<User>;
    fn save(&self, user: &User) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Keeps the session as a single JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<User> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "cannot read stored session");
                return None;
            }
        };

        let user = parse_user(&contents);
        if user.is_none() {
            // Drop the record so the next start does not trip over it again.
            if let Err(err) = self.clear() {
                warn!(path = %self.path.display(), error = %err, "cannot remove malformed session");
            }
        }
        user
    }

    fn save(&self, user: &User) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec(user)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// In-process store, holding the serialized record like the file store does.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    record: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with raw contents, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<User> {
        let mut record = self.record.lock().unwrap_or_else(PoisonError::into_inner);
        let user = record.as_deref().and_then(parse_user);
        if user.is_none() {
            *record = None;
        }
        user
    }

    fn save(&self, user: &User) -> Result<(), SessionError> {
        let encoded = serde_json::to_string(user)?;
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(encoded);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

fn parse_user(contents: &str) -> Option<User> {
    match serde_json::from_str(contents) {
        Ok(user) => Some(user),
        Err(err) => {
            warn!(error = %err, "discarding malformed stored session");
            None
        }
    }
}

/// The current user, handed explicitly to every operation that needs one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user_id(&self) -> Result<&UserId, StoreClientError> {
        self.user
            .as_ref()
            .map(|user| &user.id)
            .ok_or(StoreClientError::Unauthenticated)
    }
}

impl From<Option<User>> for Session {
    fn from(user: Option<User>) -> Self {
        Self { user }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::RecordId;

    fn user() -> User {
        User {
            id: RecordId::from("u-1"),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
        }
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested/session.json"));

        assert_eq!(store.load(), None);
        store.save(&user()).unwrap();
        assert_eq!(store.load(), Some(user()));
    }

    #[test]
    fn clear_removes_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        store.save(&user()).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(), None);
        store.clear().unwrap();
    }

    #[test]
    fn malformed_file_loads_as_absent_and_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::new(path.clone());
        assert_eq!(store.load(), None);
        assert!(!path.exists());
    }

    #[test]
    fn malformed_file_stays_absent_on_next_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"nome": "Ana"}"#).unwrap();

        let store = FileSessionStore::new(path.clone());
        assert_eq!(store.load(), None);
        assert_eq!(store.load(), None);
        store.save(&user()).unwrap();
        assert_eq!(store.load(), Some(user()));
    }

    #[test]
    fn record_without_identifier_loads_as_absent() {
        let store = MemorySessionStore::with_raw(r#"{"nome": "Ana", "email": "ana@example.com"}"#);
        assert_eq!(store.load(), None);
        assert_eq!(store.raw(), None);
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemorySessionStore::new();
        store.save(&user()).unwrap();
        assert_eq!(store.load(), Some(user()));
        store.clear().unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn anonymous_session_has_no_user_id() {
        let session = Session::anonymous();
        assert!(matches!(
            session.user_id(),
            Err(StoreClientError::Unauthenticated)
        ));

        let session = Session::authenticated(user());
        assert_eq!(session.user_id().unwrap().as_str(), "u-1");
    }
}
