//! Scoped credential storage.
//!
//! Two scopes:
//!
//! - **close-scoped**: held in this process, gone when the client is dropped
//! - **persistent**: a JSON file that survives restarts
//!
//! The access token always lives in the close scope. The refresh token lives
//! in the persistent scope when the session was opened with "remember",
//! otherwise in the close scope. The in-process view is what readers see;
//! the file mirrors it for the remembered case.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::ClientError;

/// Point-in-time view of the stored credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSnapshot {
    /// Current access token.
    pub access_token: Option<String>,
    /// Current refresh token.
    pub refresh_token: Option<String>,
    /// Scope the refresh token is kept in.
    pub remember: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedCredentials {
    refresh_token: String,
    saved_at: DateTime<Utc>,
}

/// Holds the client's credentials. Every update swaps the whole set under
/// one write lock, so readers never see a mixed pair.
#[derive(Debug, Default)]
pub struct TokenStore {
    state: RwLock<CredentialSnapshot>,
    persistent_path: Option<PathBuf>,
}

impl TokenStore {
    /// Store with only the close scope.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store backed by `path` for the persistent scope.
    ///
    /// A refresh token remembered by an earlier process is loaded. An
    /// unreadable file is discarded.
    pub fn open(path: Option<PathBuf>) -> Result<Self, ClientError> {
        let mut snapshot = CredentialSnapshot::default();

        if let Some(path) = &path {
            match read_persisted(path) {
                Ok(Some(persisted)) => {
                    debug!(path = %path.display(), "Loaded remembered refresh token");
                    snapshot.refresh_token = Some(persisted.refresh_token);
                    snapshot.remember = true;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Discarding unreadable credential file");
                    remove_persisted(path)?;
                }
            }
        }

        Ok(Self {
            state: RwLock::new(snapshot),
            persistent_path: path,
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, CredentialSnapshot> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CredentialSnapshot> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Everything currently stored.
    pub fn snapshot(&self) -> CredentialSnapshot {
        self.read().clone()
    }

    /// Current access token.
    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    /// Current refresh token.
    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    /// Whether the refresh token is kept in the persistent scope.
    pub fn remember(&self) -> bool {
        self.read().remember
    }

    /// Whether any credential is stored.
    pub fn has_session(&self) -> bool {
        let state = self.read();
        state.access_token.is_some() || state.refresh_token.is_some()
    }

    /// Stores a new pair, writing `remember` as the refresh token's scope.
    pub fn set_pair(
        &self,
        access_token: String,
        refresh_token: String,
        remember: bool,
    ) -> Result<(), ClientError> {
        let mut state = self.write();

        match (&self.persistent_path, remember) {
            (Some(path), true) => write_persisted(path, &refresh_token)?,
            (Some(path), false) => remove_persisted(path)?,
            (None, true) => debug!("No credential file configured; remembering in memory only"),
            (None, false) => {}
        }

        *state = CredentialSnapshot {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            remember,
        };
        Ok(())
    }

    /// Stores a renewed pair in the scope chosen at login.
    pub fn replace_pair(
        &self,
        access_token: String,
        refresh_token: String,
    ) -> Result<(), ClientError> {
        let remember = self.remember();
        self.set_pair(access_token, refresh_token, remember)
    }

    /// Drops every credential from both scopes.
    ///
    /// The in-process view is always cleared; only the file removal can fail.
    pub fn clear(&self) -> Result<(), ClientError> {
        let mut state = self.write();
        *state = CredentialSnapshot::default();

        if let Some(path) = &self.persistent_path {
            remove_persisted(path)?;
        }
        Ok(())
    }
}

fn read_persisted(path: &Path) -> Result<Option<PersistedCredentials>, ClientError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_persisted(path: &Path, refresh_token: &str) -> Result<(), ClientError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer(
        &mut tmp,
        &PersistedCredentials {
            refresh_token: refresh_token.to_string(),
            saved_at: Utc::now(),
        },
    )?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn remove_persisted(path: &Path) -> Result<(), ClientError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        (dir, path)
    }

    #[test]
    fn test_session_scope_does_not_survive_restart() {
        let (_dir, path) = scratch();
        let store = TokenStore::open(Some(path.clone())).unwrap();
        store
            .set_pair("a1".into(), "r1".into(), false)
            .unwrap();
        assert!(!path.exists());
        drop(store);

        let restarted = TokenStore::open(Some(path)).unwrap();
        assert_eq!(restarted.snapshot(), CredentialSnapshot::default());
    }

    #[test]
    fn test_remembered_refresh_survives_restart() {
        let (_dir, path) = scratch();
        let store = TokenStore::open(Some(path.clone())).unwrap();
        store.set_pair("a1".into(), "r1".into(), true).unwrap();
        drop(store);

        let restarted = TokenStore::open(Some(path)).unwrap();
        let snap = restarted.snapshot();
        assert_eq!(snap.access_token, None);
        assert_eq!(snap.refresh_token.as_deref(), Some("r1"));
        assert!(snap.remember);
    }

    #[test]
    fn test_replace_pair_keeps_scope() {
        let (_dir, path) = scratch();
        let store = TokenStore::open(Some(path.clone())).unwrap();
        store.set_pair("a1".into(), "r1".into(), true).unwrap();
        store.replace_pair("a2".into(), "r2".into()).unwrap();

        let restarted = TokenStore::open(Some(path)).unwrap();
        assert_eq!(restarted.refresh_token().as_deref(), Some("r2"));
    }

    #[test]
    fn test_switching_to_session_scope_removes_file() {
        let (_dir, path) = scratch();
        let store = TokenStore::open(Some(path.clone())).unwrap();
        store.set_pair("a1".into(), "r1".into(), true).unwrap();
        assert!(path.exists());

        store.set_pair("a2".into(), "r2".into(), false).unwrap();
        assert!(!path.exists());
        assert_eq!(store.refresh_token().as_deref(), Some("r2"));
    }

    #[test]
    fn test_clear_empties_both_scopes() {
        let (_dir, path) = scratch();
        let store = TokenStore::open(Some(path.clone())).unwrap();
        store.set_pair("a1".into(), "r1".into(), true).unwrap();

        store.clear().unwrap();
        assert!(!store.has_session());
        assert!(!path.exists());
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_discarded() {
        let (_dir, path) = scratch();
        fs::write(&path, b"{not json").unwrap();

        let store = TokenStore::open(Some(path.clone())).unwrap();
        assert!(!store.has_session());
        assert!(!path.exists());
    }
}
