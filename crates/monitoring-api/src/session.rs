//! Session credentials and their persistence.
//!
//! The [`Session`] is the single owner of the bearer token: it is set by
//! login, cleared by logout, and read by every request through the
//! [`crate::ApiClient`] it is injected into. A [`CredentialStore`] mirrors
//! it to a small key/value JSON file so the session survives restarts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use directories::ProjectDirs;
use tracing::{debug, info, warn};

use monitoring_shared::constants::{
    CREDENTIALS_FILE_NAME, STORAGE_KEY_DIVISION, STORAGE_KEY_TOKEN, STORAGE_KEY_USER_NAME,
};

use crate::error::SessionError;

// ---------------------------------------------------------------------------
// CredentialStore
// ---------------------------------------------------------------------------

/// Key/value file of persisted client state, keyed by fixed names.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Use the credential file at an explicit path.
    pub fn open_at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use the platform data directory:
    /// - Linux:   `~/.local/share/monitoring/credentials.json`
    /// - macOS:   `~/Library/Application Support/ru.niipm.monitoring/credentials.json`
    /// - Windows: `{FOLDERID_RoamingAppData}\niipm\monitoring\data\credentials.json`
    pub fn default_location() -> Result<Self, SessionError> {
        let dirs = ProjectDirs::from("ru", "niipm", "monitoring").ok_or(SessionError::NoDataDir)?;
        Ok(Self::open_at(dirs.data_dir().join(CREDENTIALS_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored entries. A missing file reads as empty.
    pub fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.load()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    pub fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;
        debug!(path = %self.path.display(), "Credentials written");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// What the session currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub token: Option<String>,
    pub user_name: Option<String>,
    /// Last-used division.
    pub division_id: Option<i32>,
}

/// Shared session handle. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: Arc<RwLock<Credentials>>,
    storage: Option<Arc<CredentialStore>>,
}

impl Session {
    /// A session that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load persisted credentials and keep them in sync from now on.
    ///
    /// An unreadable credential file is reset to empty, so the client starts
    /// signed out instead of refusing to start.
    pub fn restore(storage: CredentialStore) -> Result<Self, SessionError> {
        let entries = match storage.load() {
            Ok(entries) => entries,
            Err(SessionError::Corrupt(e)) => {
                warn!(
                    path = %storage.path().display(),
                    error = %e,
                    "Discarding corrupt credential file"
                );
                let empty = BTreeMap::new();
                storage.save(&empty)?;
                empty
            }
            Err(e) => return Err(e),
        };
        let credentials = Credentials {
            token: entries.get(STORAGE_KEY_TOKEN).cloned(),
            user_name: entries.get(STORAGE_KEY_USER_NAME).cloned(),
            division_id: entries
                .get(STORAGE_KEY_DIVISION)
                .and_then(|v| v.parse::<i32>().ok()),
        };
        debug!(
            authenticated = credentials.token.is_some(),
            "Session restored"
        );

        Ok(Self {
            state: Arc::new(RwLock::new(credentials)),
            storage: Some(Arc::new(storage)),
        })
    }

    pub fn snapshot(&self) -> Credentials {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn user_name(&self) -> Option<String> {
        self.snapshot().user_name
    }

    pub fn division_id(&self) -> Option<i32> {
        self.snapshot().division_id
    }

    /// Store the credentials of a successful login.
    pub fn sign_in(
        &self,
        token: &str,
        user_name: &str,
        division_id: Option<i32>,
    ) -> Result<(), SessionError> {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.token = Some(token.to_string());
            state.user_name = Some(user_name.to_string());
            if division_id.is_some() {
                state.division_id = division_id;
            }
        }

        if let Some(storage) = &self.storage {
            storage.set(STORAGE_KEY_TOKEN, token)?;
            storage.set(STORAGE_KEY_USER_NAME, user_name)?;
            if let Some(division) = division_id {
                storage.set(STORAGE_KEY_DIVISION, &division.to_string())?;
            }
        }

        info!(user = %user_name, "Session started");
        Ok(())
    }

    /// Remember the last-used division.
    pub fn set_division(&self, division_id: i32) -> Result<(), SessionError> {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .division_id = Some(division_id);
        if let Some(storage) = &self.storage {
            storage.set(STORAGE_KEY_DIVISION, &division_id.to_string())?;
        }
        Ok(())
    }

    /// Forget everything, in memory and on disk.
    pub fn sign_out(&self) -> Result<(), SessionError> {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Credentials::default();
        if let Some(storage) = &self.storage {
            storage.remove(STORAGE_KEY_TOKEN)?;
            storage.remove(STORAGE_KEY_USER_NAME)?;
            storage.remove(STORAGE_KEY_DIVISION)?;
        }
        info!("Session cleared");
        Ok(())
    }
}
