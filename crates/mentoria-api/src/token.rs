//! Bearer token persistence.
//!
//! The session token is the only piece of client-side persisted state. It is
//! stored under the fixed key [`TOKEN_STORAGE_KEY`], either in memory or in a
//! small JSON file that mirrors browser local storage.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{ClientError, Result};

/// Key under which the bearer token is persisted.
pub const TOKEN_STORAGE_KEY: &str = "authToken";

/// Storage for the bearer token.
///
/// Implementations must be cheap to call; the HTTP wrapper reads the token
/// before every request.
pub trait TokenStore: Send + Sync + Debug {
    /// Returns the stored token, if any.
    fn load(&self) -> Result<Option<String>>;

    /// Replaces the stored token.
    fn save(&self, token: &str) -> Result<()>;

    /// Removes the stored token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// Token store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with a token.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

fn poisoned<T>(_: T) -> ClientError {
    ClientError::storage("token store lock poisoned")
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.lock().map_err(poisoned)?.clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock().map_err(poisoned)? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().map_err(poisoned)? = None;
        Ok(())
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// Token store backed by a JSON object on disk (`{"authToken": "..."}`).
///
/// Other keys in the file are preserved on save and clear. The file is read
/// once and the token kept in memory; `save` and `clear` write through. Only
/// those two, and the first `load`, touch the disk, so the per-request read
/// done by the HTTP wrapper never blocks the runtime on file I/O. The store
/// assumes it is the only writer of the token key while it lives.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    /// `None` until the file was read.
    cached: Mutex<Option<Option<String>>>,
}

impl FileTokenStore {
    /// Creates a store for the given file. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: Mutex::new(None),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(ClientError::storage(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| {
            ClientError::storage(format!("corrupt token file {}: {e}", self.path.display()))
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClientError::storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json).map_err(|e| {
            ClientError::storage(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let mut cached = self.cached.lock().map_err(poisoned)?;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }
        let entries = self.read_entries()?;
        let token = entries
            .get(TOKEN_STORAGE_KEY)
            .filter(|t| !t.is_empty())
            .cloned();
        *cached = Some(token.clone());
        Ok(token)
    }

    fn save(&self, token: &str) -> Result<()> {
        let mut cached = self.cached.lock().map_err(poisoned)?;
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(TOKEN_STORAGE_KEY.to_string(), token.to_string());
        self.write_entries(&entries)?;
        *cached = Some(Some(token.to_string()));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut cached = self.cached.lock().map_err(poisoned)?;
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            // A corrupt file cannot hold a usable token; start over.
            Err(_) => BTreeMap::new(),
        };
        entries.remove(TOKEN_STORAGE_KEY);
        if entries.is_empty() {
            match std::fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(ClientError::storage(format!(
                        "failed to remove {}: {e}",
                        self.path.display()
                    )));
                }
            }
        } else {
            self.write_entries(&entries)?;
        }
        *cached = Some(None);
        Ok(())
    }
}
