//! Durable storage for the bearer token that represents the current session.
//!
//! The API client never keeps the token in memory between calls. Instead it
//! asks a [`TokenStore`] on every authenticated request, so a token written by
//! another process (or rotated by a fresh login) is picked up immediately.
//!
//! Two stores are provided:
//!
//! - [`FileTokenStore`]: one file named [`TOKEN_KEY`] inside the data
//!   directory (`~/.taskdeck/` by default), mode 0600 on Unix.
//! - [`MemoryTokenStore`]: process-local, for tests and embedding.
//!
//! # Example
//!
//! ```
//! use taskdeck_client::session::{MemoryTokenStore, SessionToken, TokenStore};
//!
//! let store = MemoryTokenStore::new();
//! assert!(store.load().unwrap().is_none());
//!
//! store.save(&SessionToken::new("abc")).unwrap();
//! assert_eq!(store.load().unwrap().unwrap().expose(), "abc");
//!
//! store.clear().unwrap();
//! assert!(store.load().unwrap().is_none());
//! ```

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroize;

/// Well-known key (file name) under which the token is persisted.
pub const TOKEN_KEY: &str = "token";

/// Errors that can occur while reading or writing the stored token.
#[derive(Error, Debug)]
pub enum SessionError {
    /// I/O error on the token file.
    #[error("token store I/O error: {0}")]
    Io(#[from] io::Error),
}

/// An opaque bearer token.
///
/// The value is wiped from memory on drop and never shown by `Debug`, so it
/// can be passed through `tracing` fields without leaking.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for use in an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the token is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

impl Drop for SessionToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// A durable key-value slot holding at most one session token.
///
/// Implementations must be cheap to call; the API client reads the token on
/// every authenticated request.
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Returns the stored token, or `None` when no session exists.
    fn load(&self) -> Result<Option<SessionToken>, SessionError>;

    /// Replaces the stored token.
    fn save(&self, token: &SessionToken) -> Result<(), SessionError>;

    /// Removes the stored token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Token store backed by a single file in the data directory.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the token file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(TOKEN_KEY)
    }

    /// Directory the store lives in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SessionToken>, SessionError> {
        let path = self.path();
        let mut contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let token = SessionToken::new(contents.trim());
        contents.zeroize();

        if token.is_blank() {
            debug!(path = %path.display(), "Token file is empty");
            return Ok(None);
        }
        Ok(Some(token))
    }

    fn save(&self, token: &SessionToken) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path();
        let mut file = File::create(&path)?;
        file.write_all(token.expose().as_bytes())?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        debug!(path = %path.display(), "Session token saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let path = self.path();
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Session token removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<SessionToken>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(SessionToken::new(token))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SessionToken>, SessionError> {
        let token = self.token.read().unwrap_or_else(PoisonError::into_inner);
        Ok(token.clone())
    }

    fn save(&self, token: &SessionToken) -> Result<(), SessionError> {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
        Ok(())
    }
}
