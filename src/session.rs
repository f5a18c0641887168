//! Stored login session.
//!
//! The session lives in `<config dir>/.credentials` as pretty-printed JSON.
//! The config dir defaults to `~/.mockthis`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SessionError;
use crate::types::LoginSession;

const CONFIG_DIR_NAME: &str = ".mockthis";
const CREDENTIALS_FILE: &str = ".credentials";

/// Reads and writes the credentials artifact.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Store rooted at an explicit directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store at the default per-user location.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoConfigDir` if the home directory is unknown.
    pub fn default_location() -> Result<Self, SessionError> {
        dirs::home_dir()
            .map(|home| Self::new(home.join(CONFIG_DIR_NAME)))
            .ok_or(SessionError::NoConfigDir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    /// Load the stored session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoggedIn` if no session was saved.
    pub fn load(&self) -> Result<LoginSession, SessionError> {
        let path = self.credentials_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SessionError::NotLoggedIn)
            }
            Err(source) => return Err(SessionError::Read { path, source }),
        };

        serde_json::from_str(&content).map_err(|source| SessionError::Corrupt { path, source })
    }

    /// Persist `session`, replacing any previous one.
    pub fn save(&self, session: &LoginSession) -> Result<(), SessionError> {
        let path = self.credentials_path();
        let write_err = |source| SessionError::Write {
            path: path.clone(),
            source,
        };

        create_private_dir(&self.dir).map_err(write_err)?;
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        write_private_file(&path, json.as_bytes()).map_err(write_err)?;

        debug!(path = %path.display(), "saved credentials");
        Ok(())
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}
