//! Durable file-backed session storage (feature-gated).

use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use sessionkit_core::{SessionRecord, SessionStorage, StorageError};

const APP_DIR: &str = "sessionkit";
const FILE_NAME: &str = "session.json";

/// File storage implementation.
///
/// Keeps both session keys in one JSON document
/// (`{"token": "...", "user": "{...}"}`) so they are always replaced or
/// removed together. Writes go to a sibling temp file that is renamed over
/// the target.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a storage backed by `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.local/share/sessionkit/session.json` on Linux,
    /// `%LOCALAPPDATA%\sessionkit\session.json` on Windows, etc.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join(APP_DIR).join(FILE_NAME))
    }

    /// Create a storage at [`FileStorage::default_path`].
    ///
    /// # Errors
    /// Returns error if the platform has no local data directory.
    pub fn at_default_location() -> Result<Self, StorageError> {
        Self::default_path()
            .map(Self::new)
            .ok_or_else(|| StorageError::Internal("Unable to locate data dir".to_string()))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_else(|| FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SessionStorage for FileStorage {
    async fn load(&self) -> Result<Option<SessionRecord>, StorageError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_vec_pretty(record)
            .map_err(|e| StorageError::Internal(format!("encode session: {e}")))?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, data).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), "Session file written");
        Ok(())
    }

    async fn erase(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Session file removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
