use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use dash_logging::{dash_debug, dash_warn};
use tempfile::NamedTempFile;
use thiserror::Error;

/// File holding the client's durable key/value pairs.
pub const STATE_FILENAME: &str = ".examdash_state.ron";
/// Key of the unresolved job reference.
pub const JOB_ID_KEY: &str = "jobId";
/// Key of the theme preference (`dark` / `light`).
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("could not serialize state: {0}")]
    Serialize(String),
    #[error("could not write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Durable string key/value storage, one RON map per state directory.
///
/// Every write rewrites the whole file, so at most one value per key exists.
#[derive(Debug, Clone)]
pub struct ClientStorage {
    dir: PathBuf,
}

impl ClientStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STATE_FILENAME)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    /// Like [`get`](Self::get), but a damaged or unreadable file reads as empty.
    pub fn get_or_none(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Ok(value) => value,
            Err(err) => {
                dash_warn!("Ignoring stored {}: {}", key, err);
                None
            }
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(StorageError::Read { path, source }),
        };
        ron::from_str(&content).map_err(|err| StorageError::Parse {
            path,
            message: err.to_string(),
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(entries, pretty)
            .map_err(|err| StorageError::Serialize(err.to_string()))?;
        let path = self.path();
        self.replace_file(&content)
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;
        dash_debug!("Saved client state to {:?}", path);
        Ok(())
    }

    /// Temp file in the same directory, then a rename over the state file.
    fn replace_file(&self, content: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file_mut().sync_all()?;

        let target = self.path();
        // Windows refuses to rename over an existing file.
        if cfg!(windows) && target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|err| err.error)?;
        Ok(())
    }
}

