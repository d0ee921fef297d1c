//! JSON file store.
//!
//! Layout: one file holding `{"version": N, "data": {...}}`. Writes go to a
//! temp file in the same directory, are fsynced, then renamed over the target,
//! so readers only ever see a complete document.
//!
//! The version check and the rename run under an exclusive OS lock on a
//! sidecar `<file>.lock`, so every handle on the path (in this process or
//! another) commits one at a time. Readers never take the lock.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use super::{DocumentStore, StoreError, StoreResult, Versioned};

/// A [`DocumentStore`] persisted as a single JSON file.
#[derive(Debug)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    /// Creates a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sidecar file whose OS lock guards commits.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("document"));
        name.push(".lock");
        self.parent_dir().join(name)
    }

    /// Blocks until this handle holds the exclusive commit lock. Released when
    /// the returned file is dropped.
    fn lock_commits(&self) -> StoreResult<File> {
        fs::create_dir_all(self.parent_dir())?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        file.lock()?;
        Ok(file)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl<T: DeserializeOwned> JsonFileStore<T> {
    fn read_current(&self) -> StoreResult<Option<Versioned<T>>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }
}

impl<T: Serialize> JsonFileStore<T> {
    fn write_atomic(&self, doc: &Versioned<&T>) -> StoreResult<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(&dir)?;

        let bytes =
            serde_json::to_vec_pretty(doc).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl<T> DocumentStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> StoreResult<Option<Versioned<T>>> {
        self.read_current()
    }

    fn compare_and_swap(&self, expected: Option<u64>, value: &T) -> StoreResult<u64> {
        let _guard = self.write_lock.lock();
        let _commit_lock = self.lock_commits()?;

        let found = match self.read_current() {
            Ok(current) => current.map(|v| v.version),
            // A corrupt file counts as absent so the caller can rebuild it.
            Err(e) if e.is_corrupt() => None,
            Err(e) => return Err(e),
        };

        if found != expected {
            return Err(StoreError::VersionConflict { expected, found });
        }

        let version = found.map_or(1, |v| v + 1);
        self.write_atomic(&Versioned {
            version,
            data: value,
        })?;
        Ok(version)
    }
}
