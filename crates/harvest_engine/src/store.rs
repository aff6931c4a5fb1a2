use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use harvest_core::{CandidateLink, ProcessedSet};
use harvest_logging::harvest_info;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

const STORE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read processed record at {path:?}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
    #[error("processed record at {path:?} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("processed record has unsupported version {0}")]
    UnsupportedVersion(u32),
    #[error("another harvest appears to be running (lock file {0:?} exists)")]
    Locked(PathBuf),
    #[error("failed to encode processed record: {0}")]
    Encode(serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    processed: Vec<String>,
}

/// Durable home of the [`ProcessedSet`], one JSON document per harvest.
///
/// Loading distinguishes a missing record (first run, empty set) from an
/// unreadable or corrupt one: the latter is fatal, a run must never quietly
/// start from scratch and download everything again.
pub struct ProcessedStore {
    path: PathBuf,
}

impl ProcessedStore {
    pub fn new(cache_dir: &Path, cache_file: &str) -> Self {
        Self {
            path: cache_dir.join(cache_file),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<ProcessedSet, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                harvest_info!("No processed record at {:?} yet, starting empty", self.path);
                return Ok(ProcessedSet::new());
            }
            Err(err) => {
                return Err(StoreError::Unreadable {
                    path: self.path.clone(),
                    reason: err.to_string(),
                });
            }
        };

        let document: StoreDocument =
            serde_json::from_str(&content).map_err(|err| StoreError::Corrupt {
                path: self.path.clone(),
                reason: err.to_string(),
            })?;
        if document.version != STORE_VERSION {
            return Err(StoreError::UnsupportedVersion(document.version));
        }

        Ok(ProcessedSet::from_links(
            document
                .processed
                .into_iter()
                .map(CandidateLink::from_normalized),
        ))
    }

    /// Atomically replace the record with `set` by writing a temp file in
    /// the same directory and renaming it into place.
    pub fn persist(&self, set: &ProcessedSet) -> Result<(), StoreError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let document = StoreDocument {
            version: STORE_VERSION,
            processed: set.iter().map(|link| link.as_str().to_string()).collect(),
        };
        let content = serde_json::to_string_pretty(&document).map_err(StoreError::Encode)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // The rename replaces any existing record in one step; the previous
        // record stays intact until the new one is fully in place.
        tmp.persist(&self.path).map_err(|err| StoreError::Io(err.error))?;
        Ok(())
    }

    /// Take the single-runner lock next to the record. The guard removes the
    /// lock file when dropped.
    pub fn lock(&self) -> Result<StoreLock, StoreError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let lock_path = self.path.with_extension("lock");
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(_) => Ok(StoreLock { path: lock_path }),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                Err(StoreError::Locked(lock_path))
            }
            Err(err) => Err(StoreError::Io(err)),
        }
    }
}

/// Held for the duration of one run.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
