//! # Storage - local snapshot of the game state
//!
//! The whole [`GameState`] is stored as one pretty-printed JSON document:
//!
//! ```text
//! data/
//! ├── game_state.json        ← latest committed state
//! └── game_state.json.lock   ← fs2 lock shared by readers and writers
//! ```
//!
//! Writes go to a uniquely named temp file in the same directory which is
//! then renamed over the snapshot, so a crash mid-write leaves the previous
//! snapshot intact. Readers take a shared lock on the sidecar, writers an
//! exclusive one.
//!
//! ```rust,no_run
//! use deskwars::game::seed::fresh_state;
//! use deskwars::storage::SnapshotStorage;
//!
//! let storage = SnapshotStorage::new("./data", "game_state.json");
//! let state = match storage.load() {
//!     Ok(Some(state)) => state,
//!     _ => fresh_state("local", "Pat", 0),
//! };
//! storage.save(&state)?;
//! # Ok::<(), deskwars::storage::StorageError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use log::debug;
use thiserror::Error;

use crate::game::GameState;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct SnapshotStorage {
    data_dir: PathBuf,
    file_name: String,
}

impl SnapshotStorage {
    pub fn new(data_dir: impl Into<PathBuf>, file_name: &str) -> Self {
        Self {
            data_dir: data_dir.into(),
            file_name: file_name.to_string(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    fn lock_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.lock", self.file_name))
    }

    fn open_lock(&self) -> Result<File, StorageError> {
        fs::create_dir_all(&self.data_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(self.lock_path())?;
        Ok(file)
    }

    /// Read the snapshot. `Ok(None)` when there is none yet (missing or
    /// empty file); `Err` when it exists but can't be read or parsed.
    pub fn load(&self) -> Result<Option<GameState>, StorageError> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let lock = self.open_lock()?;
        lock.lock_shared()?;

        let mut content = String::new();
        let read = File::open(&path).and_then(|mut f| f.read_to_string(&mut content));
        let _ = lock.unlock();
        match read {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let content = content.trim_matches(char::from(0)).trim();
        if content.is_empty() {
            return Ok(None);
        }
        let state: GameState = serde_json::from_str(content)?;
        debug!("loaded snapshot from {}", path.display());
        Ok(Some(state))
    }

    /// Atomically replace the snapshot with `state`.
    pub fn save(&self, state: &GameState) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(state)?;
        let lock = self.open_lock()?;
        lock.lock_exclusive()?;
        let result = write_atomic(&self.path(), &json);
        let _ = lock.unlock();
        result
    }

    /// Delete the snapshot. Returns whether one existed.
    pub fn remove(&self) -> Result<bool, StorageError> {
        let lock = self.open_lock()?;
        lock.lock_exclusive()?;
        let removed = match fs::remove_file(self.path()) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        };
        let _ = lock.unlock();
        removed
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<(), StorageError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("game_state.json");
    let mut counter = 0u32;
    let tmp_path = loop {
        let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut tmp) => {
                let written = tmp.write_all(content.as_bytes()).and_then(|_| tmp.flush());
                if let Err(e) = written {
                    drop(tmp);
                    let _ = fs::remove_file(&candidate);
                    return Err(e.into());
                }
                let _ = tmp.sync_all();
                break candidate;
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
            }
            Err(e) => return Err(e.into()),
        }
    };
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    if let Ok(dir_file) = File::open(dir) {
        let _ = dir_file.sync_all();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::seed::fresh_state;
    use tempfile::TempDir;

    #[test]
    fn missing_and_empty_files_load_as_none() {
        let dir = TempDir::new().unwrap();
        let storage = SnapshotStorage::new(dir.path(), "state.json");
        assert!(storage.load().unwrap().is_none());
        fs::write(storage.path(), "").unwrap();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let storage = SnapshotStorage::new(dir.path().join("nested"), "state.json");
        let mut state = fresh_state("p1", "Pat", 0);
        storage.save(&state).unwrap();
        state.player.coins = 7;
        storage.save(&state).unwrap();
        assert_eq!(storage.load().unwrap(), Some(state));

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn failed_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let storage = SnapshotStorage::new(dir.path(), "state.json");
        // A directory in the snapshot's place makes the final rename fail.
        fs::create_dir(storage.path()).unwrap();
        fs::write(storage.path().join("keep"), "x").unwrap();

        let result = storage.save(&fresh_state("p1", "Pat", 0));
        assert!(matches!(result, Err(StorageError::Io(_))));
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        let storage = SnapshotStorage::new(dir.path(), "state.json");
        fs::write(storage.path(), "{ not json").unwrap();
        assert!(matches!(storage.load(), Err(StorageError::Json(_))));
        assert!(storage.remove().unwrap());
        assert!(!storage.remove().unwrap());
    }
}
