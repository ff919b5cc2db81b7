use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::KeyValueStore;
use crate::error::StorageError;

/// Store backed by a single JSON object file (`{ key: value }`).
///
/// The file is read once at open and rewritten on every mutation, or once
/// per batch while a batch is open.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    state: Mutex<FileState>,
}

#[derive(Debug, Default)]
struct FileState {
    entries: BTreeMap<String, String>,
    batch_depth: u32,
    dirty: bool,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        "Progress file {} is corrupt ({}), starting empty",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            "Opened progress file {} with {} keys",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            state: Mutex::new(FileState {
                entries,
                ..FileState::default()
            }),
        })
    }

    /// `<data-local-dir>/chesstrainer/progress.json`, or the working directory when unknown.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chesstrainer")
            .join("progress.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FileState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn flush(&self, state: &mut FileState) -> Result<(), StorageError> {
        if state.batch_depth > 0 {
            state.dirty = true;
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&state.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        state.dirty = false;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut state = self.lock();
        state.entries.insert(key.to_string(), value.to_string());
        self.flush(&mut state)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut state = self.lock();
        if state.entries.remove(key).is_some() {
            self.flush(&mut state)?;
        }
        Ok(())
    }

    fn begin_batch(&self) {
        self.lock().batch_depth += 1;
    }

    fn end_batch(&self) -> Result<(), StorageError> {
        let mut state = self.lock();
        state.batch_depth = state.batch_depth.saturating_sub(1);
        if state.batch_depth == 0 && state.dirty {
            self.flush(&mut state)?;
        }
        Ok(())
    }
}
