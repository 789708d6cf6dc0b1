use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::clock::clock::ClockState;
use crate::error::{Result, TimerError};

pub const SNAPSHOT_KEY: &str = "preparai_timer_full";

pub trait SnapshotStore: Send {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, blob: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SnapshotStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TimerError::Io(e)),
        }
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(blob.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.blobs.lock().ok()?.get(key).cloned()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(key.to_string(), blob.to_string());
        }
        Ok(())
    }
}

pub fn encode_snapshot(state: &ClockState) -> Result<String> {
    Ok(serde_json::to_string(state)?)
}

pub fn decode_snapshot(blob: &str) -> Result<ClockState> {
    let mut state: ClockState = serde_json::from_str(blob)?;
    state.sanitize();
    Ok(state)
}

/// Reads the last snapshot. Any read or parse failure counts as "no prior
/// state".
pub fn load_snapshot(store: &dyn SnapshotStore) -> Option<ClockState> {
    let blob = match store.load(SNAPSHOT_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Failed to read timer snapshot: {}", e);
            return None;
        }
    };
    match decode_snapshot(&blob) {
        Ok(state) => Some(state),
        Err(e) => {
            log::warn!("Discarding corrupt timer snapshot: {}", e);
            None
        }
    }
}

pub fn save_snapshot(store: &dyn SnapshotStore, state: &ClockState) {
    let result = encode_snapshot(state).and_then(|blob| store.save(SNAPSHOT_KEY, &blob));
    if let Err(e) = result {
        log::error!("Failed to save timer snapshot: {}", e);
    }
}
