//! Directory-backed configuration sources.
//!
//! Each `<key>.json` file in a directory is one source entry. Polling
//! compares file contents against the previous poll and emits a Set for new
//! or changed files and a Del for removed ones.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use devnet_common::{DevNetError, DevNetResult, SourceEvent};

const SOURCE_EXTENSION: &str = "json";

/// Polls a directory of JSON files, decoding them into `T`.
pub struct DirectorySource<T> {
    dir: PathBuf,
    /// Raw contents by key as of the last poll.
    known: BTreeMap<String, String>,
    _payload: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> DirectorySource<T> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            known: BTreeMap::new(),
            _payload: PhantomData,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys seen in the last poll.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.known.keys().map(String::as_str)
    }

    /// Returns events for everything that changed since the last poll.
    ///
    /// A missing directory reads as empty. Files that fail to decode are
    /// skipped and retried on the next poll.
    pub fn poll(&mut self) -> Vec<SourceEvent<T>> {
        let current = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read source directory: {}", e);
                return Vec::new();
            }
        };

        let mut events = Vec::new();

        let removed: Vec<String> = self
            .known
            .keys()
            .filter(|key| !current.contains_key(*key))
            .cloned()
            .collect();
        for key in removed {
            debug!("Source {} removed from {}", key, self.dir.display());
            self.known.remove(&key);
            events.push(SourceEvent::del(key));
        }

        for (key, content) in current {
            if self.known.get(&key) == Some(&content) {
                continue;
            }

            match serde_json::from_str::<T>(&content) {
                Ok(value) => {
                    debug!("Source {} updated in {}", key, self.dir.display());
                    self.known.insert(key.clone(), content);
                    events.push(SourceEvent::set(key, value));
                }
                Err(e) => warn!(
                    "{}",
                    DevNetError::json(format!("decoding {}/{}.json", self.dir.display(), key), e)
                ),
            }
        }

        events
    }

    fn read_entries(&self) -> DevNetResult<BTreeMap<String, String>> {
        let mut entries = BTreeMap::new();
        let dir_name = self.dir.display().to_string();

        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => return Err(DevNetError::io(dir_name, e)),
        };

        for entry in read_dir {
            let path = entry.map_err(|e| DevNetError::io(&dir_name, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SOURCE_EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            match fs::read_to_string(&path) {
                Ok(content) => {
                    entries.insert(key.to_string(), content);
                }
                // Removed between listing and reading
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(DevNetError::io(path.display().to_string(), e)),
            }
        }

        Ok(entries)
    }
}
