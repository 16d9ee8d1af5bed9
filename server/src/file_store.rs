// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use planner_common::KeyValueStore;
use tracing::debug;

/// Key-value store keeping one `<key>.json` file per key in a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // Helper function to get the full path of the file backing `key`
    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!("Read {} bytes from {}", bytes.len(), path.display());
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        // Ensure the directory exists before saving the file
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory {}", self.dir.display()))?;

        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_key_is_absent() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        assert_eq!(store.get("nothing_here").unwrap(), None);
    }

    #[test]
    fn test_set_creates_directory_and_overwrites() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested").join("data"));

        store.set("tasks", b"[1]").unwrap();
        store.set("tasks", b"[2]").unwrap();

        assert_eq!(store.get("tasks").unwrap(), Some(b"[2]".to_vec()));
        assert!(store.dir().join("tasks.json").exists());
    }

    #[test]
    fn test_keys_do_not_collide() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path());

        store.set("a", b"1").unwrap();
        store.set("b", b"2").unwrap();

        assert_eq!(store.get("a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get("b").unwrap(), Some(b"2".to_vec()));
    }
}
