//! Flight log persistence in a single JSON object file.
//!
//! Every commit rewrites the file through a temp file and a rename, and a
//! sibling `.lock` file keeps a second process out until the store is dropped.
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use tempfile::NamedTempFile;
use thiserror::Error;
use wakeup_game::{KeyValueStore, WriteBatch};

const LOCK_TIMEOUT: Duration = Duration::from_secs(10);
const LOCK_RETRY: Duration = Duration::from_millis(25);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot encode state for {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("state file is locked by another run; remove {path} if no other run is active")]
    Locked { path: PathBuf },
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Exclusive hold on a state file, released on drop.
#[derive(Debug)]
struct StateLock {
    path: PathBuf,
}

impl StateLock {
    fn acquire(state: &Path) -> Result<Self, StoreError> {
        let path = sibling(state, ".lock");
        let deadline = Instant::now() + LOCK_TIMEOUT;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        return Err(StoreError::Locked { path });
                    }
                    thread::sleep(LOCK_RETRY);
                }
                Err(source) => return Err(StoreError::Io { path, source }),
            }
        }
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            warn!("could not release {}: {err}", self.path.display());
        }
    }
}

/// Key-value store backed by one JSON object of strings.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    _lock: StateLock,
}

impl JsonFileStore {
    /// Lock and open `path`. A missing file starts an empty store; an
    /// unreadable one is moved aside to `<path>.corrupt` and also starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let lock = StateLock::acquire(&path)?;
        let entries = match fs::read_to_string(&path) {
            Ok(text) => parse_entries(&path, &text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self {
            path,
            entries,
            _lock: lock,
        })
    }

    fn write_file(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|err| io_err(err.error))?;
        debug!("wrote {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}

fn parse_entries(path: &Path, text: &str) -> BTreeMap<String, String> {
    if text.trim().is_empty() {
        return BTreeMap::new();
    }
    match serde_json::from_str(text) {
        Ok(entries) => entries,
        Err(err) => {
            let aside = sibling(path, ".corrupt");
            warn!(
                "state file {} is unreadable ({err}); starting fresh, old copy at {}",
                path.display(),
                aside.display()
            );
            if let Err(err) = fs::rename(path, &aside) {
                warn!("could not move {} aside: {err}", path.display());
            }
            BTreeMap::new()
        }
    }
}

impl KeyValueStore for JsonFileStore {
    type Error = StoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn commit(&mut self, batch: WriteBatch) -> Result<(), Self::Error> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut next = self.entries.clone();
        batch.apply_to(&mut next);
        if next == self.entries {
            return Ok(());
        }
        self.write_file(&next)?;
        self.entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "wakeup-store-{label}-{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn missing_file_is_empty_and_writes_create_it() {
        let path = temp_path("create");
        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("WUM_FUEL").unwrap(), None);
        store.set("WUM_FUEL", "88").unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("WUM_FUEL").unwrap().as_deref(), Some("88"));
        drop(reopened);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn batch_lands_in_one_write() {
        let path = temp_path("batch");
        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("a", "1").unwrap();
        let mut batch = WriteBatch::new();
        batch.remove("a");
        batch.set("b", "2");
        batch.set("c", "3");
        store.commit(batch).unwrap();
        store.remove("never-there").unwrap();
        drop(store);

        let on_disk: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 2);
        assert_eq!(on_disk["b"], "2");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn corrupt_file_is_moved_aside_and_starts_empty() {
        let path = temp_path("garbage");
        fs::write(&path, r#"{"WUM_FUEL": "9"#).unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("WUM_FUEL").unwrap(), None);
        drop(store);

        let aside = sibling(&path, ".corrupt");
        assert_eq!(fs::read_to_string(&aside).unwrap(), r#"{"WUM_FUEL": "9"#);
        assert!(!path.exists());
        let _ = fs::remove_file(aside);
    }

    #[test]
    fn second_open_waits_for_the_lock() {
        let path = temp_path("lock");
        let store = JsonFileStore::open(&path).unwrap();
        let lock = sibling(&path, ".lock");
        assert!(lock.exists());

        let waiter = {
            let path = path.clone();
            thread::spawn(move || JsonFileStore::open(&path).map(|_| ()))
        };
        thread::sleep(Duration::from_millis(100));
        assert!(!waiter.is_finished());
        drop(store);
        waiter.join().unwrap().unwrap();
        assert!(!lock.exists());
    }
}
