//! Best-effort per-key persistence.
//!
//! Every persisted value lives under its own key and is read and written
//! independently; there is no grouping across keys. Failures are logged
//! here and never reach the dashboard: in-memory state stays authoritative.
//!
//! # Write-behind
//! Writes are staged in a [`WriteBehind`] buffer and flushed together once
//! no new write has arrived for the configured delay. A later write to
//! the same key replaces the pending one.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("failed to write {key}: {message}")]
    WriteFailed { key: String, message: String },

    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw string storage addressed by key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Unavailable(e.to_string())),
        }
    }

    /// Write-to-temp-then-rename so an interrupted write never leaves a
    /// truncated value behind.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let path = self.key_path(key);
        let temp = path.with_extension("tmp");
        let write_failed = |e: io::Error| StorageError::WriteFailed {
            key: key.to_string(),
            message: e.to_string(),
        };

        fs::write(&temp, value).map_err(write_failed)?;
        fs::rename(&temp, &path).map_err(write_failed)
    }
}

/// In-memory store used by tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    reject_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, like a full quota.
    pub fn rejecting_writes() -> Self {
        Self {
            values: HashMap::new(),
            reject_writes: true,
        }
    }

    pub fn with_value(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.reject_writes {
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                message: "quota exceeded".to_string(),
            });
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Pending writes plus the time of the most recent one.
#[derive(Debug, Clone)]
pub struct WriteBehind {
    delay: Duration,
    pending: BTreeMap<&'static str, String>,
    last_change: Option<Instant>,
}

impl WriteBehind {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: BTreeMap::new(),
            last_change: None,
        }
    }

    pub fn stage(&mut self, key: &'static str, value: String, now: Instant) {
        self.pending.insert(key, value);
        self.last_change = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Whether the idle delay has passed since the last staged write.
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_change {
            Some(changed) if self.is_dirty() => {
                now.saturating_duration_since(changed) >= self.delay
            }
            _ => false,
        }
    }

    /// Time left until the pending batch is due.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        let changed = self.last_change.filter(|_| self.is_dirty())?;
        Some(self.delay.saturating_sub(now.saturating_duration_since(changed)))
    }

    pub fn take_batch(&mut self) -> BTreeMap<&'static str, String> {
        self.last_change = None;
        std::mem::take(&mut self.pending)
    }
}

/// Logging facade over a [`KeyValueStore`] with write-behind.
#[derive(Debug)]
pub struct Persistence<S> {
    store: S,
    write_behind: WriteBehind,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S, delay: Duration) -> Self {
        Self {
            store,
            write_behind: WriteBehind::new(delay),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn load_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "failed to read persisted value");
                None
            }
        }
    }

    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.load_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "discarding unreadable persisted value");
                None
            }
        }
    }

    pub fn load_bool(&self, key: &str) -> Option<bool> {
        match self.load_raw(key)?.trim() {
            "true" => Some(true),
            "false" => Some(false),
            other => {
                warn!(key, value = other, "discarding unreadable persisted flag");
                None
            }
        }
    }

    pub fn load_string(&self, key: &str) -> Option<String> {
        self.load_raw(key)
    }

    pub fn stage_json<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
        now: Instant,
    ) {
        match serde_json::to_string(value) {
            Ok(json) => self.write_behind.stage(key, json, now),
            Err(source) => {
                let e = StorageError::Serialize {
                    key: key.to_string(),
                    source,
                };
                warn!(error = %e, "skipping persisted write");
            }
        }
    }

    pub fn stage_bool(&mut self, key: &'static str, value: bool, now: Instant) {
        self.write_behind.stage(key, value.to_string(), now);
    }

    pub fn stage_string(&mut self, key: &'static str, value: &str, now: Instant) {
        self.write_behind.stage(key, value.to_string(), now);
    }

    pub fn has_pending(&self) -> bool {
        self.write_behind.is_dirty()
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.write_behind.time_until_due(now)
    }

    /// Flush if the idle delay has elapsed. Returns the number of keys
    /// written successfully.
    pub fn poll(&mut self, now: Instant) -> usize {
        if self.write_behind.is_due(now) {
            self.flush()
        } else {
            0
        }
    }

    /// Write every pending value now. Failed keys are logged and dropped;
    /// the next change to them stages a fresh write.
    pub fn flush(&mut self) -> usize {
        let batch = self.write_behind.take_batch();
        let mut written = 0;
        for (key, value) in batch {
            match self.store.set(key, &value) {
                Ok(()) => written += 1,
                Err(e) => warn!(error = %e, "persisted write failed"),
            }
        }
        if written > 0 {
            debug!(written, "flushed persisted state");
        }
        written
    }
}
