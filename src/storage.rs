use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tracing::{error, warn};

pub const TIPS_KEY: &str = "tip-tracker-tips";
pub const LEADERBOARD_KEY: &str = "tip-tracker-leaderboard";
pub const USER_NAME_KEY: &str = "tip-tracker-user-name";
pub const DAILY_STATS_KEY: &str = "tip-tracker-daily-stats";
pub const WEEKLY_STATS_KEY: &str = "tip-tracker-weekly-stats";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Io(#[from] std::io::Error),

    #[error("quota exceeded writing {key}: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("failed to encode value: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("corrupt entry under {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A flat string-keyed store holding raw text values.
pub trait KvBackend: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process backend. A quota caps the summed byte size of keys and values.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota: Some(limit),
        }
    }

    pub fn insert_raw(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn size_with(&self, key: &str, value: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + value.len()
    }
}

impl KvBackend for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        if let Some(limit) = self.quota {
            let needed = self.size_with(key, &value);
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Backend stored as one JSON object (`key -> raw string`) in a file.
///
/// The whole object is rewritten on every change. A write that fails leaves
/// both the file and the cached entries as they were.
#[derive(Debug)]
pub struct FileKv {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileKv {
    /// Opens the store at `path`. A missing file starts empty; an unreadable
    /// or unparseable one is logged and also starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let payload = serde_json::to_vec_pretty(entries).map_err(StorageError::Serialize)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> BTreeMap<String, String> {
    match fs::read(path) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse data file {}: {err}", path.display());
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            error!("failed to read data file {}: {err}", path.display());
            BTreeMap::new()
        }
    }
}

impl KvBackend for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value);
        self.write_entries(&next)?;
        self.entries = next;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if !self.entries.contains_key(key) {
            return Ok(());
        }
        let mut next = self.entries.clone();
        next.remove(key);
        self.write_entries(&next)?;
        self.entries = next;
        Ok(())
    }
}

pub type FailureHook = Arc<dyn Fn(&str, &StorageError) + Send + Sync>;

/// Typed JSON access over a [`KvBackend`]. No method returns an error: failures
/// are logged, reported to the failure hook if one is set, and dropped.
pub struct Persistence {
    backend: Box<dyn KvBackend>,
    on_failure: Option<FailureHook>,
}

impl Persistence {
    pub fn new(backend: impl KvBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            on_failure: None,
        }
    }

    pub fn with_failure_hook(mut self, hook: FailureHook) -> Self {
        self.on_failure = Some(hook);
        self
    }

    pub fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(StorageError::Serialize)
            .and_then(|raw| self.backend.set(key, raw));
        if let Err(err) = result {
            error!("failed to save {key}: {err}");
            self.report(key, &err);
        }
    }

    /// Returns `default` when the key is absent, unreadable or corrupt.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(err) => {
                error!("failed to load {key}: {err}");
                self.report(key, &err);
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(source) => {
                let err = StorageError::Corrupt {
                    key: key.to_string(),
                    source,
                };
                warn!("{err}, using default");
                self.report(key, &err);
                default
            }
        }
    }

    pub fn remove(&mut self, key: &str) {
        if let Err(err) = self.backend.remove(key) {
            error!("failed to remove {key}: {err}");
            self.report(key, &err);
        }
    }

    fn report(&self, key: &str, err: &StorageError) {
        if let Some(hook) = &self.on_failure {
            hook(key, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TipRecord, WeeklyStats};
    use chrono::NaiveDate;
    use std::sync::Mutex;

    fn sample_tip(id: &str, amount: u64) -> TipRecord {
        TipRecord {
            id: id.to_string(),
            amount,
            date: "2026-01-05".to_string(),
            time: "12:30".to_string(),
            contributor_id: 7,
            contributor_name: "Ana".to_string(),
            contributor_handle: Some("ana".to_string()),
        }
    }

    fn recording_hook() -> (FailureHook, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let hook: FailureHook = Arc::new(move |key: &str, _err: &StorageError| {
            sink.lock().unwrap().push(key.to_string());
        });
        (hook, seen)
    }

    fn temp_file(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("tip_tracker_{name}_{}_{nanos}.json", std::process::id()));
        path
    }

    #[test]
    fn save_then_load_returns_equal_records() {
        let mut persistence = Persistence::new(MemoryKv::new());
        let tips = vec![sample_tip("1-a", 100), sample_tip("2-b", 50)];
        persistence.save(TIPS_KEY, &tips);

        let loaded: Vec<TipRecord> = persistence.load(TIPS_KEY, Vec::new());
        assert_eq!(loaded, tips);
    }

    #[test]
    fn load_missing_key_returns_default() {
        let persistence = Persistence::new(MemoryKv::new());
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let weekly = persistence.load(WEEKLY_STATS_KEY, WeeklyStats::empty(today));
        assert_eq!(weekly, WeeklyStats::empty(today));
        assert_eq!(persistence.load(USER_NAME_KEY, String::new()), "");
    }

    #[test]
    fn corrupt_entry_falls_back_to_default_and_reports() {
        let mut kv = MemoryKv::new();
        kv.insert_raw(TIPS_KEY, "[{not json");
        let (hook, seen) = recording_hook();
        let persistence = Persistence::new(kv).with_failure_hook(hook);

        let loaded: Vec<TipRecord> = persistence.load(TIPS_KEY, Vec::new());
        assert!(loaded.is_empty());
        assert_eq!(seen.lock().unwrap().as_slice(), [TIPS_KEY.to_string()]);
    }

    #[test]
    fn quota_rejection_is_swallowed_and_reported() {
        let (hook, seen) = recording_hook();
        let mut persistence = Persistence::new(MemoryKv::with_quota(64)).with_failure_hook(hook);

        let tips: Vec<TipRecord> = (0..10).map(|i| sample_tip(&i.to_string(), 10)).collect();
        persistence.save(TIPS_KEY, &tips);

        assert_eq!(seen.lock().unwrap().len(), 1);
        let loaded: Vec<TipRecord> = persistence.load(TIPS_KEY, Vec::new());
        assert!(loaded.is_empty());
    }

    #[test]
    fn remove_deletes_entry_and_ignores_missing_keys() {
        let mut persistence = Persistence::new(MemoryKv::new());
        persistence.save(USER_NAME_KEY, "Ana");
        persistence.remove(USER_NAME_KEY);
        persistence.remove(USER_NAME_KEY);
        assert_eq!(persistence.load(USER_NAME_KEY, String::from("none")), "none");
    }

    #[test]
    fn file_backend_survives_reopen() {
        let path = temp_file("reopen");
        {
            let mut persistence = Persistence::new(FileKv::open(&path));
            persistence.save(TIPS_KEY, &vec![sample_tip("1-a", 100)]);
        }

        let persistence = Persistence::new(FileKv::open(&path));
        let loaded: Vec<TipRecord> = persistence.load(TIPS_KEY, Vec::new());
        assert_eq!(loaded, vec![sample_tip("1-a", 100)]);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn file_backend_starts_empty_on_garbage() {
        let path = temp_file("garbage");
        fs::write(&path, b"definitely not json").unwrap();

        let kv = FileKv::open(&path);
        assert_eq!(kv.get(TIPS_KEY).unwrap(), None);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn failed_file_write_keeps_previous_entries() {
        let mut dir = temp_file("missing_dir");
        dir.set_extension("");
        let mut kv = FileKv::open(dir.join("nested").join("state.json"));

        assert!(kv.set(TIPS_KEY, "[]".to_string()).is_err());
        assert_eq!(kv.get(TIPS_KEY).unwrap(), None);
    }
}
