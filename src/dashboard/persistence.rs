use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A string key-value store, the only durable state the dashboard owns.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A JSON object on disk, rewritten in full on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all().unwrap_or_else(|e| {
            tracing::warn!("discarding unreadable storage: {e:#}");
            HashMap::new()
        });
        entries.insert(key.to_string(), value.to_string());
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

pub const SESSION_KEY: &str = "tick-pom";

/// The stored day stamp, e.g. `Fri Oct 16 2026`.
fn day_stamp(day: NaiveDate) -> String {
    day.format("%a %b %d %Y").to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    date: String,
    count: u32,
}

/// Today's completed work sessions, stamped with the day they belong to.
pub struct SessionLog {
    store: Box<dyn KeyValueStore>,
}

impl SessionLog {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored count if it was written `today`, otherwise 0. Missing,
    /// unreadable, and malformed records all count as 0.
    pub fn load(&self, today: NaiveDate) -> u32 {
        let raw = match self.store.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return 0,
            Err(e) => {
                tracing::warn!("failed to read session record: {e:#}");
                return 0;
            }
        };
        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(record) if record.date == day_stamp(today) => record.count,
            Ok(_) => 0,
            Err(e) => {
                tracing::warn!("ignoring malformed session record: {e}");
                0
            }
        }
    }

    pub fn record(&mut self, today: NaiveDate, count: u32) -> Result<()> {
        let record = SessionRecord {
            date: day_stamp(today),
            count,
        };
        let json = serde_json::to_string(&record)?;
        self.store.set(SESSION_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn day_stamp_format() {
        assert_eq!(day_stamp(day(16)), "Fri Oct 16 2026");
        assert_eq!(day_stamp(day(5)), "Mon Oct 05 2026");
    }

    #[test]
    fn empty_store_loads_zero() {
        let log = SessionLog::new(Box::new(MemoryStore::default()));
        assert_eq!(log.load(day(16)), 0);
    }

    #[test]
    fn same_day_record_is_restored() {
        let mut log = SessionLog::new(Box::new(MemoryStore::default()));
        log.record(day(16), 3).unwrap();
        assert_eq!(log.load(day(16)), 3);
    }

    #[test]
    fn other_day_record_is_shadowed() {
        let mut log = SessionLog::new(Box::new(MemoryStore::default()));
        log.record(day(15), 6).unwrap();
        assert_eq!(log.load(day(16)), 0);
        // Still there until the next write.
        assert_eq!(log.load(day(15)), 6);
    }

    #[test]
    fn malformed_record_loads_zero() {
        let mut store = MemoryStore::default();
        store.set(SESSION_KEY, "{not json").unwrap();
        let log = SessionLog::new(Box::new(store));
        assert_eq!(log.load(day(16)), 0);
    }

    #[test]
    fn record_is_plain_json() {
        let mut store = MemoryStore::default();
        store
            .set(SESSION_KEY, r#"{"date":"Fri Oct 16 2026","count":2}"#)
            .unwrap();
        let log = SessionLog::new(Box::new(store));
        assert_eq!(log.load(day(16)), 2);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut log = SessionLog::new(Box::new(FileStore::new(&path)));
        log.record(day(16), 4).unwrap();

        let reopened = SessionLog::new(Box::new(FileStore::new(&path)));
        assert_eq!(reopened.load(day(16)), 4);
        assert_eq!(reopened.load(day(17)), 0);
    }

    #[test]
    fn file_store_recovers_from_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "garbage").unwrap();

        let mut store = FileStore::new(&path);
        assert!(store.get(SESSION_KEY).is_err());
        store.set(SESSION_KEY, "1").unwrap();
        assert_eq!(store.get(SESSION_KEY).unwrap().as_deref(), Some("1"));
    }
}
