//! Local persistence for anonymous sessions.
//!
//! The record is stored as one JSON document under a single key. A record
//! that fails to decode is treated as absent: startup never blocks on
//! corrupt local state.

use std::cell::RefCell;

use super::database::Database;
use crate::error::CoreError;
use crate::progress::ProgressRecord;

/// Key under which the anonymous record is stored.
pub const PROGRESS_KEY: &str = "ascent.progress";

/// Durable store for the anonymous progress record.
pub trait LocalStore {
    /// The saved record, or `None` if nothing usable is stored.
    fn load(&self) -> Option<ProgressRecord>;

    /// Replace the saved record with `record`.
    fn save(&self, record: &ProgressRecord) -> Result<(), CoreError>;
}

fn decode(raw: &str) -> Option<ProgressRecord> {
    match ProgressRecord::from_json(raw) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(error = %e, "discarding undecodable local progress record");
            None
        }
    }
}

/// `LocalStore` over the SQLite kv table.
pub struct SqliteLocalStore {
    db: Database,
}

impl SqliteLocalStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl LocalStore for SqliteLocalStore {
    fn load(&self) -> Option<ProgressRecord> {
        match self.db.kv_get(PROGRESS_KEY) {
            Ok(Some(raw)) => decode(&raw),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read local progress record");
                None
            }
        }
    }

    fn save(&self, record: &ProgressRecord) -> Result<(), CoreError> {
        let raw = serde_json::to_string(record)?;
        self.db.kv_set(PROGRESS_KEY, &raw)?;
        Ok(())
    }
}

/// `LocalStore` held in memory as the raw JSON string.
#[derive(Debug, Default)]
pub struct MemoryLocalStore {
    raw: RefCell<Option<String>>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an arbitrary stored payload, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: RefCell::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.borrow().clone()
    }
}

impl LocalStore for MemoryLocalStore {
    fn load(&self) -> Option<ProgressRecord> {
        self.raw.borrow().as_deref().and_then(decode)
    }

    fn save(&self, record: &ProgressRecord) -> Result<(), CoreError> {
        *self.raw.borrow_mut() = Some(serde_json::to_string(record)?);
        Ok(())
    }
}

impl<T: LocalStore + ?Sized> LocalStore for std::rc::Rc<T> {
    fn load(&self) -> Option<ProgressRecord> {
        (**self).load()
    }

    fn save(&self, record: &ProgressRecord) -> Result<(), CoreError> {
        (**self).save(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Level;

    #[test]
    fn sqlite_round_trip() {
        let store = SqliteLocalStore::new(Database::open_memory().unwrap());
        assert!(store.load().is_none());

        let mut record = ProgressRecord::default();
        record.set_net_worth(12_000_000);
        record.insert_unit("m1", 2);
        store.save(&record).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.current_level, Level::Accumulator);
        assert_eq!(loaded.completion_count("m1"), 1);
    }

    #[test]
    fn corrupt_record_loads_as_none() {
        let store = MemoryLocalStore::with_raw("{not json");
        assert!(store.load().is_none());

        let db = Database::open_memory().unwrap();
        db.kv_set(PROGRESS_KEY, "[1,2,3]").unwrap();
        assert!(SqliteLocalStore::new(db).load().is_none());
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let store = MemoryLocalStore::new();
        let mut record = ProgressRecord::default();
        record.revenue = 10.0;
        store.save(&record).unwrap();
        record.revenue = 20.0;
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap().revenue, 20.0);
    }
}
