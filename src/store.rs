use crate::engine::KvsEngine;
use crate::{KvStoreError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Full point-in-time copy of a store, keyed by the stored key.
pub type Snapshot = HashMap<String, Record>;

/// A versioned value.
///
/// Records are never modified once created, a newer write replaces the whole
/// record. The field names are capitalised on the wire to remain compatible
/// with existing nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Value")]
    pub value: String,

    /// Seconds since the Unix epoch at which the value was written.
    #[serde(rename = "Updated")]
    pub updated: i64,
}

impl Record {
    pub fn new(value: impl Into<String>, updated: i64) -> Self {
        Record {
            value: value.into(),
            updated,
        }
    }

    /// Whether this record should replace `other` during a merge.
    ///
    /// Only a strictly greater timestamp wins, equal timestamps keep the
    /// record already held.
    pub fn supersedes(&self, other: &Record) -> bool {
        self.updated > other.updated
    }
}

/// An in-memory key-value store guarded by a single lock.
///
/// Every operation takes the lock for its whole duration, so callers never
/// observe a partially applied [`KvsEngine::set_many`] or
/// [`KvsEngine::merge`]. Cloning is cheap and shares the same data.
#[derive(Clone, Debug, Default)]
pub struct KvStore {
    data: Arc<Mutex<HashMap<String, Record>>>,
}

impl KvStore {
    /// Create a new, empty KvStore.
    pub fn new() -> KvStore {
        KvStore::default()
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }
}

impl KvsEngine for KvStore {
    /// Set the value of a key, overwriting whatever was held regardless of
    /// its timestamp.
    fn set(&self, key: String, value: String) {
        let updated = Self::now();
        debug!(key, value, updated, "Setting key");
        self.data.lock().insert(key, Record { value, updated });
    }

    fn set_many(&self, pairs: HashMap<String, String>) {
        let updated = Self::now();
        debug!(count = pairs.len(), updated, "Setting keys");
        let mut data = self.data.lock();
        for (key, value) in pairs {
            data.insert(key, Record { value, updated });
        }
    }

    /// Retrieve the value of a key from the store.
    /// If the key does not exist, then [`KvStoreError::KeyNotFound`] is returned.
    fn get(&self, key: &str) -> Result<String> {
        debug!(key, "Getting key");
        match self.data.lock().get(key) {
            Some(record) => Ok(record.value.clone()),
            None => Err(KvStoreError::KeyNotFound {
                key: key.to_string(),
            }),
        }
    }

    fn merge(&self, incoming: Snapshot) -> usize {
        let mut applied = 0;
        let mut data = self.data.lock();
        for (key, record) in incoming {
            match data.get(&key) {
                Some(local) if !record.supersedes(local) => {
                    trace!(
                        key,
                        local = local.updated,
                        incoming = record.updated,
                        "Keeping local record"
                    );
                }
                _ => {
                    data.insert(key, record);
                    applied += 1;
                }
            }
        }
        debug!(applied, "Merged incoming records");
        applied
    }

    fn snapshot(&self) -> Snapshot {
        self.data.lock().clone()
    }

    fn len(&self) -> usize {
        self.data.lock().len()
    }
}
