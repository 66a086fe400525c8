use std::collections::HashMap;

use crate::store::Snapshot;
use crate::Result;

/// Operations every storage engine behind the node must provide.
///
/// Implementations are cheap handles: cloning one yields another handle onto
/// the same underlying data, which is how the HTTP handlers and the sync loop
/// share a single store.
pub trait KvsEngine: Clone + Send + Sync + 'static {
    /// Write a value for the key, stamped with the current time.
    fn set(&self, key: String, value: String);

    /// Write every pair at once with a single shared timestamp.
    fn set_many(&self, pairs: HashMap<String, String>);

    fn get(&self, key: &str) -> Result<String>;

    /// Apply records from another node using last-write-wins, returning how
    /// many of them replaced (or created) a local record.
    fn merge(&self, incoming: Snapshot) -> usize;

    fn snapshot(&self) -> Snapshot;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
