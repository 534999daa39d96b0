use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::tracker::FieldChange;

/// One committed edit of a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub changes: Vec<FieldChange>,
}

/// Lazily created lock per card path, entries live as long as the table.
#[derive(Debug, Default)]
pub(crate) struct LockTable {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl LockTable {
    /// the one lock for `key`, creating it if needed
    pub(crate) fn lock_for(&self, key: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();

        Arc::clone(locks.entry(key.to_path_buf()).or_default())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().len()
    }
}

#[derive(Debug, Default)]
pub(crate) struct EditHistory {
    entries: Mutex<HashMap<PathBuf, Vec<HistoryEntry>>>,
}

impl EditHistory {
    pub(crate) fn append(&self, key: &Path, entry: HistoryEntry) {
        self.entries
            .lock()
            .entry(key.to_path_buf())
            .or_default()
            .push(entry);
    }

    pub(crate) fn get(&self, key: &Path) -> Vec<HistoryEntry> {
        self.entries.lock().get(key).cloned().unwrap_or_default()
    }
}

/// State shared by every coordinator handle of one process.
///
/// Edits of the same card are serialized through its lock, edits of different
/// cards run independently. The history is kept in memory only.
#[derive(Debug, Default)]
pub struct CoordinatorContext {
    pub(crate) locks: LockTable,
    pub(crate) history: EditHistory,
}

impl CoordinatorContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Two spellings of the same file share one key, files that do not
/// exist yet fall back to the path as given
pub(crate) fn canonical_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
