use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::media::payload::{Record, META_KEY};

/// One field level change; `None` means the field was absent before or removed after
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// Diff capturing view over a decoded record.
///
/// Reads and writes behave like a plain map. A change is recorded exactly when
/// a write differs from the current value, so writing a field back to what it
/// already holds keeps the tracker unmodified.
#[derive(Debug, Clone, PartialEq)]
pub struct EditTracker {
    original: Record,
    working: Record,
    changes: Vec<FieldChange>,
}

impl EditTracker {
    pub fn new(record: Record) -> Self {
        Self {
            working: record.clone(),
            original: record,
            changes: Vec::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.working.get(field)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.working.contains_key(field)
    }

    /// Sets `field` to `value`, returns true if this was a change.
    ///
    /// The reserved metadata key is maintained by the codec and never set here.
    pub fn set<K: Into<String>, V: Into<Value>>(&mut self, field: K, value: V) -> bool {
        let field = field.into();
        if field == META_KEY {
            warn!("Ignoring write to the reserved field {META_KEY}");
            return false;
        }
        let value = value.into();
        let old_value = self.working.get(&field).cloned();
        if old_value.as_ref() == Some(&value) {
            return false;
        }

        self.working.insert(field.clone(), value.clone());
        self.changes.push(FieldChange {
            field,
            old_value,
            new_value: Some(value),
        });

        true
    }

    /// removes `field`, absent fields and the reserved metadata key are not a change
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        if field == META_KEY {
            return None;
        }
        let old_value = self.working.shift_remove(field)?;
        self.changes.push(FieldChange {
            field: field.to_string(),
            old_value: Some(old_value.clone()),
            new_value: None,
        });

        Some(old_value)
    }

    pub fn update<I, K, V>(&mut self, updates: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (field, value) in updates {
            self.set(field, value);
        }
    }

    /// the working copy including all changes so far
    pub fn record(&self) -> &Record {
        &self.working
    }

    /// the record as it was extracted
    pub fn original(&self) -> &Record {
        &self.original
    }

    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    pub fn is_modified(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn into_parts(self) -> (Record, Vec<FieldChange>) {
        (self.working, self.changes)
    }
}
