use chrono::Utc;
use serde::{Deserialize, Serialize};

/// reserved payload key carrying the `EnvelopeMeta`, never handed out as part of a record
pub const META_KEY: &str = "_aurora_meta";

/// format version written into fresh envelopes
pub const FORMAT_VERSION: &str = "1.0";

/// naive UTC ISO-8601 with microseconds, e.g. `2024-03-01T12:30:45.123456`
pub fn timestamp_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Bookkeeping stored next to every record.
///
/// `edit_count` starts at 0 on the first embed and grows by one per committed edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub embedded_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub edit_count: u64,
}

impl EnvelopeMeta {
    /// metadata for a record embedded for the first time
    pub fn fresh(version: &str) -> Self {
        Self {
            version: version.to_string(),
            embedded_at: timestamp_now(),
            last_modified: None,
            edit_count: 0,
        }
    }

    /// Metadata for the next committed edit.
    ///
    /// Keeps the original `embedded_at`, stamps `last_modified` and increments `edit_count`.
    pub fn next_edit(previous: Option<&EnvelopeMeta>, version: &str) -> Self {
        let now = timestamp_now();
        let (embedded_at, edit_count) = match previous {
            Some(meta) if !meta.embedded_at.is_empty() => {
                (meta.embedded_at.clone(), meta.edit_count.saturating_add(1))
            }
            Some(meta) => (now.clone(), meta.edit_count.saturating_add(1)),
            None => (now.clone(), 1),
        };

        Self {
            version: version.to_string(),
            embedded_at,
            last_modified: Some(now),
            edit_count,
        }
    }
}
