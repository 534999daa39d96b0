use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use log::{debug, info};
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::RawMutex;

use super::context::{CoordinatorContext, HistoryEntry};
use super::tracker::EditTracker;
use crate::codec::StegoCodec;
use crate::media::payload::{timestamp_now, EnvelopeMeta, Record};
use crate::Result;

/// An open edit of one card, holding the card's lock until it is
/// committed, discarded or dropped.
///
/// Dereferences to the [`EditTracker`] of the extracted record, so fields are
/// read and written on the session directly.
pub struct EditSession<'c> {
    codec: &'c StegoCodec,
    context: &'c CoordinatorContext,
    path: PathBuf,
    key: PathBuf,
    meta: Option<EnvelopeMeta>,
    tracker: EditTracker,
    _guard: ArcMutexGuard<RawMutex, ()>,
}

impl<'c> EditSession<'c> {
    pub(crate) fn new(
        codec: &'c StegoCodec,
        context: &'c CoordinatorContext,
        path: PathBuf,
        key: PathBuf,
        meta: Option<EnvelopeMeta>,
        record: Record,
        guard: ArcMutexGuard<RawMutex, ()>,
    ) -> Self {
        Self {
            codec,
            context,
            path,
            key,
            meta,
            tracker: EditTracker::new(record),
            _guard: guard,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// metadata as extracted, before this edit
    pub fn meta(&self) -> Option<&EnvelopeMeta> {
        self.meta.as_ref()
    }

    /// Writes the record back if anything changed and releases the lock.
    ///
    /// An unmodified session touches neither the image nor the history.
    pub fn commit(self) -> Result<Record> {
        if !self.tracker.is_modified() {
            debug!("No changes to commit for {:?}", self.path);
            return Ok(self.tracker.into_parts().0);
        }

        let meta = EnvelopeMeta::next_edit(
            self.meta.as_ref(),
            &self.codec.options().format_version,
        );
        let (record, changes) = self.tracker.into_parts();

        self.codec
            .embed_with_meta(&self.path, &self.path, &record, &meta, true)?;

        info!(
            "committed {} change(s) to {:?}, edit {}",
            changes.len(),
            self.path,
            meta.edit_count
        );
        self.context.history.append(
            &self.key,
            HistoryEntry {
                timestamp: meta.last_modified.unwrap_or_else(timestamp_now),
                changes,
            },
        );

        Ok(record)
    }

    /// drops all changes and releases the lock
    pub fn discard(self) {
        if self.tracker.is_modified() {
            debug!(
                "discarding {} change(s) to {:?}",
                self.tracker.changes().len(),
                self.path
            );
        }
    }
}

impl Deref for EditSession<'_> {
    type Target = EditTracker;

    fn deref(&self) -> &Self::Target {
        &self.tracker
    }
}

impl DerefMut for EditSession<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.tracker
    }
}

impl std::fmt::Debug for EditSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("path", &self.path)
            .field("meta", &self.meta)
            .field("tracker", &self.tracker)
            .finish()
    }
}
