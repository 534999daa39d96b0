use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use log::{debug, warn};

use super::context::{canonical_key, CoordinatorContext, HistoryEntry};
use super::session::EditSession;
use crate::api::shared::is_png_extension;
use crate::codec::StegoCodec;
use crate::media::payload::Record;
use crate::{AuroraError, Result};

/// Serializes read-modify-write cycles on embedded cards.
///
/// Every edit of a card takes that card's lock before extracting and releases
/// it after writing back, so concurrent edits of one card never lose updates.
/// Cloned handles and coordinators built from the same [`CoordinatorContext`]
/// share locks and history.
///
/// ## Example of usage
/// ```rust
/// use aurora_stego::{MutationCoordinator, Record};
/// use serde_json::json;
/// use tempfile::tempdir;
///
/// let temp_dir = tempdir().expect("Failed to create temporary directory");
/// let card = temp_dir.path().join("card.png");
/// image::RgbImage::new(100, 100).save(&card).unwrap();
///
/// let coordinator = MutationCoordinator::new();
/// let mut record = Record::new();
/// record.insert("credits".to_string(), json!(10));
/// coordinator.codec().embed(&card, &record, false).unwrap();
///
/// coordinator
///     .with_edit_session(&card, |session| {
///         let credits = session.get("credits").and_then(|c| c.as_i64()).unwrap_or(0);
///         session.set("credits", credits + 5);
///         Ok::<_, std::io::Error>(())
///     })
///     .unwrap();
///
/// assert_eq!(coordinator.codec().extract(&card).unwrap()["credits"], json!(15));
/// assert_eq!(coordinator.get_history(&card).len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MutationCoordinator {
    codec: Arc<StegoCodec>,
    context: Arc<CoordinatorContext>,
}

impl Default for MutationCoordinator {
    fn default() -> Self {
        Self::with_codec(StegoCodec::new())
    }
}

impl MutationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codec(codec: StegoCodec) -> Self {
        Self::with_context(codec, Arc::new(CoordinatorContext::new()))
    }

    /// a coordinator sharing locks and history with every other user of `context`
    pub fn with_context(codec: StegoCodec, context: Arc<CoordinatorContext>) -> Self {
        Self {
            codec: Arc::new(codec),
            context,
        }
    }

    pub fn codec(&self) -> &StegoCodec {
        &self.codec
    }

    pub fn context(&self) -> &Arc<CoordinatorContext> {
        &self.context
    }

    /// Locks the card at `path` and extracts its record for editing.
    ///
    /// Blocks while another session of the same card is open. If extraction
    /// fails the lock is released before the error is returned. Only PNG
    /// paths can be edited, a commit writes back to the very same file.
    pub fn begin_edit(&self, path: impl AsRef<Path>) -> Result<EditSession<'_>> {
        let path = path.as_ref();
        if !is_png_extension(path) {
            warn!("Refusing to edit {path:?}, commits only go to PNG files");
            return Err(AuroraError::NotEditable(path.to_path_buf()));
        }
        let key = canonical_key(path);
        let lock = self.context.locks.lock_for(&key);
        let guard = lock.lock_arc();
        debug!("acquired edit lock for {key:?}");

        let envelope = self.codec.extract_envelope(path)?;

        Ok(EditSession::new(
            &self.codec,
            &self.context,
            path.to_path_buf(),
            key,
            envelope.meta,
            envelope.record,
            guard,
        ))
    }

    /// Runs `edit` inside a session and commits on success.
    ///
    /// If `edit` fails the session is discarded, the image stays untouched and
    /// the failure is returned as `EditAborted` with the original error as source.
    pub fn with_edit_session<T, E, F>(&self, path: impl AsRef<Path>, edit: F) -> Result<T>
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
        F: FnOnce(&mut EditSession<'_>) -> std::result::Result<T, E>,
    {
        let path = path.as_ref();
        let mut session = self.begin_edit(path)?;

        match edit(&mut session) {
            Ok(value) => {
                session.commit()?;
                Ok(value)
            }
            Err(e) => {
                session.discard();
                let source = e.into();
                warn!("Edit of {path:?} aborted: {source}");
                Err(AuroraError::EditAborted {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Sets every field of `updates` on the card at `path`, returns the record as written
    pub fn update_fields(&self, path: impl AsRef<Path>, updates: &Record) -> Result<Record> {
        let mut session = self.begin_edit(path)?;
        session.update(updates.iter().map(|(k, v)| (k.clone(), v.clone())));

        session.commit()
    }

    /// Applies each update on its own thread.
    ///
    /// Results come back in input order. A failing item does not affect the others,
    /// items naming the same card are serialized by its lock.
    pub fn batch_update(&self, updates: Vec<(PathBuf, Record)>) -> Vec<Result<Record>> {
        thread::scope(|scope| {
            let workers: Vec<_> = updates
                .iter()
                .map(|(path, record)| {
                    (
                        path,
                        scope.spawn(move || self.update_fields(path, record)),
                    )
                })
                .collect();

            workers
                .into_iter()
                .map(|(path, worker)| {
                    worker.join().unwrap_or_else(|_| {
                        warn!("Update worker for {path:?} panicked");
                        Err(AuroraError::WorkerPanicked(path.clone()))
                    })
                })
                .collect()
        })
    }

    /// committed edits of the card at `path` in commit order, empty if none
    pub fn get_history(&self, path: impl AsRef<Path>) -> Vec<HistoryEntry> {
        self.context.history.get(&canonical_key(path.as_ref()))
    }
}
