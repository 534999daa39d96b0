//! Shortcuts with default options, one call per card

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::mutation::{CoordinatorContext, MutationCoordinator};
use crate::{Record, Result, StegoCodec};

/// Embeds `record` into the card at `image`.
///
/// Writes to `output` or to `<stem>_embedded.png` next to the image, refuses
/// images that already carry a record.
pub fn embed_card_data(image: &Path, record: Record, output: Option<&Path>) -> Result<PathBuf> {
    crate::api::embed::prepare()
        .with_image(image)
        .use_output(output)
        .with_record(record)
        .execute()
}

pub fn extract_card_data(image: &Path) -> Result<Record> {
    StegoCodec::new().extract(image)
}

/// true if `image` carries a record that passes every integrity check
pub fn is_aurora_card(image: &Path) -> bool {
    StegoCodec::new().has_embedded(image)
}

/// Sets `updates` on the card at `image` under its edit lock.
///
/// All calls in a process share one lock table, so concurrent calls on the
/// same card do not lose updates.
pub fn update_card(image: &Path, updates: &Record) -> Result<Record> {
    static CONTEXT: OnceLock<Arc<CoordinatorContext>> = OnceLock::new();
    let context = CONTEXT.get_or_init(|| Arc::new(CoordinatorContext::new()));

    MutationCoordinator::with_context(StegoCodec::new(), Arc::clone(context))
        .update_fields(image, updates)
}
