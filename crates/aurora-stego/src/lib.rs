//! # Aurora Stego
//!
//! Hides a JSON record inside the least significant bits of a card image and
//! lets it be edited in place, safely from many threads.
//!
//! - [`StegoCodec`] embeds and extracts records
//! - [`MutationCoordinator`] serializes read-modify-write edits per card
//! - [`api::embed`] is a builder for one-off embeds, [`commands`] holds
//!   free-function shortcuts with default options
//!
//! # Usage Examples
//!
//! ## Embed a record into a card
//!
//! ```rust
//! use serde_json::json;
//! use tempfile::tempdir;
//!
//! let temp_dir = tempdir().expect("Failed to create temporary directory");
//! let card = temp_dir.path().join("crimson.png");
//! image::RgbImage::new(300, 420).save(&card).unwrap();
//!
//! let output = aurora_stego::api::embed::prepare()
//!     .with_image(&card)
//!     .with_field("card_id", json!("aurora_001_crimson"))
//!     .with_field("tier", json!("Premium"))
//!     .execute()
//!     .expect("Failed to embed the record");
//!
//! assert_eq!(output, temp_dir.path().join("crimson_embedded.png"));
//! ```
//!
//! ## Edit an embedded record
//!
//! ```rust
//! use aurora_stego::{MutationCoordinator, Record};
//! use serde_json::json;
//! use tempfile::tempdir;
//!
//! let temp_dir = tempdir().expect("Failed to create temporary directory");
//! let card = temp_dir.path().join("card.png");
//! image::RgbImage::new(100, 100).save(&card).unwrap();
//!
//! let coordinator = MutationCoordinator::new();
//! let mut record = Record::new();
//! record.insert("tier".to_string(), json!("Standard"));
//! coordinator.codec().embed(&card, &record, false).unwrap();
//!
//! let mut updates = Record::new();
//! updates.insert("tier".to_string(), json!("Premium"));
//! coordinator.update_fields(&card, &updates).expect("Failed to update the card");
//!
//! let meta = coordinator.codec().get_metadata(&card).unwrap().unwrap();
//! assert_eq!(meta.edit_count, 1);
//! ```

#![warn(
    // clippy::unwrap_used,
    // clippy::expect_used,
// clippy::cognitive_complexity,
// clippy::missing_const_for_fn,
// clippy::missing_panics_doc,
// clippy::redundant_closure,
    clippy::redundant_else,
// clippy::use_self,
)]

pub mod api;
pub mod codec;
pub mod commands;
pub mod error;
pub mod media;
pub mod mutation;
pub mod result;

pub use crate::codec::{Capacity, StegoCodec};
pub use crate::error::{AuroraError, CorruptionReason};
pub use crate::media::payload::{Envelope, EnvelopeMeta, Record};
pub use crate::media::{CodecOptions, ImageSurface, PngSurface};
pub use crate::mutation::{
    CoordinatorContext, EditSession, EditTracker, FieldChange, HistoryEntry,
    MutationCoordinator,
};
pub use crate::result::Result;
