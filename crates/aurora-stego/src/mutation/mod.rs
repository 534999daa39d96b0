//! Locked read-modify-write editing of embedded cards

mod context;
mod coordinator;
mod session;
mod tracker;

pub use context::{CoordinatorContext, HistoryEntry};
pub use coordinator::MutationCoordinator;
pub use session::EditSession;
pub use tracker::{EditTracker, FieldChange};
