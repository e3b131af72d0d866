//! Document tracking: snapshot state, caret conversion, and the per-URI
//! store that feeds observations into each document's watcher.

mod state;
mod text;

pub use state::{DocumentState, DocumentStore, TrackedDocument};
pub use text::LineIndex;
