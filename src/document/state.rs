//! Per-document state and the store that routes observations.

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use crate::watcher::CaretWatcher;

use super::text::LineIndex;

/// Immutable snapshot of one document version.
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// Pre-computed line index for position conversion.
    pub line_index: LineIndex,
    /// Document version from the client.
    pub version: i32,
}

impl DocumentState {
    pub fn new(source: String, version: i32) -> Self {
        Self {
            line_index: LineIndex::new(source),
            version,
        }
    }

    pub fn source(&self) -> &str {
        self.line_index.source()
    }
}

/// A document snapshot together with its watcher and last known caret.
pub struct TrackedDocument {
    pub state: DocumentState,
    pub caret: usize,
    pub watcher: CaretWatcher,
}

/// Thread-safe storage for open documents.
///
/// Notifications arrive one at a time per document; the shard lock only
/// guards against concurrent documents, not concurrent observations.
#[derive(Default)]
pub struct DocumentStore {
    documents: DashMap<Url, TrackedDocument>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Start tracking a document. The watcher has already run its initial
    /// scan at construction.
    pub fn open(&self, uri: Url, doc: TrackedDocument) {
        self.documents.insert(uri, doc);
    }

    /// Replace a document's snapshot after a content change and re-observe
    /// with the last known caret, clamped into the new snapshot.
    pub fn update(&self, uri: &Url, state: DocumentState) {
        if let Some(mut entry) = self.documents.get_mut(uri) {
            let doc = entry.value_mut();
            doc.caret = doc.caret.min(state.source().len());
            doc.state = state;
            doc.watcher.observe(doc.state.source(), doc.caret);
        }
    }

    /// Record a caret move and re-observe against the current snapshot.
    pub fn move_caret(&self, uri: &Url, caret: usize) {
        if let Some(mut entry) = self.documents.get_mut(uri) {
            let doc = entry.value_mut();
            doc.caret = caret.min(doc.state.source().len());
            doc.watcher.observe(doc.state.source(), doc.caret);
        }
    }

    /// Stop tracking a document.
    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    /// Whether the document's caret is currently inside math. `None` for
    /// untracked documents.
    pub fn is_inside(&self, uri: &Url) -> Option<bool> {
        self.documents.get(uri).map(|d| d.watcher.is_inside())
    }

    /// Run `f` against a document's current snapshot.
    pub fn with_state<T>(&self, uri: &Url, f: impl FnOnce(&DocumentState) -> T) -> Option<T> {
        self.documents.get(uri).map(|d| f(&d.state))
    }
}
