//! Math-aware input-method switching server.
//!
//! Watches caret position in Markdown documents and switches the system
//! input method whenever the caret crosses a math-span boundary. Documents
//! and carets arrive over LSP: content via standard full-text sync, caret
//! movement via the custom `mathswitch/caretMoved` notification (LSP has no
//! standard one; editors wire their cursor-moved hook to it).

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use serde::Deserialize;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService};

mod document;
pub mod scanner;
pub mod settings;
mod switcher;
pub mod watcher;

pub use document::{DocumentState, DocumentStore, LineIndex, TrackedDocument};
pub use scanner::{scanner_for, MathScanner, ScanStrategy, StructuralScanner, TextualScanner};
pub use settings::{discover_settings, load_settings, Settings};
pub use switcher::ImeSwitcher;
pub use watcher::{CaretWatcher, SwitchAction, SwitchSink};

/// Parameters of the `mathswitch/caretMoved` notification.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaretMovedParams {
    pub text_document: TextDocumentIdentifier,
    pub position: Position,
}

pub struct Backend {
    client: Client,
    documents: DocumentStore,
    workspace_root: OnceLock<PathBuf>,
    settings: OnceLock<Settings>,
}

impl Backend {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: DocumentStore::new(),
            workspace_root: OnceLock::new(),
            settings: OnceLock::new(),
        }
    }

    fn settings(&self) -> &Settings {
        self.settings.get_or_init(Settings::default)
    }

    /// Start watching a freshly opened document, caret at the start.
    fn track_document(&self, uri: Url, text: String, version: i32) {
        let settings = self.settings();
        let state = DocumentState::new(text, version);
        let watcher = CaretWatcher::new(
            scanner_for(settings.scan.strategy),
            Arc::new(ImeSwitcher::new(settings.ime.clone())),
            state.source(),
            0,
        );
        self.documents.open(
            uri,
            TrackedDocument {
                state,
                caret: 0,
                watcher,
            },
        );
    }

    /// Handle the custom `mathswitch/caretMoved` notification.
    pub async fn caret_moved(&self, params: CaretMovedParams) {
        let uri = params.text_document.uri;
        let Some(caret) = self.caret_offset(&uri, params.position) else {
            return;
        };
        self.documents.move_caret(&uri, caret);
    }

    fn caret_offset(&self, uri: &Url, position: Position) -> Option<usize> {
        self.documents
            .with_state(uri, |state| state.line_index.position_to_offset(position))
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Extract workspace root from params
        let workspace_root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|f| f.uri.to_file_path().ok())
            .or_else(|| {
                #[allow(deprecated)]
                params.root_uri.as_ref()?.to_file_path().ok()
            });

        if let Some(root) = workspace_root {
            let _ = self.workspace_root.set(root.clone());

            // Discover mathswitch.toml by walking the directory tree
            let (settings, _settings_dir) = settings::discover_settings(&root);
            let _ = self.settings.set(settings);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "math input switch server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.track_document(
            params.text_document.uri,
            params.text_document.text,
            params.text_document.version,
        );
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // We use FULL sync, so there's exactly one change with the full text
        if let Some(change) = params.content_changes.into_iter().next() {
            let state = DocumentState::new(change.text, params.text_document.version);
            self.documents.update(&params.text_document.uri, state);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.close(&params.text_document.uri);
    }
}

pub fn create_service() -> (LspService<Backend>, tower_lsp::ClientSocket) {
    LspService::build(Backend::new)
        .custom_method("mathswitch/caretMoved", Backend::caret_moved)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_can_be_created() {
        let (_service, _socket) = create_service();
    }
}
