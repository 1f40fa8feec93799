use crate::convert::{full_document_edit, overlaps, to_lsp_diagnostic, to_lsp_edit, LineTable};
use anyhow::Context;
use dashmap::DashMap;
use gofmts_config::{find_config, load_config, FileMatcher, GofmtsConfig};
use gofmts_engine::{Diagnostic, Engine};
use lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, CodeActionParams,
    CodeActionProviderCapability, CodeActionResponse, DidChangeTextDocumentParams,
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, DidSaveTextDocumentParams,
    DocumentFormattingParams, InitializeParams, InitializeResult, InitializedParams, MessageType,
    OneOf, Range, ServerCapabilities, ServerInfo, TextDocumentSyncCapability,
    TextDocumentSyncKind, TextEdit, Uri, WorkspaceEdit,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::{Client, LanguageServer, UriExt};

/// Engine and file patterns of one workspace folder
struct Workspace {
    root: PathBuf,
    engine: Arc<Engine>,
    matcher: FileMatcher,
}

impl Workspace {
    /// Build from the config found at or above `root`, or from the defaults
    fn load(root: &Path) -> anyhow::Result<Self> {
        let config = match find_config(root).context("Failed to search for config")? {
            Some(config_path) => {
                tracing::info!("Found gofmts config at {:?}", config_path);
                load_config(&config_path)
                    .with_context(|| format!("Failed to load {}", config_path.display()))?
            }
            None => {
                tracing::info!("No gofmts config for {:?}, using defaults", root);
                GofmtsConfig::default()
            }
        };

        Ok(Self {
            root: root.to_path_buf(),
            engine: Arc::new(Engine::new(&config)),
            matcher: FileMatcher::new(&config)?,
        })
    }
}

pub struct GofmtsLanguageServer {
    client: Client,
    /// Workspace folders from initialization, loaded once the client is ready
    init_workspace_folders: Arc<DashMap<String, PathBuf>>,
    /// Loaded workspaces by folder URI string
    workspaces: Arc<DashMap<String, Workspace>>,
    /// Latest full text of every open document
    documents: Arc<DashMap<Uri, String>>,
    /// Engine for documents outside every workspace folder
    fallback: Arc<Engine>,
}

impl GofmtsLanguageServer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            init_workspace_folders: Arc::new(DashMap::new()),
            workspaces: Arc::new(DashMap::new()),
            documents: Arc::new(DashMap::new()),
            fallback: Arc::new(Engine::default()),
        }
    }

    async fn load_workspace(&self, workspace_uri: &str, workspace_path: &Path) {
        tracing::info!("Loading gofmts config for {:?}", workspace_path);

        match Workspace::load(workspace_path) {
            Ok(workspace) => {
                self.workspaces.insert(workspace_uri.to_string(), workspace);
            }
            Err(e) => {
                tracing::error!("Failed to load workspace config: {e:#}");
                self.client
                    .log_message(
                        MessageType::ERROR,
                        format!("Failed to load gofmts config: {e:#}"),
                    )
                    .await;
            }
        }
    }

    /// Engine governing a document; `None` when its workspace excludes it.
    /// The deepest workspace folder containing the document wins.
    fn engine_for(&self, uri: &Uri) -> Option<Arc<Engine>> {
        let Some(file_path) = uri.to_file_path() else {
            return Some(Arc::clone(&self.fallback));
        };
        let path: &Path = file_path.as_ref();

        let workspace = self
            .workspaces
            .iter()
            .filter(|entry| path.starts_with(&entry.value().root))
            .max_by_key(|entry| entry.value().root.components().count());

        let Some(workspace) = workspace else {
            return Some(Arc::clone(&self.fallback));
        };
        let workspace = workspace.value();
        let relative = path.strip_prefix(&workspace.root).unwrap_or(path);

        workspace
            .matcher
            .is_match(relative)
            .then(|| Arc::clone(&workspace.engine))
    }

    fn diagnose(&self, uri: &Uri, content: &str) -> Option<Vec<Diagnostic>> {
        let engine = self.engine_for(uri)?;
        match engine.diagnose(content) {
            Ok(diagnostics) => Some(diagnostics),
            Err(e) => {
                // Incomplete source is routine while typing
                tracing::debug!("Skipping analysis of {:?}: {e}", uri);
                None
            }
        }
    }

    /// Analyze a document and publish its diagnostics
    async fn publish(&self, uri: Uri, content: &str) {
        let diagnostics = self.diagnose(&uri, content).map_or_else(Vec::new, |diagnostics| {
            let lines = LineTable::new(content);
            diagnostics
                .iter()
                .map(|diagnostic| to_lsp_diagnostic(&lines, diagnostic))
                .collect()
        });

        tracing::debug!("Publishing {} diagnostic(s) for {:?}", diagnostics.len(), uri);
        self.client
            .publish_diagnostics(uri, diagnostics, None)
            .await;
    }

    fn document(&self, uri: &Uri) -> Option<String> {
        self.documents.get(uri).map(|entry| entry.value().clone())
    }
}

/// Quick fixes for the diagnostics of `content` that touch `range`
fn quick_fixes(
    uri: &Uri,
    content: &str,
    diagnostics: &[Diagnostic],
    range: &Range,
) -> Vec<CodeActionOrCommand> {
    let lines = LineTable::new(content);

    diagnostics
        .iter()
        .filter_map(|diagnostic| {
            let fix = diagnostic.fix.as_ref()?;
            let lsp_diagnostic = to_lsp_diagnostic(&lines, diagnostic);
            if !overlaps(&lsp_diagnostic.range, range) {
                return None;
            }

            let edit = WorkspaceEdit {
                changes: Some(HashMap::from([(
                    uri.clone(),
                    vec![to_lsp_edit(&lines, &fix.edit)],
                )])),
                ..Default::default()
            };

            Some(CodeActionOrCommand::CodeAction(CodeAction {
                title: fix.title.clone(),
                kind: Some(CodeActionKind::QUICKFIX),
                diagnostics: Some(vec![lsp_diagnostic]),
                edit: Some(edit),
                is_preferred: Some(true),
                ..Default::default()
            }))
        })
        .collect()
}

impl LanguageServer for GofmtsLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("Initializing gofmts language server");

        if let Some(ref folders) = params.workspace_folders {
            tracing::info!("Workspace folders: {} folders", folders.len());
            for folder in folders {
                if let Some(path) = folder.uri.to_file_path() {
                    self.init_workspace_folders
                        .insert(folder.uri.to_string(), path.into_owned());
                }
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
                document_formatting_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "gofmts".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        tracing::info!("gofmts language server initialized");

        let folders: Vec<_> = self
            .init_workspace_folders
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        for (uri, path) in folders {
            self.load_workspace(&uri, &path).await;
        }

        self.client
            .log_message(
                MessageType::INFO,
                format!("gofmts loaded {} workspace(s)", self.workspaces.len()),
            )
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down gofmts language server");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let content = params.text_document.text;
        tracing::info!("Document opened: {:?}", uri);

        self.documents.insert(uri.clone(), content.clone());
        self.publish(uri, &content).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!("Document changed: {:?}", uri);

        // Full sync: the last change holds the whole text
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        self.documents.insert(uri.clone(), change.text.clone());
        self.publish(uri, &change.text).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::info!("Document saved: {:?}", uri);

        let content = match params.text {
            Some(text) => {
                self.documents.insert(uri.clone(), text.clone());
                Some(text)
            }
            None => self.document(&uri),
        };
        if let Some(content) = content {
            self.publish(uri, &content).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::info!("Document closed: {:?}", uri);

        self.documents.remove(&uri);
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = params.text_document.uri;
        tracing::debug!("Code actions requested: {:?}", uri);

        let Some(content) = self.document(&uri) else {
            return Ok(None);
        };
        let Some(diagnostics) = self.diagnose(&uri, &content) else {
            return Ok(None);
        };

        let actions = quick_fixes(&uri, &content, &diagnostics, &params.range);
        Ok((!actions.is_empty()).then_some(actions))
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri;
        tracing::debug!("Formatting requested: {:?}", uri);

        let Some(content) = self.document(&uri) else {
            return Ok(None);
        };
        let Some(engine) = self.engine_for(&uri) else {
            return Ok(None);
        };

        match engine.rewrite(&content) {
            Ok(formatted) if formatted == content => Ok(None),
            Ok(formatted) => Ok(Some(vec![full_document_edit(&content, formatted)])),
            Err(e) => {
                tracing::warn!("Failed to format {:?}: {e}", uri);
                self.client
                    .log_message(MessageType::WARNING, format!("gofmts: {e}"))
                    .await;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsp_types::Position;
    use std::fs;
    use tempfile::TempDir;

    const UNSORTED: &str = "package main

const (
\t//gofmts:sort
\tZ = 2
\tA = 1
)
";

    fn uri() -> Uri {
        "file:///work/main.go".parse().unwrap()
    }

    fn line(line: u32) -> Range {
        Range::new(Position::new(line, 0), Position::new(line, 5))
    }

    #[test]
    fn test_quick_fix_for_unsorted_block() {
        let diagnostics = Engine::default().diagnose(UNSORTED).unwrap();
        let actions = quick_fixes(&uri(), UNSORTED, &diagnostics, &line(4));

        assert_eq!(actions.len(), 1);
        let CodeActionOrCommand::CodeAction(action) = &actions[0] else {
            panic!("Expected a code action");
        };
        assert_eq!(action.title, "Sort block");
        assert_eq!(action.kind, Some(CodeActionKind::QUICKFIX));

        let changes = action.edit.as_ref().unwrap().changes.as_ref().unwrap();
        let edits = &changes[&uri()];
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].new_text, "\tA = 1\n\tZ = 2\n");
        assert_eq!(
            edits[0].range,
            Range::new(Position::new(4, 0), Position::new(6, 0))
        );
    }

    #[test]
    fn test_no_quick_fix_outside_range() {
        let diagnostics = Engine::default().diagnose(UNSORTED).unwrap();
        assert!(quick_fixes(&uri(), UNSORTED, &diagnostics, &line(0)).is_empty());
    }

    #[test]
    fn test_workspace_uses_its_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(".gofmts.yml"),
            "exclude:\n  - \"gen/**\"\n",
        )
        .unwrap();

        let workspace = Workspace::load(temp_dir.path()).unwrap();
        assert!(workspace.matcher.is_match(Path::new("main.go")));
        assert!(!workspace.matcher.is_match(Path::new("gen/types.go")));
    }
}
