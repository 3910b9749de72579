//! Document storage seam.
//!
//! The engine never keeps documents in memory between calls: every operation
//! reads the current text through a [`DocumentStore`] and, when rating, writes
//! the full patched text back.

use crate::error::StoreError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Tag that marks a markdown document as a deck.
pub const DECK_TAG: &str = "#flashcards";

const DOCUMENT_EXTENSION: &str = "md";

/// A document the store considers a deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    /// Identifier accepted by [`DocumentStore::read_document`].
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Host storage collaborator.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents that count as decks.
    async fn list_documents(&self) -> Result<Vec<DocumentInfo>, StoreError>;

    /// Full text of a document.
    async fn read_document(&self, id: &str) -> Result<String, StoreError>;

    /// Replace the full text of a document.
    async fn write_document(&self, id: &str, content: &str) -> Result<(), StoreError>;
}

/// Whether document text carries the deck tag (`#flashcards` or a nested
/// `#flashcards/...` tag).
pub fn has_deck_tag(content: &str) -> bool {
    content.split_whitespace().any(|word| {
        let word = word
            .trim_start_matches(|c: char| matches!(c, '(' | '['))
            .trim_end_matches(|c: char| matches!(c, ',' | '.' | ';' | ':' | ')' | ']'));
        word == DECK_TAG
            || word
                .strip_prefix(DECK_TAG)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Markdown files under a root directory.
///
/// Document ids are paths relative to the root, `/`-separated.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a document id to a path, refusing ids that leave the root.
    fn resolve(&self, id: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(id);
        let inside_root = !id.trim().is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !inside_root {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn document_id(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }

    async fn markdown_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut files = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let hidden = entry.file_name().to_string_lossy().starts_with('.');
                if hidden {
                    continue;
                }
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if path.extension().is_some_and(|ext| ext == DOCUMENT_EXTENSION) {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl DocumentStore for FsStore {
    async fn list_documents(&self) -> Result<Vec<DocumentInfo>, StoreError> {
        let mut documents = Vec::new();

        for path in self.markdown_files().await? {
            let Some(id) = self.document_id(&path) else {
                tracing::warn!(path = %path.display(), "skipping document with non UTF-8 path");
                continue;
            };
            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(%id, error = %e, "skipping unreadable document");
                    continue;
                }
            };
            if !has_deck_tag(&content) {
                continue;
            }
            let name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or(&id)
                .to_string();
            documents.push(DocumentInfo { id, name });
        }

        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(documents)
    }

    async fn read_document(&self, id: &str) -> Result<String, StoreError> {
        let path = self.resolve(id)?;
        fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(id.to_string()),
            _ => StoreError::Io(e),
        })
    }

    /// Writes a sibling temporary file and renames it over the document, so a
    /// failed write leaves the previous text in place.
    async fn write_document(&self, id: &str, content: &str) -> Result<(), StoreError> {
        let path = self.resolve(id)?;
        if !fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| StoreError::InvalidId(id.to_string()))?;
        let temp = path.with_file_name(format!(".{file_name}.oboeru-tmp"));

        if let Err(e) = fs::write(&temp, content).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        tracing::debug!(%id, bytes = content.len(), "wrote document");
        Ok(())
    }
}
