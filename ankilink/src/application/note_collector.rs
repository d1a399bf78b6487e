use crate::domain::location::vault_path_string;
use crate::domain::{DomainError, Note, ParseLocation, SourceDescriptor};
use crate::infrastructure::file_writer;
use crate::infrastructure::markdown::block_scanner;
use crate::infrastructure::TagIndex;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A failure scoped to one note block, reported with its position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteError {
    pub file: String,
    pub line: usize,
    pub column: usize,
    #[serde(serialize_with = "serialize_display")]
    pub error: DomainError,
}

impl NoteError {
    pub fn new(file: &Path, location: &ParseLocation, error: DomainError) -> Self {
        Self {
            file: vault_path_string(file),
            line: location.start().line,
            column: location.start().column,
            error,
        }
    }

    pub fn for_note(note: &Note, error: DomainError) -> Self {
        Self::new(&note.source().file, &note.source().location, error)
    }
}

impl fmt::Display for NoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}: {}", self.file, self.line, self.column, self.error)
    }
}

fn serialize_display<S: serde::Serializer>(
    value: &DomainError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Notes found in one markdown file
#[derive(Debug, Clone)]
pub struct CollectedFile {
    /// Path on disk
    pub path: PathBuf,
    /// Path relative to the vault root, used for deck and tag resolution
    pub vault_path: PathBuf,
    pub notes: Vec<Note>,
}

/// Reads markdown files of a vault and turns their note blocks into notes.
///
/// A block that fails validation is recorded in `errors()` and skipped;
/// the other blocks of the file are still collected.
pub struct NoteCollector {
    vault_root: PathBuf,
    tag_index: TagIndex,
    index_tags: bool,
    errors: Vec<NoteError>,
}

impl NoteCollector {
    /// Collector that builds its tag index from the documents it reads
    pub fn new(vault_root: impl Into<PathBuf>) -> Self {
        Self {
            vault_root: vault_root.into(),
            tag_index: TagIndex::new(),
            index_tags: true,
            errors: Vec::new(),
        }
    }

    /// Collector that uses a tag index supplied by the document layer
    pub fn with_tag_index(vault_root: impl Into<PathBuf>, tag_index: TagIndex) -> Self {
        Self {
            tag_index,
            index_tags: false,
            ..Self::new(vault_root)
        }
    }

    pub fn errors(&self) -> &[NoteError] {
        &self.errors
    }

    pub fn tag_index(&self) -> &TagIndex {
        &self.tag_index
    }

    /// Build notes from one document's content
    pub fn collect_document(&mut self, vault_path: &Path, content: &str) -> Result<Vec<Note>> {
        let source_name = vault_path_string(vault_path);
        if self.index_tags {
            self.tag_index.index_document(vault_path, content);
        }

        let blocks = block_scanner::scan_blocks(content, &source_name)
            .with_context(|| format!("Failed to scan {}", source_name))?;

        let mut notes = Vec::with_capacity(blocks.len());
        for block in blocks {
            let location = block.result.location.clone();
            let source = SourceDescriptor::new(vault_path, location.clone());
            match Note::from_parse_result(&block.result, source, block.text) {
                Ok(note) => notes.push(note),
                Err(e) => {
                    let error = NoteError::new(vault_path, &location, e);
                    warn!(%error, "Skipping invalid note");
                    self.errors.push(error);
                }
            }
        }

        debug!(file = %source_name, count = notes.len(), "Collected notes");
        Ok(notes)
    }

    pub fn collect_file(&mut self, path: impl AsRef<Path>) -> Result<CollectedFile> {
        let path = path.as_ref();
        let content = file_writer::read_markdown_file(path)
            .with_context(|| format!("Cannot collect {}", path.display()))?;
        let vault_path = path
            .strip_prefix(&self.vault_root)
            .with_context(|| {
                format!(
                    "{} is not inside the vault {}",
                    path.display(),
                    self.vault_root.display()
                )
            })?
            .to_path_buf();

        let notes = self.collect_document(&vault_path, &content)?;
        Ok(CollectedFile {
            path: path.to_path_buf(),
            vault_path,
            notes,
        })
    }

    /// Collect a single markdown file, or every markdown file below a directory
    pub fn collect_path(&mut self, path: impl AsRef<Path>) -> Result<Vec<CollectedFile>> {
        let path = path.as_ref();

        if path.is_file() {
            return Ok(vec![self.collect_file(path)?]);
        }
        if !path.is_dir() {
            return Err(anyhow::anyhow!("Path does not exist: {:?}", path));
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if entry_path.is_file() && entry_path.extension().and_then(|s| s.to_str()) == Some("md")
            {
                files.push(self.collect_file(entry_path)?);
            }
        }

        info!(
            files = files.len(),
            notes = files.iter().map(|f| f.notes.len()).sum::<usize>(),
            errors = self.errors.len(),
            "Collected vault"
        );
        Ok(files)
    }
}

/// Dot-directories like `.obsidian` and `.git` hold no notes
fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}
