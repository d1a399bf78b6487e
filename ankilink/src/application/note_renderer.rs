// src/application/note_renderer.rs
use crate::application::{CollectedFile, NoteError};
use crate::domain::{DomainError, Note, ParseLocation};
use crate::infrastructure::file_writer;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Canonical block texts for one file, keyed by the span they replace
#[derive(Debug, Clone, PartialEq)]
pub struct FileEdits {
    pub path: PathBuf,
    pub edits: Vec<(ParseLocation, String)>,
}

/// Rewrites note blocks into their canonical form
#[derive(Debug, Default)]
pub struct NoteRenderer {
    errors: Vec<NoteError>,
}

impl NoteRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[NoteError] {
        &self.errors
    }

    /// Edit for a note whose block differs from its canonical rendering
    pub fn render_note(note: &Note) -> Result<Option<(ParseLocation, String)>, DomainError> {
        if !note.should_update_file()? {
            return Ok(None);
        }
        Ok(Some((note.source().location.clone(), note.render_as_text()?)))
    }

    /// Compute the edits for every file; files without changes are left out
    pub fn plan(&mut self, files: &[CollectedFile]) -> Vec<FileEdits> {
        let mut planned = Vec::new();
        for file in files {
            let mut edits = Vec::new();
            for note in &file.notes {
                match Self::render_note(note) {
                    Ok(Some(edit)) => edits.push(edit),
                    Ok(None) => {}
                    Err(e) => self.errors.push(NoteError::for_note(note, e)),
                }
            }
            if !edits.is_empty() {
                debug!(file = ?file.vault_path, edits = edits.len(), "Blocks to rewrite");
                planned.push(FileEdits {
                    path: file.path.clone(),
                    edits,
                });
            }
        }
        planned
    }

    /// Write the edits back; returns the number of files changed
    #[instrument(level = "debug", skip_all)]
    pub fn write(&self, planned: &[FileEdits]) -> Result<usize> {
        let mut written = 0;
        for file in planned {
            if file_writer::apply_edits(&file.path, &file.edits)? {
                written += 1;
            }
        }
        info!(files = written, "Rewrote documents");
        Ok(written)
    }
}
