// src/infrastructure/remote_snapshot.rs
use crate::application::RemoteNoteStore;
use crate::domain::{DomainError, NotesInfoResponseEntity};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Remote notes captured from an AnkiConnect `notesInfo` response
#[derive(Debug, Default)]
pub struct RemoteSnapshot {
    notes: HashMap<i64, NotesInfoResponseEntity>,
}

impl RemoteSnapshot {
    pub fn new(notes: impl IntoIterator<Item = NotesInfoResponseEntity>) -> Self {
        Self {
            notes: notes.into_iter().map(|note| (note.note_id, note)).collect(),
        }
    }

    /// Load a JSON array of `notesInfo` entries.
    ///
    /// AnkiConnect answers unknown ids with `{}`; such entries are skipped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(?path, "Loading remote snapshot");

        let content = std::fs::read_to_string(path).context("Failed to read remote snapshot")?;
        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&content).context("Failed to parse remote snapshot JSON")?;

        let mut notes = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.as_object().is_some_and(|o| o.is_empty()) {
                continue;
            }
            let note: NotesInfoResponseEntity = serde_json::from_value(entry)
                .context("Remote snapshot entry is not a notesInfo record")?;
            notes.push(note);
        }

        info!(count = notes.len(), "Loaded remote snapshot");
        Ok(Self::new(notes))
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl RemoteNoteStore for RemoteSnapshot {
    #[instrument(level = "debug", skip(self))]
    fn notes_info(
        &mut self,
        ids: &[i64],
    ) -> Result<Vec<Option<NotesInfoResponseEntity>>, DomainError> {
        Ok(ids.iter().map(|id| self.notes.get(id).cloned()).collect())
    }
}
