// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Embedded note configuration is malformed or violates the schema
    #[error("Invalid note configuration: {0}")]
    Validation(String),
    /// Remote record does not carry the field names its model implies
    #[error("Note {note_id} ({model}) is missing field '{field}'")]
    ShapeMismatch {
        note_id: i64,
        model: String,
        field: String,
    },
    #[error("Note {note_id} is a {remote} note in Anki but a {local} note locally")]
    ModelMismatch {
        note_id: i64,
        local: String,
        remote: String,
    },
    #[error("Unknown note type: {0}")]
    UnknownBlueprint(String),
    #[error("Invalid source span: {0}")]
    InvalidSpan(String),
    #[error("Note not found: {0}")]
    NoteNotFound(i64),
    /// Field or config text that would not read back unchanged from a note block
    #[error("Cannot write {what} into a note block: {reason}")]
    Unrepresentable { what: String, reason: String },
    #[error("Note id {id} is also used by the note at {first}")]
    DuplicateId { id: i64, first: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
