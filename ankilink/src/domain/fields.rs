// src/domain/fields.rs
use crate::constants::{
    BACK_EXTRA_FIELD, BACK_FIELD, CLOZE_MODEL_NAME, FRONT_FIELD, TEXT_FIELD,
};
use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// The two format-agnostic field slots every note has
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NoteFields {
    pub frontlike: String,
    pub backlike: String,
}

impl NoteFields {
    pub fn new(frontlike: impl Into<String>, backlike: impl Into<String>) -> Self {
        Self {
            frontlike: frontlike.into(),
            backlike: backlike.into(),
        }
    }
}

/// Field map keyed by the Anki model's field names
pub type AnkiFields = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteInfoField {
    pub value: String,
    #[serde(default)]
    pub order: u32,
}

/// One entry of an AnkiConnect `notesInfo` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesInfoResponseEntity {
    pub note_id: i64,
    pub model_name: String,
    pub fields: HashMap<String, NoteInfoField>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NotesInfoResponseEntity {
    pub fn is_cloze(&self) -> bool {
        self.model_name == CLOZE_MODEL_NAME
    }

    /// Field values by name, dropping the ordering metadata
    pub fn field_values(&self) -> AnkiFields {
        self.fields
            .iter()
            .map(|(name, field)| (name.clone(), field.value.clone()))
            .collect()
    }
}

/// Anki field names used for the two slots of a (non-)cloze note
pub fn field_names(is_cloze: bool) -> (&'static str, &'static str) {
    if is_cloze {
        (TEXT_FIELD, BACK_EXTRA_FIELD)
    } else {
        (FRONT_FIELD, BACK_FIELD)
    }
}

pub fn fields_to_anki_fields(fields: &NoteFields, is_cloze: bool) -> AnkiFields {
    let (front_name, back_name) = field_names(is_cloze);
    AnkiFields::from([
        (front_name.to_string(), fields.frontlike.clone()),
        (back_name.to_string(), fields.backlike.clone()),
    ])
}

/// Extract the two slots from a remote record.
///
/// Cloze-ness comes from the remote model name, not from local config.
pub fn normalise_note_info_fields(
    remote: &NotesInfoResponseEntity,
) -> Result<(NoteFields, bool), DomainError> {
    let is_cloze = remote.is_cloze();
    let (front_name, back_name) = field_names(is_cloze);

    let value_of = |name: &str| {
        remote
            .fields
            .get(name)
            .map(|field| field.value.clone())
            .ok_or_else(|| DomainError::ShapeMismatch {
                note_id: remote.note_id,
                model: remote.model_name.clone(),
                field: name.to_string(),
            })
    };

    Ok((
        NoteFields::new(value_of(front_name)?, value_of(back_name)?),
        is_cloze,
    ))
}
