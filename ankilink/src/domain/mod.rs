// src/domain/mod.rs
pub mod blueprint;
pub mod cloze;
pub mod config;
pub mod deck;
pub mod error;
pub mod fields;
pub mod location;
pub mod media;
pub mod note;
pub mod parse_result;
pub mod settings;
pub mod tags;

pub use blueprint::{BasicNoteFormat, Blueprint, ClozeNoteFormat, NoteFormat};
pub use config::{parse_config, Config, ParseConfig};
pub use error::DomainError;
pub use fields::{
    fields_to_anki_fields, normalise_note_info_fields, AnkiFields, NoteFields, NoteInfoField,
    NotesInfoResponseEntity,
};
pub use location::{ParseLocation, ParseLocationMarker, SourceDescriptor};
pub use media::Media;
pub use note::{Note, NoteWithId};
pub use parse_result::ParseNoteResult;
pub use settings::Settings;
pub use tags::{NoTagCache, TagCache};
