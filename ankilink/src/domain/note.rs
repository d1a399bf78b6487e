// src/domain/note.rs
use crate::domain::config::parse_config;
use crate::domain::deck::resolve_deck;
use crate::domain::fields::{fields_to_anki_fields, AnkiFields};
use crate::domain::media::extract_media;
use crate::domain::tags::{resolve_tags, TagCache};
use crate::domain::{
    Blueprint, Config, DomainError, Media, NoteFields, ParseConfig, ParseNoteResult, Settings,
    SourceDescriptor,
};
use serde::Serialize;
use std::ops::Deref;
use tracing::{debug, warn};

/// A flashcard parsed out of a document, rebuilt on every pass.
///
/// Only `id` outlives a pass; it is written back into the block's config.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    blueprint: Blueprint,
    id: Option<i64>,
    fields: NoteFields,
    source: SourceDescriptor,
    source_text: String,
    config: Config,
    medias: Vec<Media>,
    is_cloze: bool,
}

impl Note {
    pub fn new(
        blueprint: Blueprint,
        source: SourceDescriptor,
        source_text: impl Into<String>,
        fields: NoteFields,
        config: ParseConfig,
    ) -> Self {
        let medias = extract_media(&[&fields.frontlike, &fields.backlike]);
        let note = Self {
            blueprint,
            id: config.id,
            fields,
            source,
            source_text: source_text.into(),
            config: config.config,
            medias,
            is_cloze: blueprint.is_cloze(),
        };
        if note.has_cloze_conflict() {
            warn!(
                source = %note.source,
                blueprint = %note.blueprint,
                "Note config 'cloze' disagrees with its block type"
            );
        }
        note
    }

    /// Build a note from raw parser output: validate the config, pick the
    /// blueprint by type and let it extract the fields
    pub fn from_parse_result(
        result: &ParseNoteResult,
        source: SourceDescriptor,
        source_text: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let blueprint = Blueprint::from_type(&result.note_type)?;
        let config = parse_config(result)?;
        let fields = blueprint.parse_fields(result);
        debug!(%source, %blueprint, id = ?config.id, "Parsed note");
        Ok(Self::new(blueprint, source, source_text, fields, config))
    }

    pub fn blueprint(&self) -> Blueprint {
        self.blueprint
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn fields(&self) -> &NoteFields {
        &self.fields
    }

    pub fn source(&self) -> &SourceDescriptor {
        &self.source
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn medias(&self) -> &[Media] {
        &self.medias
    }

    pub fn is_cloze(&self) -> bool {
        self.is_cloze
    }

    /// True when the config states `cloze` and it contradicts the block type.
    /// Neither side wins; callers decide what to do with the note.
    pub fn has_cloze_conflict(&self) -> bool {
        matches!(self.config.cloze, Some(cloze) if cloze != self.is_cloze)
    }

    /// Replace the fields with content taken from the remote record
    pub fn replace_fields(&mut self, fields: NoteFields) {
        self.medias = extract_media(&[&fields.frontlike, &fields.backlike]);
        self.fields = fields;
    }

    /// Record the identity the remote store assigned
    pub fn assign_id(mut self, id: i64) -> NoteWithId {
        self.id = Some(id);
        NoteWithId(self)
    }

    pub fn parse_config(&self) -> ParseConfig {
        ParseConfig {
            id: self.id,
            config: self.config.clone(),
        }
    }

    pub fn render_as_text(&self) -> Result<String, DomainError> {
        self.blueprint.render(&self.fields, &self.parse_config())
    }

    /// Whether the block in the document differs from its canonical rendering
    pub fn should_update_file(&self) -> Result<bool, DomainError> {
        Ok(self.get_enabled() && self.render_as_text()? != self.source_text)
    }

    pub fn get_enabled(&self) -> bool {
        self.config.enabled.unwrap_or(true)
    }

    pub fn is_marked_for_deletion(&self) -> bool {
        self.config.delete == Some(true)
    }

    pub fn get_deck_name(&self, settings: &Settings) -> String {
        resolve_deck(&self.config, &self.source, settings)
    }

    pub fn get_tags(&self, settings: &Settings, cache: &dyn TagCache) -> Vec<String> {
        resolve_tags(
            self.config.tags.as_deref(),
            &self.source.file,
            cache,
            settings,
        )
    }

    pub fn anki_fields(&self) -> AnkiFields {
        fields_to_anki_fields(&self.fields, self.is_cloze)
    }
}

/// A note known to exist remotely
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteWithId(Note);

impl NoteWithId {
    pub fn id(&self) -> i64 {
        // Constructed only through `assign_id` or `TryFrom`, both of which set the id
        self.0.id.unwrap_or_default()
    }

    pub fn into_inner(self) -> Note {
        self.0
    }
}

impl TryFrom<Note> for NoteWithId {
    type Error = Note;

    fn try_from(note: Note) -> Result<Self, Self::Error> {
        if note.id.is_some() {
            Ok(Self(note))
        } else {
            Err(note)
        }
    }
}

impl Deref for NoteWithId {
    type Target = Note;

    fn deref(&self) -> &Note {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParseLocation;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn parse(note_type: &str, config: Option<&str>, front: &str, back: Option<&str>) -> Note {
        let result = ParseNoteResult {
            note_type: note_type.to_string(),
            config: config.map(str::to_string),
            front: Some(front.to_string()),
            back: back.map(str::to_string),
            location: ParseLocation::from_range("", 0..0).unwrap(),
        };
        let source = SourceDescriptor::new("Biology/Cells.md", result.location.clone());
        let blueprint = Blueprint::from_type(note_type).unwrap();
        let fields = blueprint.parse_fields(&result);
        let text = blueprint
            .render(&fields, &parse_config(&result).unwrap())
            .unwrap();
        Note::from_parse_result(&result, source, text).unwrap()
    }

    #[test]
    fn given_note_without_enabled_key_when_checking_then_is_enabled() {
        let note = parse("basic", None, "Q", Some("A"));

        assert!(note.get_enabled());
    }

    #[test]
    fn given_note_disabled_in_config_when_checking_then_is_disabled() {
        let note = parse("basic", Some("enabled: false"), "Q", Some("A"));

        assert!(!note.get_enabled());
    }

    #[test]
    fn given_unmodified_note_when_checking_update_then_returns_false() {
        let note = parse("basic", Some("id: 5\ndeck: Bio"), "Q", Some("A"));

        assert!(!note.should_update_file().unwrap());
    }

    #[test]
    fn given_changed_fields_when_checking_update_then_returns_true() {
        let mut note = parse("basic", None, "Q", Some("A"));

        note.replace_fields(NoteFields::new("Q", "Another answer"));

        assert!(note.should_update_file().unwrap());
    }

    #[test]
    fn given_new_id_when_checking_update_then_returns_true() {
        let note = parse("basic", None, "Q", Some("A"));

        let note = note.assign_id(1234);

        assert_eq!(note.id(), 1234);
        assert!(note.should_update_file().unwrap());
        assert!(note.render_as_text().unwrap().contains("id: 1234"));
    }

    #[test]
    fn given_changed_but_disabled_note_when_checking_update_then_returns_false() {
        let mut note = parse("basic", Some("enabled: false"), "Q", Some("A"));

        note.replace_fields(NoteFields::new("changed", "A"));

        assert!(!note.should_update_file().unwrap());
    }

    #[test]
    fn given_cloze_config_on_basic_block_when_constructing_then_flags_conflict() {
        let note = parse("basic", Some("cloze: true"), "Q", Some("A"));

        assert!(!note.is_cloze());
        assert!(note.has_cloze_conflict());
    }

    #[test]
    fn given_cloze_block_when_mapping_fields_then_uses_cloze_names() {
        let note = parse("cloze", Some("cloze: true"), "{{c1::Paris}}", None);

        let fields = note.anki_fields();

        assert!(!note.has_cloze_conflict());
        assert_eq!(fields["Text"], "{{c1::Paris}}");
        assert_eq!(fields["Back Extra"], "");
    }

    #[test]
    fn given_note_with_image_when_constructing_then_collects_media() {
        let note = parse("basic", None, "What is this?", Some("![cell](img/cell.png)"));

        assert_eq!(note.medias(), &[Media::new("img/cell.png")]);
    }

    #[test]
    fn given_note_without_id_when_refining_then_returns_note_back() {
        let note = parse("basic", None, "Q", Some("A"));

        assert!(NoteWithId::try_from(note).is_err());
    }

    #[test]
    fn given_note_when_resolving_deck_and_tags_then_uses_source_file() {
        let note = parse("basic", Some("tags: [exam]"), "Q", Some("A"));
        let settings = Settings {
            inherit_deck: Some(true),
            ..Default::default()
        };
        let cache = HashMap::from([(
            PathBuf::from("Biology/Cells.md"),
            vec!["#Bio/Cells".to_string()],
        )]);

        assert_eq!(note.get_deck_name(&settings), "Default::Biology::Cells.md");
        assert_eq!(
            note.get_tags(&settings, &cache),
            vec!["obsidian", "Bio::Cells", "exam"]
        );
    }
}
