// src/domain/blueprint.rs
use crate::constants::{BLOCK_CLOSE, BLOCK_OPEN, FIELD_SEPARATOR};
use crate::domain::cloze::convert_cloze_syntax;
use crate::domain::{DomainError, NoteFields, ParseConfig, ParseNoteResult};
use serde::Serialize;
use std::fmt;

/// Text dialect of a note block: how it is rendered and how its fields are read back
pub trait NoteFormat {
    /// Value of `ParseNoteResult::note_type` this format handles
    fn type_name(&self) -> &'static str;

    fn is_cloze(&self) -> bool;

    /// Canonical block text for the given state; must be deterministic
    fn render(&self, fields: &NoteFields, config: &ParseConfig) -> Result<String, DomainError>;

    fn parse_fields(&self, result: &ParseNoteResult) -> NoteFields;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasicNoteFormat;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClozeNoteFormat;

impl NoteFormat for BasicNoteFormat {
    fn type_name(&self) -> &'static str {
        "basic"
    }

    fn is_cloze(&self) -> bool {
        false
    }

    fn render(&self, fields: &NoteFields, config: &ParseConfig) -> Result<String, DomainError> {
        check_fields(fields)?;
        Ok(format!(
            "{}\n{}\n{}\n{}\n{}",
            header(BLOCK_OPEN, config)?,
            fields.frontlike,
            FIELD_SEPARATOR,
            fields.backlike,
            BLOCK_CLOSE
        ))
    }

    fn parse_fields(&self, result: &ParseNoteResult) -> NoteFields {
        NoteFields::new(
            result.front.clone().unwrap_or_default(),
            result.back.clone().unwrap_or_default(),
        )
    }
}

impl NoteFormat for ClozeNoteFormat {
    fn type_name(&self) -> &'static str {
        "cloze"
    }

    fn is_cloze(&self) -> bool {
        true
    }

    fn render(&self, fields: &NoteFields, config: &ParseConfig) -> Result<String, DomainError> {
        check_fields(fields)?;
        let open = format!("{}:{}", BLOCK_OPEN, self.type_name());
        let body = if fields.backlike.is_empty() {
            fields.frontlike.clone()
        } else {
            format!("{}\n{}\n{}", fields.frontlike, FIELD_SEPARATOR, fields.backlike)
        };
        Ok(format!("{}\n{}\n{}", header(&open, config)?, body, BLOCK_CLOSE))
    }

    /// Short cloze syntax is normalised here, so such notes render differently
    /// from their source and get rewritten
    fn parse_fields(&self, result: &ParseNoteResult) -> NoteFields {
        NoteFields::new(
            convert_cloze_syntax(result.front.as_deref().unwrap_or_default()),
            result.back.clone().unwrap_or_default(),
        )
    }
}

/// `<!--anki-->` for an empty config, otherwise the YAML wrapped in the comment
fn header(open: &str, config: &ParseConfig) -> Result<String, DomainError> {
    let yaml = config.to_yaml()?;
    if yaml.contains("-->") {
        return Err(DomainError::Unrepresentable {
            what: "config".to_string(),
            reason: "'-->' would end the header early".to_string(),
        });
    }
    if yaml.is_empty() {
        Ok(format!("{}-->", open))
    } else {
        Ok(format!("{}\n{}-->", open, yaml))
    }
}

/// Reject field text the block scanner would read back differently.
///
/// The scanner splits front from back at the first `---` line, ends the block
/// at the first `<!--/anki-->` line and reads CRLF as LF.
fn check_fields(fields: &NoteFields) -> Result<(), DomainError> {
    let unrepresentable = |what: &str, reason: &str| DomainError::Unrepresentable {
        what: what.to_string(),
        reason: reason.to_string(),
    };

    for (what, text) in [("front", &fields.frontlike), ("back", &fields.backlike)] {
        if text.contains("\r\n") {
            return Err(unrepresentable(what, "CRLF line endings"));
        }
        if text.split(['\r', '\n']).any(|line| line == BLOCK_CLOSE) {
            return Err(unrepresentable(what, "a line would close the block"));
        }
    }
    if fields.frontlike.split('\n').any(|line| line == FIELD_SEPARATOR) {
        return Err(unrepresentable(
            "front",
            "a '---' line would be read as the field separator",
        ));
    }
    Ok(())
}

/// The registry of supported formats, dispatched by tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Blueprint {
    Basic,
    Cloze,
}

impl Blueprint {
    pub const ALL: [Blueprint; 2] = [Blueprint::Basic, Blueprint::Cloze];

    pub fn from_type(note_type: &str) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|blueprint| blueprint.format().type_name() == note_type)
            .ok_or_else(|| DomainError::UnknownBlueprint(note_type.to_string()))
    }

    pub fn format(&self) -> &'static dyn NoteFormat {
        match self {
            Blueprint::Basic => &BasicNoteFormat,
            Blueprint::Cloze => &ClozeNoteFormat,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.format().type_name()
    }

    pub fn is_cloze(&self) -> bool {
        self.format().is_cloze()
    }

    pub fn render(&self, fields: &NoteFields, config: &ParseConfig) -> Result<String, DomainError> {
        self.format().render(fields, config)
    }

    pub fn parse_fields(&self, result: &ParseNoteResult) -> NoteFields {
        self.format().parse_fields(result)
    }
}

impl fmt::Display for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
