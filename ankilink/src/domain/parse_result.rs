// src/domain/parse_result.rs
use crate::domain::ParseLocation;
use serde::{Deserialize, Serialize};

/// Raw output of the block parser for one note, before any validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseNoteResult {
    #[serde(rename = "type")]
    pub note_type: String,
    pub config: Option<String>,
    pub front: Option<String>,
    pub back: Option<String>,
    pub location: ParseLocation,
}
