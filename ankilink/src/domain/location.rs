// src/domain/location.rs
use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A single point in source text.
///
/// `offset` and `column` count bytes, `line` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseLocationMarker {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl ParseLocationMarker {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Compute the marker for a byte offset into `text`
    pub fn at(text: &str, offset: usize) -> Self {
        let before = &text[..offset.min(text.len())];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before.len() - newline - 1,
            None => before.len(),
        };
        Self::new(offset, line, column)
    }
}

impl Default for ParseLocationMarker {
    fn default() -> Self {
        Self::new(0, 1, 0)
    }
}

/// Half-open span `[start, end)` of a note block in its document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseLocation {
    start: ParseLocationMarker,
    end: ParseLocationMarker,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl ParseLocation {
    pub fn new(start: ParseLocationMarker, end: ParseLocationMarker) -> Result<Self, DomainError> {
        if start.offset > end.offset {
            return Err(DomainError::InvalidSpan(format!(
                "start offset {} is after end offset {}",
                start.offset, end.offset
            )));
        }
        Ok(Self {
            start,
            end,
            source: None,
        })
    }

    /// Span covering `range` of `text`
    pub fn from_range(text: &str, range: std::ops::Range<usize>) -> Result<Self, DomainError> {
        Self::new(
            ParseLocationMarker::at(text, range.start),
            ParseLocationMarker::at(text, range.end),
        )
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn start(&self) -> ParseLocationMarker {
        self.start
    }

    pub fn end(&self) -> ParseLocationMarker {
        self.end
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start.offset..self.end.offset
    }
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start.line, self.start.column)
    }
}

/// Where a note lives: its vault-relative file and span
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    pub file: PathBuf,
    pub location: ParseLocation,
}

impl SourceDescriptor {
    pub fn new(file: impl Into<PathBuf>, location: ParseLocation) -> Self {
        Self {
            file: file.into(),
            location,
        }
    }

    /// Parent folder as a `/`-separated vault path, empty at the vault root
    pub fn parent_folder(&self) -> String {
        self.file
            .parent()
            .map(vault_path_string)
            .unwrap_or_default()
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", vault_path_string(&self.file), self.location)
    }
}

/// Render a path with `/` separators regardless of platform
pub fn vault_path_string(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_offset_on_third_line_when_computing_marker_then_counts_lines_and_columns() {
        let text = "one\ntwo\nthree";

        let marker = ParseLocationMarker::at(text, 10);

        assert_eq!(marker, ParseLocationMarker::new(10, 3, 2));
    }

    #[test]
    fn given_offset_zero_when_computing_marker_then_starts_at_line_one() {
        let marker = ParseLocationMarker::at("abc", 0);

        assert_eq!(marker, ParseLocationMarker::default());
    }

    #[test]
    fn given_start_after_end_when_creating_location_then_rejects() {
        let result = ParseLocation::new(
            ParseLocationMarker::new(10, 1, 10),
            ParseLocationMarker::new(2, 1, 2),
        );

        assert!(matches!(result, Err(DomainError::InvalidSpan(_))));
    }

    #[test]
    fn given_nested_file_when_getting_parent_folder_then_uses_slashes() {
        let location = ParseLocation::from_range("x", 0..1).unwrap();
        let source = SourceDescriptor::new(PathBuf::from("Biology").join("Cells.md"), location);

        assert_eq!(source.parent_folder(), "Biology");
        assert_eq!(source.to_string(), "Biology/Cells.md:1:0");
    }

    #[test]
    fn given_file_at_root_when_getting_parent_folder_then_returns_empty() {
        let location = ParseLocation::from_range("x", 0..1).unwrap();
        let source = SourceDescriptor::new("Cells.md", location);

        assert_eq!(source.parent_folder(), "");
    }
}
