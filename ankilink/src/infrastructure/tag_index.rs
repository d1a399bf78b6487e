use crate::domain::location::vault_path_string;
use crate::domain::TagCache;
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

lazy_static! {
    static ref FRONT_MATTER_REGEX: Regex =
        Regex::new(r"(?s)\A---\r?\n(.*?)\r?\n---(?:\r?\n|\z)").expect("Failed to compile front matter regex");
    // A tag needs at least one non-digit word character, in any script
    static ref INLINE_TAG_REGEX: Regex =
        Regex::new(r"(?m)(?:^|[\s(])#([\w/-]*[^\d\W][\w/-]*)")
            .expect("Failed to compile inline tag regex");
    static ref CODE_REGEX: Regex =
        Regex::new(r"```[\s\S]*?```|`[^`\n]+`").expect("Failed to compile code regex");
    static ref NOTE_BLOCK_CONFIG_REGEX: Regex =
        Regex::new(r"(?s)<!--.*?-->").expect("Failed to compile comment regex");
}

/// Tags visible in each vault document, keyed by vault-relative path.
///
/// Tags are kept the way a document cache reports them, with the leading `#`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagIndex {
    tags: HashMap<PathBuf, Vec<String>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an index exported as a JSON object `{ "path.md": ["#tag", ...] }`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read tag index file")?;
        let raw: HashMap<String, Vec<String>> =
            serde_json::from_str(&content).context("Failed to parse tag index JSON")?;

        Ok(Self {
            tags: raw
                .into_iter()
                .map(|(file, tags)| (PathBuf::from(file), tags))
                .collect(),
        })
    }

    pub fn insert(&mut self, file: impl Into<PathBuf>, tags: Vec<String>) {
        self.tags.insert(file.into(), tags);
    }

    /// Index one document's tags from its markdown source
    pub fn index_document(&mut self, file: impl Into<PathBuf>, content: &str) {
        let file = file.into();
        let tags = extract_document_tags(content);
        debug!(file = %vault_path_string(&file), count = tags.len(), "Indexed document tags");
        self.tags.insert(file, tags);
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl TagCache for TagIndex {
    fn tags_for(&self, file: &Path) -> Option<Vec<String>> {
        self.tags.get(file).cloned()
    }
}

/// Front-matter tags first, then inline `#tags`; code spans and HTML
/// comments (including note block headers) are skipped
pub fn extract_document_tags(content: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut push = |tag: String| {
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    };

    let body = match FRONT_MATTER_REGEX.captures(content) {
        Some(caps) => {
            for tag in front_matter_tags(&caps[1]) {
                push(format!("#{}", tag.trim_start_matches('#')));
            }
            &content[caps[0].len()..]
        }
        None => content,
    };

    let without_code = CODE_REGEX.replace_all(body, " ");
    let without_comments = NOTE_BLOCK_CONFIG_REGEX.replace_all(&without_code, " ");
    for caps in INLINE_TAG_REGEX.captures_iter(&without_comments) {
        push(format!("#{}", caps[1].trim_end_matches('/')));
    }

    tags
}

fn front_matter_tags(yaml: &str) -> Vec<String> {
    let value: Value = match serde_yaml::from_str(yaml) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Ignoring unparsable front matter");
            return Vec::new();
        }
    };

    match value.get("tags").or_else(|| value.get("tag")) {
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(list)) => list
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
