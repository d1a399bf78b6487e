// src/domain/tags.rs
use crate::constants::HIERARCHY_SEPARATOR;
use crate::domain::Settings;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Read-only lookup of the tags visible in a document, as the document
/// layer reports them (`#tag`, `#parent/child`)
pub trait TagCache {
    fn tags_for(&self, file: &Path) -> Option<Vec<String>>;
}

impl TagCache for HashMap<PathBuf, Vec<String>> {
    fn tags_for(&self, file: &Path) -> Option<Vec<String>> {
        self.get(file).cloned()
    }
}

/// Cache with no entries, for callers that have no document layer
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTagCache;

impl TagCache for NoTagCache {
    fn tags_for(&self, _file: &Path) -> Option<Vec<String>> {
        None
    }
}

/// Turn a cached document tag into an Anki tag: `#Bio/Cells` -> `Bio::Cells`
pub fn to_anki_tag(tag: &str) -> String {
    tag.strip_prefix('#')
        .unwrap_or(tag)
        .replace('/', HIERARCHY_SEPARATOR)
}

/// Marker tag first, then document tags (when inherited), then note tags;
/// duplicates keep their first position.
pub fn resolve_tags(
    note_tags: Option<&[String]>,
    file: &Path,
    cache: &dyn TagCache,
    settings: &Settings,
) -> Vec<String> {
    let inherited = if settings.inherit_tags {
        cache
            .tags_for(file)
            .map(|tags| tags.iter().map(|tag| to_anki_tag(tag)).collect())
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    let mut tags = vec![settings.tag_in_anki.clone()];
    for tag in inherited
        .into_iter()
        .chain(note_tags.unwrap_or_default().iter().cloned())
    {
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(file: &str, tags: &[&str]) -> HashMap<PathBuf, Vec<String>> {
        HashMap::from([(
            PathBuf::from(file),
            tags.iter().map(|t| t.to_string()).collect(),
        )])
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn given_cached_and_note_tags_when_resolving_then_merges_without_duplicates() {
        let cache = cache("Bio.md", &["#Bio/Cells", "#exam"]);
        let note_tags = strings(&["exam"]);

        let tags = resolve_tags(
            Some(&note_tags),
            Path::new("Bio.md"),
            &cache,
            &Settings::default(),
        );

        assert_eq!(tags, strings(&["obsidian", "Bio::Cells", "exam"]));
    }

    #[test]
    fn given_inherit_tags_disabled_when_resolving_then_ignores_cache() {
        let cache = cache("Bio.md", &["#Bio/Cells"]);
        let settings = Settings {
            inherit_tags: false,
            ..Default::default()
        };
        let note_tags = strings(&["exam"]);

        let tags = resolve_tags(Some(&note_tags), Path::new("Bio.md"), &cache, &settings);

        assert_eq!(tags, strings(&["obsidian", "exam"]));
    }

    #[test]
    fn given_no_cache_entry_when_resolving_then_uses_note_tags_only() {
        let cache = cache("Other.md", &["#Bio"]);

        let tags = resolve_tags(None, Path::new("Bio.md"), &cache, &Settings::default());

        assert_eq!(tags, strings(&["obsidian"]));
    }

    #[test]
    fn given_marker_tag_in_sources_when_resolving_then_it_appears_once_and_first() {
        let cache = cache("Bio.md", &["#exam", "#obsidian"]);
        let note_tags = strings(&["obsidian"]);

        let tags = resolve_tags(
            Some(&note_tags),
            Path::new("Bio.md"),
            &cache,
            &Settings::default(),
        );

        assert_eq!(tags, strings(&["obsidian", "exam"]));
    }

    #[test]
    fn given_empty_cache_when_resolving_then_returns_marker_only() {
        let tags = resolve_tags(None, Path::new("Bio.md"), &NoTagCache, &Settings::default());

        assert_eq!(tags, strings(&["obsidian"]));
    }
}
