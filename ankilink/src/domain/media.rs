// src/domain/media.rs
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    // ![alt](path) and ![[path]] embeds
    static ref MD_IMAGE_REGEX: Regex = Regex::new(r"!\[[^\]]*?\]\(([^)\s]+)[^)]*\)|!\[\[([^\]|]+)(?:\|[^\]]*)?\]\]")
        .expect("Failed to compile markdown image regex");

    // <img src="path">
    static ref HTML_IMAGE_REGEX: Regex = Regex::new(r#"<img[^>]+src="([^"]+)""#)
        .expect("Failed to compile HTML image regex");
}

/// Reference to an asset embedded in a note; the file itself lives elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Media {
    pub path: String,
}

impl Media {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// File name Anki would store the asset under
    pub fn file_name(&self) -> &str {
        self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path)
    }
}

/// Collect local media references from note text, in order, without duplicates.
/// Remote URLs are not media.
pub fn extract_media(texts: &[&str]) -> Vec<Media> {
    let mut medias: Vec<Media> = Vec::new();

    for text in texts {
        let md = MD_IMAGE_REGEX
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).or_else(|| cap.get(2)));
        let html = HTML_IMAGE_REGEX
            .captures_iter(text)
            .filter_map(|cap| cap.get(1));

        for found in md.chain(html) {
            let path = found.as_str().trim();
            if path.starts_with("http://") || path.starts_with("https://") {
                continue;
            }
            let media = Media::new(path);
            if !medias.contains(&media) {
                medias.push(media);
            }
        }
    }

    medias
}
