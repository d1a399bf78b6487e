// src/domain/settings.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Global sync settings, shared read-only by every resolver call
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Settings {
    /// `false`: per-note deck, then folder maps. `true`: mirror the file path.
    /// Unset: always the fallback deck.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherit_deck: Option<bool>,
    #[serde(default = "default_fallback_deck")]
    pub fallback_deck: String,
    #[serde(default = "default_inherit_tags")]
    pub inherit_tags: bool,
    /// Marker tag put on every synced note
    #[serde(default = "default_tag_in_anki")]
    pub tag_in_anki: String,
    /// Vault folder (`/`-separated) to deck name
    #[serde(default)]
    pub default_deck_maps: BTreeMap<String, String>,
}

fn default_fallback_deck() -> String { "Default".to_string() }
fn default_inherit_tags() -> bool { true }
fn default_tag_in_anki() -> String { "obsidian".to_string() }

impl Default for Settings {
    fn default() -> Self {
        Self {
            inherit_deck: None,
            fallback_deck: default_fallback_deck(),
            inherit_tags: default_inherit_tags(),
            tag_in_anki: default_tag_in_anki(),
            default_deck_maps: BTreeMap::new(),
        }
    }
}
