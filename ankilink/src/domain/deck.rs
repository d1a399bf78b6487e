// src/domain/deck.rs
use crate::constants::HIERARCHY_SEPARATOR;
use crate::domain::location::vault_path_string;
use crate::domain::{Config, Settings, SourceDescriptor};
use tracing::trace;

/// Decide which deck a note belongs in.
///
/// Never fails: anything that does not resolve lands in `fallback_deck`.
pub fn resolve_deck(config: &Config, source: &SourceDescriptor, settings: &Settings) -> String {
    match settings.inherit_deck {
        Some(false) => {
            if let Some(deck) = &config.deck {
                return deck.clone();
            }
            let folder = source.parent_folder();
            if let Some(deck) = settings.default_deck_maps.get(&folder) {
                return deck.clone();
            }
            trace!(%folder, "No deck mapping for folder, using fallback deck");
        }
        Some(true) => {
            let mirrored = vault_path_string(&source.file).replace('/', HIERARCHY_SEPARATOR);
            if !mirrored.is_empty() {
                return format!(
                    "{}{}{}",
                    settings.fallback_deck, HIERARCHY_SEPARATOR, mirrored
                );
            }
        }
        None => {}
    }
    settings.fallback_deck.clone()
}
