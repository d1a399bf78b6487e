// src/constants.rs
//
// Names and markers shared between the note model, the block dialect and Anki.

/// Model name Anki uses for cloze notes; remote cloze detection compares against it.
pub const CLOZE_MODEL_NAME: &str = "Cloze";

/// Model name used when creating non-cloze notes.
pub const BASIC_MODEL_NAME: &str = "Basic";

pub const FRONT_FIELD: &str = "Front";
pub const BACK_FIELD: &str = "Back";
pub const TEXT_FIELD: &str = "Text";
pub const BACK_EXTRA_FIELD: &str = "Back Extra";

/// Separator between levels of Anki deck and tag hierarchies.
pub const HIERARCHY_SEPARATOR: &str = "::";

/// Opening of a note block header, optionally followed by `:<type>`.
///
/// Used in: `infrastructure/markdown/block_scanner.rs`, `domain/blueprint.rs`
pub const BLOCK_OPEN: &str = "<!--anki";

/// Line that terminates a note block.
pub const BLOCK_CLOSE: &str = "<!--/anki-->";

/// Line separating front from back inside a note block.
pub const FIELD_SEPARATOR: &str = "---";

/// File name of the settings file inside the user config directory.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Directory that marks a vault root; searched for upwards from the scanned path.
pub const VAULT_MARKER: &str = ".obsidian";
