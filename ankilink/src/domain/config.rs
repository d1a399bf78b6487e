// src/domain/config.rs
use crate::domain::{DomainError, ParseNoteResult};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

/// Per-note overrides. `None` always means "inherit from settings".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deck: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloze: Option<bool>,
}

/// Config as written in the note block, including the remote identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub config: Config,
}

impl ParseConfig {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Serialize to the YAML written inside a note block; empty config yields ""
    pub fn to_yaml(&self) -> Result<String, DomainError> {
        if self.is_empty() {
            return Ok(String::new());
        }
        serde_yaml::to_string(self).map_err(|e| DomainError::validation(e.to_string()))
    }
}

/// Deserialize and validate the configuration embedded in a parsed note block.
pub fn parse_config(result: &ParseNoteResult) -> Result<ParseConfig, DomainError> {
    let raw = result.config.as_deref().unwrap_or("");
    if raw.trim().is_empty() {
        return Ok(ParseConfig::default());
    }

    let value: Value = serde_yaml::from_str(raw)
        .map_err(|e| DomainError::validation(format!("malformed YAML: {}", e)))?;

    let mapping = match value {
        Value::Null => return Ok(ParseConfig::default()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(DomainError::validation(format!(
                "expected a mapping, found {}",
                kind_of(&other)
            )))
        }
    };

    for key in mapping.keys() {
        if !matches!(key.as_str(), Some(k) if KNOWN_KEYS.contains(&k)) {
            debug!(?key, "Ignoring unknown note configuration key");
        }
    }

    Ok(ParseConfig {
        id: field(&mapping, "id", as_id)?,
        config: Config {
            deck: field(&mapping, "deck", as_string)?.filter(|deck| !deck.is_empty()),
            tags: field(&mapping, "tags", as_string_list)?,
            delete: field(&mapping, "delete", as_bool)?,
            enabled: field(&mapping, "enabled", as_bool)?,
            cloze: field(&mapping, "cloze", as_bool)?,
        },
    })
}

const KNOWN_KEYS: &[&str] = &["id", "deck", "tags", "delete", "enabled", "cloze"];

/// Look up `key` and run `check` on it; absent and null both map to `None`
fn field<T>(
    mapping: &Mapping,
    key: &str,
    check: fn(&Value) -> Option<T>,
) -> Result<Option<T>, DomainError> {
    match mapping.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => check(value).map(Some).ok_or_else(|| {
            DomainError::validation(format!("'{}' has an invalid {}", key, kind_of(value)))
        }),
    }
}

fn as_id(value: &Value) -> Option<i64> {
    value.as_i64()
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn as_bool(value: &Value) -> Option<bool> {
    value.as_bool()
}

fn as_string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_sequence()?
        .iter()
        .map(as_string)
        .collect::<Option<Vec<_>>>()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
