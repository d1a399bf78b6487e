use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary vault of markdown documents
#[allow(dead_code)]
pub struct TestVault {
    temp_dir: TempDir,
    pub root: PathBuf,
}

#[allow(dead_code)]
impl TestVault {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir().context("Failed to create temporary directory")?;
        let root = temp_dir.path().join("vault");
        std::fs::create_dir_all(&root).context("Failed to create vault directory")?;
        Ok(Self { temp_dir, root })
    }

    /// Write a document at a vault-relative path, creating folders as needed
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn read(&self, relative: &str) -> Result<String> {
        std::fs::read_to_string(self.root.join(relative)).context("Failed to read document")
    }

    /// Write a file outside the vault tree, e.g. a remote snapshot
    pub fn write_outside(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content)?;
        Ok(path)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

/// AnkiConnect `notesInfo` entry for a Basic note
#[allow(dead_code)]
pub fn basic_note_info(id: i64, front: &str, back: &str, tags: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "noteId": id,
        "modelName": "Basic",
        "tags": tags,
        "fields": {
            "Front": {"value": front, "order": 0},
            "Back": {"value": back, "order": 1}
        }
    })
}
