use crate::domain::ParseLocation;
use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Read markdown file content
pub fn read_markdown_file(path: impl AsRef<Path>) -> Result<String> {
    std::fs::read_to_string(path.as_ref()).context("Failed to read markdown file")
}

/// Write via a temporary file in the same directory, then rename over the target
pub fn write_markdown_file(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir).context("Failed to create temporary file")?;
    temp.write_all(content.as_bytes())
        .context("Failed to write temporary file")?;
    temp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}

/// Replace each span of `content` with its new text.
///
/// Spans refer to the original content; they must be in range, on character
/// boundaries and must not overlap.
pub fn splice(content: &str, edits: &[(ParseLocation, String)]) -> Result<String> {
    let mut ordered: Vec<&(ParseLocation, String)> = edits.iter().collect();
    ordered.sort_by_key(|(location, _)| location.start().offset);

    let mut previous_end = 0;
    for (location, _) in &ordered {
        let range = location.range();
        if range.start < previous_end {
            bail!("Overlapping edit at {}", location);
        }
        if range.end > content.len()
            || !content.is_char_boundary(range.start)
            || !content.is_char_boundary(range.end)
        {
            bail!("Edit at {} is outside the document", location);
        }
        previous_end = range.end;
    }

    let mut result = content.to_string();
    for (location, replacement) in ordered.into_iter().rev() {
        result.replace_range(location.range(), replacement);
    }
    Ok(result)
}

/// Apply `edits` to the file at `path`; returns whether anything was written.
///
/// Replacements use LF; in a CRLF document they are written with CRLF.
pub fn apply_edits(path: impl AsRef<Path>, edits: &[(ParseLocation, String)]) -> Result<bool> {
    if edits.is_empty() {
        return Ok(false);
    }
    let path = path.as_ref();
    let content = read_markdown_file(path)?;
    let updated = if content.contains("\r\n") {
        let crlf_edits: Vec<(ParseLocation, String)> = edits
            .iter()
            .map(|(location, text)| (location.clone(), text.replace('\n', "\r\n")))
            .collect();
        splice(&content, &crlf_edits)
    } else {
        splice(&content, edits)
    }
        .with_context(|| format!("Cannot update {}", path.display()))?;
    if updated == content {
        return Ok(false);
    }
    write_markdown_file(path, &updated)?;
    Ok(true)
}
