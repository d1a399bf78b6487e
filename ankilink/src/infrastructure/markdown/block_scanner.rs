use crate::constants::FIELD_SEPARATOR;
use crate::domain::{DomainError, ParseLocation, ParseNoteResult};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // <!--anki[:type] [config] -->\n body \n<!--/anki-->, LF or CRLF
    static ref BLOCK_REGEX: Regex = Regex::new(
        r"(?msR)^<!--anki(?::([A-Za-z]+))?(.*?)-->\r?\n(.*?)\r?\n?^<!--/anki-->$"
    )
    .expect("Failed to compile note block regex");
}

/// A note block found in a document.
///
/// `text` and the parsed fields use LF line endings; the location still
/// points at the original bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedBlock {
    pub result: ParseNoteResult,
    pub text: String,
}

/// Find every note block in `content`.
///
/// `source` is recorded on each location, usually the document's vault path.
pub fn scan_blocks(content: &str, source: &str) -> Result<Vec<ScannedBlock>, DomainError> {
    let mut blocks = Vec::new();

    for caps in BLOCK_REGEX.captures_iter(content) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let note_type = caps.get(1).map_or("basic", |m| m.as_str());
        let config = caps
            .get(2)
            .map(|m| m.as_str())
            .filter(|c| !c.trim().is_empty())
            .map(|c| to_lf(c).trim_start_matches('\n').to_string());
        let body = to_lf(caps.get(3).map_or("", |m| m.as_str()));
        let (front, back) = split_body(&body);

        blocks.push(ScannedBlock {
            result: ParseNoteResult {
                note_type: note_type.to_string(),
                config,
                front: Some(front.to_string()),
                back: back.map(str::to_string),
                location: ParseLocation::from_range(content, whole.range())?.with_source(source),
            },
            text: to_lf(whole.as_str()),
        });
    }

    Ok(blocks)
}

fn to_lf(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Split at the first line that is exactly `---`
fn split_body(body: &str) -> (&str, Option<&str>) {
    if let Some(back) = body.strip_prefix(&format!("{}\n", FIELD_SEPARATOR)) {
        return ("", Some(back));
    }
    if body == FIELD_SEPARATOR {
        return ("", Some(""));
    }
    let separator = format!("\n{}\n", FIELD_SEPARATOR);
    if let Some(pos) = body.find(&separator) {
        return (&body[..pos], Some(&body[pos + separator.len()..]));
    }
    if let Some(front) = body.strip_suffix(&format!("\n{}", FIELD_SEPARATOR)) {
        return (front, Some(""));
    }
    (body, None)
}
