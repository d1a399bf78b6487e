// src/domain/cloze.rs
use lazy_static::lazy_static;
use regex::Regex;
use std::ops::Range;

lazy_static! {
    static ref ANKI_CLOZE_REGEX: Regex =
        Regex::new(r"\{\{c(\d+)::[\s\S]*?\}\}").expect("Failed to compile Anki cloze regex");
    static ref EXPLICIT_SHORT_CLOZE_REGEX: Regex =
        Regex::new(r"^c?(\d+)::([\s\S]*)$").expect("Failed to compile explicit short cloze regex");
    // Order matters: fenced code before inline code, block math before inline math
    static ref PROTECTED_REGEXES: Vec<Regex> = [
        r"```[\s\S]+?```",
        r"`[^`]+?`",
        r"\$\$[\s\S]+?\$\$",
        r"\$[^\s$][^$]*?\$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Failed to compile protected span regex"))
    .collect();
}

pub fn is_anki_cloze(text: &str) -> bool {
    ANKI_CLOZE_REGEX.is_match(text)
}

/// Rewrite short cloze syntax into Anki's `{{cN::...}}` form.
///
/// `{1::x}` and `{c1::x}` keep their index; bare `{x}` is numbered after the
/// highest index already present. Code spans and math are left alone.
pub fn convert_cloze_syntax(text: &str) -> String {
    let protected = protected_ranges(text);
    let is_protected = |pos: usize| protected.iter().any(|range| range.contains(&pos));

    let mut next_index = highest_index(text) + 1;
    let mut result = String::with_capacity(text.len());
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        if !rest.starts_with('{') || is_protected(pos) {
            let ch = rest.chars().next().unwrap_or_default();
            result.push(ch);
            pos += ch.len_utf8().max(1);
            continue;
        }

        if let Some(anki) = ANKI_CLOZE_REGEX.find(rest).filter(|m| m.start() == 0) {
            result.push_str(anki.as_str());
            pos += anki.end();
            continue;
        }

        let Some(close) = matching_brace(rest) else {
            result.push('{');
            pos += 1;
            continue;
        };

        let inner = &rest[1..close];
        match EXPLICIT_SHORT_CLOZE_REGEX.captures(inner) {
            Some(caps) => {
                result.push_str(&format!("{{{{c{}::{}}}}}", &caps[1], &caps[2]));
            }
            None => {
                result.push_str(&format!("{{{{c{}::{}}}}}", next_index, inner));
                next_index += 1;
            }
        }
        pos += close + 1;
    }

    result
}

fn highest_index(text: &str) -> u32 {
    ANKI_CLOZE_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}

/// Byte index of the `}` closing the `{` at the start of `text`
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn protected_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for regex in PROTECTED_REGEXES.iter() {
        for m in regex.find_iter(text) {
            let overlaps = ranges
                .iter()
                .any(|r| r.start < m.end() && m.start() < r.end);
            if !overlaps {
                ranges.push(m.range());
            }
        }
    }
    ranges
}
