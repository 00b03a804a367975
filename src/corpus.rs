use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Marks where whitespace used to be in a preprocessed corpus.
pub const OPEN_BOX: char = '␣';

/// Reads a UTF-8 corpus as a sequence of code points. Nothing is stripped.
pub fn read_corpus(path: &Path) -> Result<Vec<char>> {
    let text = fs::read_to_string(path).context("error reading corpus file")?;
    Ok(text.chars().collect())
}

/// Characters turned into a plain space inside a line.
const SPACES: &[char] = &[
    '\t', '\u{85}', '\u{a0}', '\u{2000}', '\u{2001}', '\u{2002}', '\u{2003}', '\u{2004}',
    '\u{2005}', '\u{2006}', '\u{2007}', '\u{2008}', '\u{2009}', '\u{200a}', '\u{2028}',
    '\u{2029}', '\u{202f}', '\u{205f}', '\u{3000}',
];

/// Characters that split a line.
const LINE_BREAKS: &[char] = &['\u{b}', '\u{c}'];

/// Whitespace trimmed from both ends of a line: Unicode white space plus the
/// information separators U+001C..U+001F.
fn is_edge_space(ch: char) -> bool {
    ch.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&ch)
}

/// Decodes UTF-8, dropping any bytes that are not part of a valid sequence.
pub fn decode_lossy(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(err) => {
                let (valid, rest) = bytes.split_at(err.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                let skip = err.error_len().unwrap_or(rest.len());
                bytes = &rest[skip..];
            }
        }
    }
}

/// Reads raw text for preprocessing. Invalid UTF-8 is skipped, not an error.
pub fn read_text_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).context("error reading corpus file")?;
    Ok(decode_lossy(&bytes))
}

/// Joins the whole text into a single line with every whitespace run
/// replaced by one [`OPEN_BOX`], so that whitespace can take part in
/// substrings like any other character.
///
/// Lines (split at `\n`, `\r\n` or `\r`) are trimmed, tabs and the Unicode
/// spaces become spaces, vertical tab and form feed split the line, and empty
/// lines are dropped. Spaces and line ends then become `␣`, and runs of `␣`,
/// including ones already in the text, collapse to one. Other characters,
/// such as U+1680 inside a line, are kept.
pub fn visualize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(text.len());
    for line in text.split('\n') {
        let line: String = line
            .trim_matches(is_edge_space)
            .chars()
            .map(|ch| {
                if SPACES.contains(&ch) {
                    ' '
                } else if LINE_BREAKS.contains(&ch) {
                    '\n'
                } else {
                    ch
                }
            })
            .collect();
        for segment in line.split('\n') {
            let segment = segment.trim_matches(is_edge_space);
            if segment.is_empty() {
                continue;
            }
            if !out.is_empty() && !out.ends_with(OPEN_BOX) {
                out.push(OPEN_BOX);
            }
            for ch in segment.chars() {
                if ch == ' ' || ch == OPEN_BOX {
                    if !out.ends_with(OPEN_BOX) {
                        out.push(OPEN_BOX);
                    }
                } else {
                    out.push(ch);
                }
            }
        }
    }
    out
}
