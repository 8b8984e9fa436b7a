//! Comment ranges and comment text cleanup.
//!
//! Comments are not part of the declaration model, so the scanner extracts
//! them separately and attaches them as leading trivia to the next
//! declaration. This module holds the range type and the cleanup pass that
//! turns raw comment text into human-readable description text.

use serde::{Deserialize, Serialize};

/// A range representing a comment in the source text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommentRange {
    /// Start position (byte offset)
    pub pos: u32,
    /// End position (byte offset)
    pub end: u32,
    /// Whether this is a multi-line comment
    pub is_multi_line: bool,
}

impl CommentRange {
    pub fn new(pos: u32, end: u32, is_multi_line: bool) -> Self {
        CommentRange {
            pos,
            end,
            is_multi_line,
        }
    }

    /// Get the comment text from source, delimiters included.
    pub fn get_text<'a>(&self, source: &'a str) -> &'a str {
        let start = self.pos as usize;
        let end = self.end as usize;
        if end <= source.len() && start < end {
            &source[start..end]
        } else {
            ""
        }
    }
}

/// Strip comment delimiters and doc-comment decoration from raw comment text.
///
/// Handles `// ...`, `/* ... */`, and `/** ... */` forms. For multi-line
/// comments each line loses its leading `*` (the JSDoc gutter). Interior
/// line breaks collapse to single spaces so the result is one line of text.
pub fn clean_comment_text(raw: &str) -> String {
    let body = if let Some(rest) = raw.strip_prefix("/*") {
        // `/**` doc comments have one more `*` to drop
        let rest = rest.strip_prefix('*').unwrap_or(rest);
        rest.strip_suffix("*/").unwrap_or(rest)
    } else {
        raw.strip_prefix("//").unwrap_or(raw)
    };

    let mut out = String::with_capacity(body.len());
    for line in body.lines() {
        let line = line.trim();
        let line = line.strip_prefix('*').unwrap_or(line).trim();
        if line.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(line);
    }
    out
}
