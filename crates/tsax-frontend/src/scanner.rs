//! Byte scanner for the TypeScript declaration subset.
//!
//! Produces a flat token stream with byte spans. Comments are not tokens;
//! they are collected as leading trivia on the next real token, which is
//! how the parser attaches doc comments to declarations.

use std::fmt;

use tsax_common::{CommentRange, Span};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    StringLit,
    NumberLit,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LAngle,
    RAngle,
    Comma,
    Colon,
    Semicolon,
    Pipe,
    Amp,
    Question,
    Eq,
    Arrow,
    Dot,
    Ellipsis,
    /// Anything the parser has no use for (operators inside skipped code).
    Other,
    Eof,
}

#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Comments between the previous token and this one.
    pub leading_comments: Vec<CommentRange>,
}

#[derive(Clone, Debug)]
pub struct ScanError {
    pub message: String,
    pub pos: u32,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.pos)
    }
}

/// Scan the whole source. The stream always ends with an `Eof` token,
/// which carries any trailing comments.
pub fn scan(source: &str) -> Result<Vec<Token>, ScanError> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut pos = 0usize;
    let mut tokens = Vec::new();
    let mut pending_comments: Vec<CommentRange> = Vec::new();

    macro_rules! push {
        ($kind:expr, $start:expr, $end:expr) => {
            tokens.push(Token {
                kind: $kind,
                span: Span::new($start as u32, $end as u32),
                leading_comments: std::mem::take(&mut pending_comments),
            })
        };
    }

    while pos < len {
        let ch = bytes[pos];

        if ch == b' ' || ch == b'\t' || ch == b'\r' || ch == b'\n' {
            pos += 1;
            continue;
        }

        if ch == b'/' {
            let next = if pos + 1 < len { bytes[pos + 1] } else { 0 };
            if next == b'/' {
                let start = pos as u32;
                pos += 2;
                while pos < len && bytes[pos] != b'\n' && bytes[pos] != b'\r' {
                    pos += 1;
                }
                pending_comments.push(CommentRange::new(start, pos as u32, false));
                continue;
            }
            if next == b'*' {
                let start = pos as u32;
                pos += 2;
                let mut closed = false;
                while pos + 1 < len {
                    if bytes[pos] == b'*' && bytes[pos + 1] == b'/' {
                        pos += 2;
                        closed = true;
                        break;
                    }
                    pos += 1;
                }
                if !closed {
                    return Err(ScanError {
                        message: "unterminated block comment".to_string(),
                        pos: start,
                    });
                }
                pending_comments.push(CommentRange::new(start, pos as u32, true));
                continue;
            }
            // Regex literals live inside skipped function bodies; they must
            // not be mistaken for string openers or division. Whether a `/`
            // starts a regex depends on what precedes it.
            if regex_allowed(&tokens, source) {
                let start = pos;
                pos += 1;
                let mut in_class = false;
                let mut closed = false;
                while pos < len {
                    let c = bytes[pos];
                    if c == b'\\' {
                        pos += 2;
                        continue;
                    }
                    match c {
                        b'[' => in_class = true,
                        b']' => in_class = false,
                        b'/' if !in_class => {
                            pos += 1;
                            closed = true;
                            break;
                        }
                        b'\n' | b'\r' => break,
                        _ => {}
                    }
                    pos += 1;
                }
                if !closed {
                    return Err(ScanError {
                        message: "unterminated regular expression".to_string(),
                        pos: start as u32,
                    });
                }
                while pos < len && is_ident_continue(bytes[pos]) {
                    pos += 1; // flags
                }
                push!(TokenKind::Other, start, pos);
                continue;
            }
            // otherwise a division operator; falls through to punctuation
        }

        // String literals (single, double, or template quotes).
        if ch == b'"' || ch == b'\'' || ch == b'`' {
            let quote = ch;
            let start = pos;
            pos += 1;
            let mut closed = false;
            while pos < len {
                let c = bytes[pos];
                if c == b'\\' {
                    pos += 2;
                    continue;
                }
                if c == quote {
                    pos += 1;
                    closed = true;
                    break;
                }
                // Template literals may span lines; quoted strings may not.
                if quote != b'`' && (c == b'\n' || c == b'\r') {
                    break;
                }
                pos += 1;
            }
            if !closed {
                return Err(ScanError {
                    message: "unterminated string literal".to_string(),
                    pos: start as u32,
                });
            }
            push!(TokenKind::StringLit, start, pos);
            continue;
        }

        if ch.is_ascii_digit() {
            let start = pos;
            pos += 1;
            let radix_prefix = pos < len
                && bytes[start] == b'0'
                && matches!(bytes[pos] | 0x20, b'x' | b'o' | b'b');
            if radix_prefix {
                pos += 1;
                while pos < len && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
                    pos += 1;
                }
            } else {
                while pos < len
                    && (bytes[pos].is_ascii_digit()
                        || bytes[pos] == b'.'
                        || bytes[pos] == b'_'
                        || (bytes[pos] | 0x20) == b'e'
                        || ((bytes[pos] == b'+' || bytes[pos] == b'-')
                            && (bytes[pos - 1] | 0x20) == b'e'))
                {
                    pos += 1;
                }
            }
            push!(TokenKind::NumberLit, start, pos);
            continue;
        }

        if is_ident_start(ch) {
            let start = pos;
            pos += 1;
            while pos < len && is_ident_continue(bytes[pos]) {
                pos += 1;
            }
            push!(TokenKind::Ident, start, pos);
            continue;
        }

        // Punctuation.
        let start = pos;
        let kind = match ch {
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b'<' => TokenKind::LAngle,
            b'>' => TokenKind::RAngle,
            b',' => TokenKind::Comma,
            b':' => TokenKind::Colon,
            b';' => TokenKind::Semicolon,
            b'|' => TokenKind::Pipe,
            b'&' => TokenKind::Amp,
            b'?' => TokenKind::Question,
            b'.' => {
                if pos + 2 < len && bytes[pos + 1] == b'.' && bytes[pos + 2] == b'.' {
                    pos += 2;
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            b'=' => {
                if pos + 1 < len && bytes[pos + 1] == b'>' {
                    pos += 1;
                    TokenKind::Arrow
                } else if pos + 1 < len && bytes[pos + 1] == b'=' {
                    // == / === scan as a single Other token
                    while pos + 1 < len && bytes[pos + 1] == b'=' {
                        pos += 1;
                    }
                    TokenKind::Other
                } else {
                    TokenKind::Eq
                }
            }
            _ => TokenKind::Other,
        };
        pos += 1;
        push!(kind, start, pos);
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(len as u32, len as u32),
        leading_comments: pending_comments,
    });
    Ok(tokens)
}

/// Whether a `/` at the current position can start a regex literal.
///
/// A regex may follow an operator, an opening bracket, or an expression
/// keyword; after an identifier, a literal, or a closing bracket the `/`
/// is division.
fn regex_allowed(tokens: &[Token], source: &str) -> bool {
    let Some(prev) = tokens.last() else {
        return true;
    };
    match prev.kind {
        TokenKind::Ident => matches!(
            prev.span.text(source),
            "return"
                | "typeof"
                | "case"
                | "in"
                | "of"
                | "new"
                | "delete"
                | "void"
                | "do"
                | "else"
                | "yield"
                | "await"
                | "instanceof"
        ),
        TokenKind::StringLit
        | TokenKind::NumberLit
        | TokenKind::RParen
        | TokenKind::RBracket
        | TokenKind::RBrace
        | TokenKind::RAngle => false,
        _ => true,
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_' || ch == b'$' || !ch.is_ascii()
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_' || ch == b'$' || !ch.is_ascii()
}

/// Cook a string literal's value: strip quotes, process simple escapes.
pub fn cook_string(raw: &str) -> String {
    let inner = if raw.len() >= 2 { &raw[1..raw.len() - 1] } else { raw };
    if !inner.contains('\\') {
        return inner.to_string();
    }
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
