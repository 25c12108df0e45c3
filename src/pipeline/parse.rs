//! Line parsing: one raw deck-list line → [`CardRequest`].
//!
//! ## Grammar
//!
//! ```text
//! [QTY[x]] [WS] [T:] NAME [(SET)]
//! ```
//!
//! | Segment | Characters | Notes |
//! |---------|------------|-------|
//! | `QTY`   | ASCII digits, then an optional `x` | consumed, value unused |
//! | `WS`    | whitespace | |
//! | `T:`    | one word char + `:` | `t:` only under [`TokenPrefix::Strict`]; sets `is_token` |
//! | `NAME`  | word chars, `+ ' , . - ! ` and space | longest run, trimmed, needs a word char |
//! | `SET`   | up to 6 word chars after `(` | closing `)` optional; extra chars ignored |
//!
//! "Word char" is ASCII `[A-Za-z0-9_]`. Anything after the set code is
//! ignored, so trailing comments such as `# sideboard` do not break a line.

use crate::config::TokenPrefix;
use std::fmt;

/// Longest set code accepted inside the parentheses.
const MAX_SET_CODE_LEN: usize = 6;

/// A structured request derived from one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRequest {
    /// Trimmed, never empty.
    pub name: String,
    pub set_code: Option<String>,
    pub is_token: bool,
}

impl CardRequest {
    /// Miss-report entry: `name` or `name(SET)`.
    pub fn canonical(&self) -> String {
        match &self.set_code {
            Some(set) => format!("{}({})", self.name, set),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for CardRequest {
    /// Human label: `name` or `name (SET)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.set_code {
            Some(set) => write!(f, "{} ({})", self.name, set),
            None => f.write_str(&self.name),
        }
    }
}

/// U+FEFF, left at the start of files saved by some Windows editors.
pub const BYTE_ORDER_MARK: char = '\u{FEFF}';

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_name_char(c: char) -> bool {
    is_word_char(c) || matches!(c, '+' | '\'' | ',' | '.' | '-' | ' ' | '!')
}

/// Parse one line into a request.
///
/// Returns `None` for blank lines and for lines with no name after the
/// optional quantity and token prefix. Such lines are skipped silently and
/// never reach the miss report. A leading byte-order mark counts as
/// whitespace.
pub fn parse_line(line: &str, token_prefix: TokenPrefix) -> Option<CardRequest> {
    let line = line.trim_start_matches(BYTE_ORDER_MARK);
    if line.trim().is_empty() {
        return None;
    }

    let mut rest = line.trim_start();

    // Quantity: digits, optionally followed by `x`.
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        rest = &rest[digits..];
        rest = rest.strip_prefix('x').unwrap_or(rest);
    }

    rest = rest.trim_start();

    // Token marker.
    let is_token = match strip_token_prefix(rest, token_prefix) {
        Some(after) => {
            rest = after;
            true
        }
        None => false,
    };

    // Name.
    let name_len = rest
        .char_indices()
        .find(|&(_, c)| !is_name_char(c))
        .map_or(rest.len(), |(i, _)| i);
    let name = rest[..name_len].trim();
    if !name.chars().any(is_word_char) {
        return None;
    }
    rest = &rest[name_len..];

    // Set code.
    let set_code = rest.strip_prefix('(').and_then(|inner| {
        let code: String = inner
            .chars()
            .take_while(|&c| is_word_char(c))
            .take(MAX_SET_CODE_LEN)
            .collect();
        (!code.is_empty()).then_some(code)
    });

    Some(CardRequest {
        name: name.to_string(),
        set_code,
        is_token,
    })
}

/// Strip a token marker, returning the remainder when one is present.
fn strip_token_prefix(s: &str, mode: TokenPrefix) -> Option<&str> {
    let mut chars = s.chars();
    let tag = chars.next()?;
    if chars.next()? != ':' {
        return None;
    }
    let accepted = match mode {
        TokenPrefix::Any => is_word_char(tag),
        TokenPrefix::Strict => tag == 't',
    };
    // Both characters are ASCII here, so byte offset 2 is a char boundary.
    accepted.then(|| &s[2..])
}
