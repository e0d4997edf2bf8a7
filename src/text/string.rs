//! Value predicates and the quoted-string codec shared by the encoder and
//! decoder.
//!
//! The encoder emits a string unquoted exactly when
//! [`is_safe_unquoted_string`] holds, and a key unquoted exactly when
//! [`is_valid_unquoted_key`] holds; the decoder relies on the same
//! predicates when mapping tokens back to values.

use memchr::memchr;

use crate::constants::{is_keyword, LIST_ITEM_PREFIX};
use crate::error::Error;

/// Exact match against the `true`/`false`/`null` keywords.
#[inline]
pub fn is_boolean_or_null_literal(s: &str) -> bool {
    is_keyword(s)
}

/// Token that decodes as a number: optional sign, digits, optional fraction,
/// optional exponent, finite as an f64. Pure integers with a leading zero
/// (`007`) are excluded and decode as strings.
pub fn is_numeric_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = usize::from(bytes.first() == Some(&b'-'));
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == int_start {
        return false;
    }
    let int_len = i - int_start;
    let mut has_fraction = false;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return false;
        }
        has_fraction = true;
    }
    if int_len > 1 && bytes[int_start] == b'0' && !has_fraction {
        return false;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    if i != bytes.len() {
        return false;
    }
    s.parse::<f64>().is_ok_and(|f| f.is_finite())
}

/// Segment eligible for key folding or path expansion:
/// `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier_segment(s: &str) -> bool {
    let bytes = s.as_bytes();
    let Some(&first) = bytes.first() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != b'_' {
        return false;
    }
    bytes[1..]
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || *b == b'_')
}

/// Key that may be written without quotes: identifier characters plus dots,
/// `[A-Za-z_][A-Za-z0-9_.]*`.
pub fn is_valid_unquoted_key(key: &str) -> bool {
    let bytes = key.as_bytes();
    let Some(&first) = bytes.first() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != b'_' {
        return false;
    }
    bytes[1..]
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'.')
}

/// String value that survives unquoted emission under the active delimiter
/// and decodes back to itself.
pub fn is_safe_unquoted_string(s: &str, delimiter: char) -> bool {
    if s.is_empty() || s != s.trim() {
        return false;
    }
    if is_boolean_or_null_literal(s) || is_numeric_literal(s) {
        return false;
    }
    if s.starts_with(LIST_ITEM_PREFIX) {
        return false;
    }
    s.chars().all(|ch| {
        !matches!(
            ch,
            ':' | '"' | '\\' | '[' | ']' | '{' | '}' | '\n' | '\r' | '\t'
        ) && ch != delimiter
    })
}

/// Escape a string for quoted output. CRLF pairs collapse to a single `\n`
/// escape; the five escapes `\\ \" \n \r \t` are the only ones produced.
pub fn escape_into(out: &mut String, s: &str) {
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                out.push_str("\\n");
            }
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(&mut out, s);
    out
}

/// Reverse the five escape sequences over the inner content of a quoted
/// literal. A backslash followed by anything else is a syntax error.
pub fn unescape(inner: &str) -> Result<String, Error> {
    let bytes = inner.as_bytes();
    if memchr(b'\\', bytes).is_none() {
        return Ok(inner.to_string());
    }
    let mut out = String::with_capacity(inner.len());
    let mut idx = 0;
    while let Some(offset) = memchr(b'\\', &bytes[idx..]) {
        let esc_pos = idx + offset;
        out.push_str(&inner[idx..esc_pos]);
        let next = bytes
            .get(esc_pos + 1)
            .ok_or_else(|| Error::syntax("unterminated escape sequence"))?;
        match next {
            b'\\' => out.push('\\'),
            b'"' => out.push('"'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            other => {
                return Err(Error::syntax(format!(
                    "invalid escape sequence: \\{}",
                    *other as char
                )))
            }
        }
        idx = esc_pos + 2;
    }
    out.push_str(&inner[idx..]);
    Ok(out)
}

/// Index of the first unescaped `"` after the opening quote at `start`, or
/// `None` when the literal is unterminated.
pub fn find_closing_quote(s: &str, start: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut idx = start + 1;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' => idx += 2,
            b'"' => return Some(idx),
            _ => idx += 1,
        }
    }
    None
}

/// First index of `ch` at or after `start` that lies outside any
/// double-quoted span.
pub fn find_unquoted_char(s: &str, ch: char, start: usize) -> Option<usize> {
    let target = ch as u8;
    debug_assert!(ch.is_ascii());
    let bytes = s.as_bytes();
    let mut in_quotes = false;
    let mut idx = start;
    while idx < bytes.len() {
        let byte = bytes[idx];
        if in_quotes {
            match byte {
                b'\\' => idx += 1,
                b'"' => in_quotes = false,
                _ => {}
            }
        } else if byte == b'"' {
            in_quotes = true;
        } else if byte == target {
            return Some(idx);
        }
        idx += 1;
    }
    None
}
