//! Token-level recognizers: primitive and key tokens, the delimited-value
//! splitter, and the array-header line parser.

use serde_json::Value;
use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::error::Error;
use crate::num::number::normalize_signed_zero;
use crate::options::Delimiter;
use crate::text::string::{
    find_closing_quote, find_unquoted_char, is_numeric_literal, is_valid_unquoted_key, unescape,
};
use crate::Result;

/// Mapping key as it appeared in the source. The `quoted` flag decides
/// path-expansion eligibility later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyToken {
    pub text: SmolStr,
    pub quoted: bool,
}

impl KeyToken {
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }
}

/// Parsed array header line: `key?[#?len<delim>?]{fields}?: tail?`.
#[derive(Debug)]
pub struct ArrayHeader<'a> {
    pub key: Option<KeyToken>,
    pub len: usize,
    pub delimiter: Delimiter,
    pub length_marker: bool,
    pub fields: Option<Vec<KeyToken>>,
    pub tail: Option<&'a str>,
}

pub type TokenBuf<'a> = SmallVec<[&'a str; 16]>;

/// Map a single trimmed token to its primitive value.
pub fn parse_primitive_token(token: &str) -> Result<Value> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(Value::String(String::new()));
    }
    if token.starts_with('"') {
        let close = find_closing_quote(token, 0)
            .ok_or_else(|| Error::syntax("unterminated string: missing closing quote"))?;
        if close + 1 != token.len() {
            return Err(Error::syntax("unexpected characters after closing quote"));
        }
        return Ok(Value::String(unescape(&token[1..close])?));
    }
    match token {
        "null" => return Ok(Value::Null),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }
    if let Some(number) = parse_number_token(token) {
        return Ok(Value::Number(number));
    }
    Ok(Value::String(token.to_string()))
}

/// Numeric token to a `serde_json::Number`: exact i64/u64 for plain
/// integers, finite f64 otherwise, signed zero normalized.
pub fn parse_number_token(token: &str) -> Option<serde_json::Number> {
    if !is_numeric_literal(token) {
        return None;
    }
    let has_float_syntax = token.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'));
    if !has_float_syntax {
        if let Ok(value) = token.parse::<i64>() {
            return Some(serde_json::Number::from(value));
        }
        if let Ok(value) = token.parse::<u64>() {
            return Some(serde_json::Number::from(value));
        }
    }
    let float = token.parse::<f64>().ok()?;
    serde_json::Number::from_f64(normalize_signed_zero(float))
}

/// Parse one key token (quoted or bare). Strict mode holds bare keys to the
/// unquoted-key grammar.
pub fn parse_key_token(token: &str, strict: bool) -> Result<KeyToken> {
    let token = token.trim();
    if token.starts_with('"') {
        let close = find_closing_quote(token, 0)
            .ok_or_else(|| Error::syntax("unterminated quoted key"))?;
        if close + 1 != token.len() {
            return Err(Error::syntax("unexpected characters after quoted key"));
        }
        return Ok(KeyToken {
            text: SmolStr::new(unescape(&token[1..close])?),
            quoted: true,
        });
    }
    if token.is_empty() {
        return Err(Error::syntax("empty key"));
    }
    if strict {
        // Non-ASCII keys may appear bare; ASCII keys must fit the
        // unquoted-key grammar, and whitespace always requires quotes.
        if token.contains(char::is_whitespace)
            || (token.is_ascii() && !is_valid_unquoted_key(token))
        {
            return Err(Error::syntax(format!("invalid unquoted key: '{token}'")));
        }
    }
    Ok(KeyToken {
        text: SmolStr::new(token),
        quoted: false,
    })
}

/// Split a line at its first colon outside quotes into key and value parts.
/// Returns `None` when the line carries no colon.
pub fn split_key_value(line: &str) -> Result<Option<(&str, &str)>> {
    let bytes = line.as_bytes();
    let mut in_quotes = false;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' if in_quotes => idx += 1,
            b'"' => in_quotes = !in_quotes,
            b':' if !in_quotes => return Ok(Some((&line[..idx], &line[idx + 1..]))),
            _ => {}
        }
        idx += 1;
    }
    if in_quotes {
        return Err(Error::syntax("unterminated string"));
    }
    Ok(None)
}

/// Split by the active delimiter, honoring double-quoted spans (inside
/// which a backslash escapes one character); each field is trimmed.
pub fn parse_delimited_values<'a>(text: &'a str, delimiter: Delimiter) -> Result<TokenBuf<'a>> {
    let delim = delimiter.as_char() as u8;
    let bytes = text.as_bytes();
    let mut tokens = TokenBuf::new();
    let mut in_quotes = false;
    let mut start = 0;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' if in_quotes => idx += 1,
            b'"' => in_quotes = !in_quotes,
            byte if byte == delim && !in_quotes => {
                tokens.push(text[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
        idx += 1;
    }
    if in_quotes {
        return Err(Error::syntax("unterminated string"));
    }
    tokens.push(text[start..].trim());
    Ok(tokens)
}

/// A tabular data row has its first unquoted delimiter before any unquoted
/// colon; a line with an earlier colon is a key-value continuation.
pub fn is_tabular_data_row(content: &str, delimiter: Delimiter) -> bool {
    let colon = find_unquoted_char(content, ':', 0);
    let delim = find_unquoted_char(content, delimiter.as_char(), 0);
    match (colon, delim) {
        (Some(colon), Some(delim)) => delim < colon,
        (Some(_), None) => false,
        (None, _) => true,
    }
}

/// Recognize an array header line. A line that does not match the full
/// header shape yields `Ok(None)`, not an error, so the caller can fall
/// back to key/value parsing.
pub fn parse_array_header_line<'a>(
    content: &'a str,
    default_delimiter: Delimiter,
    strict: bool,
) -> Result<Option<ArrayHeader<'a>>> {
    let Some(bracket) = find_unquoted_char(content, '[', 0) else {
        return Ok(None);
    };
    // A colon before the bracket makes this a key/value line whose value
    // merely contains brackets.
    if let Some(colon) = find_unquoted_char(content, ':', 0) {
        if colon < bracket {
            return Ok(None);
        }
    }
    let Some(close_offset) = content[bracket + 1..].find(']') else {
        return Ok(None);
    };
    let bracket_end = bracket + 1 + close_offset;

    let mut inner = &content[bracket + 1..bracket_end];
    let length_marker = inner.starts_with('#');
    if length_marker {
        inner = &inner[1..];
    }
    let digits_end = inner
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(inner.len());
    if digits_end == 0 {
        return Ok(None);
    }
    let Ok(len) = inner[..digits_end].parse::<usize>() else {
        return Ok(None);
    };
    let delimiter = match &inner[digits_end..] {
        "" => default_delimiter,
        suffix => {
            let mut chars = suffix.chars();
            match (chars.next().and_then(Delimiter::from_char), chars.next()) {
                (Some(delimiter), None) => delimiter,
                _ => return Ok(None),
            }
        }
    };

    let key_part = content[..bracket].trim();
    let key = if key_part.is_empty() {
        None
    } else {
        Some(parse_key_token(key_part, strict)?)
    };

    let mut rest = content[bracket_end + 1..].trim_start();
    let mut fields = None;
    if rest.starts_with('{') {
        let Some(brace_end) = find_unquoted_char(rest, '}', 1) else {
            return Err(Error::syntax("unterminated field list"));
        };
        let mut parsed = Vec::new();
        for token in parse_delimited_values(&rest[1..brace_end], delimiter)? {
            if token.is_empty() {
                return Err(Error::syntax("empty field name in tabular header"));
            }
            let field = parse_key_token(token, strict)?;
            if !field.quoted {
                if let Some(foreign) = foreign_delimiter_in(field.as_str(), delimiter) {
                    return Err(Error::validation(format!(
                        "field name contains '{foreign}' but the header delimiter is '{}'",
                        delimiter.as_char()
                    )));
                }
            }
            parsed.push(field);
        }
        fields = Some(parsed);
        rest = rest[brace_end + 1..].trim_start();
    }

    let Some(rest) = rest.strip_prefix(':') else {
        return Ok(None);
    };
    let tail = rest.trim();
    let tail = if tail.is_empty() { None } else { Some(tail) };

    Ok(Some(ArrayHeader {
        key,
        len,
        delimiter,
        length_marker,
        fields,
        tail,
    }))
}

fn foreign_delimiter_in(field: &str, active: Delimiter) -> Option<char> {
    field
        .chars()
        .find(|ch| crate::constants::is_delimiter_char(*ch) && *ch != active.as_char())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[rstest::rstest]
    fn test_parse_primitive_token_literals() {
        assert_eq!(parse_primitive_token("").unwrap(), json!(""));
        assert_eq!(parse_primitive_token("null").unwrap(), json!(null));
        assert_eq!(parse_primitive_token("true").unwrap(), json!(true));
        assert_eq!(parse_primitive_token("false").unwrap(), json!(false));
        assert_eq!(parse_primitive_token("42").unwrap(), json!(42));
        assert_eq!(parse_primitive_token("-3.5").unwrap(), json!(-3.5));
        assert_eq!(parse_primitive_token("1e3").unwrap(), json!(1000.0));
        assert_eq!(parse_primitive_token("hello").unwrap(), json!("hello"));
        assert_eq!(parse_primitive_token("007").unwrap(), json!("007"));
        assert_eq!(parse_primitive_token("-").unwrap(), json!("-"));
    }

    #[rstest::rstest]
    fn test_parse_primitive_token_quoted() {
        assert_eq!(parse_primitive_token("\"a,b\"").unwrap(), json!("a,b"));
        assert_eq!(parse_primitive_token("\"true\"").unwrap(), json!("true"));
        assert_eq!(parse_primitive_token("\"a\\nb\"").unwrap(), json!("a\nb"));
        assert!(parse_primitive_token("\"open").is_err());
        assert!(parse_primitive_token("\"x\" tail").is_err());
    }

    #[rstest::rstest]
    fn test_parse_number_token_exact_integers() {
        assert_eq!(parse_number_token("42").unwrap().as_i64(), Some(42));
        assert_eq!(
            parse_number_token("18446744073709551615").unwrap().as_u64(),
            Some(u64::MAX)
        );
        assert_eq!(parse_number_token("-0").unwrap().as_i64(), Some(0));
        assert!(parse_number_token("007").is_none());
        assert!(parse_number_token("abc").is_none());
    }

    #[rstest::rstest]
    fn test_parse_key_token() {
        let key = parse_key_token("name", true).unwrap();
        assert_eq!(key.as_str(), "name");
        assert!(!key.quoted);

        let key = parse_key_token("\"a:b\"", true).unwrap();
        assert_eq!(key.as_str(), "a:b");
        assert!(key.quoted);

        assert!(parse_key_token("bad key", true).is_err());
        assert!(parse_key_token("bad key", false).is_ok());
        assert!(parse_key_token("", true).is_err());
        assert!(parse_key_token("\"x\"y", true).is_err());
    }

    #[rstest::rstest]
    fn test_split_key_value() {
        assert_eq!(
            split_key_value("key: value").unwrap(),
            Some(("key", " value"))
        );
        assert_eq!(
            split_key_value("\"a:b\": v").unwrap(),
            Some(("\"a:b\"", " v"))
        );
        assert_eq!(split_key_value("no colon here").unwrap(), None);
        assert!(split_key_value("\"open: x").is_err());
    }

    #[rstest::rstest]
    fn test_parse_delimited_values() {
        let tokens = parse_delimited_values("1, 2, 3", Delimiter::Comma).unwrap();
        assert_eq!(tokens.as_slice(), ["1", "2", "3"]);

        let tokens = parse_delimited_values("\"a,b\",c", Delimiter::Comma).unwrap();
        assert_eq!(tokens.as_slice(), ["\"a,b\"", "c"]);

        let tokens = parse_delimited_values("a|b|c", Delimiter::Pipe).unwrap();
        assert_eq!(tokens.as_slice(), ["a", "b", "c"]);

        let tokens = parse_delimited_values("a,,c", Delimiter::Comma).unwrap();
        assert_eq!(tokens.as_slice(), ["a", "", "c"]);

        assert!(parse_delimited_values("\"open", Delimiter::Comma).is_err());
    }

    #[rstest::rstest]
    fn test_is_tabular_data_row() {
        assert!(is_tabular_data_row("1,Alice,admin", Delimiter::Comma));
        assert!(is_tabular_data_row("1", Delimiter::Comma));
        assert!(is_tabular_data_row("\"a:b\",c", Delimiter::Comma));
        assert!(!is_tabular_data_row("status: active", Delimiter::Comma));
        assert!(!is_tabular_data_row("key: a,b", Delimiter::Comma));
    }

    fn header(content: &str) -> ArrayHeader<'_> {
        parse_array_header_line(content, Delimiter::Comma, true)
            .unwrap()
            .expect("header should match")
    }

    #[rstest::rstest]
    fn test_header_basic() {
        let parsed = header("users[2]{id,name}:");
        assert_eq!(parsed.key.as_ref().unwrap().as_str(), "users");
        assert_eq!(parsed.len, 2);
        assert_eq!(parsed.delimiter, Delimiter::Comma);
        let fields = parsed.fields.unwrap();
        assert_eq!(fields[0].as_str(), "id");
        assert_eq!(fields[1].as_str(), "name");
        assert!(parsed.tail.is_none());
        assert!(!parsed.length_marker);
    }

    #[rstest::rstest]
    fn test_header_inline_tail_and_delimiter() {
        let parsed = header("items[3|]: a|b|c");
        assert_eq!(parsed.len, 3);
        assert_eq!(parsed.delimiter, Delimiter::Pipe);
        assert_eq!(parsed.tail, Some("a|b|c"));

        let parsed = header("items[2\t]: a\tb");
        assert_eq!(parsed.delimiter, Delimiter::Tab);
    }

    #[rstest::rstest]
    fn test_header_length_marker() {
        let parsed = header("items[#3|]: a|b|c");
        assert!(parsed.length_marker);
        assert_eq!(parsed.len, 3);
        assert_eq!(parsed.delimiter, Delimiter::Pipe);
    }

    #[rstest::rstest]
    fn test_header_keyless_and_quoted_key() {
        let parsed = header("[0]:");
        assert!(parsed.key.is_none());
        assert_eq!(parsed.len, 0);

        let parsed = header("\"my list\"[1]: x");
        let key = parsed.key.unwrap();
        assert_eq!(key.as_str(), "my list");
        assert!(key.quoted);
    }

    #[rstest::rstest]
    fn test_header_no_match_shapes() {
        let probe = |content| {
            parse_array_header_line(content, Delimiter::Comma, false)
                .unwrap()
                .is_none()
        };
        assert!(probe("key: value"));
        assert!(probe("key: [3] in text"));
        assert!(probe("key[]: v"));
        assert!(probe("key[x]: v"));
        assert!(probe("key[3"));
        assert!(probe("key[3] no colon"));
        assert!(probe("plain text"));
    }

    #[rstest::rstest]
    fn test_header_field_delimiter_mismatch() {
        let err = parse_array_header_line("[1]{a|b}: 1", Delimiter::Comma, true).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::Validation);

        let parsed = parse_array_header_line("items[2|]{\"a|b\"}:", Delimiter::Comma, true)
            .unwrap()
            .unwrap();
        assert_eq!(parsed.fields.unwrap()[0].as_str(), "a|b");
    }
}
