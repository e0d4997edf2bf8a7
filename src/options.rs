use std::fmt;

use crate::constants::DEFAULT_INDENT;

/// Delimiter character used between inline array values, tabular fields and
/// tabular row cells.
///
/// # Examples
/// ```
/// use toon_codec::Delimiter;
///
/// assert_eq!(Delimiter::Pipe.as_char(), '|');
/// assert_eq!(Delimiter::from_char('\t'), Some(Delimiter::Tab));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
    Pipe,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            ',' => Some(Delimiter::Comma),
            '\t' => Some(Delimiter::Tab),
            '|' => Some(Delimiter::Pipe),
            _ => None,
        }
    }

    /// Suffix written inside the bracket segment of an array header.
    /// Comma is the default delimiter and is never suffixed.
    pub fn header_suffix(self) -> &'static str {
        match self {
            Delimiter::Comma => "",
            Delimiter::Tab => "\t",
            Delimiter::Pipe => "|",
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Indentation unit. Only space indentation exists in the format; tabs are
/// never indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    Spaces(usize),
}

impl Indent {
    pub fn spaces(count: usize) -> Self {
        Indent::Spaces(count)
    }

    pub fn get_spaces(self) -> usize {
        let Indent::Spaces(count) = self;
        count
    }
}

impl Default for Indent {
    fn default() -> Self {
        Indent::Spaces(DEFAULT_INDENT)
    }
}

/// Whether the encoder collapses single-key object chains into dotted keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyFolding {
    #[default]
    Off,
    Safe,
}

/// Whether the decoder expands dotted keys into nested objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpandPaths {
    #[default]
    Off,
    Safe,
}

/// Options for [`encode`](crate::encode).
///
/// # Examples
/// ```
/// use toon_codec::{Delimiter, EncodeOptions, Indent, KeyFolding};
///
/// let opts = EncodeOptions::new()
///     .with_indent(Indent::spaces(4))
///     .with_delimiter(Delimiter::Pipe)
///     .with_key_folding(KeyFolding::Safe)
///     .with_flatten_depth(Some(2));
/// assert_eq!(opts.delimiter, Delimiter::Pipe);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    pub indent: Indent,
    pub delimiter: Delimiter,
    pub key_folding: KeyFolding,
    /// Maximum segments per folded chain; `None` means unbounded.
    pub flatten_depth: Option<usize>,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_key_folding(mut self, key_folding: KeyFolding) -> Self {
        self.key_folding = key_folding;
        self
    }

    pub fn with_flatten_depth(mut self, flatten_depth: Option<usize>) -> Self {
        self.flatten_depth = flatten_depth;
        self
    }
}

/// Options for [`decode`](crate::decode).
///
/// Strict mode enforces the structural invariants: declared array lengths,
/// tabular row widths, exact indentation and blank-line placement.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    pub indent: Indent,
    pub strict: bool,
    pub expand_paths: ExpandPaths,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_expand_paths(mut self, expand_paths: ExpandPaths) -> Self {
        self.expand_paths = expand_paths;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            indent: Indent::default(),
            strict: true,
            expand_paths: ExpandPaths::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_delimiter_char_round_trip() {
        for delim in [Delimiter::Comma, Delimiter::Tab, Delimiter::Pipe] {
            assert_eq!(Delimiter::from_char(delim.as_char()), Some(delim));
        }
        assert_eq!(Delimiter::from_char(';'), None);
    }

    #[rstest::rstest]
    fn test_delimiter_header_suffix() {
        assert_eq!(Delimiter::Comma.header_suffix(), "");
        assert_eq!(Delimiter::Tab.header_suffix(), "\t");
        assert_eq!(Delimiter::Pipe.header_suffix(), "|");
    }

    #[rstest::rstest]
    fn test_encode_options_builder() {
        let opts = EncodeOptions::new()
            .with_indent(Indent::spaces(4))
            .with_delimiter(Delimiter::Tab)
            .with_key_folding(KeyFolding::Safe)
            .with_flatten_depth(Some(3));
        assert_eq!(opts.indent.get_spaces(), 4);
        assert_eq!(opts.delimiter, Delimiter::Tab);
        assert_eq!(opts.key_folding, KeyFolding::Safe);
        assert_eq!(opts.flatten_depth, Some(3));
    }

    #[rstest::rstest]
    fn test_decode_options_defaults() {
        let opts = DecodeOptions::default();
        assert_eq!(opts.indent.get_spaces(), 2);
        assert!(opts.strict);
        assert_eq!(opts.expand_paths, ExpandPaths::Off);
    }
}
