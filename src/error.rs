use std::fmt;

/// Classification of a codec failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed token, unterminated quote, invalid escape, missing colon.
    Syntax,
    /// Declared array length does not match the parsed item or row count.
    Range,
    /// Strict-mode structural violation: blank line inside an array body,
    /// extra row or item past the declared count, delimiter mismatch.
    Validation,
    /// Tab in indentation or indent that is not a multiple of the unit.
    Indentation,
    /// Field or value contains the active delimiter without quoting.
    Delimiter,
    /// Type conflict while expanding a dotted key.
    PathExpansion,
    Unknown,
}

impl ErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Range => "range",
            ErrorKind::Validation => "validation",
            ErrorKind::Indentation => "indentation",
            ErrorKind::Delimiter => "delimiter",
            ErrorKind::PathExpansion => "path expansion",
            ErrorKind::Unknown => "unknown",
        }
    }
}

/// 1-based position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// Error carrier shared by every encode and decode failure.
///
/// Errors abort the operation that produced them; no partial value is ever
/// returned alongside one.
#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Option<Location>,
    pub source_line: Option<String>,
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
            source_line: None,
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, message)
    }

    pub fn range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Range, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn indentation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Indentation, message)
    }

    pub fn delimiter(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Delimiter, message)
    }

    pub fn path_expansion(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PathExpansion, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.location = Some(Location { line, column });
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.location = Some(Location { line, column: 1 });
        self
    }

    pub fn with_source_line(mut self, source_line: impl Into<String>) -> Self {
        self.source_line = Some(source_line.into());
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(Location { line, column }) => write!(
                f,
                "{} error at line {line}, column {column}: {}",
                self.kind.as_str(),
                self.message
            )?,
            None => write!(f, "{} error: {}", self.kind.as_str(), self.message)?,
        }
        if let (Some(source_line), Some(location)) = (&self.source_line, self.location) {
            write!(f, "\n{source_line}\n")?;
            for _ in 1..location.column {
                f.write_str(" ")?;
            }
            f.write_str("^")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_display_without_location() {
        let err = Error::syntax("missing colon after key");
        assert_eq!(err.to_string(), "syntax error: missing colon after key");
    }

    #[rstest::rstest]
    fn test_display_with_location() {
        let err = Error::indentation("tabs not allowed in indentation").with_location(3, 1);
        assert_eq!(
            err.to_string(),
            "indentation error at line 3, column 1: tabs not allowed in indentation"
        );
    }

    #[rstest::rstest]
    fn test_display_renders_caret_under_column() {
        let err = Error::syntax("invalid escape sequence")
            .with_location(1, 6)
            .with_source_line("k: \"a\\q\"");
        let rendered = err.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[1], "k: \"a\\q\"");
        assert_eq!(lines[2], "     ^");
    }

    #[rstest::rstest]
    fn test_kind_is_preserved() {
        assert_eq!(Error::range("x").kind, ErrorKind::Range);
        assert_eq!(Error::validation("x").kind, ErrorKind::Validation);
        assert_eq!(Error::delimiter("x").kind, ErrorKind::Delimiter);
        assert_eq!(Error::path_expansion("x").kind, ErrorKind::PathExpansion);
        assert_eq!(Error::unknown("x").kind, ErrorKind::Unknown);
    }
}
