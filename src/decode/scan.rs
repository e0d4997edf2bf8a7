//! Scanner: raw source to depth-tagged logical lines plus a blank-line
//! index. Single pass, no backtracking; LF and CRLF terminators accepted.

use memchr::memchr_iter;

use crate::error::Error;
use crate::Result;

/// One non-blank logical line.
#[derive(Debug, Clone, Copy)]
pub struct ScanLine<'a> {
    /// Original line without the trailing terminator.
    pub raw: &'a str,
    /// Line content with leading indentation removed.
    pub content: &'a str,
    /// Count of leading space characters.
    pub indent: usize,
    /// `indent / indent_size`.
    pub depth: usize,
    /// 1-based physical line number.
    pub line_number: usize,
}

/// Whitespace-only line, tracked separately for strict-mode range checks.
#[derive(Debug, Clone, Copy)]
pub struct BlankLine {
    pub line_number: usize,
    pub depth: usize,
}

#[derive(Debug)]
pub struct ScanResult<'a> {
    pub lines: Vec<ScanLine<'a>>,
    pub blank_lines: Vec<BlankLine>,
}

pub fn scan_lines(input: &str, indent_size: usize, strict: bool) -> Result<ScanResult<'_>> {
    if indent_size == 0 {
        return Err(Error::unknown("indent size must be greater than zero"));
    }
    let bytes = input.as_bytes();
    let mut result = ScanResult {
        lines: Vec::with_capacity(memchr_iter(b'\n', bytes).count() + 1),
        blank_lines: Vec::new(),
    };
    if input.is_empty() {
        return Ok(result);
    }

    let mut start = 0;
    let mut line_number = 1;
    for newline in memchr_iter(b'\n', bytes) {
        let mut end = newline;
        if end > start && bytes[end - 1] == b'\r' {
            end -= 1;
        }
        push_line(&input[start..end], line_number, indent_size, strict, &mut result)?;
        start = newline + 1;
        line_number += 1;
    }
    let mut end = bytes.len();
    if end > start && bytes[end - 1] == b'\r' {
        end -= 1;
    }
    push_line(&input[start..end], line_number, indent_size, strict, &mut result)?;

    Ok(result)
}

fn push_line<'a>(
    raw: &'a str,
    line_number: usize,
    indent_size: usize,
    strict: bool,
    result: &mut ScanResult<'a>,
) -> Result<()> {
    let bytes = raw.as_bytes();
    let mut columns = 0;
    let mut chars = 0;
    let mut has_tab = false;
    for &byte in bytes {
        match byte {
            b' ' => {
                columns += 1;
                chars += 1;
            }
            b'\t' => {
                // Tabs are never indentation; lenient mode reads one as a
                // full indent unit, strict mode rejects the line below.
                has_tab = true;
                columns += indent_size;
                chars += 1;
            }
            _ => break,
        }
    }

    if chars == bytes.len() {
        result.blank_lines.push(BlankLine {
            line_number,
            depth: columns / indent_size,
        });
        return Ok(());
    }

    if strict {
        if has_tab {
            return Err(Error::indentation("tabs not allowed in indentation")
                .with_line(line_number)
                .with_source_line(raw));
        }
        if columns % indent_size != 0 {
            return Err(Error::indentation(format!(
                "indentation of {columns} spaces is not a multiple of {indent_size}"
            ))
            .with_line(line_number)
            .with_source_line(raw));
        }
    }

    result.lines.push(ScanLine {
        raw,
        content: &raw[chars..],
        indent: columns,
        depth: columns / indent_size,
        line_number,
    });
    Ok(())
}

/// Forward-only view over the scanned lines. The blank index rides along so
/// array decoders can run their range checks.
pub struct Cursor<'a> {
    lines: Vec<ScanLine<'a>>,
    blank_lines: Vec<BlankLine>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(result: ScanResult<'a>) -> Self {
        Self {
            lines: result.lines,
            blank_lines: result.blank_lines,
            pos: 0,
        }
    }

    pub fn peek(&self) -> Option<&ScanLine<'a>> {
        self.lines.get(self.pos)
    }

    pub fn next_line(&mut self) -> Option<ScanLine<'a>> {
        let line = self.lines.get(self.pos).copied();
        if line.is_some() {
            self.pos += 1;
        }
        line
    }

    pub fn advance(&mut self) {
        self.pos += 1;
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.lines.len()
    }

    /// Line number of the most recently consumed line.
    pub fn previous_line_number(&self) -> Option<usize> {
        self.pos
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(|line| line.line_number)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn blank_lines(&self) -> &[BlankLine] {
        &self.blank_lines
    }
}
