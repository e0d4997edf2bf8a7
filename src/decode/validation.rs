//! Strict-mode structural checks for array bodies.

use crate::decode::parser::is_tabular_data_row;
use crate::decode::scan::{BlankLine, ScanLine};
use crate::error::Error;
use crate::options::Delimiter;
use crate::Result;

/// Declared length versus parsed child count.
pub fn assert_expected_count(actual: usize, expected: usize, what: &str) -> Result<()> {
    if actual != expected {
        return Err(Error::range(format!(
            "expected {expected} {what}, found {actual}"
        )));
    }
    Ok(())
}

/// After the declared number of list items, the next line at the same depth
/// must not be another list item.
pub fn validate_no_extra_list_items(
    next: Option<&ScanLine<'_>>,
    depth: usize,
    expected: usize,
) -> Result<()> {
    if let Some(line) = next {
        if line.depth == depth && (line.content == "-" || line.content.starts_with("- ")) {
            return Err(Error::validation(format!(
                "unexpected list item after the declared {expected}"
            ))
            .with_line(line.line_number)
            .with_source_line(line.raw));
        }
    }
    Ok(())
}

/// After the declared number of rows, the next line at the row depth must
/// not be a data row. A key-value continuation there is fine.
pub fn validate_no_extra_tabular_rows(
    next: Option<&ScanLine<'_>>,
    depth: usize,
    delimiter: Delimiter,
    expected: usize,
) -> Result<()> {
    if let Some(line) = next {
        if line.depth == depth && is_tabular_data_row(line.content, delimiter) {
            return Err(Error::validation(format!(
                "unexpected row after the declared {expected}"
            ))
            .with_line(line.line_number)
            .with_source_line(line.raw));
        }
    }
    Ok(())
}

/// Blank lines strictly inside `(start_line, end_line)` are forbidden,
/// regardless of their computed depth.
pub fn validate_no_blank_lines_in_range(
    start_line: usize,
    end_line: usize,
    blanks: &[BlankLine],
) -> Result<()> {
    for blank in blanks {
        if blank.line_number > start_line && blank.line_number < end_line {
            return Err(
                Error::validation("blank line inside array body").with_line(blank.line_number)
            );
        }
    }
    Ok(())
}
