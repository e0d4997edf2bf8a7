//! Decoder: recursive descent over the scanned line cursor.

pub mod parser;
pub mod paths;
pub mod scan;
pub mod validation;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::constants::MAX_DEPTH;
use crate::error::Error;
use crate::options::{DecodeOptions, Delimiter};
use crate::Result;

use parser::{
    is_tabular_data_row, parse_array_header_line, parse_delimited_values, parse_key_token,
    parse_primitive_token, split_key_value, ArrayHeader, KeyToken,
};
use paths::PathInserter;
use scan::{scan_lines, Cursor, ScanLine};
use validation::{
    assert_expected_count, validate_no_blank_lines_in_range, validate_no_extra_list_items,
    validate_no_extra_tabular_rows,
};

pub fn decode_value(input: &str, options: &DecodeOptions) -> Result<Value> {
    let scanned = scan_lines(input, options.indent.get_spaces(), options.strict)?;
    let mut cursor = Cursor::new(scanned);
    let decoder = Decoder::new(options);
    decoder.decode_document(&mut cursor)
}

pub fn decode<T: DeserializeOwned>(input: &str, options: &DecodeOptions) -> Result<T> {
    let value = decode_value(input, options)?;
    serde_json::from_value(value)
        .map_err(|err| Error::unknown(format!("deserialize failed: {err}")))
}

pub fn decode_slice<T: DeserializeOwned>(input: &[u8], options: &DecodeOptions) -> Result<T> {
    let text = std::str::from_utf8(input)
        .map_err(|err| Error::syntax(format!("input is not valid UTF-8: {err}")))?;
    decode(text, options)
}

struct Decoder {
    strict: bool,
    inserter: PathInserter,
}

/// Attach the failing line to an error produced while parsing its tokens.
fn at_line(err: Error, line: &ScanLine<'_>) -> Error {
    if err.location.is_some() {
        err
    } else {
        err.with_line(line.line_number).with_source_line(line.raw)
    }
}

impl Decoder {
    fn new(options: &DecodeOptions) -> Self {
        Self {
            strict: options.strict,
            inserter: PathInserter::new(options.expand_paths, options.strict),
        }
    }

    fn decode_document(&self, cursor: &mut Cursor<'_>) -> Result<Value> {
        let Some(first) = cursor.peek().copied() else {
            return Ok(Value::Object(Map::new()));
        };

        if first.depth != 0 && self.strict {
            return Err(Error::indentation("unexpected indentation on the first line")
                .with_line(first.line_number)
                .with_source_line(first.raw));
        }

        if let Some(header) =
            parse_array_header_line(first.content, Delimiter::Comma, self.strict)
                .map_err(|err| at_line(err, &first))?
        {
            if header.key.is_none() {
                cursor.advance();
                let value = self.decode_array_body(&header, cursor, &first, first.depth, 0)?;
                self.ensure_consumed(cursor)?;
                return Ok(value);
            }
        }

        if cursor.len() == 1 && split_key_value(first.content).map_err(|err| at_line(err, &first))?.is_none()
        {
            cursor.advance();
            return parse_primitive_token(first.content).map_err(|err| at_line(err, &first));
        }

        let map = self.decode_object(cursor, first.depth, 0)?;
        self.ensure_consumed(cursor)?;
        Ok(Value::Object(map))
    }

    fn ensure_consumed(&self, cursor: &mut Cursor<'_>) -> Result<()> {
        if let Some(line) = cursor.peek() {
            return Err(Error::syntax("unexpected trailing content")
                .with_line(line.line_number)
                .with_source_line(line.raw));
        }
        Ok(())
    }

    fn check_depth(&self, nesting: usize) -> Result<()> {
        if nesting > MAX_DEPTH {
            return Err(Error::validation(format!(
                "nesting exceeds the supported depth of {MAX_DEPTH}"
            )));
        }
        Ok(())
    }

    /// Decode mapping entries while lines sit exactly at `depth`.
    fn decode_object(
        &self,
        cursor: &mut Cursor<'_>,
        depth: usize,
        nesting: usize,
    ) -> Result<Map<String, Value>> {
        self.check_depth(nesting)?;
        let mut map = Map::new();
        self.decode_object_into(&mut map, cursor, depth, nesting)?;
        Ok(map)
    }

    fn decode_object_into(
        &self,
        map: &mut Map<String, Value>,
        cursor: &mut Cursor<'_>,
        depth: usize,
        nesting: usize,
    ) -> Result<()> {
        while let Some(line) = cursor.peek().copied() {
            if line.depth < depth {
                break;
            }
            if line.depth > depth {
                return Err(Error::indentation("unexpected indentation")
                    .with_line(line.line_number)
                    .with_source_line(line.raw));
            }

            if let Some(header) =
                parse_array_header_line(line.content, Delimiter::Comma, self.strict)
                    .map_err(|err| at_line(err, &line))?
            {
                let key = header.key.clone().ok_or_else(|| {
                    at_line(Error::syntax("array header in an object must carry a key"), &line)
                })?;
                cursor.advance();
                let value = self.decode_array_body(&header, cursor, &line, depth, nesting + 1)?;
                self.inserter.insert(map, &key, value)?;
                continue;
            }

            match split_key_value(line.content).map_err(|err| at_line(err, &line))? {
                Some((key_part, value_part)) => {
                    let key =
                        parse_key_token(key_part, self.strict).map_err(|err| at_line(err, &line))?;
                    cursor.advance();
                    let value =
                        self.decode_field_value(value_part, cursor, &line, depth + 1, nesting + 1)?;
                    self.inserter.insert(map, &key, value)?;
                }
                None => {
                    if self.strict {
                        return Err(at_line(
                            Error::syntax(format!(
                                "expected ':' after '{}' in object context",
                                line.content
                            )),
                            &line,
                        ));
                    }
                    let key = parse_key_token(line.content, false)
                        .map_err(|err| at_line(err, &line))?;
                    cursor.advance();
                    self.inserter.insert(map, &key, Value::Null)?;
                }
            }
        }
        Ok(())
    }

    /// Value portion of a key/value line: inline primitive, nested mapping
    /// at `child_depth`, or the empty mapping.
    fn decode_field_value(
        &self,
        value_part: &str,
        cursor: &mut Cursor<'_>,
        line: &ScanLine<'_>,
        child_depth: usize,
        nesting: usize,
    ) -> Result<Value> {
        let value_part = value_part.trim();
        if !value_part.is_empty() {
            return parse_primitive_token(value_part).map_err(|err| at_line(err, line));
        }
        match cursor.peek() {
            Some(next) if next.depth >= child_depth => {
                Ok(Value::Object(self.decode_object(cursor, child_depth, nesting)?))
            }
            _ => Ok(Value::Object(Map::new())),
        }
    }

    /// Decode the body that follows an already-parsed header. Body lines
    /// sit at `base_depth + 1`; for the first field of a list item the
    /// caller passes an inflated base so the body lands one deeper than
    /// the hyphen line.
    fn decode_array_body(
        &self,
        header: &ArrayHeader<'_>,
        cursor: &mut Cursor<'_>,
        header_line: &ScanLine<'_>,
        base_depth: usize,
        nesting: usize,
    ) -> Result<Value> {
        self.check_depth(nesting)?;

        if let Some(tail) = header.tail {
            if header.fields.is_some() {
                return Err(at_line(
                    Error::syntax("tabular header cannot carry inline values"),
                    header_line,
                ));
            }
            let tokens = parse_delimited_values(tail, header.delimiter)
                .map_err(|err| at_line(err, header_line))?;
            let mut items = Vec::with_capacity(tokens.len());
            for token in tokens {
                items.push(parse_primitive_token(token).map_err(|err| at_line(err, header_line))?);
            }
            if self.strict {
                assert_expected_count(items.len(), header.len, "array values")
                    .map_err(|err| at_line(err, header_line))?;
            }
            return Ok(Value::Array(items));
        }

        if let Some(fields) = &header.fields {
            return self.decode_tabular_rows(cursor, header, fields, header_line, base_depth);
        }

        if header.len == 0 {
            if self.strict {
                validate_no_extra_list_items(cursor.peek(), base_depth + 1, 0)?;
            }
            return Ok(Value::Array(Vec::new()));
        }

        self.decode_list_items(cursor, header, header_line, base_depth, nesting)
    }

    fn decode_tabular_rows(
        &self,
        cursor: &mut Cursor<'_>,
        header: &ArrayHeader<'_>,
        fields: &[KeyToken],
        header_line: &ScanLine<'_>,
        base_depth: usize,
    ) -> Result<Value> {
        let row_depth = base_depth + 1;
        let mut rows = Vec::with_capacity(header.len);
        let mut last_line = header_line.line_number;

        while let Some(line) = cursor.peek().copied() {
            if line.depth != row_depth || !is_tabular_data_row(line.content, header.delimiter) {
                break;
            }
            if self.strict && rows.len() == header.len {
                break;
            }
            let tokens = parse_delimited_values(line.content, header.delimiter)
                .map_err(|err| at_line(err, &line))?;
            if tokens.len() != fields.len() && self.strict {
                return Err(at_line(
                    Error::validation(format!(
                        "row has {} values, header declares {} fields",
                        tokens.len(),
                        fields.len()
                    )),
                    &line,
                ));
            }
            let mut row = Map::with_capacity(fields.len());
            for (field, token) in fields.iter().zip(tokens.iter()) {
                let value = parse_primitive_token(token).map_err(|err| at_line(err, &line))?;
                self.inserter.insert(&mut row, field, value)?;
            }
            for field in fields.iter().skip(tokens.len()) {
                self.inserter
                    .insert(&mut row, field, Value::String(String::new()))?;
            }
            rows.push(Value::Object(row));
            last_line = line.line_number;
            cursor.advance();
        }

        if self.strict {
            assert_expected_count(rows.len(), header.len, "rows")
                .map_err(|err| at_line(err, header_line))?;
            validate_no_extra_tabular_rows(cursor.peek(), row_depth, header.delimiter, header.len)?;
            validate_no_blank_lines_in_range(
                header_line.line_number,
                last_line,
                cursor.blank_lines(),
            )?;
        }
        Ok(Value::Array(rows))
    }

    fn decode_list_items(
        &self,
        cursor: &mut Cursor<'_>,
        header: &ArrayHeader<'_>,
        header_line: &ScanLine<'_>,
        base_depth: usize,
        nesting: usize,
    ) -> Result<Value> {
        let item_depth = base_depth + 1;
        let mut items = Vec::with_capacity(header.len);
        let mut last_line = header_line.line_number;

        while let Some(line) = cursor.peek().copied() {
            if line.depth != item_depth {
                break;
            }
            if line.content != "-" && !line.content.starts_with("- ") {
                break;
            }
            if self.strict && items.len() == header.len {
                break;
            }
            cursor.advance();
            let (item, item_last_line) =
                self.decode_list_item(&line, cursor, item_depth, nesting + 1)?;
            items.push(item);
            last_line = item_last_line;
        }

        if self.strict {
            assert_expected_count(items.len(), header.len, "items")
                .map_err(|err| at_line(err, header_line))?;
            validate_no_extra_list_items(cursor.peek(), item_depth, header.len)?;
            validate_no_blank_lines_in_range(
                header_line.line_number,
                last_line,
                cursor.blank_lines(),
            )?;
        }
        Ok(Value::Array(items))
    }

    /// One `- ` item. Returns the item value and the last physical line it
    /// consumed.
    fn decode_list_item(
        &self,
        line: &ScanLine<'_>,
        cursor: &mut Cursor<'_>,
        item_depth: usize,
        nesting: usize,
    ) -> Result<(Value, usize)> {
        self.check_depth(nesting)?;
        let content = if line.content == "-" {
            ""
        } else {
            line.content[2..].trim_start()
        };
        if content.is_empty() {
            return Ok((Value::Object(Map::new()), line.line_number));
        }

        if let Some(header) = parse_array_header_line(content, Delimiter::Comma, self.strict)
            .map_err(|err| at_line(err, line))?
        {
            let Some(key) = header.key.clone() else {
                // The item is itself an array; its body sits one level past
                // the hyphen line.
                let value = self.decode_array_body(&header, cursor, line, item_depth, nesting + 1)?;
                return Ok((value, last_consumed(cursor, line)));
            };
            // Keyed header on the hyphen line: the array is the first field
            // of a list-item object. Its body indents two levels past the
            // hyphen so sibling fields stay at one.
            let value =
                self.decode_array_body(&header, cursor, line, item_depth + 1, nesting + 1)?;
            let mut map = Map::new();
            self.inserter.insert(&mut map, &key, value)?;
            self.decode_object_into(&mut map, cursor, item_depth + 1, nesting + 1)?;
            return Ok((Value::Object(map), last_consumed(cursor, line)));
        }

        if let Some((key_part, value_part)) =
            split_key_value(content).map_err(|err| at_line(err, line))?
        {
            let key = parse_key_token(key_part, self.strict).map_err(|err| at_line(err, line))?;
            let mut map = Map::new();
            let value =
                self.decode_field_value(value_part, cursor, line, item_depth + 2, nesting + 1)?;
            self.inserter.insert(&mut map, &key, value)?;
            self.decode_object_into(&mut map, cursor, item_depth + 1, nesting + 1)?;
            return Ok((Value::Object(map), last_consumed(cursor, line)));
        }

        let value = parse_primitive_token(content).map_err(|err| at_line(err, line))?;
        Ok((value, line.line_number))
    }
}

fn last_consumed(cursor: &Cursor<'_>, item_line: &ScanLine<'_>) -> usize {
    cursor
        .previous_line_number()
        .unwrap_or(item_line.line_number)
        .max(item_line.line_number)
}
