//! Encoder: recursive emission choosing inline, tabular or expanded array
//! forms, with optional key folding.

pub mod fold;
pub mod normalize;
pub mod writer;

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::MAX_DEPTH;
use crate::error::Error;
use crate::num::number::append_number;
use crate::options::{Delimiter, EncodeOptions, KeyFolding};
use crate::text::string::{escape_into, is_safe_unquoted_string, is_valid_unquoted_key};
use crate::Result;

use fold::{try_fold, Fold};
use normalize::normalize;
use writer::LineWriter;

pub fn encode<T: Serialize>(value: &T, options: &EncodeOptions) -> Result<String> {
    let value = serde_json::to_value(value)
        .map_err(|err| Error::unknown(format!("value is not JSON-shaped: {err}")))?;
    encode_value(&normalize(value), options)
}

pub fn encode_to_bytes<T: Serialize>(value: &T, options: &EncodeOptions) -> Result<Vec<u8>> {
    encode(value, options).map(String::into_bytes)
}

pub fn encode_value(value: &Value, options: &EncodeOptions) -> Result<String> {
    let mut encoder = Encoder::new(options);
    encoder.encode_root(value)?;
    Ok(encoder.writer.finish())
}

struct Encoder {
    writer: LineWriter,
    delimiter: Delimiter,
    key_folding: bool,
    flatten_depth: usize,
    root_dotted_literals: HashSet<String>,
}

impl Encoder {
    fn new(options: &EncodeOptions) -> Self {
        Self {
            writer: LineWriter::new(options.indent.get_spaces()),
            delimiter: options.delimiter,
            key_folding: options.key_folding == KeyFolding::Safe,
            flatten_depth: options.flatten_depth.unwrap_or(usize::MAX),
            root_dotted_literals: HashSet::new(),
        }
    }

    fn check_depth(&self, nesting: usize) -> Result<()> {
        if nesting > MAX_DEPTH {
            return Err(Error::validation(format!(
                "nesting exceeds the supported depth of {MAX_DEPTH}"
            )));
        }
        Ok(())
    }

    fn encode_root(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Object(map) => {
                if self.key_folding {
                    for key in map.keys().filter(|key| key.contains('.')) {
                        self.root_dotted_literals.insert(key.clone());
                    }
                }
                self.encode_object(map, 0, self.flatten_depth, "", 0)
            }
            Value::Array(items) => self.encode_array(None, items, 0, false, 0),
            scalar => {
                let mut line = String::new();
                self.append_scalar(&mut line, scalar)?;
                self.writer.push(0, &line);
                Ok(())
            }
        }
    }

    fn encode_object(
        &mut self,
        map: &Map<String, Value>,
        depth: usize,
        budget: usize,
        path_prefix: &str,
        nesting: usize,
    ) -> Result<()> {
        self.check_depth(nesting)?;
        for (key, value) in map {
            if self.key_folding {
                if let Some(fold) =
                    try_fold(key, value, map, budget, path_prefix, &self.root_dotted_literals)
                {
                    self.encode_folded(fold, depth, budget, path_prefix, nesting)?;
                    continue;
                }
            }
            self.encode_entry(key, value, depth, nesting)?;
        }
        Ok(())
    }

    fn encode_folded(
        &mut self,
        fold: Fold<'_>,
        depth: usize,
        budget: usize,
        path_prefix: &str,
        nesting: usize,
    ) -> Result<()> {
        match fold.tail {
            Value::Object(tail) if !tail.is_empty() => {
                let mut line = String::new();
                self.append_key(&mut line, &fold.dotted_key);
                line.push(':');
                self.writer.push(depth, &line);
                // A chain cut by the budget carries the leftover budget into
                // its tail; a chain that stopped at a multi-key mapping
                // starts the tail's entries fresh.
                let remaining = if fold.segments_used == budget {
                    budget.saturating_sub(fold.segments_used)
                } else {
                    self.flatten_depth
                };
                let next_prefix = if path_prefix.is_empty() {
                    fold.dotted_key.clone()
                } else {
                    format!("{path_prefix}.{}", fold.dotted_key)
                };
                self.encode_object(tail, depth + 1, remaining, &next_prefix, nesting + 1)
            }
            Value::Object(_) => {
                let mut line = String::new();
                self.append_key(&mut line, &fold.dotted_key);
                line.push(':');
                self.writer.push(depth, &line);
                Ok(())
            }
            Value::Array(items) => {
                self.encode_array(Some(&fold.dotted_key), items, depth, false, nesting + 1)
            }
            scalar => {
                let mut line = String::new();
                self.append_key(&mut line, &fold.dotted_key);
                line.push_str(": ");
                self.append_scalar(&mut line, scalar)?;
                self.writer.push(depth, &line);
                Ok(())
            }
        }
    }

    fn encode_entry(
        &mut self,
        key: &str,
        value: &Value,
        depth: usize,
        nesting: usize,
    ) -> Result<()> {
        match value {
            Value::Array(items) => self.encode_array(Some(key), items, depth, false, nesting + 1),
            Value::Object(map) => {
                let mut line = String::new();
                self.append_key(&mut line, key);
                line.push(':');
                self.writer.push(depth, &line);
                if map.is_empty() {
                    Ok(())
                } else {
                    self.encode_object(map, depth + 1, self.flatten_depth, "", nesting + 1)
                }
            }
            scalar => {
                let mut line = String::new();
                self.append_key(&mut line, key);
                line.push_str(": ");
                self.append_scalar(&mut line, scalar)?;
                self.writer.push(depth, &line);
                Ok(())
            }
        }
    }

    /// Emit an array under `key`. With `as_list_item` the header rides on a
    /// hyphen line; a keyed header there is the first field of a list-item
    /// object, whose body indents two levels past the hyphen.
    fn encode_array(
        &mut self,
        key: Option<&str>,
        items: &[Value],
        depth: usize,
        as_list_item: bool,
        nesting: usize,
    ) -> Result<()> {
        self.check_depth(nesting)?;

        if items.iter().all(is_scalar) {
            let mut line = String::new();
            self.append_array_header(&mut line, key, items.len(), None);
            if !items.is_empty() {
                line.push(' ');
                self.append_joined_scalars(&mut line, items)?;
            }
            self.push_header_line(depth, as_list_item, &line);
            return Ok(());
        }

        let body_depth = depth + 1 + usize::from(as_list_item && key.is_some());

        if items
            .iter()
            .all(|item| matches!(item, Value::Array(sub) if sub.iter().all(is_scalar)))
        {
            let mut line = String::new();
            self.append_array_header(&mut line, key, items.len(), None);
            self.push_header_line(depth, as_list_item, &line);
            for item in items {
                let Value::Array(sub) = item else {
                    unreachable!()
                };
                let mut line = String::new();
                self.append_array_header(&mut line, None, sub.len(), None);
                if !sub.is_empty() {
                    line.push(' ');
                    self.append_joined_scalars(&mut line, sub)?;
                }
                self.writer.push_list_item(body_depth, &line);
            }
            return Ok(());
        }

        if let Some(fields) = tabular_fields(items) {
            let mut line = String::new();
            self.append_array_header(&mut line, key, items.len(), Some(&fields));
            self.push_header_line(depth, as_list_item, &line);
            for item in items {
                let row = item.as_object().expect("tabular rows are objects");
                let mut line = String::new();
                for (idx, field) in fields.iter().enumerate() {
                    if idx > 0 {
                        line.push(self.delimiter.as_char());
                    }
                    let cell = row.get(*field).expect("tabular row has all fields");
                    self.append_scalar(&mut line, cell)?;
                }
                self.writer.push(body_depth, &line);
            }
            return Ok(());
        }

        let mut line = String::new();
        self.append_array_header(&mut line, key, items.len(), None);
        self.push_header_line(depth, as_list_item, &line);
        for item in items {
            self.encode_list_element(item, body_depth, nesting + 1)?;
        }
        Ok(())
    }

    fn encode_list_element(&mut self, item: &Value, item_depth: usize, nesting: usize) -> Result<()> {
        match item {
            Value::Array(sub) => self.encode_array(None, sub, item_depth, true, nesting + 1),
            Value::Object(map) => self.encode_object_item(map, item_depth, nesting + 1),
            scalar => {
                let mut line = String::new();
                self.append_scalar(&mut line, scalar)?;
                self.writer.push_list_item(item_depth, &line);
                Ok(())
            }
        }
    }

    fn encode_object_item(
        &mut self,
        map: &Map<String, Value>,
        item_depth: usize,
        nesting: usize,
    ) -> Result<()> {
        self.check_depth(nesting)?;
        let mut entries = map.iter();
        let Some((first_key, first_value)) = entries.next() else {
            self.writer.push(item_depth, "-");
            return Ok(());
        };

        match first_value {
            Value::Array(items) => {
                self.encode_array(Some(first_key), items, item_depth, true, nesting + 1)?;
            }
            Value::Object(nested) => {
                let mut line = String::new();
                self.append_key(&mut line, first_key);
                line.push(':');
                self.writer.push_list_item(item_depth, &line);
                if !nested.is_empty() {
                    self.encode_object(nested, item_depth + 2, self.flatten_depth, "", nesting + 1)?;
                }
            }
            scalar => {
                let mut line = String::new();
                self.append_key(&mut line, first_key);
                line.push_str(": ");
                self.append_scalar(&mut line, scalar)?;
                self.writer.push_list_item(item_depth, &line);
            }
        }

        for (key, value) in entries {
            self.encode_entry(key, value, item_depth + 1, nesting + 1)?;
        }
        Ok(())
    }

    fn push_header_line(&mut self, depth: usize, as_list_item: bool, line: &str) {
        if as_list_item {
            self.writer.push_list_item(depth, line);
        } else {
            self.writer.push(depth, line);
        }
    }

    fn append_array_header(
        &self,
        out: &mut String,
        key: Option<&str>,
        len: usize,
        fields: Option<&[&str]>,
    ) {
        if let Some(key) = key {
            self.append_key(out, key);
        }
        out.push('[');
        let mut buf = itoa::Buffer::new();
        out.push_str(buf.format(len));
        out.push_str(self.delimiter.header_suffix());
        out.push(']');
        if let Some(fields) = fields {
            out.push('{');
            for (idx, field) in fields.iter().enumerate() {
                if idx > 0 {
                    out.push(self.delimiter.as_char());
                }
                self.append_key(out, field);
            }
            out.push('}');
        }
        out.push(':');
    }

    fn append_joined_scalars(&self, out: &mut String, items: &[Value]) -> Result<()> {
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                out.push(self.delimiter.as_char());
            }
            self.append_scalar(out, item)?;
        }
        Ok(())
    }

    fn append_scalar(&self, out: &mut String, value: &Value) -> Result<()> {
        match value {
            Value::Null => out.push_str("null"),
            Value::Bool(true) => out.push_str("true"),
            Value::Bool(false) => out.push_str("false"),
            Value::Number(number) => append_number(out, number),
            Value::String(text) => {
                if is_safe_unquoted_string(text, self.delimiter.as_char()) {
                    out.push_str(text);
                } else {
                    out.push('"');
                    escape_into(out, text);
                    out.push('"');
                }
            }
            _ => return Err(Error::unknown("container in scalar position")),
        }
        Ok(())
    }

    fn append_key(&self, out: &mut String, key: &str) {
        if is_valid_unquoted_key(key) {
            out.push_str(key);
        } else {
            out.push('"');
            escape_into(out, key);
            out.push('"');
        }
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
    )
}

/// The uniform tabular header, if one exists: every element is a non-empty
/// mapping with the same keys in the same order and only scalar values.
fn tabular_fields(items: &[Value]) -> Option<Vec<&str>> {
    let first = items.first()?.as_object()?;
    if first.is_empty() {
        return None;
    }
    let fields: Vec<&str> = first.keys().map(String::as_str).collect();
    for item in items {
        let row = item.as_object()?;
        if row.len() != fields.len() {
            return None;
        }
        for (row_key, field) in row.keys().zip(&fields) {
            if row_key != *field {
                return None;
            }
        }
        if !row.values().all(is_scalar) {
            return None;
        }
    }
    Some(fields)
}
