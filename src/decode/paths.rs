//! Dotted-key expansion: `a.b.c: 1` becomes nested objects on decode.
//!
//! Expansion applies only to keys that were unquoted in the source and
//! whose every dot-separated segment is an identifier segment. Everything
//! else is inserted literally, last write wins.

use serde_json::{Map, Value};

use crate::decode::parser::KeyToken;
use crate::error::Error;
use crate::options::ExpandPaths;
use crate::text::string::is_identifier_segment;
use crate::Result;

pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Inserts decoded entries into mappings, expanding eligible dotted keys
/// when the option asks for it.
#[derive(Debug, Clone, Copy)]
pub struct PathInserter {
    expand: ExpandPaths,
    strict: bool,
}

impl PathInserter {
    pub fn new(expand: ExpandPaths, strict: bool) -> Self {
        Self { expand, strict }
    }

    pub fn insert(&self, map: &mut Map<String, Value>, key: &KeyToken, value: Value) -> Result<()> {
        if let Some(parts) = self.expandable_parts(key) {
            return self.insert_path(map, &parts, value);
        }
        if self.expand == ExpandPaths::Safe && self.strict {
            if let Some(existing) = map.get(key.as_str()) {
                if existing.is_object() != value.is_object() {
                    return Err(Error::path_expansion(format!(
                        "key '{}' already holds {}, cannot assign {}",
                        key.as_str(),
                        value_type_name(existing),
                        value_type_name(&value)
                    )));
                }
            }
        }
        map.insert(key.as_str().to_string(), value);
        Ok(())
    }

    fn expandable_parts<'a>(&self, key: &'a KeyToken) -> Option<Vec<&'a str>> {
        if self.expand != ExpandPaths::Safe || key.quoted || !key.as_str().contains('.') {
            return None;
        }
        let parts: Vec<&str> = key.as_str().split('.').collect();
        if parts.iter().all(|part| is_identifier_segment(part)) {
            Some(parts)
        } else {
            None
        }
    }

    fn insert_path(&self, map: &mut Map<String, Value>, parts: &[&str], value: Value) -> Result<()> {
        let key = parts[0];
        if parts.len() == 1 {
            if let Some(existing) = map.get_mut(key) {
                return match (existing, value) {
                    (Value::Object(target), Value::Object(source)) => {
                        self.merge_objects(target, source)
                    }
                    (existing, value) => {
                        if self.strict {
                            return Err(Error::path_expansion(format!(
                                "key '{key}' already holds {}, cannot assign {}",
                                value_type_name(existing),
                                value_type_name(&value)
                            )));
                        }
                        *existing = value;
                        Ok(())
                    }
                };
            }
            map.insert(key.to_string(), value);
            return Ok(());
        }

        match map.get_mut(key) {
            Some(Value::Object(_)) => {}
            Some(existing) => {
                if self.strict {
                    return Err(Error::path_expansion(format!(
                        "expected object at '{key}', found {}",
                        value_type_name(existing)
                    )));
                }
                map.insert(key.to_string(), Value::Object(Map::new()));
            }
            None => {
                map.insert(key.to_string(), Value::Object(Map::new()));
            }
        }
        let next = map
            .get_mut(key)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| Error::unknown("expansion target vanished"))?;
        self.insert_path(next, &parts[1..], value)
    }

    fn merge_objects(&self, target: &mut Map<String, Value>, source: Map<String, Value>) -> Result<()> {
        for (key, value) in source {
            match target.get_mut(&key) {
                None => {
                    target.insert(key, value);
                }
                Some(Value::Object(nested)) if value.is_object() => {
                    let Value::Object(source_nested) = value else {
                        unreachable!()
                    };
                    self.merge_objects(nested, source_nested)?;
                }
                Some(existing) => {
                    if self.strict {
                        return Err(Error::path_expansion(format!(
                            "key '{key}' already holds {}, cannot assign {}",
                            value_type_name(existing),
                            value_type_name(&value)
                        )));
                    }
                    *existing = value;
                }
            }
        }
        Ok(())
    }
}
