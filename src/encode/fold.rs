//! Key folding: collapse chains of single-key objects into dotted keys.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::text::string::is_identifier_segment;

/// Successful fold of one mapping entry.
#[derive(Debug)]
pub struct Fold<'a> {
    /// The dotted key to emit, e.g. `a.b.c`.
    pub dotted_key: String,
    /// Value the chain stopped at: a leaf, or a non-empty mapping when the
    /// budget ran out.
    pub tail: &'a Value,
    /// Segments consumed by `dotted_key`.
    pub segments_used: usize,
}

/// Try to fold `(key, value)`. `budget` caps the segment count
/// (`usize::MAX` means unbounded); `path_prefix` is the dotted path of the
/// enclosing folded tail, used for collision checks against root-level
/// dotted literal keys.
pub fn try_fold<'a>(
    key: &'a str,
    value: &'a Value,
    siblings: &Map<String, Value>,
    budget: usize,
    path_prefix: &str,
    root_dotted_literals: &HashSet<String>,
) -> Option<Fold<'a>> {
    if budget < 2 || !value.is_object() {
        return None;
    }
    if !is_identifier_segment(key) {
        return None;
    }

    let mut segments = vec![key];
    let mut tail = value;
    while segments.len() < budget {
        let Value::Object(map) = tail else {
            break;
        };
        if map.len() != 1 {
            break;
        }
        let (next_key, next_value) = map.iter().next()?;
        if !is_identifier_segment(next_key) {
            break;
        }
        segments.push(next_key.as_str());
        tail = next_value;
    }

    if segments.len() < 2 {
        return None;
    }

    let dotted_key = segments.join(".");
    if siblings.contains_key(&dotted_key) {
        return None;
    }
    let full_path = if path_prefix.is_empty() {
        dotted_key.clone()
    } else {
        format!("{path_prefix}.{dotted_key}")
    };
    if root_dotted_literals.contains(&full_path) {
        return None;
    }

    Some(Fold {
        segments_used: segments.len(),
        dotted_key,
        tail,
    })
}
