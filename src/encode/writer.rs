//! Indent-aware append-only output buffer.

use crate::constants::LIST_ITEM_PREFIX;

/// Builds the final document line by line. Indentation strings are cached
/// per depth; the finished output carries no trailing newline.
pub struct LineWriter {
    buffer: String,
    indent_unit: String,
    indent_cache: Vec<String>,
}

impl LineWriter {
    pub fn new(indent_size: usize) -> Self {
        Self {
            buffer: String::new(),
            indent_unit: " ".repeat(indent_size),
            indent_cache: vec![String::new()],
        }
    }

    /// Append a line at `depth`. A newline separates it from the previous
    /// line; the very first line gets none.
    pub fn push(&mut self, depth: usize, content: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        if depth > 0 && !self.indent_unit.is_empty() {
            self.ensure_indent(depth);
            self.buffer.push_str(&self.indent_cache[depth]);
        }
        self.buffer.push_str(content);
    }

    pub fn push_list_item(&mut self, depth: usize, content: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        if depth > 0 && !self.indent_unit.is_empty() {
            self.ensure_indent(depth);
            self.buffer.push_str(&self.indent_cache[depth]);
        }
        self.buffer.push_str(LIST_ITEM_PREFIX);
        self.buffer.push_str(content);
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    fn ensure_indent(&mut self, depth: usize) {
        while self.indent_cache.len() <= depth {
            let mut next = self.indent_cache.last().cloned().unwrap_or_default();
            next.push_str(&self.indent_unit);
            self.indent_cache.push(next);
        }
    }
}
