//! Resource string table
//!
//! Dataref and texture paths referenced by the command stream are
//! deduplicated here and addressed by single-byte indices, which caps the
//! table at 255 entries. An entry's index is stable once assigned. The
//! writer serializes the table as back-to-back NUL-terminated strings.

use crate::error::CompileError;

/// Hard format cap: one-byte indices cannot address a 256th entry
pub const MAX_STRINGS: usize = 255;

#[derive(Debug, Default)]
pub struct StringTable {
    entries: Vec<String>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index of `s`, appending it on first sight.
    ///
    /// Fails rather than truncates once the table is full.
    pub fn intern(&mut self, s: &str) -> Result<u8, CompileError> {
        if let Some(idx) = self.entries.iter().position(|e| e == s) {
            return Ok(idx as u8);
        }
        if self.entries.len() >= MAX_STRINGS {
            return Err(CompileError::StringTableOverflow);
        }
        self.entries.push(s.to_owned());
        Ok((self.entries.len() - 1) as u8)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in table order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Serialized size: every entry plus its NUL terminator
    pub fn blob_len(&self) -> usize {
        self.entries.iter().map(|s| s.len() + 1).sum()
    }
}
