//! String Record
//!
//! ```text
//! ┌──────────┬────────────────────┐
//! │ N (i32)  │  N bytes of UTF-8  │
//! └──────────┴────────────────────┘
//! ```

use std::cmp::Ordering;
use std::fs::File;

use bytes::BufMut;

use crate::error::Result;

use super::{len_header, read_at, read_i32_at, read_string_at, write_at, Record};

/// A record whose key is the whole string
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StringRecord {
    value: String,
}

impl StringRecord {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }

    /// Decode the record stored at `offset`
    pub fn read_at(content: &mut File, offset: u64) -> Result<Self> {
        Ok(Self::new(read_string_at(content, offset)?))
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let bytes = self.value.as_bytes();
        let mut buf = Vec::with_capacity(4 + bytes.len());
        buf.put_i32(len_header(bytes.len())?);
        buf.put_slice(bytes);
        Ok(buf)
    }
}

impl From<&str> for StringRecord {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StringRecord {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Record for StringRecord {
    fn store_compare(&self, content: &mut File, offset: u64) -> Result<Ordering> {
        // Byte order of UTF-8 is code point order, so no decoding needed
        let len = read_i32_at(content, offset)?.max(0) as usize;
        let stored = read_at(content, offset + 4, len)?;
        Ok(self.value.as_bytes().cmp(&stored))
    }

    fn refresh_read(&mut self, content: &mut File, offset: u64) -> Result<()> {
        self.value = read_string_at(content, offset)?;
        Ok(())
    }

    fn write(&self, content: &mut File, offset: u64) -> Result<()> {
        write_at(content, offset, &self.encode()?)
    }

    fn byte_length(&self) -> u64 {
        4 + self.value.len() as u64
    }
}
