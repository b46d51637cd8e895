//! Name/Counter Record
//!
//! ```text
//! ┌──────────┬────────────────────┬───────────────┐
//! │ N (i32)  │  N bytes of UTF-8  │ counter (i32) │
//! └──────────┴────────────────────┴───────────────┘
//! ```
//!
//! Keyed by name only: saving a record with an existing name and a new
//! counter updates the stored counter.

use std::cmp::Ordering;
use std::fs::File;

use bytes::BufMut;

use crate::error::Result;

use super::{len_header, read_at, read_i32_at, read_string_at, write_at, Record};

/// A named counter
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NameCounter {
    name: String,
    counter: i32,
}

impl NameCounter {
    pub fn new(name: impl Into<String>, counter: i32) -> Self {
        Self {
            name: name.into(),
            counter,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn counter(&self) -> i32 {
        self.counter
    }

    pub fn set_counter(&mut self, counter: i32) {
        self.counter = counter;
    }

    /// Add `by` to the counter, wrapping on overflow
    pub fn increment(&mut self, by: i32) -> i32 {
        self.counter = self.counter.wrapping_add(by);
        self.counter
    }

    /// Decode the record stored at `offset`
    pub fn read_at(content: &mut File, offset: u64) -> Result<Self> {
        let mut record = Self::default();
        record.refresh_read(content, offset)?;
        Ok(record)
    }

    fn counter_offset(&self, offset: u64) -> u64 {
        offset + 4 + self.name.len() as u64
    }
}

impl Record for NameCounter {
    fn store_compare(&self, content: &mut File, offset: u64) -> Result<Ordering> {
        let len = read_i32_at(content, offset)?.max(0) as usize;
        let stored = read_at(content, offset + 4, len)?;
        Ok(self.name.as_bytes().cmp(&stored))
    }

    fn refresh_read(&mut self, content: &mut File, offset: u64) -> Result<()> {
        let name = read_string_at(content, offset)?;
        let counter = read_i32_at(content, offset + 4 + name.len() as u64)?;
        self.name = name;
        self.counter = counter;
        Ok(())
    }

    fn write(&self, content: &mut File, offset: u64) -> Result<()> {
        let bytes = self.name.as_bytes();
        let mut buf = Vec::with_capacity(8 + bytes.len());
        buf.put_i32(len_header(bytes.len())?);
        buf.put_slice(bytes);
        buf.put_i32(self.counter);
        write_at(content, offset, &buf)
    }

    /// Same length means same name, so only the counter can differ
    fn update_write(&self, content: &mut File, offset: u64) -> Result<()> {
        write_at(content, self.counter_offset(offset), &self.counter.to_be_bytes())
    }

    fn byte_length(&self) -> u64 {
        8 + self.name.len() as u64
    }
}
