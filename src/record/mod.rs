//! Record Module
//!
//! The contract every storable value implements, and the decoder values the
//! engine uses to build records from content-file bytes.
//!
//! ## Responsibilities
//! - Compare an in-memory key against a serialized record on disk
//! - Read, write and rewrite records at a content-file offset
//! - Report the exact serialized length
//!
//! A record never holds a reference to the engine; it is handed the content
//! file and an offset for each call.

mod name_counter;
mod payload;
mod string;

use std::cmp::Ordering;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;

use bytes::Buf;

use crate::error::{Result, StoreError};

pub use name_counter::NameCounter;
pub use payload::PayloadRecord;
pub use string::StringRecord;

/// A value that can live in the content file
pub trait Record {
    /// Compare this record's key with the record serialized at `offset`.
    ///
    /// Reads only as much as the comparison needs and must agree with the
    /// type's own ordering.
    fn store_compare(&self, content: &mut File, offset: u64) -> Result<Ordering>;

    /// Replace this value with the record serialized at `offset`
    fn refresh_read(&mut self, content: &mut File, offset: u64) -> Result<()>;

    /// Serialize the full record at `offset`
    fn write(&self, content: &mut File, offset: u64) -> Result<()>;

    /// Rewrite a record whose serialized length has not changed.
    ///
    /// Must not write outside `offset..offset + byte_length()`.
    fn update_write(&self, content: &mut File, offset: u64) -> Result<()> {
        self.write(content, offset)
    }

    /// Serialized length; exactly what `write` produces
    fn byte_length(&self) -> u64;
}

/// Builds a record from the content file
pub trait Decoder<R> {
    fn decode(&self, content: &mut File, offset: u64) -> Result<R>;
}

impl<R, F> Decoder<R> for F
where
    F: Fn(&mut File, u64) -> Result<R>,
{
    fn decode(&self, content: &mut File, offset: u64) -> Result<R> {
        self(content, offset)
    }
}

/// Decoder for any `Default` record: start from the default, then refresh
pub struct RefreshDecoder<R>(PhantomData<fn() -> R>);

impl<R> RefreshDecoder<R> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<R> Default for RefreshDecoder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record + Default> Decoder<R> for RefreshDecoder<R> {
    fn decode(&self, content: &mut File, offset: u64) -> Result<R> {
        let mut record = R::default();
        record.refresh_read(content, offset)?;
        Ok(record)
    }
}

// =============================================================================
// Positional I/O helpers for record implementations
// =============================================================================

/// Read exactly `len` bytes at `offset`
pub fn read_at(content: &mut File, offset: u64, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    content.seek(SeekFrom::Start(offset))?;
    content.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read a big-endian i32 at `offset`
pub fn read_i32_at(content: &mut File, offset: u64) -> Result<i32> {
    let raw = read_at(content, offset, 4)?;
    Ok((&raw[..]).get_i32())
}

/// Read an `i32 N` length header at `offset` followed by `N` bytes
pub fn read_len_prefixed(content: &mut File, offset: u64) -> Result<Vec<u8>> {
    let len = read_i32_at(content, offset)?;
    if len < 0 {
        return Err(StoreError::Codec(format!(
            "negative length header {} at offset {}",
            len, offset
        )));
    }
    read_at(content, offset + 4, len as usize)
}

/// Read a length-prefixed UTF-8 string at `offset`
pub fn read_string_at(content: &mut File, offset: u64) -> Result<String> {
    let raw = read_len_prefixed(content, offset)?;
    String::from_utf8(raw)
        .map_err(|e| StoreError::Codec(format!("invalid UTF-8 at offset {}: {}", offset, e)))
}

/// Write `data` at `offset`
pub fn write_at(content: &mut File, offset: u64, data: &[u8]) -> Result<()> {
    content.seek(SeekFrom::Start(offset))?;
    content.write_all(data)?;
    Ok(())
}

/// Length header for a byte string, rejecting anything an i32 can't hold
pub(crate) fn len_header(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| StoreError::Codec(format!("field of {} bytes is too long", len)))
}
