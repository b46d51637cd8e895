//! Index File
//!
//! Fixed-width offset table: slot `i` holds the content-file offset of the
//! record with rank `i`, as an 8-byte big-endian signed integer.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use bytes::{Buf, BufMut};

use crate::error::Result;

use super::relocate;

/// Width of one index slot in bytes
pub const SLOT_SIZE: u64 = 8;

/// Typed access to the slots of an index file
#[derive(Debug)]
pub struct IndexFile {
    file: File,
    block_size: usize,
}

impl IndexFile {
    pub fn new(file: File, block_size: usize) -> Self {
        Self { file, block_size }
    }

    /// Underlying handle (for locking and syncing)
    pub fn file(&self) -> &File {
        &self.file
    }

    /// Current file length in bytes
    pub fn byte_len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Read the offset stored in slot `slot`
    pub fn read_offset(&mut self, slot: usize) -> Result<u64> {
        let mut raw = [0u8; SLOT_SIZE as usize];
        self.file.seek(SeekFrom::Start(slot as u64 * SLOT_SIZE))?;
        self.file.read_exact(&mut raw)?;
        Ok((&raw[..]).get_i64() as u64)
    }

    /// Overwrite slot `slot` with `offset`
    pub fn write_offset(&mut self, slot: usize, offset: u64) -> Result<()> {
        let mut raw = Vec::with_capacity(SLOT_SIZE as usize);
        raw.put_i64(offset as i64);
        self.file.seek(SeekFrom::Start(slot as u64 * SLOT_SIZE))?;
        self.file.write_all(&raw)?;
        Ok(())
    }

    /// Insert a new slot at `slot`, moving slots `slot..count` one slot up
    pub fn insert(&mut self, slot: usize, count: usize, offset: u64) -> Result<()> {
        let start = slot as u64 * SLOT_SIZE;
        let len = (count - slot) as u64 * SLOT_SIZE;
        relocate::shift(&mut self.file, start, len, SLOT_SIZE as i64, self.block_size)?;
        self.write_offset(slot, offset)?;
        self.truncate(count + 1)
    }

    /// Drop slot `slot`, moving slots `slot+1..count` one slot down
    pub fn remove(&mut self, slot: usize, count: usize) -> Result<()> {
        let start = (slot as u64 + 1) * SLOT_SIZE;
        let len = (count - slot - 1) as u64 * SLOT_SIZE;
        relocate::shift(&mut self.file, start, len, -(SLOT_SIZE as i64), self.block_size)?;
        self.truncate(count - 1)
    }

    /// Add `delta` to every offset in slots `from..count`
    pub fn adjust(&mut self, from: usize, count: usize, delta: i64) -> Result<()> {
        if from >= count || delta == 0 {
            return Ok(());
        }

        let slots_per_block = (self.block_size as u64 / SLOT_SIZE).max(1) as usize;
        let mut slot = from;
        while slot < count {
            let n = (count - slot).min(slots_per_block);
            let mut raw = vec![0u8; n * SLOT_SIZE as usize];
            self.file.seek(SeekFrom::Start(slot as u64 * SLOT_SIZE))?;
            self.file.read_exact(&mut raw)?;

            let mut src = &raw[..];
            let mut out = Vec::with_capacity(raw.len());
            while src.has_remaining() {
                out.put_i64(src.get_i64() + delta);
            }

            self.file.seek(SeekFrom::Start(slot as u64 * SLOT_SIZE))?;
            self.file.write_all(&out)?;
            slot += n;
        }
        Ok(())
    }

    /// Cut or extend the file to exactly `count` slots
    pub fn truncate(&mut self, count: usize) -> Result<()> {
        self.file.set_len(count as u64 * SLOT_SIZE)?;
        Ok(())
    }

    /// Flush file contents to disk
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}
