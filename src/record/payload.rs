//! Payload Record
//!
//! A string key plus any serde value, encoded with bincode.
//!
//! ```text
//! ┌──────────┬─────────────┬──────────┬──────────────────────┐
//! │ N (i32)  │  N key bytes│ M (i32)  │ M bytes bincode(V)   │
//! └──────────┴─────────────┴──────────┴──────────────────────┘
//! ```
//!
//! The payload is encoded when the value is set, so `byte_length` never
//! has to serialize.

use std::cmp::Ordering;
use std::fs::File;

use bytes::BufMut;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

use super::{len_header, read_at, read_i32_at, read_len_prefixed, read_string_at, write_at, Record};

/// A keyed record carrying a bincode-encoded value
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadRecord<V> {
    key: String,
    value: V,
    payload: Vec<u8>,
}

impl<V> PayloadRecord<V>
where
    V: Serialize + DeserializeOwned,
{
    pub fn new(key: impl Into<String>, value: V) -> Result<Self> {
        let payload = bincode::serialize(&value)?;
        len_header(payload.len())?;
        Ok(Self {
            key: key.into(),
            value,
            payload,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    /// Replace the value, re-encoding the payload
    pub fn set_value(&mut self, value: V) -> Result<()> {
        let payload = bincode::serialize(&value)?;
        len_header(payload.len())?;
        self.value = value;
        self.payload = payload;
        Ok(())
    }

    /// Decode the record stored at `offset`
    pub fn read_at(content: &mut File, offset: u64) -> Result<Self> {
        let key = read_string_at(content, offset)?;
        let payload = read_len_prefixed(content, offset + 4 + key.len() as u64)?;
        let value = bincode::deserialize(&payload)?;
        Ok(Self { key, value, payload })
    }
}

impl<V> Default for PayloadRecord<V>
where
    V: Serialize + DeserializeOwned + Default,
{
    fn default() -> Self {
        let value = V::default();
        let payload = bincode::serialize(&value).unwrap_or_default();
        Self {
            key: String::new(),
            value,
            payload,
        }
    }
}

impl<V> Record for PayloadRecord<V>
where
    V: Serialize + DeserializeOwned,
{
    fn store_compare(&self, content: &mut File, offset: u64) -> Result<Ordering> {
        let len = read_i32_at(content, offset)?.max(0) as usize;
        let stored = read_at(content, offset + 4, len)?;
        Ok(self.key.as_bytes().cmp(&stored))
    }

    fn refresh_read(&mut self, content: &mut File, offset: u64) -> Result<()> {
        *self = Self::read_at(content, offset)?;
        Ok(())
    }

    fn write(&self, content: &mut File, offset: u64) -> Result<()> {
        let key = self.key.as_bytes();
        let mut buf = Vec::with_capacity(self.byte_length() as usize);
        buf.put_i32(len_header(key.len())?);
        buf.put_slice(key);
        buf.put_i32(len_header(self.payload.len())?);
        buf.put_slice(&self.payload);
        write_at(content, offset, &buf)
    }

    fn byte_length(&self) -> u64 {
        8 + self.key.len() as u64 + self.payload.len() as u64
    }
}
