//! Engine Module
//!
//! The sorted record store over one index file and one content file.
//!
//! ## Responsibilities
//! - Binary-search the index, comparing against on-disk records
//! - Insert, update and remove records while keeping both files consistent
//! - Track record count and content length
//! - Acquire and release the advisory lock pair

use std::cmp::Ordering;
use std::fs::{self, File, OpenOptions};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::record::{Decoder, Record, RefreshDecoder};
use crate::size;
use crate::storage::{lock, relocate, IndexFile, LockMode, SLOT_SIZE};

/// An engine behind the external mutex needed to share it between threads
pub type SharedEngine<R, D> = Arc<Mutex<Engine<R, D>>>;

/// What `save` did with a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// New key, stored at this position
    Inserted { index: usize },

    /// Existing key, same serialized length, rewritten in place
    UpdatedInPlace { index: usize },

    /// Existing key, length changed by `delta`; everything after it moved
    Relocated { index: usize, delta: i64 },
}

impl SaveOutcome {
    /// Position of the saved record
    pub fn index(&self) -> usize {
        match *self {
            SaveOutcome::Inserted { index }
            | SaveOutcome::UpdatedInPlace { index }
            | SaveOutcome::Relocated { index, .. } => index,
        }
    }
}

/// The sorted record store
///
/// ## Concurrency Model
///
/// There is no internal mutex. Every mutating call takes `&mut self`, so one
/// instance is used from one thread at a time; to share it, wrap it in an
/// external mutex (see [`SharedEngine`]).
///
/// Separate instances over the same file pair (other threads or processes)
/// coordinate through [`Engine::lock`]. A read-modify-write sequence must be
/// bracketed by `lock(LockMode::Exclusive)` / `release()`, or run through
/// [`Engine::with_lock`].
pub struct Engine<R, D = RefreshDecoder<R>> {
    /// Engine configuration
    config: StoreConfig,

    /// Offset table (one slot per record)
    index: IndexFile,

    /// Serialized records
    content: File,

    /// Number of live records
    record_count: usize,

    /// Logical length of the content file, orphaned bytes included
    content_length: u64,

    /// Lock currently held on the pair, if any
    lock_mode: Option<LockMode>,

    /// Builds records from content bytes
    decoder: D,

    _record: PhantomData<fn() -> R>,
}

impl<R: Record + Default> Engine<R, RefreshDecoder<R>> {
    /// Open with the default-then-refresh decoder
    pub fn open_default(config: StoreConfig) -> Result<Self> {
        Self::open(config, RefreshDecoder::new())
    }
}

impl<R, D> Engine<R, D>
where
    R: Record,
    D: Decoder<R>,
{
    /// Open or create the file pair described by `config`
    ///
    /// On startup:
    /// 1. Create parent directories and both files if missing
    /// 2. Derive record count and content length from file sizes
    /// 3. Acquire the configured lock, if any
    pub fn open(config: StoreConfig, decoder: D) -> Result<Self> {
        config.validate()?;

        // Step 1: Open/create both files
        let index_file = open_rw(&config.index_path)?;
        let content = open_rw(&config.content_path)?;

        let mut engine = Self {
            index: IndexFile::new(index_file, config.block_size),
            content,
            record_count: 0,
            content_length: 0,
            lock_mode: None,
            decoder,
            config,
            _record: PhantomData,
        };

        // Step 2: Bookkeeping from file sizes
        engine.refresh()?;

        tracing::debug!(
            index = %engine.config.index_path.display(),
            content = %engine.config.content_path.display(),
            records = engine.record_count,
            content_length = engine.content_length,
            "opened record store"
        );

        // Step 3: Optional lock
        if let Some(mode) = engine.config.lock_on_open {
            engine.lock(mode)?;
        }

        Ok(engine)
    }

    /// Open `{dir}/{name}.idx` and `{dir}/{name}.dat` with default settings
    pub fn open_in(dir: &Path, name: &str, decoder: D) -> Result<Self> {
        Self::open(StoreConfig::in_dir(dir, name), decoder)
    }

    /// Recompute record count and content length from the file sizes
    ///
    /// An empty content file means an empty store, whatever the index says.
    /// In that case the index is cut back to zero slots.
    pub fn refresh(&mut self) -> Result<()> {
        let index_len = self.index.byte_len()?;
        self.content_length = self.content.metadata()?.len();

        if self.content_length > 0 {
            self.record_count = (index_len / SLOT_SIZE) as usize;
        } else {
            if index_len > 0 {
                tracing::warn!(
                    index_len,
                    "content file is empty but index is not; treating store as empty"
                );
                self.index.truncate(0)?;
            }
            self.record_count = 0;
        }
        Ok(())
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Binary search for `record`'s key.
    ///
    /// `Ok(pos)` if found, `Err(pos)` with the insertion position otherwise.
    fn search(&mut self, record: &R) -> Result<std::result::Result<usize, usize>> {
        let mut low = 0;
        let mut high = self.record_count;

        while low < high {
            let mid = low + (high - low) / 2;
            let offset = self.index.read_offset(mid)?;
            match record.store_compare(&mut self.content, offset)? {
                Ordering::Less => high = mid,
                Ordering::Greater => low = mid + 1,
                Ordering::Equal => return Ok(Ok(mid)),
            }
        }
        Ok(Err(low))
    }

    /// Position of the record with `record`'s key
    pub fn index_of(&mut self, record: &R) -> Result<Option<usize>> {
        Ok(self.search(record)?.ok())
    }

    /// Whether a record with `record`'s key is stored
    pub fn contains(&mut self, record: &R) -> Result<bool> {
        Ok(self.search(record)?.is_ok())
    }

    /// Decode the record at position `index`
    pub fn get(&mut self, index: usize) -> Result<R> {
        self.check_index(index)?;
        let offset = self.index.read_offset(index)?;
        self.decoder.decode(&mut self.content, offset)
    }

    /// Decode every record in key order
    pub fn to_list(&mut self) -> Result<Vec<R>> {
        let mut records = Vec::with_capacity(self.record_count);
        for i in 0..self.record_count {
            let offset = self.index.read_offset(i)?;
            records.push(self.decoder.decode(&mut self.content, offset)?);
        }
        Ok(records)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert `record`, or replace the stored record with the same key
    pub fn save(&mut self, record: &R) -> Result<SaveOutcome> {
        // Empty store: whatever is in the content file is orphaned
        if self.record_count == 0 {
            self.content.set_len(0)?;
            record.write(&mut self.content, 0)?;
            self.content_length = record.byte_length();
            self.index.truncate(0)?;
            self.index.insert(0, 0, 0)?;
            self.record_count = 1;

            tracing::debug!(bytes = self.content_length, "saved first record");
            return Ok(SaveOutcome::Inserted { index: 0 });
        }

        match self.search(record)? {
            Err(pos) => self.insert_at(pos, record),
            Ok(pos) => self.update_at(pos, record),
        }
    }

    /// Store a new record at rank `pos`
    ///
    /// Bytes go where rank `pos` currently starts, so the content file stays
    /// in index order; at the end this is a plain append.
    fn insert_at(&mut self, pos: usize, record: &R) -> Result<SaveOutcome> {
        let len = record.byte_length();
        let offset = if pos < self.record_count {
            self.index.read_offset(pos)?
        } else {
            self.content_length
        };

        if pos < self.record_count {
            relocate::shift(
                &mut self.content,
                offset,
                self.content_length - offset,
                len as i64,
                self.config.block_size,
            )?;
            self.index.adjust(pos, self.record_count, len as i64)?;
        }

        record.write(&mut self.content, offset)?;
        self.index.insert(pos, self.record_count, offset)?;
        self.record_count += 1;
        self.content_length += len;

        tracing::debug!(index = pos, offset, bytes = len, "inserted record");
        Ok(SaveOutcome::Inserted { index: pos })
    }

    /// Replace the record at rank `pos`
    fn update_at(&mut self, pos: usize, record: &R) -> Result<SaveOutcome> {
        let start = self.index.read_offset(pos)?;
        let end = self.span_end(pos)?;
        let old_len = end - start;
        let new_len = record.byte_length();

        if new_len == old_len {
            record.update_write(&mut self.content, start)?;
            tracing::debug!(index = pos, offset = start, "updated record in place");
            return Ok(SaveOutcome::UpdatedInPlace { index: pos });
        }

        let delta = new_len as i64 - old_len as i64;

        // Move the tail first so a growing record has room
        relocate::shift(
            &mut self.content,
            end,
            self.content_length - end,
            delta,
            self.config.block_size,
        )?;
        record.write(&mut self.content, start)?;
        self.index.adjust(pos + 1, self.record_count, delta)?;

        self.content_length = (self.content_length as i64 + delta) as u64;
        if delta < 0 {
            self.content.set_len(self.content_length)?;
        }

        tracing::debug!(index = pos, offset = start, delta, "updated record with relocation");
        Ok(SaveOutcome::Relocated { index: pos, delta })
    }

    /// Remove the record at position `index`
    ///
    /// Only the index slot goes away; the content bytes stay where they are.
    pub fn remove(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.index.remove(index, self.record_count)?;
        self.record_count -= 1;

        tracing::debug!(index, remaining = self.record_count, "removed record");
        Ok(())
    }

    /// Remove the record with `record`'s key; false if there was none
    pub fn remove_record(&mut self, record: &R) -> Result<bool> {
        match self.search(record)? {
            Ok(pos) => {
                self.remove(pos)?;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    // =========================================================================
    // Locking
    // =========================================================================

    /// Lock both files, blocking until granted.
    ///
    /// If this instance already holds a lock, that lock's mode is returned
    /// and nothing changes. A fresh lock reloads the bookkeeping, since
    /// another instance may have written while this one was unlocked.
    pub fn lock(&mut self, mode: LockMode) -> Result<LockMode> {
        if let Some(held) = self.lock_mode {
            return Ok(held);
        }

        lock::acquire(self.index.file(), &self.content, mode)?;
        self.lock_mode = Some(mode);

        if let Err(e) = self.refresh() {
            self.release()?;
            return Err(e);
        }

        tracing::debug!(?mode, records = self.record_count, "acquired lock pair");
        Ok(mode)
    }

    /// Release the held lock pair, if any
    pub fn release(&mut self) -> Result<()> {
        if self.lock_mode.take().is_some() {
            lock::release(self.index.file(), &self.content)?;
            tracing::debug!("released lock pair");
        }
        Ok(())
    }

    /// Run `f` under a lock of `mode`.
    ///
    /// The lock is released afterwards, on success or error, unless it was
    /// already held on entry.
    pub fn with_lock<T, F>(&mut self, mode: LockMode, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let already_held = self.lock_mode.is_some();
        self.lock(mode)?;

        let result = f(self);
        if !already_held {
            let released = self.release();
            if result.is_ok() {
                released?;
            }
        }
        result
    }

    /// Lock currently held by this instance
    pub fn lock_mode(&self) -> Option<LockMode> {
        self.lock_mode
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Release any lock, sync both files and close them
    pub fn close(mut self) -> Result<()> {
        let released = self.release();
        self.index.sync()?;
        self.content.sync_all()?;
        released
    }

    /// Move behind an external mutex for sharing across threads
    pub fn into_shared(self) -> SharedEngine<R, D> {
        Arc::new(Mutex::new(self))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.record_count
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Content file length, orphaned bytes included
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Bytes used by both files
    pub fn storage_size(&self) -> u64 {
        self.content_length + self.record_count as u64 * SLOT_SIZE
    }

    /// `storage_size` formatted with a unit, e.g. `18.00 B`
    pub fn readable_size(&self) -> String {
        size::readable_size(self.storage_size())
    }

    /// Get the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.record_count {
            return Err(StoreError::IndexOutOfBounds {
                index,
                count: self.record_count,
            });
        }
        Ok(())
    }

    /// End of the span owned by rank `pos`
    fn span_end(&mut self, pos: usize) -> Result<u64> {
        if pos + 1 < self.record_count {
            self.index.read_offset(pos + 1)
        } else {
            Ok(self.content_length)
        }
    }
}

fn open_rw(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    Ok(file)
}
