//! Advisory Lock Pair
//!
//! Whole-file locks over the index and content handles. The locks are
//! advisory: they coordinate engine instances (threads or processes) that
//! open the same pair, and do nothing against writers that never lock.
//!
//! Acquisition order is always index then content, so two instances can
//! never hold one half each while waiting on the other.

use std::fs::File;

use crate::error::Result;

/// Kind of lock held on a file pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    /// Many holders at once; excludes exclusive holders
    Shared,

    /// Single holder; excludes everyone else
    Exclusive,
}

impl LockMode {
    /// `true` -> Exclusive, `false` -> Shared
    pub fn from_exclusive(exclusive: bool) -> Self {
        if exclusive {
            LockMode::Exclusive
        } else {
            LockMode::Shared
        }
    }

    pub fn is_exclusive(self) -> bool {
        self == LockMode::Exclusive
    }
}

/// Block until both files are locked in `mode`
pub fn acquire(index: &File, content: &File, mode: LockMode) -> Result<()> {
    lock_one(index, mode)?;
    if let Err(e) = lock_one(content, mode) {
        // Don't leave half a pair behind
        let _ = index.unlock();
        return Err(e.into());
    }
    Ok(())
}

/// Unlock both files
///
/// Both unlocks are attempted even if the first fails.
pub fn release(index: &File, content: &File) -> Result<()> {
    let index_result = index.unlock();
    let content_result = content.unlock();
    index_result?;
    content_result?;
    Ok(())
}

fn lock_one(file: &File, mode: LockMode) -> std::io::Result<()> {
    match mode {
        LockMode::Shared => file.lock_shared(),
        LockMode::Exclusive => file.lock(),
    }
}
