//! Configuration for varstore
//!
//! Centralized configuration with sensible defaults.

use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::storage::LockMode;

/// Default relocation block size (8 KiB)
pub const DEFAULT_BLOCK_SIZE: usize = 8 * 1024;

/// Configuration for a single index/content file pair
#[derive(Debug, Clone)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // File Configuration
    // -------------------------------------------------------------------------
    /// Index file: one 8-byte big-endian offset per record
    pub index_path: PathBuf,

    /// Content file: serialized records in index order
    pub content_path: PathBuf,

    // -------------------------------------------------------------------------
    // Relocation Configuration
    // -------------------------------------------------------------------------
    /// Chunk size used when shifting byte ranges inside either file
    pub block_size: usize,

    // -------------------------------------------------------------------------
    // Locking Configuration
    // -------------------------------------------------------------------------
    /// Acquire this lock immediately after opening
    pub lock_on_open: Option<LockMode>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("./store.idx"),
            content_path: PathBuf::from("./store.dat"),
            block_size: DEFAULT_BLOCK_SIZE,
            lock_on_open: None,
        }
    }
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Config for `{dir}/{name}.idx` and `{dir}/{name}.dat`
    pub fn in_dir(dir: impl AsRef<Path>, name: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            index_path: dir.join(format!("{}.idx", name)),
            content_path: dir.join(format!("{}.dat", name)),
            ..Self::default()
        }
    }

    /// Reject configurations that cannot describe a valid file pair
    pub fn validate(&self) -> Result<()> {
        if self.index_path == self.content_path {
            return Err(StoreError::Config(format!(
                "index and content must be different files, both are {}",
                self.index_path.display()
            )));
        }
        if self.block_size == 0 {
            return Err(StoreError::Config("block_size must be positive".to_string()));
        }
        Ok(())
    }
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct ConfigBuilder {
    config: StoreConfig,
}

impl ConfigBuilder {
    /// Set both file paths from a directory and a base name
    pub fn dir(mut self, dir: impl AsRef<Path>, name: &str) -> Self {
        let paths = StoreConfig::in_dir(dir, name);
        self.config.index_path = paths.index_path;
        self.config.content_path = paths.content_path;
        self
    }

    /// Set the index file path
    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.index_path = path.into();
        self
    }

    /// Set the content file path
    pub fn content_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.content_path = path.into();
        self
    }

    /// Set the relocation block size (in bytes)
    pub fn block_size(mut self, size: usize) -> Self {
        self.config.block_size = size;
        self
    }

    /// Lock the pair as soon as it is opened
    pub fn lock_on_open(mut self, mode: LockMode) -> Self {
        self.config.lock_on_open = Some(mode);
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}
