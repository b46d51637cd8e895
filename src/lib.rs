//! # varstore
//!
//! A persistent, sorted store of variable-length records kept in two files:
//! - An index file of fixed-width offsets, in key order
//! - A content file of serialized records, in the same order
//! - Binary-search lookup that compares against on-disk bytes
//! - Overlap-safe relocation when records grow, shrink or are inserted
//! - Advisory shared/exclusive locking across instances
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Engine                             │
//! │     index_of / get / to_list / save / remove / lock         │
//! └──────────┬───────────────────┬───────────────────┬──────────┘
//!            │                   │                   │
//!            ▼                   ▼                   ▼
//!   ┌─────────────────┐  ┌───────────────┐  ┌─────────────────┐
//!   │ Record/Decoder  │  │   IndexFile   │  │  Lock Pair      │
//!   │ (compare, r/w)  │  │ (8-byte slots)│  │ (advisory)      │
//!   └────────┬────────┘  └───────┬───────┘  └─────────────────┘
//!            │                   │
//!            ▼                   ▼
//!   ┌─────────────────────────────────────┐
//!   │      Byte-Range Relocator (shift)   │
//!   └─────────────────────────────────────┘
//! ```
//!
//! This is not a crash-safe database: there is no log, no checksums and no
//! recovery, and space freed by removals is never reclaimed.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod record;
pub mod size;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::StoreConfig;
pub use engine::{Engine, SaveOutcome, SharedEngine};
pub use record::{Decoder, NameCounter, PayloadRecord, Record, RefreshDecoder, StringRecord};
pub use storage::LockMode;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of varstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
