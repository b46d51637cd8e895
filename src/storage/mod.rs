//! Storage Module
//!
//! On-disk plumbing for a record store: the offset table, the byte-range
//! relocator, and the advisory lock pair.
//!
//! ## File Format
//! ```text
//! Index file (8 bytes per record, big-endian i64, key order)
//! ┌──────────┬──────────┬──────────┬─────┐
//! │ offset 0 │ offset 1 │ offset 2 │ ... │
//! └────┬─────┴────┬─────┴────┬─────┴─────┘
//!      │          │          │
//!      ▼          ▼          ▼
//! ┌──────────┬──────────────┬──────┬─────┐
//! │ record 0 │   record 1   │ rec 2│ ... │
//! └──────────┴──────────────┴──────┴─────┘
//! Content file (record layout defined by the record type)
//! ```
//!
//! Record `i` spans `offset[i]..offset[i+1]` (the last one runs to the end of
//! the content file). Removing a record leaves its bytes in place; they
//! become part of the preceding record's span.

pub mod index;
pub mod lock;
pub mod relocate;

pub use index::{IndexFile, SLOT_SIZE};
pub use lock::LockMode;
pub use relocate::shift;
