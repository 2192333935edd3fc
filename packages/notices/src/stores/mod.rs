//! Storage implementations for the notices library.
//!
//! Available backends:
//! - `MemoryNoticeStore` - In-memory storage (always available)
//! - `SqliteNoticeStore` - SQLite file-based storage (requires `sqlite` feature)

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryNoticeStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteNoticeStore;
