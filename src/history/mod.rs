//! Persisted history of saved configurations
//!
//! - [`HistoryStore`]: save (dedup by id, newest first, capped at 50), list, delete, clear
//! - [`KeyValueStore`]: the durable record backend; [`JsonFileStore`] on disk,
//!   [`MemoryStore`] in memory
//!
//! On disk the history is a single file, `qrforge-history.json`, in the data directory:
//! - macOS: `~/Library/Application Support/qrforge/`
//! - Linux: `~/.local/share/qrforge/`
//! - Windows: `%APPDATA%\qrforge\`

pub mod persistence;
pub mod store;

pub use persistence::{JsonFileStore, KeyValueStore, MemoryStore};
pub use store::{HISTORY_CAPACITY, HISTORY_KEY, HistoryStore};
