pub mod storage;
pub mod store;

pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{HistoryEntry, HistoryStore, HISTORY_KEY, MAX_HISTORY};
