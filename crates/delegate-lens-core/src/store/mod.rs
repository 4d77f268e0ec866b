pub mod persistence;
pub mod task_store;

pub use persistence::{
    FileStore, KeyValueStore, MemoryStore, Persistence, StorageError, WriteBehind,
};
pub use task_store::{TaskCounts, TaskStore, ValidationError};
