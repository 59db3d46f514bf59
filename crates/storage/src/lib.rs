#![forbid(unsafe_code)]

pub mod repository;
pub mod snapshot;
pub mod sqlite;

pub use repository::{
    BlobStore, InMemoryRepository, PROGRESS_KEY, ProgressRepository, SESSIONS_KEY,
    SessionLogRepository, Storage, StorageError,
};
