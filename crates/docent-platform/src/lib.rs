//! Platform services for Docent: directory layout and local persistence.

pub mod paths;
pub mod storage;

pub use paths::{config_dir, data_dir, ensure_dirs, store_file};
pub use storage::{FileStore, KeyValueStore, MemoryStore, PersistenceStore};
