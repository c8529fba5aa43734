//! Local persistence: a key-value backend plus typed accessors for the
//! credential and the conversation history.

mod kv;
mod persistence;


pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use persistence::{PersistenceStore, API_KEY_KEY, API_KEY_KIND_KEY, CHAT_HISTORY_KEY};
