//! Persisted client state (token, selected site, preferences, drafts)

mod state;
mod store;

pub use state::{DEFAULT_KEY_PREFIX, PersistedState, SortDirection, SortPreference};
pub use store::{FileStore, KeyValueStore, MemoryStore};
