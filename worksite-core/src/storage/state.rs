//! Namespaced view over the key/value store

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::KeyValueStore;
use crate::StorageError;

/// Default namespace for every persisted key
pub const DEFAULT_KEY_PREFIX: &str = "admin_portal_";

const TOKEN_KEY: &str = "token";
const SELECTED_SITE_KEY: &str = "selected_site";
const RETURN_PATH_KEY: &str = "return_path";
const SORT_FIELD_KEY: &str = "sort_field";
const SORT_DIRECTION_KEY: &str = "sort_direction";
const DRAFT_KEY_PREFIX: &str = "draft_";

/// Sort direction for table views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Remembered table sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortPreference {
    pub field: String,
    pub direction: SortDirection,
}

/// Typed accessors for client state under a shared key prefix.
///
/// Writes are best-effort: callers on non-critical paths log and move on.
#[derive(Clone)]
pub struct PersistedState {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
}

impl PersistedState {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_prefix(store, DEFAULT_KEY_PREFIX)
    }

    pub fn with_prefix(store: Arc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    // ==================== Bearer token ====================

    pub fn token(&self) -> Option<String> {
        self.store
            .get(&self.key(TOKEN_KEY))
            .filter(|t| !t.is_empty())
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.store.set(&self.key(TOKEN_KEY), token)
    }

    /// Remove the token, logging rather than failing on storage errors.
    ///
    /// Returns `false` only when no token was stored.
    pub fn clear_token(&self) -> bool {
        match self.store.remove(&self.key(TOKEN_KEY)) {
            Ok(removed) => removed,
            Err(e) => {
                warn!("Failed to clear stored token: {}", e);
                true
            }
        }
    }

    // ==================== Selected site ====================

    pub fn selected_site_id(&self) -> Option<String> {
        self.store.get(&self.key(SELECTED_SITE_KEY))
    }

    pub fn set_selected_site_id(&self, site_id: &str) -> Result<(), StorageError> {
        self.store.set(&self.key(SELECTED_SITE_KEY), site_id)
    }

    pub fn clear_selected_site_id(&self) {
        if let Err(e) = self.store.remove(&self.key(SELECTED_SITE_KEY)) {
            warn!("Failed to clear selected site: {}", e);
        }
    }

    // ==================== OAuth return path ====================

    pub fn set_return_path(&self, path: &str) -> Result<(), StorageError> {
        self.store.set(&self.key(RETURN_PATH_KEY), path)
    }

    /// Read and remove the saved return path
    pub fn take_return_path(&self) -> Option<String> {
        let key = self.key(RETURN_PATH_KEY);
        let path = self.store.get(&key)?;
        if let Err(e) = self.store.remove(&key) {
            warn!("Failed to clear return path: {}", e);
        }
        Some(path)
    }

    // ==================== UI preferences ====================

    /// Stored sort preference; `None` unless both halves are present and valid
    pub fn sort_preference(&self) -> Option<SortPreference> {
        let field = self.store.get(&self.key(SORT_FIELD_KEY))?;
        let direction = self
            .store
            .get(&self.key(SORT_DIRECTION_KEY))
            .and_then(|d| SortDirection::parse(&d))?;
        Some(SortPreference { field, direction })
    }

    pub fn set_sort_preference(&self, preference: &SortPreference) -> Result<(), StorageError> {
        self.store.set(&self.key(SORT_FIELD_KEY), &preference.field)?;
        self.store
            .set(&self.key(SORT_DIRECTION_KEY), preference.direction.as_str())
    }

    // ==================== Form drafts ====================

    /// Load a saved draft for `form`. Undecodable drafts are dropped.
    pub fn draft<T: DeserializeOwned>(&self, form: &str) -> Option<T> {
        let key = self.key(&format!("{}{}", DRAFT_KEY_PREFIX, form));
        let raw = self.store.get(&key)?;
        match serde_json::from_str(&raw) {
            Ok(draft) => Some(draft),
            Err(e) => {
                warn!("Discarding unreadable draft for {}: {}", form, e);
                self.discard_draft(form);
                None
            }
        }
    }

    pub fn save_draft<T: Serialize>(&self, form: &str, draft: &T) -> Result<(), StorageError> {
        let key = self.key(&format!("{}{}", DRAFT_KEY_PREFIX, form));
        let raw = serde_json::to_string(draft).map_err(|e| StorageError::Encode {
            key: key.clone(),
            message: e.to_string(),
        })?;
        self.store.set(&key, &raw)
    }

    pub fn discard_draft(&self, form: &str) {
        let key = self.key(&format!("{}{}", DRAFT_KEY_PREFIX, form));
        if let Err(e) = self.store.remove(&key) {
            warn!("Failed to discard draft for {}: {}", form, e);
        }
    }
}
