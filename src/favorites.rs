//! Favorites
//!
//! Event ids the user has starred, kept in the same durable storage as the cart.

use thiserror::Error;
use tracing::warn;

use crate::storage::{KeyValueStorage, StorageError};

/// Storage key holding the favourite event ids.
pub const FAVORITES_STORAGE_KEY: &str = "favorites";

/// Errors raised while persisting favourites.
#[derive(Debug, Error)]
pub enum FavoritesError {
    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The favourites could not be serialized.
    #[error("failed to serialize favorites: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Insertion-ordered set of favourite event ids.
#[derive(Debug)]
pub struct FavoritesStore<S: KeyValueStorage> {
    storage: S,
    ids: Vec<String>,
}

impl<S: KeyValueStorage> FavoritesStore<S> {
    /// Restore favourites from `storage`, starting empty on unreadable data.
    pub fn load(storage: S) -> Self {
        let ids = match storage.get(FAVORITES_STORAGE_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|error| {
                warn!(%error, "discarding malformed stored favorites");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(%error, "failed to read stored favorites");
                Vec::new()
            }
        };

        let mut store = Self {
            storage,
            ids: Vec::with_capacity(ids.len()),
        };

        for id in ids {
            if !store.is_favorite(&id) {
                store.ids.push(id);
            }
        }

        store
    }

    /// Flip the favourite state of `event_id`, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns a [`FavoritesError`] if the favourites cannot be persisted.
    pub fn toggle(&mut self, event_id: &str) -> Result<bool, FavoritesError> {
        let now_favorite = match self.ids.iter().position(|id| id == event_id) {
            Some(idx) => {
                self.ids.remove(idx);
                false
            }
            None => {
                self.ids.push(event_id.to_string());
                true
            }
        };

        self.persist()?;

        Ok(now_favorite)
    }

    /// Check if `event_id` is a favourite.
    pub fn is_favorite(&self, event_id: &str) -> bool {
        self.ids.iter().any(|id| id == event_id)
    }

    /// Favourite event ids, oldest first.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Give back the storage backend.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) -> Result<(), FavoritesError> {
        if self.ids.is_empty() {
            self.storage.remove(FAVORITES_STORAGE_KEY)?;
        } else {
            let raw = serde_json::to_string(&self.ids)?;
            self.storage.set(FAVORITES_STORAGE_KEY, &raw)?;
        }

        Ok(())
    }
}
