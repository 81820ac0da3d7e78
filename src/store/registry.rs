use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::view_state::ViewStateStore;
use crate::types::Entity;

/// Scoped owner of the per-entity view-state stores.
///
/// One registry lives inside each session; stores are created with defaults the
/// first time a feature asks for them, and nothing is shared between registries.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    stores: Mutex<HashMap<Entity, Arc<ViewStateStore>>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the store for an entity
    pub fn store(&self, entity: Entity) -> Arc<ViewStateStore> {
        let mut stores = self.stores.lock().unwrap_or_else(PoisonError::into_inner);
        stores
            .entry(entity)
            .or_insert_with(|| Arc::new(ViewStateStore::new(entity)))
            .clone()
    }

    /// Existing store, without creating one
    pub fn get(&self, entity: Entity) -> Option<Arc<ViewStateStore>> {
        let stores = self.stores.lock().unwrap_or_else(PoisonError::into_inner);
        stores.get(&entity).cloned()
    }

    pub fn reset_all(&self) {
        let stores = self.stores.lock().unwrap_or_else(PoisonError::into_inner);
        for store in stores.values() {
            store.reset();
        }
    }
}
