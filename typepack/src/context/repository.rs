// (c) 2025 Ross Younger

//! The type-keyed serializer store

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::generation::BuiltSerializer;
use crate::ser::{AnySerializer, Serializer};

/// Mapping of item type to its published serializer.
///
/// Many concurrent readers, single-writer registration; the first
/// registration for a type wins and is never replaced or mutated.
pub(crate) struct SerializerRepository {
    entries: RwLock<HashMap<TypeId, BuiltSerializer>>,
}

impl SerializerRepository {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn get<T: 'static>(&self) -> Option<Arc<dyn Serializer<Item = T>>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .and_then(BuiltSerializer::typed::<T>)
    }

    pub(crate) fn get_erased(&self, type_id: TypeId) -> Option<Arc<dyn AnySerializer>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .map(BuiltSerializer::erased)
    }

    /// Publishes a serializer for `T`, returning the winner: the existing
    /// entry if a concurrent registration got there first.
    pub(crate) fn register<T: Send + Sync + 'static>(
        &self,
        serializer: Arc<dyn Serializer<Item = T>>,
    ) -> Arc<dyn Serializer<Item = T>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.entry(TypeId::of::<T>()) {
            std::collections::hash_map::Entry::Occupied(existing) => existing
                .get()
                .typed::<T>()
                .unwrap_or(serializer),
            std::collections::hash_map::Entry::Vacant(slot) => {
                tracing::trace!("registered serializer for {}", std::any::type_name::<T>());
                let _ = slot.insert(BuiltSerializer::new(serializer.clone()));
                serializer
            }
        }
    }
}
