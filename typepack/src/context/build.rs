// (c) 2025 Ross Younger

//! The re-entrant, concurrent-safe build protocol
//!
//! The context keeps one [`BuildLock`] per type with an in-flight build.
//! The thread that creates the lock is the *primary builder*: it
//! constructs the serializer, publishes it, removes the lock and releases
//! waiters. A request for the same type from the primary builder's own
//! thread (a self-referential member) is answered with a
//! [`LazySerializer`] so the construction cycle breaks without deadlock;
//! requests from other threads wait and then re-query the repository.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, OnceLock, PoisonError, Weak};
use std::thread::ThreadId;

use super::SerializationContext;
use crate::errors::{Error, Result};
use crate::ser::{Packable, Serializer};
use crate::wire::{Packer, Unpacker};

pub(crate) struct BuildTable {
    locks: Mutex<HashMap<TypeId, Arc<BuildLock>>>,
}

pub(crate) struct BuildLock {
    owner: ThreadId,
    done: Mutex<bool>,
    finished: Condvar,
}

pub(crate) enum Claim {
    /// This thread created the lock and must build and publish.
    Primary(Arc<BuildLock>),
    /// This thread already holds the lock further up its own call stack.
    Reentrant,
    /// Another thread is building; wait and re-query.
    Contended(Arc<BuildLock>),
}

impl BuildTable {
    pub(crate) fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn claim(&self, type_id: TypeId) -> Claim {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        match locks.entry(type_id) {
            std::collections::hash_map::Entry::Occupied(entry) => {
                let lock = entry.get();
                if lock.owner == std::thread::current().id() {
                    Claim::Reentrant
                } else {
                    Claim::Contended(lock.clone())
                }
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                let lock = Arc::new(BuildLock {
                    owner: std::thread::current().id(),
                    done: Mutex::new(false),
                    finished: Condvar::new(),
                });
                let _ = slot.insert(lock.clone());
                Claim::Primary(lock)
            }
        }
    }

    /// Removes the lock and releases waiters. Only the primary builder
    /// calls this, so latecomers and the primary agree on ownership.
    pub(crate) fn release(&self, type_id: TypeId, lock: &Arc<BuildLock>) {
        let _ = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&type_id);
        let mut done = lock.done.lock().unwrap_or_else(PoisonError::into_inner);
        *done = true;
        lock.finished.notify_all();
    }
}

impl BuildLock {
    pub(crate) fn wait(&self) {
        let mut done = self.done.lock().unwrap_or_else(PoisonError::into_inner);
        while !*done {
            done = self
                .finished
                .wait(done)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// A delegating serializer that resolves the real one on first use.
///
/// Handed out for re-entrant requests during a type's own build. By the
/// time any operation runs, the primary build has published the real
/// serializer; the first operation resolves and caches it through the
/// (weak) context link.
pub(crate) struct LazySerializer<T: Packable> {
    context: Weak<SerializationContext>,
    resolved: OnceLock<Arc<dyn Serializer<Item = T>>>,
}

impl<T: Packable> LazySerializer<T> {
    pub(crate) fn new(context: &Arc<SerializationContext>) -> Self {
        Self {
            context: Arc::downgrade(context),
            resolved: OnceLock::new(),
        }
    }

    fn resolve(&self) -> Result<Arc<dyn Serializer<Item = T>>> {
        if let Some(serializer) = self.resolved.get() {
            return Ok(serializer.clone());
        }
        let Some(context) = self.context.upgrade() else {
            return Err(Error::NotRegistered(format!(
                "{}: owning context has been dropped",
                std::any::type_name::<T>()
            )));
        };
        tracing::trace!("lazily resolving serializer for {}", std::any::type_name::<T>());
        let serializer = context.get_serializer::<T>()?;
        Ok(self.resolved.get_or_init(|| serializer).clone())
    }
}

impl<T: Packable> Serializer for LazySerializer<T> {
    type Item = T;

    fn pack_core(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()> {
        self.resolve()?.pack_core(packer, value)
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
        self.resolve()?.unpack_core(unpacker)
    }

    fn pack_to(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()> {
        self.resolve()?.pack_to(packer, value)
    }

    fn unpack_from(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
        self.resolve()?.unpack_from(unpacker)
    }

    fn unpack_into(&self, unpacker: &mut Unpacker<'_>, existing: &mut Self::Item) -> Result<()> {
        self.resolve()?.unpack_into(unpacker, existing)
    }

    // Never resolves: a delegate only ever stands in for an aggregate
    // type, which rejects nil; resolving here can recurse into the
    // in-flight build that created this delegate.
    fn nil_value(&self) -> Option<Self::Item> {
        None
    }
}
