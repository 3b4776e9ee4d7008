// (c) 2025 Ross Younger

//! Serializers for sequences, sets and maps

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{NilImplication, Packable, Serializer};
use crate::context::SerializationContext;
use crate::errors::{Error, Result};
use crate::wire::{Packer, Unpacker};

/// A homogeneous collection that can be serialized as a MessagePack array.
///
/// Implemented for the std sequence and set types; implement it to teach
/// the library about your own containers.
pub trait Sequence: Default + Send + Sync + 'static {
    /// The element type.
    type Item;
    /// Number of elements currently held.
    fn length(&self) -> usize;
    /// Appends (or inserts) one element.
    fn add(&mut self, item: Self::Item);
    /// Iterates the elements in serialization order.
    fn items(&self) -> impl Iterator<Item = &Self::Item>;
}

impl<T: Send + Sync + 'static> Sequence for Vec<T> {
    type Item = T;
    fn length(&self) -> usize {
        self.len()
    }
    fn add(&mut self, item: T) {
        self.push(item);
    }
    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }
}

impl<T: Send + Sync + 'static> Sequence for VecDeque<T> {
    type Item = T;
    fn length(&self) -> usize {
        self.len()
    }
    fn add(&mut self, item: T) {
        self.push_back(item);
    }
    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }
}

impl<T: Eq + Hash + Send + Sync + 'static> Sequence for HashSet<T> {
    type Item = T;
    fn length(&self) -> usize {
        self.len()
    }
    fn add(&mut self, item: T) {
        let _ = self.insert(item);
    }
    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }
}

impl<T: Ord + Send + Sync + 'static> Sequence for BTreeSet<T> {
    type Item = T;
    fn length(&self) -> usize {
        self.len()
    }
    fn add(&mut self, item: T) {
        let _ = self.insert(item);
    }
    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }
}

/// A key/value collection that can be serialized as a MessagePack map.
pub trait MapCollection: Default + Send + Sync + 'static {
    /// The key type.
    type Key;
    /// The value type.
    type Value;
    /// Number of entries currently held.
    fn length(&self) -> usize;
    /// Inserts one entry.
    fn put(&mut self, key: Self::Key, value: Self::Value);
    /// Iterates the entries in serialization order.
    fn entries(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)>;
}

impl<K: Eq + Hash + Send + Sync + 'static, V: Send + Sync + 'static> MapCollection
    for HashMap<K, V>
{
    type Key = K;
    type Value = V;
    fn length(&self) -> usize {
        self.len()
    }
    fn put(&mut self, key: K, value: V) {
        let _ = self.insert(key, value);
    }
    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }
}

impl<K: Ord + Send + Sync + 'static, V: Send + Sync + 'static> MapCollection for BTreeMap<K, V> {
    type Key = K;
    type Value = V;
    fn length(&self) -> usize {
        self.len()
    }
    fn put(&mut self, key: K, value: V) {
        let _ = self.insert(key, value);
    }
    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }
}

/// Serializer for [`Sequence`] collections.
///
/// The item nil policy is captured from the context at build time;
/// see [`NilImplication`].
pub struct SequenceSerializer<C: Sequence> {
    items: Arc<dyn Serializer<Item = C::Item>>,
    item_nil: NilImplication,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Sequence> std::fmt::Debug for SequenceSerializer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceSerializer")
            .field("item_nil", &self.item_nil)
            .finish_non_exhaustive()
    }
}

impl<C: Sequence> SequenceSerializer<C> {
    /// Creates a sequence serializer with the given item serializer and
    /// item nil policy.
    #[must_use]
    pub fn new(items: Arc<dyn Serializer<Item = C::Item>>, item_nil: NilImplication) -> Self {
        Self {
            items,
            item_nil,
            _marker: PhantomData,
        }
    }

    fn fill(&self, unpacker: &mut Unpacker<'_>, into: &mut C) -> Result<()> {
        if !unpacker.is_array_header() {
            let actual = if unpacker.is_map_header() {
                "map header"
            } else {
                unpacker.last_value().map_or("nothing", |v| v.type_name())
            };
            return Err(Error::MessageTypeMismatch {
                expected: "array header",
                actual,
            });
        }
        let count = unpacker.items_count()?;
        for _ in 0..count {
            unpacker.move_to_next_entry()?;
            if unpacker.last_is_nil() && self.item_nil == NilImplication::Prohibit {
                return Err(Error::MissingRequiredValue("collection item"));
            }
            into.add(self.items.unpack_from(unpacker)?);
        }
        Ok(())
    }
}

impl<C: Sequence> Serializer for SequenceSerializer<C> {
    type Item = C;

    fn pack_core(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()> {
        packer.pack_array_header(value.length())?;
        for item in value.items() {
            self.items.pack_to(packer, item)?;
        }
        Ok(())
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
        let mut out = C::default();
        self.fill(unpacker, &mut out)?;
        Ok(out)
    }

    fn unpack_into(&self, unpacker: &mut Unpacker<'_>, existing: &mut Self::Item) -> Result<()> {
        if unpacker.last_is_nil() {
            return Ok(());
        }
        self.fill(unpacker, existing)
    }
}

/// Serializer for [`MapCollection`] collections.
pub struct MapSerializer<M: MapCollection> {
    keys: Arc<dyn Serializer<Item = M::Key>>,
    values: Arc<dyn Serializer<Item = M::Value>>,
    key_nil: NilImplication,
    value_nil: NilImplication,
    _marker: PhantomData<fn() -> M>,
}

impl<M: MapCollection> std::fmt::Debug for MapSerializer<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSerializer")
            .field("key_nil", &self.key_nil)
            .field("value_nil", &self.value_nil)
            .finish_non_exhaustive()
    }
}

impl<M: MapCollection> MapSerializer<M> {
    /// Creates a map serializer with the given entry serializers and nil
    /// policies.
    #[must_use]
    pub fn new(
        keys: Arc<dyn Serializer<Item = M::Key>>,
        values: Arc<dyn Serializer<Item = M::Value>>,
        key_nil: NilImplication,
        value_nil: NilImplication,
    ) -> Self {
        Self {
            keys,
            values,
            key_nil,
            value_nil,
            _marker: PhantomData,
        }
    }

    fn fill(&self, unpacker: &mut Unpacker<'_>, into: &mut M) -> Result<()> {
        if !unpacker.is_map_header() {
            let actual = if unpacker.is_array_header() {
                "array header"
            } else {
                unpacker.last_value().map_or("nothing", |v| v.type_name())
            };
            return Err(Error::MessageTypeMismatch {
                expected: "map header",
                actual,
            });
        }
        let count = unpacker.items_count()?;
        for _ in 0..count {
            unpacker.move_to_next_entry()?;
            if unpacker.last_is_nil() && self.key_nil == NilImplication::Prohibit {
                return Err(Error::MissingRequiredValue("map key"));
            }
            let key = self.keys.unpack_from(unpacker)?;
            unpacker.move_to_next_entry()?;
            if unpacker.last_is_nil() && self.value_nil == NilImplication::Prohibit {
                return Err(Error::MissingRequiredValue("map value"));
            }
            let value = self.values.unpack_from(unpacker)?;
            into.put(key, value);
        }
        Ok(())
    }
}

impl<M: MapCollection> Serializer for MapSerializer<M> {
    type Item = M;

    fn pack_core(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()> {
        packer.pack_map_header(value.length())?;
        for (k, v) in value.entries() {
            self.keys.pack_to(packer, k)?;
            self.values.pack_to(packer, v)?;
        }
        Ok(())
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
        let mut out = M::default();
        self.fill(unpacker, &mut out)?;
        Ok(out)
    }

    fn unpack_into(&self, unpacker: &mut Unpacker<'_>, existing: &mut Self::Item) -> Result<()> {
        if unpacker.last_is_nil() {
            return Ok(());
        }
        self.fill(unpacker, existing)
    }
}

macro_rules! sequence_packable {
    ($coll:ident, $($bound:path),*) => {
        impl<T: Packable $(+ $bound)*> Packable for $coll<T> {
            fn build_serializer(
                context: &Arc<SerializationContext>,
            ) -> Result<Arc<dyn Serializer<Item = Self>>> {
                Ok(Arc::new(SequenceSerializer::<Self>::new(
                    context.get_serializer::<T>()?,
                    context.options().collection_item_nil,
                )))
            }
        }
    };
}

sequence_packable!(Vec,);
sequence_packable!(VecDeque,);
sequence_packable!(HashSet, Eq, Hash);
sequence_packable!(BTreeSet, Ord);

macro_rules! map_packable {
    ($coll:ident, $($bound:path),*) => {
        impl<K: Packable $(+ $bound)*, V: Packable> Packable for $coll<K, V> {
            fn build_serializer(
                context: &Arc<SerializationContext>,
            ) -> Result<Arc<dyn Serializer<Item = Self>>> {
                Ok(Arc::new(MapSerializer::<Self>::new(
                    context.get_serializer::<K>()?,
                    context.get_serializer::<V>()?,
                    context.options().map_key_nil,
                    context.options().collection_item_nil,
                )))
            }
        }
    };
}

map_packable!(HashMap, Eq, Hash);
map_packable!(BTreeMap, Ord);
