// (c) 2025 Ross Younger

//! Serializers for nullable and indirection wrappers

use std::sync::Arc;

use super::{Packable, Serializer};
use crate::context::SerializationContext;
use crate::errors::Result;
use crate::wire::{Packer, Unpacker};

/// Serializer for `Option<T>`: the nullable wrapper.
///
/// `None` packs as nil; a nil token unpacks as `None`. This is the type
/// that gives the nil-implication machinery something to assign.
pub struct OptionSerializer<T> {
    inner: Arc<dyn Serializer<Item = T>>,
}

impl<T> std::fmt::Debug for OptionSerializer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionSerializer").finish_non_exhaustive()
    }
}

impl<T> OptionSerializer<T> {
    /// Creates an option serializer over the given item serializer.
    #[must_use]
    pub fn new(inner: Arc<dyn Serializer<Item = T>>) -> Self {
        Self { inner }
    }
}

impl<T: Send + Sync> Serializer for OptionSerializer<T> {
    type Item = Option<T>;

    fn pack_core(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()> {
        match value {
            Some(inner) => self.inner.pack_to(packer, inner),
            None => packer.pack_nil(),
        }
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
        self.inner.unpack_from(unpacker).map(Some)
    }

    fn nil_value(&self) -> Option<Self::Item> {
        Some(None)
    }
}

impl<T: Packable> Packable for Option<T> {
    fn build_serializer(
        context: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn Serializer<Item = Self>>> {
        Ok(Arc::new(OptionSerializer::new(
            context.get_serializer::<T>()?,
        )))
    }
}

/// Serializer for `Box<T>`, transparent on the wire.
///
/// The indirection is what lets self-referential aggregates (a tree node
/// holding `Option<Box<Self>>`) have a finite layout.
pub struct BoxSerializer<T> {
    inner: Arc<dyn Serializer<Item = T>>,
}

impl<T> std::fmt::Debug for BoxSerializer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxSerializer").finish_non_exhaustive()
    }
}

impl<T> BoxSerializer<T> {
    /// Creates a box serializer over the given item serializer.
    #[must_use]
    pub fn new(inner: Arc<dyn Serializer<Item = T>>) -> Self {
        Self { inner }
    }
}

impl<T: Send + Sync> Serializer for BoxSerializer<T> {
    type Item = Box<T>;

    fn pack_core(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()> {
        self.inner.pack_to(packer, value)
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
        self.inner.unpack_from(unpacker).map(Box::new)
    }

    fn nil_value(&self) -> Option<Self::Item> {
        self.inner.nil_value().map(Box::new)
    }
}

impl<T: Packable> Packable for Box<T> {
    fn build_serializer(
        context: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn Serializer<Item = Self>>> {
        Ok(Arc::new(BoxSerializer::new(context.get_serializer::<T>()?)))
    }
}
