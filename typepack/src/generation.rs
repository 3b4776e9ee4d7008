// (c) 2025 Ross Younger

//! The code-generation backend interface
//!
//! A generation backend is an external factory of pre-built serializers:
//! hand-written, emitted by a build script, or loaded from a precompiled
//! crate. The core treats backends as opaque: their only obligations are
//! the [`Serializer`] contract and being side-effect-free when asked
//! twice. The context picks among backends with a [`GenerationFlavor`]
//! switch; the choice is orthogonal to wire behaviour.

use std::any::TypeId;
use std::sync::Arc;

use crate::context::SerializationContext;
use crate::ser::{AnySerializer, Erased, Serializer};

/// Which family of serializer builders a context prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
#[non_exhaustive]
pub enum GenerationFlavor {
    /// The member-table path built into this crate
    #[default]
    Reflective,
    /// Pre-built serializers supplied by registered factories
    Precompiled,
}

/// A serializer plus its type identity, as produced by a factory and as
/// stored in the repository.
pub struct BuiltSerializer {
    type_id: TypeId,
    type_name: &'static str,
    typed: Box<dyn std::any::Any + Send + Sync>,
    erased: Arc<dyn AnySerializer>,
}

impl std::fmt::Debug for BuiltSerializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltSerializer")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl BuiltSerializer {
    /// Wraps a typed serializer together with its erased handle.
    #[must_use]
    pub fn new<T: Send + Sync + 'static>(serializer: Arc<dyn Serializer<Item = T>>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            typed: Box::new(serializer.clone()),
            erased: Arc::new(Erased(serializer)),
        }
    }

    /// The [`TypeId`] of the item type.
    #[must_use]
    pub fn item_type(&self) -> TypeId {
        self.type_id
    }

    /// The name of the item type, for diagnostics.
    #[must_use]
    pub fn item_type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn typed<T: 'static>(&self) -> Option<Arc<dyn Serializer<Item = T>>> {
        self.typed
            .downcast_ref::<Arc<dyn Serializer<Item = T>>>()
            .cloned()
    }

    pub(crate) fn erased(&self) -> Arc<dyn AnySerializer> {
        self.erased.clone()
    }
}

/// An opaque factory of pre-built serializers, keyed by type.
///
/// `try_build` is consulted during the context's build protocol for every
/// type the repository does not yet hold. Returning `None` passes the type
/// on to the next factory (and ultimately to the built-in path). A second
/// call for the same type must return an equivalent result with no
/// additional side effects.
pub trait SerializerFactory: Send + Sync {
    /// Which flavor switch selects this factory.
    fn flavor(&self) -> GenerationFlavor;

    /// Builds a serializer for `type_id`, if this factory covers it.
    fn try_build(
        &self,
        context: &Arc<SerializationContext>,
        type_id: TypeId,
    ) -> Option<BuiltSerializer>;
}

/// Generation configuration carried by a context.
#[derive(Clone, Default)]
pub struct GenerationOptions {
    /// Which factory flavor the context consults.
    pub flavor: GenerationFlavor,
    /// Registered factories, consulted in order.
    pub factories: Vec<Arc<dyn SerializerFactory>>,
}

impl std::fmt::Debug for GenerationOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationOptions")
            .field("flavor", &self.flavor)
            .field("factories", &self.factories.len())
            .finish()
    }
}
