// (c) 2025 Ross Younger

//! # Serialization contexts
//!
//! A [`SerializationContext`] is a configuration scope plus a serializer
//! registry. Asking it for a type's serializer builds one on first
//! request, resolving member serializers recursively through the same
//! context, and interns it for the context's lifetime. Options are set
//! when the context is created; serializers capture what they need at
//! build time, and later changes never rebuild.
//!
//! One process-wide default context exists for callers who do not need
//! separate scopes; it can be replaced atomically with
//! [`SerializationContext::set_default_context`].

mod build;
mod repository;

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use build::{BuildTable, Claim, LazySerializer};
use repository::SerializerRepository;

use crate::errors::{Error, Result};
use crate::generation::GenerationOptions;
use crate::ser::{
    AnySerializer, EnumSerializationMethod, NilImplication, Packable, SerializationMethod,
    Serializer,
};
use crate::wire::CompatibilityOptions;

/// Configuration for a [`SerializationContext`].
///
/// Set the fields before constructing the context; serializers capture
/// these values when they are built, and later changes never rebuild.
#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// Wire-dialect switches suggested to packers created on this
    /// context's behalf.
    pub compatibility: CompatibilityOptions,
    /// Default wire shape for aggregate types.
    pub default_serialization_method: SerializationMethod,
    /// Default representation for enums.
    pub default_enum_method: EnumSerializationMethod,
    /// What a nil collection item means. Default: [`NilImplication::Null`].
    pub collection_item_nil: NilImplication,
    /// What a nil map key means. Default: [`NilImplication::Prohibit`].
    pub map_key_nil: NilImplication,
    /// What a nil or missing tuple item means. Default:
    /// [`NilImplication::Null`].
    pub tuple_item_nil: NilImplication,
    /// Code-generation backend configuration.
    pub generation: GenerationOptions,
    /// Redirections for erased lookups: an abstract key type resolves to
    /// the serializer of its nominated concrete type. See
    /// [`ContextOptions::set_default_concrete_type`].
    pub default_concrete_types: HashMap<TypeId, TypeId>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            compatibility: CompatibilityOptions::default(),
            default_serialization_method: SerializationMethod::default(),
            default_enum_method: EnumSerializationMethod::default(),
            collection_item_nil: NilImplication::Null,
            map_key_nil: NilImplication::Prohibit,
            tuple_item_nil: NilImplication::Null,
            generation: GenerationOptions::default(),
            default_concrete_types: HashMap::new(),
        }
    }
}

impl ContextOptions {
    /// Nominates `Concrete` as the type to serialize when an erased lookup
    /// asks for `Abstract` (a trait object or other stand-in that cannot
    /// be built directly).
    pub fn set_default_concrete_type<Abstract: ?Sized + 'static, Concrete: 'static>(&mut self) {
        let _ = self
            .default_concrete_types
            .insert(TypeId::of::<Abstract>(), TypeId::of::<Concrete>());
    }
}

/// Configuration and serializer registry scope.
///
/// Create one with [`new`](Self::new) or [`with_defaults`](Self::with_defaults)
/// (both return `Arc`, which the build protocol needs), or share the
/// process-wide [`default_context`](Self::default_context).
///
/// All operations are thread-safe; concurrent first requests for the same
/// type collapse to a single registered serializer.
pub struct SerializationContext {
    options: ContextOptions,
    repository: SerializerRepository,
    builds: BuildTable,
}

impl std::fmt::Debug for SerializationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializationContext")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

static DEFAULT_CONTEXT: OnceLock<RwLock<Arc<SerializationContext>>> = OnceLock::new();

fn default_slot() -> &'static RwLock<Arc<SerializationContext>> {
    DEFAULT_CONTEXT.get_or_init(|| RwLock::new(SerializationContext::with_defaults()))
}

impl SerializationContext {
    /// Creates a context with the given options.
    #[must_use]
    pub fn new(options: ContextOptions) -> Arc<Self> {
        Arc::new(Self {
            options,
            repository: SerializerRepository::new(),
            builds: BuildTable::new(),
        })
    }

    /// Creates a context with default options.
    #[must_use]
    pub fn with_defaults() -> Arc<Self> {
        Self::new(ContextOptions::default())
    }

    /// The options this context was created with.
    #[must_use]
    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Creates a packer over `sink` honouring this context's
    /// [compatibility options](ContextOptions::compatibility).
    #[must_use]
    pub fn packer<'a>(&self, sink: &'a mut dyn std::io::Write) -> crate::Packer<'a> {
        crate::Packer::with_options(sink, self.options.compatibility)
    }

    /// The process-wide default context.
    #[must_use]
    pub fn default_context() -> Arc<SerializationContext> {
        default_slot()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Atomically replaces the process-wide default context.
    ///
    /// Serializers already obtained from the previous default keep
    /// working; they hold no strong reference back to it.
    pub fn set_default_context(context: Arc<SerializationContext>) {
        tracing::debug!("replacing the process-wide default serialization context");
        *default_slot().write().unwrap_or_else(PoisonError::into_inner) = context;
    }

    /// The serializer for `T`, building and interning it on first request.
    ///
    /// Concurrent first requests collapse to one instance. A re-entrant
    /// request during `T`'s own build (a self-referential type) returns a
    /// lazy delegate that resolves once the build has published.
    pub fn get_serializer<T: Packable>(
        self: &Arc<Self>,
    ) -> Result<Arc<dyn Serializer<Item = T>>> {
        let type_id = TypeId::of::<T>();
        loop {
            if let Some(existing) = self.repository.get::<T>() {
                return Ok(existing);
            }
            match self.builds.claim(type_id) {
                Claim::Reentrant => {
                    tracing::trace!(
                        "re-entrant request for {}; delegating lazily",
                        std::any::type_name::<T>()
                    );
                    return Ok(Arc::new(LazySerializer::<T>::new(self)));
                }
                Claim::Contended(lock) => {
                    tracing::trace!(
                        "waiting for a concurrent build of {}",
                        std::any::type_name::<T>()
                    );
                    lock.wait();
                }
                Claim::Primary(lock) => {
                    let built = self.build_uncached::<T>();
                    let result = match built {
                        Ok(serializer) => Ok(self.repository.register::<T>(serializer)),
                        Err(e) => Err(e),
                    };
                    self.builds.release(type_id, &lock);
                    return result;
                }
            }
        }
    }

    fn build_uncached<T: Packable>(self: &Arc<Self>) -> Result<Arc<dyn Serializer<Item = T>>> {
        let flavor = self.options.generation.flavor;
        for factory in &self.options.generation.factories {
            if factory.flavor() != flavor {
                continue;
            }
            if let Some(built) = factory.try_build(self, TypeId::of::<T>()) {
                if let Some(serializer) = built.typed::<T>() {
                    tracing::debug!(
                        "serializer for {} supplied by a generation backend",
                        std::any::type_name::<T>()
                    );
                    return Ok(serializer);
                }
                tracing::debug!(
                    "generation backend offered {} where {} was requested; ignoring",
                    built.item_type_name(),
                    std::any::type_name::<T>()
                );
            }
        }
        tracing::debug!("building serializer for {}", std::any::type_name::<T>());
        T::build_serializer(self)
    }

    /// Publishes a pre-built serializer for `T`, returning the winner.
    ///
    /// The first registration for a type wins; a pre-built serializer
    /// must therefore be registered before the type is first requested.
    pub fn register<T: Send + Sync + 'static>(
        &self,
        serializer: Arc<dyn Serializer<Item = T>>,
    ) -> Arc<dyn Serializer<Item = T>> {
        self.repository.register::<T>(serializer)
    }

    /// The type-erased serializer registered for `type_id`.
    ///
    /// Follows the [default concrete-type
    /// map](ContextOptions::set_default_concrete_type) for nominated
    /// abstract keys; a mapping whose concrete serializer has not been
    /// built yet fails with [`Error::AbstractType`]. Erased lookup never
    /// builds; only types already requested (or
    /// [registered](Self::register)) are visible here.
    pub fn get_registered(&self, type_id: TypeId) -> Result<Arc<dyn AnySerializer>> {
        if let Some(serializer) = self.repository.get_erased(type_id) {
            return Ok(serializer);
        }
        if let Some(concrete) = self.options.default_concrete_types.get(&type_id) {
            return self.repository.get_erased(*concrete).ok_or_else(|| {
                Error::AbstractType(format!(
                    "{type_id:?}: its default concrete type has not been built"
                ))
            });
        }
        Err(Error::NotRegistered(format!("{type_id:?}")))
    }
}

/// The serializer for `T` from the process-wide default context.
pub fn get_serializer<T: Packable>() -> Result<Arc<dyn Serializer<Item = T>>> {
    SerializationContext::default_context().get_serializer::<T>()
}
