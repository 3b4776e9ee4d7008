// (c) 2025 Ross Younger

//! # The serializer layer
//!
//! A [`Serializer`] is an encode/decode strategy for one Rust type,
//! expressed against the logical operations of the [codec](crate::wire);
//! it never touches the byte grammar directly. Serializers are obtained
//! from a [`SerializationContext`](crate::SerializationContext), which
//! builds one per type on first request and interns it for its lifetime.
//!
//! Built-in serializers cover scalars, strings, blobs, collections,
//! tuples, [`Option`], enums (see [`EnumSerializer`]) and the dynamic
//! [`Value`](crate::Value). Aggregate types join in through the member
//! table emitted by [`typepack_message!`](crate::typepack_message) (or a
//! hand-built [`ObjectSerializer`]).
//!
//! # Positioning protocol
//!
//! `pack_to` writes exactly one value. `unpack_from` expects its unpacker
//! already advanced onto the value ([`Unpacker::read`] has been called) and
//! consumes exactly that value, containers included. The convenience
//! methods on [`SerializerExt`] take care of the initial advance.

mod collections;
mod dynamic;
mod enums;
pub(crate) mod object;
mod primitives;
mod tuples;
mod wrappers;

use std::any::{Any, TypeId};
use std::sync::Arc;

pub use collections::{MapCollection, MapSerializer, Sequence, SequenceSerializer};
pub use dynamic::{BytesSerializer, MsgPackStringSerializer, ValueSerializer};
pub use enums::EnumSerializer;
pub use object::{MemberDef, ObjectSerializer};
pub use primitives::{
    BoolSerializer, CharSerializer, F32Serializer, F64Serializer, I8Serializer, I16Serializer,
    I32Serializer, I64Serializer, StringSerializer, U8Serializer, U16Serializer, U32Serializer,
    U64Serializer,
};
pub use wrappers::{BoxSerializer, OptionSerializer};

use crate::context::SerializationContext;
use crate::errors::{Error, Result};
use crate::wire::{CompatibilityOptions, Packer, Unpacker};

/// How an aggregate type is laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum SerializationMethod {
    /// A map of member name to member value (tolerant of reordering and
    /// schema additions)
    #[default]
    Map,
    /// An array of member values in declared index order (compact)
    Array,
}

/// How an enum value is represented on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum EnumSerializationMethod {
    /// By the variant's declared name
    #[default]
    ByName,
    /// By the variant's underlying integer value
    ByUnderlyingValue,
}

/// What a missing or nil wire entry means for a typed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum NilImplication {
    /// Leave the slot at its constructed default
    #[default]
    MemberDefault,
    /// Assign the slot's nil value; only valid for slots that admit nil
    Null,
    /// Fail with [`Error::MissingRequiredValue`]
    Prohibit,
}

/// An encode/decode strategy for values of one type.
///
/// Implementors provide [`pack_core`](Self::pack_core) and
/// [`unpack_core`](Self::unpack_core); the provided
/// [`pack_to`](Self::pack_to) / [`unpack_from`](Self::unpack_from) wrap
/// them with nil handling and are what callers invoke. Generated or
/// hand-written serializers may override the outer pair when they need
/// different nil behaviour.
///
/// A serializer registered with a context is never mutated afterwards; all
/// methods take `&self` and implementations must be thread-safe.
pub trait Serializer: Send + Sync {
    /// The type this serializer handles.
    type Item;

    /// Writes `value`, without any nil pre-handling.
    fn pack_core(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()>;

    /// Reads a value, without any nil pre-handling. The unpacker is
    /// positioned on a non-nil token.
    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item>;

    /// Writes `value`.
    fn pack_to(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()> {
        self.pack_core(packer, value)
    }

    /// Reads a value. The unpacker must already be advanced onto it.
    ///
    /// A nil token yields [`nil_value`](Self::nil_value), or fails with
    /// [`Error::ValueCannotBeNull`] for types that do not admit nil.
    fn unpack_from(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
        if unpacker.last_is_nil() {
            return self
                .nil_value()
                .ok_or_else(|| Error::ValueCannotBeNull(std::any::type_name::<Self::Item>()));
        }
        self.unpack_core(unpacker)
    }

    /// Reads into an existing collection without replacing its identity.
    ///
    /// A nil token is a no-op. Non-collection serializers fail with
    /// [`Error::NotSupported`].
    fn unpack_into(&self, unpacker: &mut Unpacker<'_>, existing: &mut Self::Item) -> Result<()> {
        let _ = (unpacker, existing);
        Err(Error::NotSupported(format!(
            "unpack_into is only available for collections, not {}",
            std::any::type_name::<Self::Item>()
        )))
    }

    /// The value a nil token deserializes to, for types that admit nil.
    ///
    /// `None` (the default) means the type rejects nil. This doubles as
    /// the "admits nil" bit consulted by nil-implication policies.
    fn nil_value(&self) -> Option<Self::Item> {
        None
    }
}

/// Convenience surface provided for every [`Serializer`].
///
/// These helpers own the packer/unpacker lifecycle: `pack` writes one
/// framed-free value to a sink, `unpack` performs the initial
/// [`read`](Unpacker::read) and decodes one value from a source.
pub trait SerializerExt: Serializer {
    /// Packs `value` into `sink` using the default wire dialect.
    fn pack<W: std::io::Write>(&self, sink: &mut W, value: &Self::Item) -> Result<()> {
        let mut packer = Packer::new(sink);
        self.pack_to(&mut packer, value)
    }

    /// Packs `value` into `sink` with explicit compatibility options.
    fn pack_with_options<W: std::io::Write>(
        &self,
        sink: &mut W,
        options: CompatibilityOptions,
        value: &Self::Item,
    ) -> Result<()> {
        let mut packer = Packer::with_options(sink, options);
        self.pack_to(&mut packer, value)
    }

    /// Unpacks one value from `source`.
    fn unpack<R: std::io::Read>(&self, source: &mut R) -> Result<Self::Item> {
        let mut unpacker = Unpacker::new(source);
        if !unpacker.read()? {
            return Err(Error::EndOfStream);
        }
        self.unpack_from(&mut unpacker)
    }

    /// Packs `value` into a fresh byte vector.
    fn pack_single_object(&self, value: &Self::Item) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.pack(&mut buf, value)?;
        Ok(buf)
    }

    /// Unpacks one value from a byte slice.
    fn unpack_single_object(&self, bytes: &[u8]) -> Result<Self::Item> {
        let mut cursor = std::io::Cursor::new(bytes);
        self.unpack(&mut cursor)
    }
}

impl<S: Serializer + ?Sized> SerializerExt for S {}

/// A type that knows how to build its own serializer.
///
/// This is the compile-time counterpart of runtime member discovery: the
/// built-in impls cover scalars, strings, collections, tuples, wrappers
/// and [`Value`](crate::Value); [`typepack_message!`](crate::typepack_message)
/// and [`typepack_enum!`](crate::typepack_enum) emit impls for user types.
///
/// `build_serializer` is invoked at most once per type per context (under
/// the context's build protocol) and must not have side effects beyond
/// resolving member serializers through the given context.
pub trait Packable: Sized + Send + Sync + 'static {
    /// Builds the serializer for this type against the given context.
    fn build_serializer(context: &Arc<SerializationContext>)
    -> Result<Arc<dyn Serializer<Item = Self>>>;
}

/// A type-erased serializer handle, as stored in the repository.
///
/// Erased handles let callers who only hold a [`TypeId`] drive a
/// serializer; the value travels as [`Any`].
pub trait AnySerializer: Send + Sync {
    /// The [`TypeId`] of the item type this serializer handles.
    fn item_type(&self) -> TypeId;
    /// The name of the item type, for diagnostics.
    fn item_type_name(&self) -> &'static str;
    /// As [`Serializer::pack_to`]; fails with
    /// [`Error::MessageTypeMismatch`] if `value` is not the item type.
    fn pack_any(&self, packer: &mut Packer<'_>, value: &dyn Any) -> Result<()>;
    /// As [`Serializer::unpack_from`].
    fn unpack_any(&self, unpacker: &mut Unpacker<'_>) -> Result<Box<dyn Any + Send>>;
}

/// Adapter from a typed serializer to [`AnySerializer`].
pub(crate) struct Erased<T>(pub(crate) Arc<dyn Serializer<Item = T>>);

impl<T: Send + Sync + 'static> AnySerializer for Erased<T> {
    fn item_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn item_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn pack_any(&self, packer: &mut Packer<'_>, value: &dyn Any) -> Result<()> {
        let value = value
            .downcast_ref::<T>()
            .ok_or_else(|| Error::MessageTypeMismatch {
                expected: std::any::type_name::<T>(),
                actual: "a different runtime type",
            })?;
        self.0.pack_to(packer, value)
    }

    fn unpack_any(&self, unpacker: &mut Unpacker<'_>) -> Result<Box<dyn Any + Send>> {
        Ok(Box::new(self.0.unpack_from(unpacker)?))
    }
}
