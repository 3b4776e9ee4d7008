// (c) 2025 Ross Younger

//! The generic aggregate serializer
//!
//! Rust has no runtime reflection, so aggregate types supply their member
//! table as data: one [`MemberDef`] per field, usually emitted by the
//! [`typepack_message!`](crate::typepack_message) macro. The
//! [`ObjectSerializer`] binds each member to its child serializer once at
//! build time and then drives the codec over the members in either
//! [shape](crate::SerializationMethod):
//!
//! * **Map** (default): `{ name: value, ... }`, tolerant of wire reordering
//!   and of unknown member names (which are skipped, so a peer may add
//!   members without breaking this end).
//! * **Array**: `[ value, ... ]` in declared index order, compact; a wire
//!   array with fewer entries than the type has members applies each
//!   missing trailing member's [`NilImplication`].

use std::sync::{Arc, Weak};

use super::{NilImplication, Packable, SerializationMethod, Serializer};
use crate::context::SerializationContext;
use crate::errors::{Error, Result};
use crate::wire::{Packer, Unpacker};

/// Declares one serializable member of an aggregate type.
///
/// Carries the wire name, the declared index (for array shape), the
/// nil-implication policy, and typed accessors for the field. Bound to a
/// child serializer when the owning [`ObjectSerializer`] is built.
pub struct MemberDef<T> {
    name: &'static str,
    index: usize,
    nil: NilImplication,
    binder: Box<dyn MemberBinder<T>>,
}

impl<T> std::fmt::Debug for MemberDef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberDef")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("nil", &self.nil)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> MemberDef<T> {
    /// Declares a member whose serializer is resolved through the context.
    #[must_use]
    pub fn new<F: Packable>(
        index: usize,
        name: &'static str,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> Self {
        Self {
            name,
            index,
            nil: NilImplication::MemberDefault,
            binder: Box::new(FieldBinder::<T, F> {
                get,
                set,
                serializer: None,
            }),
        }
    }

    /// Declares a member with an explicit serializer, overriding whatever
    /// the context would resolve (e.g. an
    /// [`EnumSerializer::with_method`](super::EnumSerializer::with_method)
    /// clone).
    #[must_use]
    pub fn with_serializer<F: Packable>(
        index: usize,
        name: &'static str,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
        serializer: Arc<dyn Serializer<Item = F>>,
    ) -> Self {
        Self {
            name,
            index,
            nil: NilImplication::MemberDefault,
            binder: Box::new(FieldBinder::<T, F> {
                get,
                set,
                serializer: Some(serializer),
            }),
        }
    }

    /// Sets the member's nil-implication policy.
    #[must_use]
    pub fn nil(mut self, nil: NilImplication) -> Self {
        self.nil = nil;
        self
    }
}

trait MemberBinder<T>: Send + Sync {
    fn bind(&self, context: &Arc<SerializationContext>) -> Result<Box<dyn MemberDriver<T>>>;
}

struct FieldBinder<T, F> {
    get: fn(&T) -> &F,
    set: fn(&mut T, F),
    serializer: Option<Arc<dyn Serializer<Item = F>>>,
}

impl<T: 'static, F: Packable> MemberBinder<T> for FieldBinder<T, F> {
    fn bind(&self, context: &Arc<SerializationContext>) -> Result<Box<dyn MemberDriver<T>>> {
        let serializer = match &self.serializer {
            Some(s) => s.clone(),
            None => context.get_serializer::<F>()?,
        };
        Ok(Box::new(FieldDriver {
            serializer,
            get: self.get,
            set: self.set,
        }))
    }
}

trait MemberDriver<T>: Send + Sync {
    fn pack(&self, packer: &mut Packer<'_>, owner: &T) -> Result<()>;
    fn unpack(&self, unpacker: &mut Unpacker<'_>, owner: &mut T) -> Result<()>;
    fn assign_nil(&self, owner: &mut T) -> bool;
    fn accepts_nil(&self) -> bool;
}

struct FieldDriver<T, F> {
    serializer: Arc<dyn Serializer<Item = F>>,
    get: fn(&T) -> &F,
    set: fn(&mut T, F),
}

impl<T, F: Send + Sync> MemberDriver<T> for FieldDriver<T, F> {
    fn pack(&self, packer: &mut Packer<'_>, owner: &T) -> Result<()> {
        self.serializer.pack_to(packer, (self.get)(owner))
    }

    fn unpack(&self, unpacker: &mut Unpacker<'_>, owner: &mut T) -> Result<()> {
        let value = self.serializer.unpack_from(unpacker)?;
        (self.set)(owner, value);
        Ok(())
    }

    fn assign_nil(&self, owner: &mut T) -> bool {
        match self.serializer.nil_value() {
            Some(nil) => {
                (self.set)(owner, nil);
                true
            }
            None => false,
        }
    }

    fn accepts_nil(&self) -> bool {
        self.serializer.nil_value().is_some()
    }
}

struct BoundMember<T> {
    name: &'static str,
    nil: NilImplication,
    driver: Box<dyn MemberDriver<T>>,
}

/// The serializer for an aggregate type, driven by its member table.
pub struct ObjectSerializer<T> {
    type_name: &'static str,
    method: SerializationMethod,
    constructor: fn() -> T,
    // Declaration order; map shape follows this.
    members: Vec<BoundMember<T>>,
    // Positions into `members`, sorted by declared index; array shape
    // follows this.
    array_order: Vec<usize>,
    context: Weak<SerializationContext>,
}

impl<T> std::fmt::Debug for ObjectSerializer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectSerializer")
            .field("type_name", &self.type_name)
            .field("method", &self.method)
            .field("members", &self.members.len())
            .finish_non_exhaustive()
    }
}

impl<T: Send + Sync + 'static> ObjectSerializer<T> {
    /// Builds the serializer, resolving each member's child serializer
    /// through `context`.
    ///
    /// `method` falls back to the context default. Passing no constructor
    /// fails with [`Error::NoDefaultConstructor`]. A member whose policy is
    /// [`NilImplication::Null`] but whose serializer rejects nil fails the
    /// build.
    pub fn build(
        context: &Arc<SerializationContext>,
        method: Option<SerializationMethod>,
        constructor: Option<fn() -> T>,
        defs: Vec<MemberDef<T>>,
    ) -> Result<Self> {
        let type_name = std::any::type_name::<T>();
        let Some(constructor) = constructor else {
            return Err(Error::NoDefaultConstructor(type_name));
        };
        let method = method.unwrap_or(context.options().default_serialization_method);
        let mut members = Vec::with_capacity(defs.len());
        let mut order: Vec<(usize, usize)> = Vec::with_capacity(defs.len());
        for (position, def) in defs.into_iter().enumerate() {
            let driver = def.binder.bind(context)?;
            if def.nil == NilImplication::Null && !driver.accepts_nil() {
                return Err(Error::NotSupported(format!(
                    "nil implication Null on non-nullable member {type_name}::{}",
                    def.name
                )));
            }
            order.push((def.index, position));
            members.push(BoundMember {
                name: def.name,
                nil: def.nil,
                driver,
            });
        }
        order.sort_by_key(|&(index, _)| index);
        if order.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(Error::NotSupported(format!(
                "duplicate member index on {type_name}"
            )));
        }
        tracing::debug!("built object serializer for {type_name} ({method} shape)");
        Ok(Self {
            type_name,
            method,
            constructor,
            members,
            array_order: order.into_iter().map(|(_, position)| position).collect(),
            context: Arc::downgrade(context),
        })
    }

    /// The owning context, if it is still alive.
    #[must_use]
    pub fn context(&self) -> Option<Arc<SerializationContext>> {
        self.context.upgrade()
    }
}

fn unpack_member<T>(
    unpacker: &mut Unpacker<'_>,
    member: &BoundMember<T>,
    owner: &mut T,
) -> Result<()> {
    if unpacker.last_is_nil() {
        return match member.nil {
            NilImplication::MemberDefault => Ok(()),
            NilImplication::Null => {
                // validated at build time
                let _ = member.driver.assign_nil(owner);
                Ok(())
            }
            NilImplication::Prohibit => Err(Error::MissingRequiredValue(member.name)),
        };
    }
    member.driver.unpack(unpacker, owner)
}

fn apply_missing<T>(member: &BoundMember<T>, owner: &mut T) -> Result<()> {
    match member.nil {
        NilImplication::MemberDefault => Ok(()),
        NilImplication::Null => {
            let _ = member.driver.assign_nil(owner);
            Ok(())
        }
        NilImplication::Prohibit => Err(Error::MissingRequiredValue(member.name)),
    }
}

impl<T: Send + Sync + 'static> Serializer for ObjectSerializer<T> {
    type Item = T;

    fn pack_core(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()> {
        match self.method {
            SerializationMethod::Map => {
                packer.pack_map_header(self.members.len())?;
                for member in &self.members {
                    packer.pack_str(member.name)?;
                    member.driver.pack(packer, value)?;
                }
            }
            SerializationMethod::Array => {
                packer.pack_array_header(self.members.len())?;
                for &position in &self.array_order {
                    self.members[position].driver.pack(packer, value)?;
                }
            }
        }
        Ok(())
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
        let mut object = (self.constructor)();
        if !unpacker.is_array_header() && !unpacker.is_map_header() {
            // Forgive a caller who did not pre-advance onto the value.
            if !unpacker.read()? {
                return Err(Error::EndOfStream);
            }
        }
        if unpacker.is_map_header() {
            let count = unpacker.items_count()?;
            for _ in 0..count {
                unpacker.move_to_next_entry()?;
                let name = unpacker.last_value()?.expect_str()?.get_string()?.to_owned();
                if let Some(found) = self.members.iter().position(|m| m.name == name) {
                    unpacker.move_to_next_entry()?;
                    unpack_member(unpacker, &self.members[found], &mut object)?;
                } else {
                    // Unknown member name: a schema addition on the peer.
                    unpacker.skip()?;
                }
            }
        } else if unpacker.is_array_header() {
            let count = unpacker.items_count()?;
            let mut consumed = 0usize;
            for &position in &self.array_order {
                let member = &self.members[position];
                if consumed < count {
                    unpacker.move_to_next_entry()?;
                    consumed += 1;
                    unpack_member(unpacker, member, &mut object)?;
                } else {
                    apply_missing(member, &mut object)?;
                }
            }
            for _ in consumed..count {
                unpacker.skip()?;
            }
        } else {
            return Err(Error::MessageTypeMismatch {
                expected: "array or map header",
                actual: unpacker.last_value().map_or("nothing", |v| v.type_name()),
            });
        }
        Ok(object)
    }
}

/// Declares the member table for an aggregate type and registers it with
/// the serializer machinery.
///
/// The type must already be declared, with `Default` for construction.
/// Each member line gives a declared index (for array shape), optional
/// nil-implication mode, the field, its type, and an optional wire-name
/// override:
///
/// ```rust,ignore
/// #[derive(Debug, Default, PartialEq)]
/// struct Widget {
///     id: u32,
///     label: String,
///     note: Option<String>,
/// }
/// typepack_message! {
///     Widget {
///         [0] id: u32,
///         [1, required] label: String => "Label",
///         [2, nullable] note: Option<String>,
///     }
/// }
/// ```
///
/// Modes are `required` ([`NilImplication::Prohibit`]), `nullable`
/// ([`NilImplication::Null`]) and `default` ([`NilImplication::MemberDefault`],
/// also the fallback when no mode is given). Prefix the member block with
/// `: map` or `: array` to pin the wire shape; otherwise the context
/// default applies.
#[macro_export]
macro_rules! typepack_message {
    ($ty:ident { $($body:tt)* }) => {
        $crate::typepack_message!(@impl $ty, ::std::option::Option::None, { $($body)* });
    };
    ($ty:ident : map { $($body:tt)* }) => {
        $crate::typepack_message!(@impl $ty,
            ::std::option::Option::Some($crate::SerializationMethod::Map), { $($body)* });
    };
    ($ty:ident : array { $($body:tt)* }) => {
        $crate::typepack_message!(@impl $ty,
            ::std::option::Option::Some($crate::SerializationMethod::Array), { $($body)* });
    };
    (@impl $ty:ident, $method:expr,
        { $( [$idx:literal $(, $mode:ident)?] $field:ident : $fty:ty $(=> $wire:literal)? ),* $(,)? }
    ) => {
        impl $crate::Packable for $ty {
            fn build_serializer(
                context: &::std::sync::Arc<$crate::SerializationContext>,
            ) -> $crate::Result<::std::sync::Arc<dyn $crate::Serializer<Item = Self>>> {
                let members = ::std::vec![
                    $(
                        $crate::MemberDef::<$ty>::new(
                            $idx,
                            $crate::typepack_message!(@name $field $(, $wire)?),
                            |owner: &$ty| &owner.$field,
                            |owner: &mut $ty, value: $fty| owner.$field = value,
                        )
                        .nil($crate::typepack_message!(@nil $($mode)?))
                    ),*
                ];
                ::std::result::Result::Ok(::std::sync::Arc::new(
                    $crate::ObjectSerializer::build(
                        context,
                        $method,
                        ::std::option::Option::Some(<$ty as ::std::default::Default>::default),
                        members,
                    )?,
                ))
            }
        }
    };
    (@name $field:ident) => { ::std::stringify!($field) };
    (@name $field:ident, $wire:literal) => { $wire };
    (@nil) => { $crate::NilImplication::MemberDefault };
    (@nil default) => { $crate::NilImplication::MemberDefault };
    (@nil nullable) => { $crate::NilImplication::Null };
    (@nil required) => { $crate::NilImplication::Prohibit };
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use crate::errors::Error;
    use crate::ser::{MemberDef, ObjectSerializer, SerializerExt as _};
    use crate::wire::CompatibilityOptions;
    use crate::{ContextOptions, SerializationContext, SerializationMethod};
    use assertables::assert_matches;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;

    fn classic_array_context() -> std::sync::Arc<SerializationContext> {
        SerializationContext::new(ContextOptions {
            default_serialization_method: SerializationMethod::Array,
            ..ContextOptions::default()
        })
    }

    fn pack_classic<T>(
        context: &std::sync::Arc<SerializationContext>,
        value: &T,
    ) -> Vec<u8>
    where
        T: crate::Packable,
    {
        let serializer = context.get_serializer::<T>().unwrap();
        let mut buf = Vec::new();
        serializer
            .pack_with_options(&mut buf, CompatibilityOptions::CLASSIC, value)
            .unwrap();
        buf
    }

    #[derive(Debug, Default, PartialEq)]
    struct ListHolder {
        val: Vec<Bytes>,
    }
    crate::typepack_message! {
        ListHolder {
            [0] val: Vec<Bytes> => "Val",
        }
    }

    #[test]
    fn map_shape_wire_form() {
        let context = SerializationContext::with_defaults();
        let value = ListHolder {
            val: vec![Bytes::from_static(&[0x41])],
        };
        let bytes = pack_classic(&context, &value);
        assert_eq!(bytes, [0x81, 0xa3, b'V', b'a', b'l', 0x91, 0xa1, 0x41]);
        let serializer = context.get_serializer::<ListHolder>().unwrap();
        assert_eq!(serializer.unpack_single_object(&bytes).unwrap(), value);
    }

    #[test]
    fn array_shape_wire_form() {
        let context = classic_array_context();
        let value = ListHolder {
            val: vec![Bytes::from_static(&[0x41])],
        };
        let bytes = pack_classic(&context, &value);
        assert_eq!(bytes, [0x91, 0x91, 0xa1, 0x41]);
        let serializer = context.get_serializer::<ListHolder>().unwrap();
        assert_eq!(serializer.unpack_single_object(&bytes).unwrap(), value);
    }

    #[derive(Debug, Default, PartialEq)]
    struct BlobHolder {
        val: Bytes,
    }
    crate::typepack_message! {
        BlobHolder: array {
            [0] val: Bytes => "Val",
        }
    }

    #[test]
    fn blob_field_in_both_dialects() {
        let context = SerializationContext::with_defaults();
        let value = BlobHolder {
            val: Bytes::from_static(&[0x41]),
        };
        assert_eq!(pack_classic(&context, &value), [0x91, 0xa1, 0x41]);

        let serializer = context.get_serializer::<BlobHolder>().unwrap();
        let modern = serializer.pack_single_object(&value).unwrap();
        assert_eq!(modern, [0x91, 0xc4, 0x01, 0x41]);
        assert_eq!(serializer.unpack_single_object(&modern).unwrap(), value);
    }

    #[derive(Debug, Default, PartialEq)]
    struct Nested {
        val: Option<Bytes>,
        child: Option<Box<Nested>>,
    }
    crate::typepack_message! {
        Nested: array {
            [0, nullable] val: Option<Bytes>,
            [1, nullable] child: Option<Box<Nested>>,
        }
    }

    #[test]
    fn nested_self_referential_round_trip() {
        let context = SerializationContext::with_defaults();
        let value = Nested {
            val: None,
            child: Some(Box::new(Nested {
                val: Some(Bytes::from_static(&[0x41])),
                child: None,
            })),
        };
        let bytes = pack_classic(&context, &value);
        assert_eq!(bytes, [0x92, 0xc0, 0x92, 0xa1, 0x41, 0xc0]);
        let serializer = context.get_serializer::<Nested>().unwrap();
        assert_eq!(serializer.unpack_single_object(&bytes).unwrap(), value);
    }

    #[derive(Debug, Default, PartialEq)]
    struct Trio {
        a: u8,
        b: Option<u8>,
        c: u8,
    }
    crate::typepack_message! {
        Trio {
            [0] a: u8,
            [1, nullable] b: Option<u8>,
            [2] c: u8,
        }
    }

    #[test]
    fn map_round_trip_survives_reordering() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Trio>().unwrap();
        // {"c": 3, "a": 1, "b": 2}: wire order differs from declaration
        let wire = [
            0x83u8, 0xa1, b'c', 0x03, 0xa1, b'a', 0x01, 0xa1, b'b', 0x02,
        ];
        assert_eq!(
            serializer.unpack_single_object(&wire).unwrap(),
            Trio {
                a: 1,
                b: Some(2),
                c: 3
            }
        );
    }

    #[test]
    fn unknown_member_names_are_skipped() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Trio>().unwrap();
        // {"a": 1, "zzz": [1, 2], "c": 3}: "zzz" is a schema addition
        let wire = [
            0x83u8, 0xa1, b'a', 0x01, 0xa3, b'z', b'z', b'z', 0x92, 0x01, 0x02, 0xa1, b'c', 0x03,
        ];
        assert_eq!(
            serializer.unpack_single_object(&wire).unwrap(),
            Trio {
                a: 1,
                b: None,
                c: 3
            }
        );
    }

    #[test]
    fn map_entries_running_out_early_fail() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Trio>().unwrap();
        // declares 3 entries, carries 1
        let wire = [0x83u8, 0xa1, b'a', 0x01];
        assert_matches!(
            serializer.unpack_single_object(&wire),
            Err(Error::EndOfStream)
        );
    }

    #[test]
    fn nil_member_applies_policy_in_map_shape() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Trio>().unwrap();
        // {"a": nil, "b": nil, "c": 3}: a is MemberDefault, b is Null
        let wire = [
            0x83u8, 0xa1, b'a', 0xc0, 0xa1, b'b', 0xc0, 0xa1, b'c', 0x03,
        ];
        assert_eq!(
            serializer.unpack_single_object(&wire).unwrap(),
            Trio {
                a: 0,
                b: None,
                c: 3
            }
        );
    }

    #[derive(Debug, Default, PartialEq)]
    struct Tolerant {
        a: u8,
        b: Option<u8>,
        c: u8,
    }
    crate::typepack_message! {
        Tolerant: array {
            [0] a: u8,
            [1, nullable] b: Option<u8>,
            [2] c: u8,
        }
    }

    #[test]
    fn array_shape_schema_tolerance() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Tolerant>().unwrap();
        // only the first member on the wire: b takes Null, c its default
        assert_eq!(
            serializer.unpack_single_object(&[0x91, 0x07]).unwrap(),
            Tolerant {
                a: 7,
                b: None,
                c: 0
            }
        );
    }

    #[derive(Debug, Default, PartialEq)]
    struct Strict {
        a: u8,
        b: u8,
    }
    crate::typepack_message! {
        Strict: array {
            [0] a: u8,
            [1, required] b: u8,
        }
    }

    #[test]
    fn required_member_missing_fails() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Strict>().unwrap();
        assert_matches!(
            serializer.unpack_single_object(&[0x91, 0x07]),
            Err(Error::MissingRequiredValue("b"))
        );
    }

    #[test]
    fn required_member_nil_fails() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Strict>().unwrap();
        assert_matches!(
            serializer.unpack_single_object(&[0x92, 0x07, 0xc0]),
            Err(Error::MissingRequiredValue("b"))
        );
    }

    #[test]
    fn array_shape_extra_entries_are_skipped() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Strict>().unwrap();
        assert_eq!(
            serializer
                .unpack_single_object(&[0x93, 0x01, 0x02, 0x63])
                .unwrap(),
            Strict { a: 1, b: 2 }
        );
    }

    #[derive(Debug, Default, PartialEq)]
    struct Reversed {
        first: u8,
        second: u8,
    }
    crate::typepack_message! {
        Reversed: array {
            [1] first: u8,
            [0] second: u8,
        }
    }

    #[test]
    fn declared_index_orders_the_array_shape() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Reversed>().unwrap();
        let value = Reversed {
            first: 0x0a,
            second: 0x0b,
        };
        let bytes = serializer.pack_single_object(&value).unwrap();
        assert_eq!(bytes, [0x92, 0x0b, 0x0a]);
        assert_eq!(serializer.unpack_single_object(&bytes).unwrap(), value);
    }

    #[derive(Debug, Default, PartialEq)]
    struct BadNullable {
        x: u8,
    }
    crate::typepack_message! {
        BadNullable {
            [0, nullable] x: u8,
        }
    }

    #[test]
    fn null_policy_on_non_nullable_member_fails_the_build() {
        let context = SerializationContext::with_defaults();
        assert_matches!(
            context.get_serializer::<BadNullable>(),
            Err(Error::NotSupported(_))
        );
    }

    #[test]
    fn missing_constructor_fails_the_build() {
        let context = SerializationContext::with_defaults();
        let result = ObjectSerializer::<Trio>::build(&context, None, None, vec![]);
        assert_matches!(result, Err(Error::NoDefaultConstructor(_)));
    }

    #[test]
    fn duplicate_member_index_fails_the_build() {
        let context = SerializationContext::with_defaults();
        let defs = vec![
            MemberDef::<Trio>::new(0, "a", |o| &o.a, |o, v| o.a = v),
            MemberDef::<Trio>::new(0, "c", |o| &o.c, |o, v| o.c = v),
        ];
        let default_fn: fn() -> Trio = Trio::default;
        let result = ObjectSerializer::build(&context, None, Some(default_fn), defs);
        assert_matches!(result, Err(Error::NotSupported(_)));
    }

    #[test]
    fn forgiving_of_a_not_yet_advanced_unpacker() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Trio>().unwrap();
        let wire = serializer
            .pack_single_object(&Trio {
                a: 1,
                b: None,
                c: 2,
            })
            .unwrap();
        let mut source = &wire[..];
        let mut unpacker = crate::Unpacker::new(&mut source);
        // no read() first
        let decoded = serializer.unpack_from(&mut unpacker).unwrap();
        assert_eq!(
            decoded,
            Trio {
                a: 1,
                b: None,
                c: 2
            }
        );
    }
}
