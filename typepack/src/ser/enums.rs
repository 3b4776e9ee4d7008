// (c) 2025 Ross Younger

//! The enum serializer
//!
//! Enums travel either by variant name or by underlying integer value;
//! see [`EnumSerializationMethod`]. Reading auto-detects from the wire
//! token, so a stream written with either method deserializes regardless
//! of how this end is configured.

use std::marker::PhantomData;
use std::str::FromStr;

use super::{EnumSerializationMethod, Serializer};
use crate::errors::{Error, Result};
use crate::value::Value;
use crate::wire::{Packer, Unpacker};

/// Serializer for a unit enum `E`.
///
/// The required bounds mirror what the usual derives provide:
/// `strum::AsRefStr` and `strum::EnumString` for the name path, and
/// `Into<u64> + TryFrom<u64>` (typically by deriving
/// [`int_enum::IntEnum`](https://docs.rs/int-enum) on a `#[repr(u64)]`
/// enum) for the underlying-value path.
///
/// Name lookups are case-sensitive. An unmatched name or value fails
/// [`Error::UnknownEnumMember`]; a wire token that cannot be an underlying
/// value at all (a negative integer, say) fails
/// [`Error::EnumUnderlyingTypeMismatch`].
pub struct EnumSerializer<E> {
    method: EnumSerializationMethod,
    _marker: PhantomData<fn() -> E>,
}

impl<E> std::fmt::Debug for EnumSerializer<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnumSerializer")
            .field("method", &self.method)
            .field("enum", &std::any::type_name::<E>())
            .finish()
    }
}

impl<E> Clone for EnumSerializer<E> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            _marker: PhantomData,
        }
    }
}

impl<E> Copy for EnumSerializer<E> {}

impl<E> EnumSerializer<E> {
    /// Creates an enum serializer using the given method.
    #[must_use]
    pub fn new(method: EnumSerializationMethod) -> Self {
        Self {
            method,
            _marker: PhantomData,
        }
    }

    /// The configured serialization method.
    #[must_use]
    pub fn method(&self) -> EnumSerializationMethod {
        self.method
    }

    /// A shallow clone with a different method, for per-use overrides.
    ///
    /// The canonical instance interned in the repository is unaffected.
    #[must_use]
    pub fn with_method(&self, method: EnumSerializationMethod) -> Self {
        Self::new(method)
    }
}

impl<E> Serializer for EnumSerializer<E>
where
    E: Copy + AsRef<str> + FromStr + Into<u64> + TryFrom<u64> + Send + Sync + 'static,
{
    type Item = E;

    fn pack_core(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()> {
        match self.method {
            EnumSerializationMethod::ByName => packer.pack_str(value.as_ref()),
            EnumSerializationMethod::ByUnderlyingValue => packer.pack_uint((*value).into()),
        }
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
        match unpacker.last_value()? {
            Value::String(s) => {
                let name = s.get_string()?;
                E::from_str(name).map_err(|_| Error::UnknownEnumMember {
                    enum_type: std::any::type_name::<E>(),
                    name: name.to_owned(),
                })
            }
            Value::Unsigned(u) => E::try_from(*u).map_err(|_| Error::UnknownEnumMember {
                enum_type: std::any::type_name::<E>(),
                name: u.to_string(),
            }),
            Value::Signed(i) => {
                let u = u64::try_from(*i).map_err(|_| Error::EnumUnderlyingTypeMismatch {
                    enum_type: std::any::type_name::<E>(),
                    actual: "negative integer",
                })?;
                E::try_from(u).map_err(|_| Error::UnknownEnumMember {
                    enum_type: std::any::type_name::<E>(),
                    name: u.to_string(),
                })
            }
            other => Err(Error::MessageTypeMismatch {
                expected: "string or integer",
                actual: other.type_name(),
            }),
        }
    }
}

/// Registers an enum with the serializer machinery.
///
/// The enum needs `Copy`, `strum::AsRefStr`, `strum::EnumString` and
/// `Into<u64> + TryFrom<u64>` (e.g. via `int_enum::IntEnum` on
/// `#[repr(u64)]`). An optional second argument pins the serialization
/// method for the type; without it the context default applies.
///
/// ```rust,ignore
/// typepack_enum!(Colour);                        // context default
/// typepack_enum!(Weekday, by_name);
/// typepack_enum!(Status, by_underlying_value);
/// ```
#[macro_export]
macro_rules! typepack_enum {
    ($ty:ty) => {
        $crate::typepack_enum!(@impl $ty, ::std::option::Option::None);
    };
    ($ty:ty, by_name) => {
        $crate::typepack_enum!(@impl $ty,
            ::std::option::Option::Some($crate::EnumSerializationMethod::ByName));
    };
    ($ty:ty, by_underlying_value) => {
        $crate::typepack_enum!(@impl $ty,
            ::std::option::Option::Some($crate::EnumSerializationMethod::ByUnderlyingValue));
    };
    (@impl $ty:ty, $override:expr) => {
        impl $crate::Packable for $ty {
            fn build_serializer(
                context: &::std::sync::Arc<$crate::SerializationContext>,
            ) -> $crate::Result<::std::sync::Arc<dyn $crate::Serializer<Item = Self>>> {
                let method = $override.unwrap_or(context.options().default_enum_method);
                ::std::result::Result::Ok(::std::sync::Arc::new(
                    $crate::EnumSerializer::<$ty>::new(method),
                ))
            }
        }
    };
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use crate::errors::Error;
    use crate::ser::{EnumSerializationMethod, EnumSerializer, SerializerExt as _};
    use crate::{ContextOptions, SerializationContext};
    use assertables::assert_matches;
    use int_enum::IntEnum;
    use pretty_assertions::assert_eq;

    #[derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        IntEnum,
        strum_macros::AsRefStr,
        strum_macros::EnumString,
    )]
    #[repr(u64)]
    enum Colour {
        Red = 0,
        Green = 1,
        Blue = 2,
    }
    crate::typepack_enum!(Colour);

    #[derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        IntEnum,
        strum_macros::AsRefStr,
        strum_macros::EnumString,
    )]
    #[repr(u64)]
    enum Numbered {
        One = 1,
        Two = 2,
    }
    crate::typepack_enum!(Numbered, by_underlying_value);

    #[test]
    fn by_name_wire_form() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Colour>().unwrap();
        let bytes = serializer.pack_single_object(&Colour::Blue).unwrap();
        assert_eq!(bytes, [0xa4, b'B', b'l', b'u', b'e']);
        assert_eq!(serializer.unpack_single_object(&bytes).unwrap(), Colour::Blue);
    }

    #[test]
    fn by_underlying_value_wire_form() {
        let serializer = EnumSerializer::<Colour>::new(EnumSerializationMethod::ByUnderlyingValue);
        let bytes = serializer.pack_single_object(&Colour::Blue).unwrap();
        assert_eq!(bytes, [0x02]);
        assert_eq!(serializer.unpack_single_object(&bytes).unwrap(), Colour::Blue);
    }

    #[test]
    fn type_level_override() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Numbered>().unwrap();
        assert_eq!(
            serializer.pack_single_object(&Numbered::Two).unwrap(),
            [0x02]
        );
    }

    #[test]
    fn context_default_method_applies() {
        let options = ContextOptions {
            default_enum_method: EnumSerializationMethod::ByUnderlyingValue,
            ..ContextOptions::default()
        };
        let context = SerializationContext::new(options);
        let serializer = context.get_serializer::<Colour>().unwrap();
        assert_eq!(
            serializer.pack_single_object(&Colour::Green).unwrap(),
            [0x01]
        );
    }

    #[test]
    fn reading_auto_detects_the_wire_method() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Colour>().unwrap();
        // configured ByName, but the wire carries an integer
        assert_eq!(serializer.unpack_single_object(&[0x02]).unwrap(), Colour::Blue);
        // and vice versa
        let serializer = EnumSerializer::<Colour>::new(EnumSerializationMethod::ByUnderlyingValue);
        assert_eq!(
            serializer
                .unpack_single_object(&[0xa3, b'R', b'e', b'd'])
                .unwrap(),
            Colour::Red
        );
    }

    #[test]
    fn unknown_name_and_value() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Colour>().unwrap();
        assert_matches!(
            serializer.unpack_single_object(&[0xa4, b'b', b'l', b'u', b'e']),
            Err(Error::UnknownEnumMember { .. })
        );
        assert_matches!(
            serializer.unpack_single_object(&[0x63]),
            Err(Error::UnknownEnumMember { .. })
        );
    }

    #[test]
    fn negative_wire_value_is_a_width_mismatch() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Colour>().unwrap();
        assert_matches!(
            serializer.unpack_single_object(&[0xff]),
            Err(Error::EnumUnderlyingTypeMismatch { .. })
        );
    }

    #[test]
    fn non_enum_token() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<Colour>().unwrap();
        assert_matches!(
            serializer.unpack_single_object(&[0xc3]),
            Err(Error::MessageTypeMismatch { .. })
        );
    }

    #[test]
    fn with_method_is_a_shallow_clone() {
        let context = SerializationContext::with_defaults();
        let _canonical = context.get_serializer::<Colour>().unwrap();
        let derived = EnumSerializer::<Colour>::new(EnumSerializationMethod::ByName)
            .with_method(EnumSerializationMethod::ByUnderlyingValue);
        assert_eq!(derived.method(), EnumSerializationMethod::ByUnderlyingValue);
        // the canonical registration still packs by name
        let canonical = context.get_serializer::<Colour>().unwrap();
        assert_eq!(
            canonical.pack_single_object(&Colour::Red).unwrap(),
            [0xa3, b'R', b'e', b'd']
        );
    }
}
