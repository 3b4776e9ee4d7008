// (c) 2025 Ross Younger

//! Serializers for scalar types

use std::sync::Arc;

use super::{Packable, Serializer};
use crate::context::SerializationContext;
use crate::errors::{Error, Result};
use crate::wire::{Packer, Unpacker};

macro_rules! scalar_serializer {
    ($ser:ident, $ty:ty, |$pk:ident, $v:ident| $pack:expr, |$val:ident| $unpack:expr) => {
        #[doc = concat!("Serializer for `", stringify!($ty), "`.")]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ser;

        impl Serializer for $ser {
            type Item = $ty;

            fn pack_core(&self, $pk: &mut Packer<'_>, $v: &Self::Item) -> Result<()> {
                $pack
            }

            fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
                let $val = unpacker.last_value()?;
                $unpack
            }
        }

        impl Packable for $ty {
            fn build_serializer(
                _context: &Arc<SerializationContext>,
            ) -> Result<Arc<dyn Serializer<Item = Self>>> {
                Ok(Arc::new($ser))
            }
        }
    };
}

scalar_serializer!(BoolSerializer, bool, |pk, v| pk.pack_bool(*v), |val| val
    .expect_bool());
scalar_serializer!(U8Serializer, u8, |pk, v| pk.pack_uint(u64::from(*v)), |val| val
    .expect_u8());
scalar_serializer!(U16Serializer, u16, |pk, v| pk.pack_uint(u64::from(*v)), |val| val
    .expect_u16());
scalar_serializer!(U32Serializer, u32, |pk, v| pk.pack_uint(u64::from(*v)), |val| val
    .expect_u32());
scalar_serializer!(U64Serializer, u64, |pk, v| pk.pack_uint(*v), |val| val.expect_u64());
scalar_serializer!(I8Serializer, i8, |pk, v| pk.pack_int(i64::from(*v)), |val| val
    .expect_i8());
scalar_serializer!(I16Serializer, i16, |pk, v| pk.pack_int(i64::from(*v)), |val| val
    .expect_i16());
scalar_serializer!(I32Serializer, i32, |pk, v| pk.pack_int(i64::from(*v)), |val| val
    .expect_i32());
scalar_serializer!(I64Serializer, i64, |pk, v| pk.pack_int(*v), |val| val.expect_i64());
scalar_serializer!(F32Serializer, f32, |pk, v| pk.pack_float32(*v), |val| val
    .expect_f32());
scalar_serializer!(F64Serializer, f64, |pk, v| pk.pack_float64(*v), |val| val
    .expect_f64());

/// Serializer for [`String`].
///
/// Reading requires strict UTF-8; a raw payload that fails to decode
/// surfaces [`Error::DecodingFailure`]. Use
/// [`MsgPackString`](crate::MsgPackString) to accept arbitrary raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerializer;

impl Serializer for StringSerializer {
    type Item = String;

    fn pack_core(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()> {
        packer.pack_str(value)
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
        let value = unpacker.last_value()?;
        match value {
            crate::Value::String(s) => Ok(s.get_string()?.to_owned()),
            crate::Value::Binary(b) => {
                let s = std::str::from_utf8(b).map_err(Error::DecodingFailure)?;
                Ok(s.to_owned())
            }
            other => Err(Error::MessageTypeMismatch {
                expected: "string",
                actual: other.type_name(),
            }),
        }
    }
}

impl Packable for String {
    fn build_serializer(
        _context: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn Serializer<Item = Self>>> {
        Ok(Arc::new(StringSerializer))
    }
}

/// Serializer for [`char`], packed as a one-character string.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharSerializer;

impl Serializer for CharSerializer {
    type Item = char;

    fn pack_core(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()> {
        let mut buf = [0u8; 4];
        packer.pack_str(value.encode_utf8(&mut buf))
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
        let s = unpacker.last_value()?.expect_str()?.get_string()?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::MessageTypeMismatch {
                expected: "a one-character string",
                actual: "string",
            }),
        }
    }
}

impl Packable for char {
    fn build_serializer(
        _context: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn Serializer<Item = Self>>> {
        Ok(Arc::new(CharSerializer))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use crate::SerializationContext;
    use crate::errors::Error;
    use crate::ser::SerializerExt as _;
    use assertables::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn round_trip<T>(value: T) -> T
    where
        T: crate::Packable + std::fmt::Debug,
    {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<T>().unwrap();
        let bytes = serializer.pack_single_object(&value).unwrap();
        serializer.unpack_single_object(&bytes).unwrap()
    }

    #[test]
    fn scalar_round_trips() {
        assert!(round_trip(true));
        assert_eq!(round_trip(0u8), 0);
        assert_eq!(round_trip(300u16), 300);
        assert_eq!(round_trip(70_000u32), 70_000);
        assert_eq!(round_trip(u64::MAX), u64::MAX);
        assert_eq!(round_trip(-5i8), -5);
        assert_eq!(round_trip(-300i16), -300);
        assert_eq!(round_trip(-70_000i32), -70_000);
        assert_eq!(round_trip(i64::MIN), i64::MIN);
        assert_eq!(round_trip('q'), 'q');
        assert_eq!(round_trip("hello".to_string()), "hello");
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn float_round_trips() {
        assert_eq!(round_trip(1.5f32), 1.5);
        assert_eq!(round_trip(-2.5f64), -2.5);
    }

    #[rstest]
    #[case(0u64, vec![0x00])]
    #[case(300u64, vec![0xcd, 0x01, 0x2c])]
    fn narrowest_wire_form(#[case] value: u64, #[case] expected: Vec<u8>) {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<u64>().unwrap();
        assert_eq!(serializer.pack_single_object(&value).unwrap(), expected);
    }

    #[test]
    fn nil_rejected_for_scalars() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<u32>().unwrap();
        assert_matches!(
            serializer.unpack_single_object(&[0xc0]),
            Err(Error::ValueCannotBeNull(_))
        );
    }

    #[test]
    fn type_mismatch_propagates() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<u32>().unwrap();
        assert_matches!(
            serializer.unpack_single_object(&[0xa1, b'x']),
            Err(Error::MessageTypeMismatch { .. })
        );
    }

    #[test]
    fn string_from_raw_bytes() {
        let context = SerializationContext::with_defaults();
        let serializer = context.get_serializer::<String>().unwrap();
        // bin8 "ok", e.g. written by a peer using the bin family for text
        assert_eq!(
            serializer
                .unpack_single_object(&[0xc4, 0x02, b'o', b'k'])
                .unwrap(),
            "ok"
        );
        // invalid UTF-8 under a string header
        assert_matches!(
            serializer.unpack_single_object(&[0xa2, 0xff, 0xfe]),
            Err(Error::DecodingFailure(_))
        );
    }
}
