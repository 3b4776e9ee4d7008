// (c) 2025 Ross Younger

//! The dynamic tagged value type
//!
//! [`Value`] is the escape hatch for callers who do not know their schema
//! statically: anything the codec can read becomes a `Value`, and any
//! `Value` can be packed back out. The variant records which wire family a
//! value was read from, so a round trip re-emits the narrowest encoding
//! compatible with the value.

mod string;

use std::fmt::Write as _;

pub use string::{BinaryKind, MsgPackString};

use crate::errors::{Error, Result};

/// A dynamic MessagePack value.
///
/// # Example
///
/// ```rust
/// use typepack::Value;
///
/// let v = Value::Array(vec![Value::from(1u8), Value::from("two")]);
/// assert!(v.is_array());
/// assert_eq!(v.to_string(), r#"[1, "two"]"#);
///
/// // Numeric equality crosses the signed/unsigned families:
/// assert_eq!(Value::Unsigned(5), Value::Signed(5));
/// ```
#[derive(Debug, Clone, strum_macros::EnumIs)]
#[non_exhaustive]
pub enum Value {
    /// Nil
    Nil,
    /// True or false
    Boolean(bool),
    /// An integer read from (or destined for) the unsigned wire family
    Unsigned(u64),
    /// An integer read from (or destined for) the signed wire family
    Signed(i64),
    /// IEEE 754 single precision
    Float32(f32),
    /// IEEE 754 double precision
    Float64(f64),
    /// A string-family payload (not necessarily valid UTF-8)
    String(MsgPackString),
    /// A bin-family payload
    Binary(Vec<u8>),
    /// An array of values
    Array(Vec<Value>),
    /// A map; entries are kept in wire order
    Map(Vec<(Value, Value)>),
    /// An extension value: application type code plus payload
    Extension(i8, Vec<u8>),
}

// Direct constructors ======================================================

macro_rules! from_types {
    ($var:ident, $($t:ty),+) => {$(
        impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::$var(value.into())
            }
        }
    )+}
}

from_types!(Unsigned, u64, u32, u16, u8);
from_types!(Signed, i64, i32, i16, i8);
from_types!(Boolean, bool);
from_types!(Float32, f32);
from_types!(Float64, f64);
from_types!(String, MsgPackString, String);
from_types!(Binary, Vec<u8>);
from_types!(Array, Vec<Value>);
from_types!(Map, Vec<(Value, Value)>);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(MsgPackString::from(value))
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Binary(value.to_vec())
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Nil
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Value::from)
    }
}

// Referencing and extraction ===============================================

macro_rules! as_value_fn {
    ($fname:ident, $vartype:ident, $inner:ty) => {
        paste::paste! {
        impl Value {
            /// Extract the inner data, if the value is of that type.
            /// (If not, the value is destroyed!)
            #[must_use]
            pub fn [<into_ $fname>](self) -> Option<$inner> {
                if let Value::$vartype(d) = self { Some(d) } else { None }
            }
            /// Obtain a reference to the inner data, if the value is of that type.
            #[must_use]
            pub fn [<as_ $fname _ref>](&self) -> Option<&$inner> {
                if let Value::$vartype(d) = self { Some(d) } else { None }
            }
        }
        }
    };
}

as_value_fn!(bool, Boolean, bool);
as_value_fn!(unsigned, Unsigned, u64);
as_value_fn!(signed, Signed, i64);
as_value_fn!(string, String, MsgPackString);
as_value_fn!(binary, Binary, Vec<u8>);
as_value_fn!(array, Array, Vec<Value>);
as_value_fn!(map, Map, Vec<(Value, Value)>);

// Typed reads ==============================================================

macro_rules! expect_narrow {
    ($via:ident, $($fname:ident => $ty:ty),+) => {$(
        paste::paste! {
        impl Value {
            #[doc = concat!("The value as `", stringify!($ty), "`, if the token was an integer in range.")]
            pub fn [<expect_ $fname>](&self) -> Result<$ty> {
                let wide = self.$via()?;
                <$ty>::try_from(wide).map_err(|_| Error::MessageTypeMismatch {
                    expected: stringify!($ty),
                    actual: self.type_name(),
                })
            }
        }
        }
    )+};
}

expect_narrow!(expect_u64, u8 => u8, u16 => u16, u32 => u32);
expect_narrow!(expect_i64, i8 => i8, i16 => i16, i32 => i32);

impl Value {
    /// A short description of the wire family this value was read from.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Unsigned(_) => "unsigned integer",
            Value::Signed(_) => "signed integer",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Extension(..) => "extension",
        }
    }

    fn mismatch(&self, expected: &'static str) -> Error {
        Error::MessageTypeMismatch {
            expected,
            actual: self.type_name(),
        }
    }

    /// The value as a boolean.
    pub fn expect_bool(&self) -> Result<bool> {
        if let Value::Boolean(b) = self {
            Ok(*b)
        } else {
            Err(self.mismatch("boolean"))
        }
    }

    /// The value as `u64`. Accepts a non-negative signed token.
    pub fn expect_u64(&self) -> Result<u64> {
        match self {
            Value::Unsigned(u) => Ok(*u),
            Value::Signed(i) => u64::try_from(*i).map_err(|_| self.mismatch("u64")),
            _ => Err(self.mismatch("u64")),
        }
    }

    /// The value as `i64`. Accepts an unsigned token within range.
    pub fn expect_i64(&self) -> Result<i64> {
        match self {
            Value::Signed(i) => Ok(*i),
            Value::Unsigned(u) => i64::try_from(*u).map_err(|_| self.mismatch("i64")),
            _ => Err(self.mismatch("i64")),
        }
    }

    /// The value as `f32`.
    pub fn expect_f32(&self) -> Result<f32> {
        if let Value::Float32(f) = self {
            Ok(*f)
        } else {
            Err(self.mismatch("f32"))
        }
    }

    /// The value as `f64`. A single-precision token widens losslessly.
    pub fn expect_f64(&self) -> Result<f64> {
        match self {
            Value::Float64(f) => Ok(*f),
            Value::Float32(f) => Ok(f64::from(*f)),
            _ => Err(self.mismatch("f64")),
        }
    }

    /// The value as a string payload.
    pub fn expect_str(&self) -> Result<&MsgPackString> {
        if let Value::String(s) = self {
            Ok(s)
        } else {
            Err(self.mismatch("string"))
        }
    }

    /// The value as raw bytes. Accepts both the bin and string families
    /// (the classic dialect writes blobs under string headers).
    pub fn expect_bin(&self) -> Result<&[u8]> {
        match self {
            Value::Binary(b) => Ok(b),
            Value::String(s) => Ok(s.get_bytes()),
            _ => Err(self.mismatch("binary")),
        }
    }

    /// Coerces any integer-family value to `u64`, wrapping negatives.
    #[must_use]
    pub fn coerce_unsigned(&self) -> u64 {
        use num_traits::AsPrimitive as _;
        match self {
            Value::Unsigned(u) => *u,
            Value::Signed(i) => (*i).as_(),
            Value::Boolean(b) => u64::from(*b),
            _ => 0,
        }
    }
}

// Equality =================================================================

/// Observable equality: numeric across the integer families, textual or
/// byte-wise for string-family payloads.
#[allow(clippy::float_cmp)]
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Unsigned(a), Value::Unsigned(b)) => a == b,
            (Value::Signed(a), Value::Signed(b)) => a == b,
            (Value::Unsigned(u), Value::Signed(i)) | (Value::Signed(i), Value::Unsigned(u)) => {
                u64::try_from(*i).is_ok_and(|i| i == *u)
            }
            (Value::Float32(a), Value::Float32(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::Float32(a), Value::Float64(b)) | (Value::Float64(b), Value::Float32(a)) => {
                f64::from(*a) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::String(s), Value::Binary(b)) | (Value::Binary(b), Value::String(s)) => {
                s.get_bytes() == &b[..]
            }
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Extension(ta, da), Value::Extension(tb, db)) => ta == tb && da == db,
            _ => false,
        }
    }
}

// Display ==================================================================

fn fmt_item(f: &mut std::fmt::Formatter<'_>, item: &Value) -> std::fmt::Result {
    match item {
        Value::String(s) => write!(f, r#""{s}""#),
        _ => write!(f, "{item}"),
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Unsigned(u) => write!(f, "{u}"),
            Value::Signed(i) => write!(f, "{i}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Binary(b) => write!(f, "0x{}", hex::encode(b)),
            Value::Array(items) => {
                f.write_char('[')?;
                let mut first = true;
                for it in items {
                    if !first {
                        f.write_str(", ")?;
                    }
                    fmt_item(f, it)?;
                    first = false;
                }
                f.write_char(']')
            }
            Value::Map(entries) => {
                f.write_char('{')?;
                let mut first = true;
                for (k, v) in entries {
                    if !first {
                        f.write_str(", ")?;
                    }
                    fmt_item(f, k)?;
                    f.write_str(": ")?;
                    fmt_item(f, v)?;
                    first = false;
                }
                f.write_char('}')
            }
            Value::Extension(tc, data) => write!(f, "ext({tc}, 0x{})", hex::encode(data)),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use super::{MsgPackString, Value};
    use crate::errors::Error;
    use assertables::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn construction_and_stringify() {
        assert_eq!(Value::from(()).to_string(), "nil");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(42u8).to_string(), "42");
        assert_eq!(Value::from(-3i16).to_string(), "-3");
        assert_eq!(Value::from("hello").to_string(), "hello");
        assert_eq!(Value::from(vec![0u8, 1, 2]).to_string(), "0x000102");
        let list = Value::Array(vec![Value::from(true), Value::from("whee")]);
        assert_eq!(list.to_string(), r#"[true, "whee"]"#);
        let map = Value::Map(vec![(Value::from("k"), Value::from(1u8))]);
        assert_eq!(map.to_string(), r#"{"k": 1}"#);
        assert_eq!(Value::Extension(7, vec![0xaa]).to_string(), "ext(7, 0xaa)");
    }

    #[test]
    fn option_construction() {
        assert_eq!(Value::from(Some(3u8)), Value::Unsigned(3));
        assert_eq!(Value::from(None::<u8>), Value::Nil);
    }

    #[test]
    fn downcasting() {
        let v = Value::from("hi");
        assert!(v.is_string());
        assert_eq!(
            v.as_string_ref().and_then(MsgPackString::try_get_string),
            Some("hi")
        );
        assert_eq!(v.into_string().unwrap().try_get_string(), Some("hi"));

        let v = Value::Array(vec![Value::Nil]);
        assert_eq!(v.as_array_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn cross_family_equality() {
        assert_eq!(Value::Unsigned(5), Value::Signed(5));
        assert_ne!(Value::Unsigned(5), Value::Signed(-5));
        assert_eq!(Value::Float32(1.5), Value::Float64(1.5));
        assert_eq!(
            Value::from("abc"),
            Value::Binary(b"abc".to_vec()),
            "string and raw bytes compare byte-wise"
        );
        assert_ne!(Value::Nil, Value::Boolean(false));
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn expect_success() {
        assert_eq!(Value::Unsigned(300).expect_u16().unwrap(), 300);
        assert_eq!(Value::Signed(300).expect_u64().unwrap(), 300);
        assert_eq!(Value::Unsigned(7).expect_i8().unwrap(), 7);
        assert!(Value::Boolean(true).expect_bool().unwrap());
        assert_eq!(Value::Float32(2.5).expect_f64().unwrap(), 2.5);
        assert_eq!(Value::from("x").expect_bin().unwrap(), b"x");
    }

    #[test]
    fn expect_range_and_type_errors() {
        assert_matches!(
            Value::Unsigned(300).expect_u8(),
            Err(Error::MessageTypeMismatch { .. })
        );
        assert_matches!(
            Value::Signed(-1).expect_u64(),
            Err(Error::MessageTypeMismatch { .. })
        );
        assert_matches!(
            Value::Unsigned(u64::MAX).expect_i64(),
            Err(Error::MessageTypeMismatch { .. })
        );
        assert_matches!(
            Value::from("hi").expect_u64(),
            Err(Error::MessageTypeMismatch { .. })
        );
        assert_matches!(
            Value::Float64(1.0).expect_f32(),
            Err(Error::MessageTypeMismatch { .. })
        );
    }

    #[test]
    fn coercion() {
        assert_eq!(Value::Unsigned(7).coerce_unsigned(), 7);
        assert_eq!(Value::Signed(-1).coerce_unsigned(), u64::MAX);
        assert_eq!(Value::Boolean(true).coerce_unsigned(), 1);
        assert_eq!(Value::Nil.coerce_unsigned(), 0);
    }
}
