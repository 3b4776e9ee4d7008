// (c) 2025 Ross Younger

//! Serializers for the dynamic value, strings-or-blobs, and byte payloads

use std::sync::Arc;

use bytes::Bytes;

use super::{Packable, Serializer};
use crate::context::SerializationContext;
use crate::errors::{Error, Result};
use crate::value::{MsgPackString, Value};
use crate::wire::{Packer, Unpacker};

/// Serializer for the dynamic [`Value`].
///
/// Anything the codec can read becomes a `Value`; nil deserializes to
/// [`Value::Nil`] rather than failing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSerializer;

impl Serializer for ValueSerializer {
    type Item = Value;

    fn pack_core(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()> {
        packer.pack_value(value)
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
        unpacker.complete_last_value()
    }

    fn nil_value(&self) -> Option<Self::Item> {
        Some(Value::Nil)
    }
}

impl Packable for Value {
    fn build_serializer(
        _context: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn Serializer<Item = Self>>> {
        Ok(Arc::new(ValueSerializer))
    }
}

/// Serializer for [`MsgPackString`]: a string-family payload which may or
/// may not be valid UTF-8. Accepts bin-family tokens on read.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackStringSerializer;

impl Serializer for MsgPackStringSerializer {
    type Item = MsgPackString;

    fn pack_core(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()> {
        packer.pack_string(value)
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
        match unpacker.last_value()? {
            Value::String(s) => Ok(s.clone()),
            Value::Binary(b) => Ok(MsgPackString::from(b.clone())),
            other => Err(Error::MessageTypeMismatch {
                expected: "string",
                actual: other.type_name(),
            }),
        }
    }
}

impl Packable for MsgPackString {
    fn build_serializer(
        _context: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn Serializer<Item = Self>>> {
        Ok(Arc::new(MsgPackStringSerializer))
    }
}

/// Serializer for [`Bytes`]: the dedicated blob path.
///
/// Writes the bin family (raw headers in the classic dialect) and accepts
/// both families on read.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesSerializer;

impl Serializer for BytesSerializer {
    type Item = Bytes;

    fn pack_core(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()> {
        packer.pack_bin(value)
    }

    fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
        Ok(Bytes::copy_from_slice(unpacker.last_value()?.expect_bin()?))
    }
}

impl Packable for Bytes {
    fn build_serializer(
        _context: &Arc<SerializationContext>,
    ) -> Result<Arc<dyn Serializer<Item = Self>>> {
        Ok(Arc::new(BytesSerializer))
    }
}
