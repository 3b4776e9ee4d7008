// (c) 2025 Ross Younger

#![allow(clippy::doc_markdown)]
//! Typed MessagePack serialization: a streaming byte codec underneath a
//! per-type serializer registry.
//!
//! ## 📖 Documentation
//!
//! * [The byte codec](wire): [`Packer`], [`Unpacker`], subtree readers
//! * [The serializer layer](ser): the [`Serializer`] contract and the
//!   built-in serializers
//! * [Contexts](context): the registry, its build protocol, and the
//!   process-wide default
//! * [Dynamic values](value): [`Value`] and [`MsgPackString`]
//!
//! ## Overview
//!
//! - 🧱 **Statically-typed first.** Ask a [`SerializationContext`] for the
//!   serializer of your type; it builds one from the type's member table,
//!   memoises it, and hands back a strategy object you can reuse from any
//!   thread.
//! - 🌊 **Streaming codec.** The [`Packer`]/[`Unpacker`] pair is a plain
//!   forward-only reader/writer over `std::io`: no framing, no async, no
//!   surprises. Bounded [subtree readers](Unpacker::read_subtree) make it
//!   impossible for a malformed nested structure to desync an outer
//!   cursor.
//! - 🪶 **Narrowest encodings.** Integers and container headers always
//!   take the shortest wire form that fits, and round trips keep it that
//!   way.
//! - 🕰️ **Classic-dialect interop.** Peers predating the `bin`/`str8`
//!   families are served by [`CompatibilityOptions::CLASSIC`], and
//!   non-UTF-8 "raw" payloads survive as [`MsgPackString`] blobs instead
//!   of failing.
//!
//! ## Getting started
//!
//! Declare a member table for your type and round-trip it:
//!
//! ```rust
//! use typepack::{SerializationContext, SerializerExt as _};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//! typepack::typepack_message! {
//!     Point {
//!         [0] x: i32,
//!         [1] y: i32,
//!     }
//! }
//!
//! # fn main() -> typepack::Result<()> {
//! let context = SerializationContext::with_defaults();
//! let serializer = context.get_serializer::<Point>()?;
//!
//! let original = Point { x: 3, y: -4 };
//! let bytes = serializer.pack_single_object(&original)?;
//! assert_eq!(serializer.unpack_single_object(&bytes)?, original);
//! # Ok(())
//! # }
//! ```
//!
//! Collections, tuples, `Option`, enums (via [`typepack_enum!`]) and the
//! dynamic [`Value`] all work the same way. For schemaless data, read
//! whatever arrives:
//!
//! ```rust
//! use typepack::Unpacker;
//!
//! let wire = [0x82u8, 0xa1, b'a', 0x01, 0xa1, b'b', 0xc0];
//! let mut source = &wire[..];
//! let mut unpacker = Unpacker::new(&mut source);
//! let value = unpacker.read_value()?.expect("one value");
//! assert_eq!(value.to_string(), r#"{"a": 1, "b": nil}"#);
//! # Ok::<(), typepack::Error>(())
//! ```
//!
//! ## Threading
//!
//! Contexts and serializers are safe to share; the codec objects are not
//! (each packer/unpacker is a single cursor). I/O is blocking; wrap the
//! source or sink if you need async.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod context;
pub mod errors;
pub mod generation;
pub mod ser;
pub mod value;
pub mod wire;

pub use context::{ContextOptions, SerializationContext, get_serializer};
pub use errors::{Error, Result};
pub use generation::{BuiltSerializer, GenerationFlavor, GenerationOptions, SerializerFactory};
pub use ser::{
    AnySerializer, EnumSerializationMethod, EnumSerializer, MemberDef, NilImplication,
    ObjectSerializer, Packable, SerializationMethod, Serializer, SerializerExt,
};
pub use value::{BinaryKind, MsgPackString, Value};
pub use wire::{CompatibilityOptions, Packer, SubtreeUnpacker, Unpacker};
