// (c) 2025 Ross Younger

//! # The MessagePack byte codec
//!
//! This layer knows only bytes: a [`Packer`] turns logical operations
//! (write an integer, open an array) into wire tokens, and an [`Unpacker`]
//! turns wire tokens back into tagged [`Value`](crate::Value)s and
//! container headers. Everything above it (serializers, the registry)
//! speaks to the codec through these logical operations and never touches
//! the byte grammar directly.
//!
//! # Wire format
//!
//! The byte grammar is MessagePack as published; every byte produced here
//! conforms. Two dialect switches exist for interoperating with peers that
//! predate the `bin` and `str8` families; see [`CompatibilityOptions`].
//!
//! # Reading discipline
//!
//! The reader is strictly forward-only and pull-based. Container headers
//! declare a length; the reader tracks open containers so that
//! [`Unpacker::skip`] and [`Unpacker::read_subtree`] can always consume a
//! structurally complete value. A malformed or oversized nested structure
//! therefore cannot desync an outer cursor: the subtree reader refuses to
//! read past its bounds, and skips whatever its consumer left behind.

pub mod code;
mod compat;
mod packer;
mod unpacker;

pub use compat::CompatibilityOptions;
pub use packer::Packer;
pub use unpacker::{SubtreeUnpacker, Unpacker};
