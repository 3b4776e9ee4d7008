// (c) 2025 Ross Younger

//! Wire-dialect compatibility switches
//!
//! The original MessagePack dialect ("classic") had a single `raw` family
//! covering both strings and byte blobs, and no `str8` header. Peers
//! predating the current specification choke on the `bin` family and on
//! `str8`. A [`Packer`](super::Packer) is given one of these option sets at
//! construction and honours it for its whole lifetime; readers accept every
//! dialect unconditionally.

/// Compatibility switches applied by a [`Packer`](super::Packer).
///
/// ```rust
/// use typepack::CompatibilityOptions;
///
/// let modern = CompatibilityOptions::default();
/// assert!(!modern.is_classic());
/// assert!(CompatibilityOptions::CLASSIC.is_classic());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompatibilityOptions {
    /// Emit byte payloads with raw (string-family) headers instead of the
    /// bin family.
    pub binary_as_raw: bool,
    /// Restrict string headers to the classic raw family, suppressing
    /// `str8`.
    pub raw_compatible: bool,
}

impl CompatibilityOptions {
    /// The full classic dialect: no bin family, no `str8`.
    pub const CLASSIC: Self = Self {
        binary_as_raw: true,
        raw_compatible: true,
    };

    /// Does this option set describe the classic dialect?
    #[must_use]
    pub fn is_classic(self) -> bool {
        self.binary_as_raw && self.raw_compatible
    }
}
