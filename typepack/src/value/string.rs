// (c) 2025 Ross Younger

//! The dual-representation string/blob value

use std::hash::{Hash, Hasher};
use std::str::Utf8Error;
use std::sync::OnceLock;

use crate::errors::{Error, Result};

/// Which view of a [`MsgPackString`] is known to be authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BinaryKind {
    /// No decode has been attempted yet
    #[display("unknown")]
    Unknown,
    /// The payload decoded as strict UTF-8
    #[display("string")]
    String,
    /// A strict decode has failed; only the byte view is meaningful
    #[display("blob")]
    Blob,
}

/// A string value that tolerates arbitrary bytes.
///
/// The classic MessagePack `raw` family conflates text with byte blobs, so
/// a payload read under a string header is not guaranteed to be UTF-8. This
/// type carries both views (encoded bytes and decoded text), populating
/// each lazily on first request. A failed strict decode is remembered: the
/// value degrades to a blob without losing a byte.
///
/// ```rust
/// use typepack::{BinaryKind, MsgPackString};
///
/// let text = MsgPackString::from("hello");
/// assert_eq!(text.try_get_string(), Some("hello"));
///
/// let blob = MsgPackString::from(vec![0xff, 0xfe]);
/// assert_eq!(blob.try_get_string(), None);
/// assert_eq!(blob.binary_kind(), BinaryKind::Blob);
/// assert_eq!(blob.get_bytes(), [0xff, 0xfe]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MsgPackString {
    // Invariant: at least one of the two cells is populated.
    bytes: OnceLock<Vec<u8>>,
    text: OnceLock<std::result::Result<String, Utf8Error>>,
}

impl MsgPackString {
    /// The UTF-8 byte view, encoding it from the text view on first request.
    #[must_use]
    pub fn get_bytes(&self) -> &[u8] {
        self.bytes.get_or_init(|| match self.text.get() {
            Some(Ok(s)) => s.as_bytes().to_vec(),
            _ => Vec::new(), // unreachable: construction populates a view
        })
    }

    /// The decoded text view, if this value is (or decodes as) valid UTF-8.
    ///
    /// The first call on a byte-constructed value performs a strict decode;
    /// failure is remembered and reported by [`binary_kind`](Self::binary_kind).
    #[must_use]
    pub fn try_get_string(&self) -> Option<&str> {
        self.decoded().as_deref().ok()
    }

    /// As [`try_get_string`](Self::try_get_string), but a failed decode
    /// surfaces the remembered [`Error::DecodingFailure`].
    pub fn get_string(&self) -> Result<&str> {
        match self.decoded() {
            Ok(s) => Ok(s),
            Err(e) => Err(Error::DecodingFailure(*e)),
        }
    }

    /// Which representation is authoritative.
    #[must_use]
    pub fn binary_kind(&self) -> BinaryKind {
        match self.text.get() {
            None => BinaryKind::Unknown,
            Some(Ok(_)) => BinaryKind::String,
            Some(Err(_)) => BinaryKind::Blob,
        }
    }

    /// Consumes the value, returning the byte view.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        let _ = self.get_bytes();
        self.bytes.into_inner().unwrap_or_default()
    }

    fn decoded(&self) -> &std::result::Result<String, Utf8Error> {
        self.text.get_or_init(|| {
            std::str::from_utf8(self.get_bytes()).map(std::borrow::ToOwned::to_owned)
        })
    }
}

impl From<String> for MsgPackString {
    fn from(value: String) -> Self {
        let out = Self::default();
        let _ = out.text.set(Ok(value));
        out
    }
}

impl From<&str> for MsgPackString {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<Vec<u8>> for MsgPackString {
    fn from(value: Vec<u8>) -> Self {
        let out = Self::default();
        let _ = out.bytes.set(value);
        out
    }
}

impl From<&[u8]> for MsgPackString {
    fn from(value: &[u8]) -> Self {
        Self::from(value.to_vec())
    }
}

/// Text comparison when both sides decode; raw-byte comparison otherwise.
impl PartialEq for MsgPackString {
    fn eq(&self, other: &Self) -> bool {
        match (self.decoded(), other.decoded()) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.get_bytes() == other.get_bytes(),
        }
    }
}

impl Eq for MsgPackString {}

impl Hash for MsgPackString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.decoded() {
            Ok(s) => s.hash(state),
            // Undecodable payload: XOR-rolling hash over the raw bytes.
            Err(_) => self
                .get_bytes()
                .iter()
                .fold(0u64, |h, b| h.rotate_left(8) ^ u64::from(*b))
                .hash(state),
        }
    }
}

impl std::fmt::Display for MsgPackString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.decoded() {
            Ok(s) => f.write_str(s),
            Err(_) => write!(f, "0x{}", hex::encode(self.get_bytes())),
        }
    }
}
