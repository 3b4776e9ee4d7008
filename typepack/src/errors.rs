// (c) 2025 Ross Younger

//! Error and result types shared by the codec and serializer layers

/// Convenience alias used throughout this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while packing or unpacking.
///
/// The codec and serializer layers share one error type; the variants note
/// which layer raises them. All errors propagate to the outermost caller
/// unwrapped; nothing is silently recovered.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The byte source ended in the middle of a value (codec)
    #[error("unexpected end of stream")]
    EndOfStream,

    /// The bytes read do not form a valid MessagePack stream (codec)
    #[error("invalid message stream: {0}")]
    InvalidStream(String),

    /// A typed read disagreed with the wire token (codec)
    #[error("message type mismatch: expected {expected}, read {actual}")]
    MessageTypeMismatch {
        /// What the caller asked for
        expected: &'static str,
        /// What the stream actually held
        actual: &'static str,
    },

    /// A declared item count exceeds this platform's index width (codec)
    #[error("collection of {0} items does not fit this platform's index width")]
    TooLargeCollection(u64),

    /// Read nil for a type that does not admit nil (serializer)
    #[error("read nil for non-nullable type {0}")]
    ValueCannotBeNull(&'static str),

    /// A member marked as required was missing or nil (serializer)
    #[error("required value {0} was missing or nil")]
    MissingRequiredValue(&'static str),

    /// The requested operation is not available for this serializer
    #[error("operation not supported: {0}")]
    NotSupported(String),

    /// An aggregate type offered no usable constructor (build protocol)
    #[error("type {0} has no default constructor")]
    NoDefaultConstructor(&'static str),

    /// An erased lookup resolved to an abstract key with no buildable
    /// concrete counterpart (build protocol)
    #[error("type {0} is abstract and its default concrete type is unavailable")]
    AbstractType(String),

    /// No serializer is registered or buildable for the requested type
    #[error("no serializer registered for {0}")]
    NotRegistered(String),

    /// An enum name or underlying value had no matching variant
    #[error("unknown member {name:?} for enum {enum_type}")]
    UnknownEnumMember {
        /// The enum type being deserialized
        enum_type: &'static str,
        /// The name or rendered value that failed to match
        name: String,
    },

    /// The wire token cannot be an underlying value for this enum
    #[error("wire token ({actual}) does not fit the underlying type of enum {enum_type}")]
    EnumUnderlyingTypeMismatch {
        /// The enum type being deserialized
        enum_type: &'static str,
        /// What the stream actually held
        actual: &'static str,
    },

    /// A raw payload claiming to be a string was not valid UTF-8.
    ///
    /// This is carried inside a [`MsgPackString`](crate::MsgPackString) and
    /// surfaced only when the caller asks for decoded text.
    #[error("string payload is not valid UTF-8: {0}")]
    DecodingFailure(#[from] std::str::Utf8Error),

    /// The underlying byte source or sink failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
