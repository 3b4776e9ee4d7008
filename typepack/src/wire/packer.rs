// (c) 2025 Ross Younger

//! The forward-only MessagePack writer

use std::io::Write;

use super::code;
use super::compat::CompatibilityOptions;
use crate::errors::{Error, Result};
use crate::value::{MsgPackString, Value};

/// A forward-only writer over the MessagePack byte grammar.
///
/// The packer is stateless apart from its destination sink and its
/// [`CompatibilityOptions`]; every operation either writes a complete wire
/// token or fails with [`Error::Io`]. There is no partial rollback; a
/// failed write leaves the sink in an unspecified state.
///
/// Container headers are written by [`pack_array_header`](Self::pack_array_header)
/// and [`pack_map_header`](Self::pack_map_header); the caller is responsible
/// for emitting exactly the declared number of values afterwards.
///
/// ```rust
/// use typepack::Packer;
///
/// let mut buf = Vec::new();
/// let mut packer = Packer::new(&mut buf);
/// packer.pack_array_header(2)?;
/// packer.pack_uint(1)?;
/// packer.pack_str("two")?;
/// assert_eq!(buf, [0x92, 0x01, 0xa3, b't', b'w', b'o']);
/// # Ok::<(), typepack::Error>(())
/// ```
pub struct Packer<'a> {
    sink: &'a mut dyn Write,
    options: CompatibilityOptions,
}

impl std::fmt::Debug for Packer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> Packer<'a> {
    /// Creates a packer writing the current (non-classic) dialect.
    #[must_use]
    pub fn new(sink: &'a mut dyn Write) -> Self {
        Self::with_options(sink, CompatibilityOptions::default())
    }

    /// Creates a packer with explicit compatibility options.
    #[must_use]
    pub fn with_options(sink: &'a mut dyn Write, options: CompatibilityOptions) -> Self {
        Self { sink, options }
    }

    /// The compatibility options this packer was created with.
    #[must_use]
    pub fn options(&self) -> CompatibilityOptions {
        self.options
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink.write_all(bytes)?;
        Ok(())
    }

    /// Writes nil.
    pub fn pack_nil(&mut self) -> Result<()> {
        self.put(&[code::NIL])
    }

    /// Writes a boolean.
    pub fn pack_bool(&mut self, value: bool) -> Result<()> {
        self.put(&[if value { code::TRUE } else { code::FALSE }])
    }

    /// Writes an unsigned integer using the narrowest encoding that fits.
    #[allow(clippy::cast_possible_truncation)] // each arm is range checked
    pub fn pack_uint(&mut self, value: u64) -> Result<()> {
        if value <= u64::from(code::MAX_FIX_POS) {
            self.put(&[value as u8])
        } else if value <= u64::from(u8::MAX) {
            self.put(&[code::UINT8, value as u8])
        } else if value <= u64::from(u16::MAX) {
            let b = (value as u16).to_be_bytes();
            self.put(&[code::UINT16, b[0], b[1]])
        } else if value <= u64::from(u32::MAX) {
            let mut out = [code::UINT32, 0, 0, 0, 0];
            out[1..].copy_from_slice(&(value as u32).to_be_bytes());
            self.put(&out)
        } else {
            let mut out = [code::UINT64, 0, 0, 0, 0, 0, 0, 0, 0];
            out[1..].copy_from_slice(&value.to_be_bytes());
            self.put(&out)
        }
    }

    /// Writes a signed integer using the narrowest encoding that fits.
    ///
    /// Non-negative values are written with the unsigned forms, which are
    /// never wider than their signed counterparts.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked
    pub fn pack_int(&mut self, value: i64) -> Result<()> {
        if value >= 0 {
            self.pack_uint(value as u64)
        } else if value >= -32 {
            self.put(&[value as i8 as u8])
        } else if value >= i64::from(i8::MIN) {
            self.put(&[code::INT8, value as i8 as u8])
        } else if value >= i64::from(i16::MIN) {
            let b = (value as i16).to_be_bytes();
            self.put(&[code::INT16, b[0], b[1]])
        } else if value >= i64::from(i32::MIN) {
            let mut out = [code::INT32, 0, 0, 0, 0];
            out[1..].copy_from_slice(&(value as i32).to_be_bytes());
            self.put(&out)
        } else {
            let mut out = [code::INT64, 0, 0, 0, 0, 0, 0, 0, 0];
            out[1..].copy_from_slice(&value.to_be_bytes());
            self.put(&out)
        }
    }

    /// Writes a single-precision float.
    pub fn pack_float32(&mut self, value: f32) -> Result<()> {
        let mut out = [code::FLOAT32, 0, 0, 0, 0];
        out[1..].copy_from_slice(&value.to_be_bytes());
        self.put(&out)
    }

    /// Writes a double-precision float.
    pub fn pack_float64(&mut self, value: f64) -> Result<()> {
        let mut out = [code::FLOAT64, 0, 0, 0, 0, 0, 0, 0, 0];
        out[1..].copy_from_slice(&value.to_be_bytes());
        self.put(&out)
    }

    /// Writes a UTF-8 string under a string-family header.
    pub fn pack_str(&mut self, value: &str) -> Result<()> {
        self.pack_str_header(value.len())?;
        self.put(value.as_bytes())
    }

    /// Writes a [`MsgPackString`] under a string-family header.
    ///
    /// Whichever representation the string already holds is authoritative;
    /// a blob that never decoded is written back byte for byte.
    pub fn pack_string(&mut self, value: &MsgPackString) -> Result<()> {
        let bytes = value.get_bytes();
        self.pack_str_header(bytes.len())?;
        self.put(bytes)
    }

    /// Writes a byte blob.
    ///
    /// Uses the bin family, unless the compatibility options require raw
    /// (string-family) headers.
    pub fn pack_bin(&mut self, value: &[u8]) -> Result<()> {
        if self.options.binary_as_raw {
            self.pack_str_header(value.len())?;
        } else {
            self.pack_bin_header(value.len())?;
        }
        self.put(value)
    }

    #[allow(clippy::cast_possible_truncation)] // range checked
    fn pack_str_header(&mut self, len: usize) -> Result<()> {
        if len <= code::FIX_STR_MAX_LEN {
            self.put(&[code::MIN_FIX_STR | len as u8])
        } else if len <= usize::from(u8::MAX) && !self.options.raw_compatible {
            self.put(&[code::STR8, len as u8])
        } else if len <= usize::from(u16::MAX) {
            let b = (len as u16).to_be_bytes();
            self.put(&[code::STR16, b[0], b[1]])
        } else {
            let len = checked_u32(len)?;
            let mut out = [code::STR32, 0, 0, 0, 0];
            out[1..].copy_from_slice(&len.to_be_bytes());
            self.put(&out)
        }
    }

    #[allow(clippy::cast_possible_truncation)] // range checked
    fn pack_bin_header(&mut self, len: usize) -> Result<()> {
        if len <= usize::from(u8::MAX) {
            self.put(&[code::BIN8, len as u8])
        } else if len <= usize::from(u16::MAX) {
            let b = (len as u16).to_be_bytes();
            self.put(&[code::BIN16, b[0], b[1]])
        } else {
            let len = checked_u32(len)?;
            let mut out = [code::BIN32, 0, 0, 0, 0];
            out[1..].copy_from_slice(&len.to_be_bytes());
            self.put(&out)
        }
    }

    /// Writes an array header. The caller must emit exactly `count` values
    /// afterwards.
    #[allow(clippy::cast_possible_truncation)] // range checked
    pub fn pack_array_header(&mut self, count: usize) -> Result<()> {
        if count <= code::FIX_CONTAINER_MAX_LEN {
            self.put(&[code::MIN_FIX_ARRAY | count as u8])
        } else if count <= usize::from(u16::MAX) {
            let b = (count as u16).to_be_bytes();
            self.put(&[code::ARRAY16, b[0], b[1]])
        } else {
            let count = checked_u32(count)?;
            let mut out = [code::ARRAY32, 0, 0, 0, 0];
            out[1..].copy_from_slice(&count.to_be_bytes());
            self.put(&out)
        }
    }

    /// Writes a map header. The caller must emit exactly `count` key/value
    /// pairs (`2 * count` values) afterwards.
    #[allow(clippy::cast_possible_truncation)] // range checked
    pub fn pack_map_header(&mut self, count: usize) -> Result<()> {
        if count <= code::FIX_CONTAINER_MAX_LEN {
            self.put(&[code::MIN_FIX_MAP | count as u8])
        } else if count <= usize::from(u16::MAX) {
            let b = (count as u16).to_be_bytes();
            self.put(&[code::MAP16, b[0], b[1]])
        } else {
            let count = checked_u32(count)?;
            let mut out = [code::MAP32, 0, 0, 0, 0];
            out[1..].copy_from_slice(&count.to_be_bytes());
            self.put(&out)
        }
    }

    /// Writes an extension value.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked
    pub fn pack_extension(&mut self, type_code: i8, data: &[u8]) -> Result<()> {
        let tb = type_code as u8;
        match data.len() {
            1 => self.put(&[code::FIXEXT1, tb])?,
            2 => self.put(&[code::FIXEXT2, tb])?,
            4 => self.put(&[code::FIXEXT4, tb])?,
            8 => self.put(&[code::FIXEXT8, tb])?,
            16 => self.put(&[code::FIXEXT16, tb])?,
            len if len <= usize::from(u8::MAX) => self.put(&[code::EXT8, len as u8, tb])?,
            len if len <= usize::from(u16::MAX) => {
                let b = (len as u16).to_be_bytes();
                self.put(&[code::EXT16, b[0], b[1], tb])?;
            }
            len => {
                let len = checked_u32(len)?;
                let mut out = [code::EXT32, 0, 0, 0, 0, tb];
                out[1..5].copy_from_slice(&len.to_be_bytes());
                self.put(&out)?;
            }
        }
        self.put(data)
    }

    /// Writes a dynamic [`Value`], recursing into containers.
    pub fn pack_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Nil => self.pack_nil(),
            Value::Boolean(b) => self.pack_bool(*b),
            Value::Unsigned(u) => self.pack_uint(*u),
            Value::Signed(i) => self.pack_int(*i),
            Value::Float32(f) => self.pack_float32(*f),
            Value::Float64(f) => self.pack_float64(*f),
            Value::String(s) => self.pack_string(s),
            Value::Binary(b) => self.pack_bin(b),
            Value::Array(items) => {
                self.pack_array_header(items.len())?;
                for it in items {
                    self.pack_value(it)?;
                }
                Ok(())
            }
            Value::Map(entries) => {
                self.pack_map_header(entries.len())?;
                for (k, v) in entries {
                    self.pack_value(k)?;
                    self.pack_value(v)?;
                }
                Ok(())
            }
            Value::Extension(tc, data) => self.pack_extension(*tc, data),
        }
    }
}

fn checked_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::TooLargeCollection(u64::try_from(len).unwrap_or(u64::MAX)))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use super::{CompatibilityOptions, Packer};
    use crate::value::Value;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn pack_with<F>(f: F) -> Vec<u8>
    where
        F: FnOnce(&mut Packer<'_>) -> crate::Result<()>,
    {
        let mut buf = Vec::new();
        let mut packer = Packer::new(&mut buf);
        f(&mut packer).unwrap();
        buf
    }

    fn pack_classic<F>(f: F) -> Vec<u8>
    where
        F: FnOnce(&mut Packer<'_>) -> crate::Result<()>,
    {
        let mut buf = Vec::new();
        let mut packer = Packer::with_options(&mut buf, CompatibilityOptions::CLASSIC);
        f(&mut packer).unwrap();
        buf
    }

    #[test]
    fn scalars() {
        assert_eq!(pack_with(|p| p.pack_nil()), [0xc0]);
        assert_eq!(pack_with(|p| p.pack_bool(false)), [0xc2]);
        assert_eq!(pack_with(|p| p.pack_bool(true)), [0xc3]);
    }

    #[rstest]
    #[case(0, vec![0x00])]
    #[case(127, vec![0x7f])]
    #[case(128, vec![0xcc, 0x80])]
    #[case(255, vec![0xcc, 0xff])]
    #[case(256, vec![0xcd, 0x01, 0x00])]
    #[case(65_535, vec![0xcd, 0xff, 0xff])]
    #[case(65_536, vec![0xce, 0x00, 0x01, 0x00, 0x00])]
    #[case(4_294_967_295, vec![0xce, 0xff, 0xff, 0xff, 0xff])]
    #[case(4_294_967_296, vec![0xcf, 0, 0, 0, 1, 0, 0, 0, 0])]
    #[case(u64::MAX, vec![0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff])]
    fn narrowest_uint(#[case] value: u64, #[case] expected: Vec<u8>) {
        assert_eq!(pack_with(|p| p.pack_uint(value)), expected);
    }

    #[rstest]
    #[case(0, vec![0x00])]
    #[case(42, vec![0x2a])]
    #[case(-1, vec![0xff])]
    #[case(-32, vec![0xe0])]
    #[case(-33, vec![0xd0, 0xdf])]
    #[case(-128, vec![0xd0, 0x80])]
    #[case(-129, vec![0xd1, 0xff, 0x7f])]
    #[case(-32_768, vec![0xd1, 0x80, 0x00])]
    #[case(-32_769, vec![0xd2, 0xff, 0xff, 0x7f, 0xff])]
    #[case(i64::from(i32::MIN), vec![0xd2, 0x80, 0, 0, 0])]
    #[case(i64::from(i32::MIN) - 1, vec![0xd3, 0xff, 0xff, 0xff, 0xff, 0x7f, 0xff, 0xff, 0xff])]
    #[case(i64::MIN, vec![0xd3, 0x80, 0, 0, 0, 0, 0, 0, 0])]
    fn narrowest_int(#[case] value: i64, #[case] expected: Vec<u8>) {
        assert_eq!(pack_with(|p| p.pack_int(value)), expected);
    }

    #[test]
    fn floats() {
        assert_eq!(pack_with(|p| p.pack_float32(1.0)), [0xca, 0x3f, 0x80, 0, 0]);
        assert_eq!(
            pack_with(|p| p.pack_float64(1.0)),
            [0xcb, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn strings() {
        assert_eq!(pack_with(|p| p.pack_str("")), [0xa0]);
        assert_eq!(pack_with(|p| p.pack_str("a")), [0xa1, b'a']);
        let thirty_one = "x".repeat(31);
        assert_eq!(pack_with(|p| p.pack_str(&thirty_one))[0], 0xbf);
        let thirty_two = "x".repeat(32);
        let bytes = pack_with(|p| p.pack_str(&thirty_two));
        assert_eq!(&bytes[..2], &[0xd9, 32]);
        let long = "x".repeat(256);
        let bytes = pack_with(|p| p.pack_str(&long));
        assert_eq!(&bytes[..3], &[0xda, 0x01, 0x00]);
    }

    #[test]
    fn classic_suppresses_str8() {
        let thirty_two = "x".repeat(32);
        let bytes = pack_classic(|p| p.pack_str(&thirty_two));
        assert_eq!(&bytes[..3], &[0xda, 0x00, 32]);
    }

    #[test]
    fn binary() {
        assert_eq!(
            pack_with(|p| p.pack_bin(&[0x41])),
            [0xc4, 0x01, 0x41],
            "bin8 in the current dialect"
        );
        let big = vec![0u8; 256];
        let bytes = pack_with(|p| p.pack_bin(&big));
        assert_eq!(&bytes[..3], &[0xc5, 0x01, 0x00]);
    }

    #[test]
    fn classic_binary_uses_raw_headers() {
        assert_eq!(pack_classic(|p| p.pack_bin(&[0x41])), [0xa1, 0x41]);
        let bytes = pack_classic(|p| p.pack_bin(&[0u8; 40]));
        assert_eq!(&bytes[..3], &[0xda, 0x00, 40]);
    }

    #[test]
    fn container_headers() {
        assert_eq!(pack_with(|p| p.pack_array_header(0)), [0x90]);
        assert_eq!(pack_with(|p| p.pack_array_header(15)), [0x9f]);
        assert_eq!(pack_with(|p| p.pack_array_header(16)), [0xdc, 0, 16]);
        assert_eq!(pack_with(|p| p.pack_map_header(0)), [0x80]);
        assert_eq!(pack_with(|p| p.pack_map_header(15)), [0x8f]);
        assert_eq!(pack_with(|p| p.pack_map_header(16)), [0xde, 0, 16]);
        assert_eq!(
            pack_with(|p| p.pack_array_header(65_536)),
            [0xdd, 0, 1, 0, 0]
        );
    }

    #[rstest]
    #[case(1, 0xd4)]
    #[case(2, 0xd5)]
    #[case(4, 0xd6)]
    #[case(8, 0xd7)]
    #[case(16, 0xd8)]
    fn fixext(#[case] len: usize, #[case] lead: u8) {
        let data = vec![0xaa; len];
        let bytes = pack_with(|p| p.pack_extension(7, &data));
        assert_eq!(bytes[0], lead);
        assert_eq!(bytes[1], 7);
        assert_eq!(&bytes[2..], &data[..]);
    }

    #[test]
    fn ext_with_length() {
        let data = [1u8, 2, 3];
        let bytes = pack_with(|p| p.pack_extension(-1, &data));
        assert_eq!(bytes, [0xc7, 3, 0xff, 1, 2, 3]);
    }

    #[test]
    fn value_recursion() {
        let value = Value::Array(vec![
            Value::Unsigned(1),
            Value::Map(vec![(Value::from("k"), Value::Nil)]),
        ]);
        assert_eq!(
            pack_with(|p| p.pack_value(&value)),
            [0x92, 0x01, 0x81, 0xa1, b'k', 0xc0]
        );
    }
}
