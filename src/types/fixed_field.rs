//! Bounded, zero-padded string fields
//!
//! A `FixedField<N>` is a UTF-8 string that fits in exactly `N` bytes on
//! disk. Construction rejects anything longer; short values are padded with
//! zero bytes, and decoding strips that padding again.

use crate::{IndexError, Result};
use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct FixedField<const N: usize> {
    /// Zero-padded on-disk image
    bytes: [u8; N],

    /// Length of the meaningful prefix
    len: usize,
}

impl<const N: usize> FixedField<N> {
    /// Maximum encoded length in bytes
    pub const CAPACITY: usize = N;

    /// Validate `value` against the field width.
    ///
    /// `field` names the column in the `FieldTooLong` error.
    pub fn new(field: &'static str, value: &str) -> Result<Self> {
        let raw = value.as_bytes();
        if raw.len() > N {
            return Err(IndexError::FieldTooLong {
                field,
                len: raw.len(),
                max: N,
            });
        }

        let mut bytes = [0u8; N];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self {
            bytes,
            len: raw.len(),
        })
    }

    /// Decode an `N`-byte on-disk image, trimming trailing zero padding
    pub fn decode(field: &'static str, raw: &[u8]) -> Result<Self> {
        if raw.len() != N {
            return Err(IndexError::Corruption(format!(
                "field '{}' image is {} bytes, expected {}",
                field,
                raw.len(),
                N
            )));
        }

        let len = raw.iter().rposition(|&b| b != 0).map_or(0, |pos| pos + 1);
        std::str::from_utf8(&raw[..len]).map_err(|e| {
            IndexError::Corruption(format!("field '{}' is not valid UTF-8: {}", field, e))
        })?;

        let mut bytes = [0u8; N];
        bytes.copy_from_slice(raw);
        Ok(Self { bytes, len })
    }

    /// The full zero-padded image, exactly `N` bytes
    pub fn padded(&self) -> &[u8; N] {
        &self.bytes
    }

    pub fn as_str(&self) -> &str {
        // Both constructors checked the prefix is UTF-8.
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> fmt::Debug for FixedField<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedField<{}>({:?})", N, self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_short_values() {
        let field = FixedField::<8>::new("name", "abc").unwrap();
        assert_eq!(field.padded(), b"abc\0\0\0\0\0");
        assert_eq!(field.as_str(), "abc");
        assert_eq!(field.len(), 3);
    }

    #[test]
    fn test_exact_width_is_accepted() {
        let field = FixedField::<4>::new("name", "abcd").unwrap();
        assert_eq!(field.padded(), b"abcd");
    }

    #[test]
    fn test_rejects_overlong() {
        let err = FixedField::<4>::new("bio", "abcde").unwrap_err();
        match err {
            IndexError::FieldTooLong { field, len, max } => {
                assert_eq!(field, "bio");
                assert_eq!(len, 5);
                assert_eq!(max, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_limit_counts_bytes_not_chars() {
        // "é" is two bytes in UTF-8
        assert!(FixedField::<3>::new("name", "éé").is_err());
        assert!(FixedField::<4>::new("name", "éé").is_ok());
    }

    #[test]
    fn test_decode_trims_padding() {
        let decoded = FixedField::<6>::decode("name", b"hi\0\0\0\0").unwrap();
        assert_eq!(decoded.as_str(), "hi");
        assert!(FixedField::<6>::decode("name", &[0u8; 6]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_bad_utf8_and_width() {
        assert!(matches!(
            FixedField::<2>::decode("name", &[0xff, 0xfe]),
            Err(IndexError::Corruption(_))
        ));
        assert!(FixedField::<4>::decode("name", b"abc").is_err());
    }
}
