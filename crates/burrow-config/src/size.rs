//! Human-readable byte sizes: `4096`, `512K`, `10MB`, `1GiB`.
//!
//! Every unit is a binary multiple: `K`, `KB` and `KiB` all mean 1024.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::loader::ConfigError;

/// Parses a size such as `"512K"`, `"10MB"` or `"1GiB"` into bytes.
///
/// Units are case-insensitive; surrounding whitespace and a space between
/// number and unit are allowed.
///
/// # Errors
///
/// Returns `ConfigError::InvalidSize` for an empty string, a missing or
/// non-integer number, an unknown unit, or a value overflowing `u64`.
pub fn parse_size(text: &str) -> Result<u64, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidSize {
        input: text.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = text.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    if number.is_empty() {
        return Err(invalid("expected a number of bytes"));
    }
    let value: u64 = number.parse().map_err(|_| invalid("number out of range"))?;

    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => 1 << 10,
        "m" | "mb" | "mib" => 1 << 20,
        "g" | "gb" | "gib" => 1 << 30,
        "t" | "tb" | "tib" => 1 << 40,
        _ => return Err(invalid("unknown unit (use B, K, M, G or T)")),
    };

    value
        .checked_mul(multiplier)
        .ok_or_else(|| invalid("size overflows 64 bits"))
}

/// A byte count that deserializes from an integer or a size string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteSize(pub u64);

impl ByteSize {
    /// The size in bytes.
    pub fn bytes(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes", self.0)
    }
}

impl Serialize for ByteSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SizeVisitor;

        impl Visitor<'_> for SizeVisitor {
            type Value = ByteSize;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a byte count or a size string such as \"10MB\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ByteSize, E> {
                Ok(ByteSize(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ByteSize, E> {
                u64::try_from(v)
                    .map(ByteSize)
                    .map_err(|_| E::custom("size must not be negative"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ByteSize, E> {
                parse_size(v).map(ByteSize).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(SizeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_bytes() {
        assert_eq!(parse_size("4096").expect("ok"), 4096);
        assert_eq!(parse_size(" 12B ").expect("ok"), 12);
    }

    #[test]
    fn binary_units() {
        assert_eq!(parse_size("512K").expect("ok"), 512 * 1024);
        assert_eq!(parse_size("10MB").expect("ok"), 10 * 1024 * 1024);
        assert_eq!(parse_size("1GiB").expect("ok"), 1 << 30);
        assert_eq!(parse_size("2 mb").expect("ok"), 2 << 20);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "MB", "ten", "1.5M", "10XB", "-1"] {
            assert!(
                matches!(parse_size(bad), Err(ConfigError::InvalidSize { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_overflow() {
        assert!(parse_size("99999999999T").is_err());
        assert!(parse_size("99999999999999999999999").is_err());
    }

    #[test]
    fn deserializes_from_number_or_string() {
        let n: ByteSize = serde_json::from_str("1024").expect("number");
        assert_eq!(n, ByteSize(1024));
        let s: ByteSize = serde_json::from_str("\"1K\"").expect("string");
        assert_eq!(s, ByteSize(1024));
        assert!(serde_json::from_str::<ByteSize>("\"lots\"").is_err());
        assert!(serde_json::from_str::<ByteSize>("-5").is_err());
    }
}
