//! Error types for Certledger Core.

use thiserror::Error;

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Decode an optionally `0x`-prefixed hex string into a fixed-size array.
pub(crate) fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N]> {
    let trimmed = s.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(body)?;
    if bytes.len() != N {
        return Err(CoreError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fixed_accepts_prefix_and_case() {
        let a: [u8; 2] = decode_fixed("0xABcd").unwrap();
        let b: [u8; 2] = decode_fixed("abcd").unwrap();
        assert_eq!(a, [0xab, 0xcd]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_decode_fixed_rejects_wrong_length() {
        let err = decode_fixed::<4>("0xabcd").unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidLength {
                expected: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn test_decode_fixed_rejects_garbage() {
        assert!(matches!(
            decode_fixed::<2>("0xzzzz"),
            Err(CoreError::InvalidHex(_))
        ));
    }
}
