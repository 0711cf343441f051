//! Decode errors for the UUID hex codec.

/// Malformed hex text passed to [`crate::decode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexError {
    #[error("Format error: empty hex string")]
    Empty,

    #[error("Format error: hex string has {len} characters, at most 32 allowed")]
    TooLong { len: usize },

    #[error("Format error: invalid hex digit {found:?} at position {position}")]
    InvalidDigit { position: usize, found: char },
}
