//! Fixed-width hex codec for 128-bit UUIDs.
//!
//! A UUID is handled as its two 64-bit halves. Encoding always yields 32
//! uppercase hex digits, most-significant half first. Decoding is lenient on
//! short input (up to 16 digits fill only the least-significant half) but
//! rejects anything longer than 32 digits.

use uuid::Uuid;

use crate::error::HexError;
use crate::{ENCODED_LEN, HALF_LEN};

/// Encode a UUID given as (most-significant, least-significant) halves.
pub fn encode(most: i64, least: i64) -> String {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&most.to_be_bytes());
    bytes[8..].copy_from_slice(&least.to_be_bytes());
    hex::encode_upper(bytes)
}

/// Decode hex text into (most-significant, least-significant) halves.
///
/// Accepts 1 to 32 hex digits in either case. The last 16 digits form the
/// least-significant half; any digits before them form the most-significant
/// half, which is zero when the input has 16 digits or fewer.
pub fn decode(text: &str) -> Result<(i64, i64), HexError> {
    if text.is_empty() {
        return Err(HexError::Empty);
    }

    let len = text.chars().count();
    if len > ENCODED_LEN {
        return Err(HexError::TooLong { len });
    }

    let low_start = len.saturating_sub(HALF_LEN);
    let split = text
        .char_indices()
        .nth(low_start)
        .map_or(text.len(), |(offset, _)| offset);

    let most = if low_start > 0 {
        parse_half(&text[..split], 0)?
    } else {
        0
    };
    let least = parse_half(&text[split..], low_start)?;

    Ok((most as i64, least as i64))
}

/// Encode a [`Uuid`] in the fixed-width form.
pub fn encode_uuid(uuid: &Uuid) -> String {
    let (most, least) = uuid.as_u64_pair();
    encode(most as i64, least as i64)
}

/// Decode hex text into a [`Uuid`], with the same leniency as [`decode`].
pub fn decode_uuid(text: &str) -> Result<Uuid, HexError> {
    let (most, least) = decode(text)?;
    Ok(Uuid::from_u64_pair(most as u64, least as u64))
}

/// Parse at most 16 hex digits as an unsigned value. `offset` is the char
/// position of `digits` within the full input, for error reporting.
fn parse_half(digits: &str, offset: usize) -> Result<u64, HexError> {
    digits
        .chars()
        .enumerate()
        .try_fold(0u64, |acc, (i, c)| {
            let nibble = c.to_digit(16).ok_or(HexError::InvalidDigit {
                position: offset + i,
                found: c,
            })?;
            Ok((acc << 4) | u64::from(nibble))
        })
}
