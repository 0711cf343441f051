//! Integer bit-flag helpers used for UI state words.

use std::ops::{BitAnd, BitOr, BitXor, Not};

/// Returns true if every bit of `flag` is set in `flags`.
pub fn get_flag<T>(flags: T, flag: T) -> bool
where
    T: Copy + PartialEq + BitAnd<Output = T>,
{
    (flags & flag) == flag
}

/// Sets the bits of `flag` when `on`, clears them otherwise.
pub fn set_flag<T>(flags: T, flag: T, on: bool) -> T
where
    T: Copy + BitAnd<Output = T> + BitOr<Output = T> + Not<Output = T>,
{
    if on {
        flags | flag
    } else {
        flags & !flag
    }
}

pub fn toggle_flag<T>(flags: T, flag: T) -> T
where
    T: BitXor<Output = T>,
{
    flags ^ flag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_flag() {
        assert_eq!(set_flag(0b0000u32, 0b0101, true), 0b0101);
        assert_eq!(set_flag(0b0101u32, 0b0100, false), 0b0001);
        assert_eq!(set_flag(0b0101u32, 0b0101, true), 0b0101);
    }

    #[test]
    fn test_toggle_flag() {
        assert_eq!(toggle_flag(0b0101u32, 0b0001), 0b0100);
        assert_eq!(toggle_flag(0b0100u32, 0b0001), 0b0101);
    }

    #[test]
    fn test_get_flag_requires_all_bits() {
        assert!(get_flag(0b0111u8, 0b0101));
        assert!(!get_flag(0b0100u8, 0b0101));
        // Empty flag is trivially contained
        assert!(get_flag(0u8, 0));
    }

    #[test]
    fn test_signed_values() {
        assert_eq!(set_flag(-1i32, 1, false), -2);
        assert!(get_flag(i64::MIN, i64::MIN));
    }
}
