//! linkman codec primitives
//!
//! Small, stateless helpers shared by the configuration core and its UI
//! collaborators: a fixed-width hex codec for UUIDs and integer flag helpers.

pub mod error;
pub mod flags;
pub mod uuid_hex;

pub use error::HexError;
pub use flags::{get_flag, set_flag, toggle_flag};
pub use uuid_hex::{decode, decode_uuid, encode, encode_uuid};

/// Number of hex characters in an encoded UUID.
pub const ENCODED_LEN: usize = 32;

/// Number of hex characters in one 64-bit half.
pub const HALF_LEN: usize = 16;
