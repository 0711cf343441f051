//! Integration tests: identifier codec and flag helpers via the linkman API

use linkman::flags::{get_flag, set_flag, toggle_flag};
use linkman::uuid_hex::{decode, decode_uuid, encode, encode_uuid};
use linkman::HexError;
use uuid::Uuid;

#[test]
fn test_encode_example() {
    assert_eq!(encode(0x1, 0x2), "00000000000000010000000000000002");
}

#[test]
fn test_round_trip_representative_pairs() {
    for (most, least) in [(0, 0), (-1, -1), (1, 0), (0, 1)] {
        assert_eq!(decode(&encode(most, least)).unwrap(), (most, least));
    }
}

#[test]
fn test_decode_leniency_and_rejections() {
    assert_eq!(decode("1").unwrap(), (0, 1));
    assert_eq!(decode(""), Err(HexError::Empty));
    assert!(matches!(
        decode(&"A".repeat(33)),
        Err(HexError::TooLong { len: 33 })
    ));
    assert!(matches!(decode("ZZ"), Err(HexError::InvalidDigit { .. })));
}

#[test]
fn test_short_input_normalizes_on_reencode() {
    let (most, least) = decode("abc").unwrap();
    assert_eq!(encode(most, least), "00000000000000000000000000000ABC");
}

#[test]
fn test_random_uuids_round_trip() {
    for _ in 0..32 {
        let uuid = Uuid::new_v4();
        let text = encode_uuid(&uuid);
        assert_eq!(text.len(), 32);
        assert_eq!(decode_uuid(&text).unwrap(), uuid);
    }
}

#[test]
fn test_flag_examples() {
    assert_eq!(set_flag(0b0000, 0b0101, true), 0b0101);
    assert_eq!(set_flag(0b0101, 0b0100, false), 0b0001);
    assert_eq!(toggle_flag(0b0101, 0b0001), 0b0100);
    assert!(get_flag(0b0101, 0b0100));
}
