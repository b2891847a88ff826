use proptest::prelude::*;

use powchain_types::{Address, Amount, BlockHash, Timestamp};

proptest! {
    /// BlockHash hex form round-trips through parsing.
    #[test]
    fn block_hash_hex_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        let parsed = BlockHash::from_hex(&hash.to_hex()).unwrap();
        prop_assert_eq!(parsed, hash);
    }

    /// BlockHash::is_zero is true only for all-zero bytes.
    #[test]
    fn block_hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// The zero-digit count agrees with the textual hex form.
    #[test]
    fn leading_zero_digits_match_hex(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        let expected = hash.to_hex().chars().take_while(|c| *c == '0').count();
        prop_assert_eq!(hash.leading_zero_digits(), expected);
    }

    /// BlockHash JSON serialization roundtrip.
    #[test]
    fn block_hash_json_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        let encoded = serde_json::to_string(&hash).unwrap();
        let decoded: BlockHash = serde_json::from_str(&encoded).unwrap();
        prop_assert_eq!(decoded, hash);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// Amount checked_add agrees with u64 checked_add.
    #[test]
    fn amount_checked_add(a in any::<u64>(), b in any::<u64>()) {
        let sum = Amount::new(a).checked_add(Amount::new(b));
        prop_assert_eq!(sum.map(|s| s.raw()), a.checked_add(b));
    }

    /// Only the literal sentinel is treated as the system issuer.
    #[test]
    fn only_sentinel_is_system(name in "[A-Za-z]{1,12}") {
        let addr = Address::new(name.clone());
        prop_assert_eq!(addr.is_system(), name == Address::SYSTEM);
    }
}
