//! Difficulty validation.

use powchain_types::BlockHash;

/// Whether the first `difficulty` hex digits of `hash` are all `'0'`.
pub fn meets_difficulty(hash: &BlockHash, difficulty: usize) -> bool {
    hash.leading_zero_digits() >= difficulty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_difficulty_always_met() {
        assert!(meets_difficulty(&BlockHash::new([0xff; 32]), 0));
    }

    #[test]
    fn prefix_checked_per_digit() {
        let mut bytes = [0xffu8; 32];
        bytes[0] = 0x00;
        bytes[1] = 0x0f;
        let hash = BlockHash::new(bytes);
        assert!(meets_difficulty(&hash, 3));
        assert!(!meets_difficulty(&hash, 4));
    }

    #[test]
    fn full_width_difficulty_only_for_zero_hash() {
        assert!(meets_difficulty(&BlockHash::ZERO, BlockHash::HEX_LEN));
        assert!(!meets_difficulty(&BlockHash::new([1; 32]), BlockHash::HEX_LEN));
    }
}
