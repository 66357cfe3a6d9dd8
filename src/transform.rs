//! Byte obfuscation between caller-visible plaintext and stored bytes.
//!
//! Every byte is XORed with a fixed one-byte key. The transform is:
//! - **Stateless**: no key schedule, no position dependence
//! - **Length-preserving**: output length equals input length
//! - **Self-inverse**: applying it twice yields the original bytes
//!
//! # Security Notes
//!
//! This is obfuscation only. A single-byte XOR key is trivially recovered
//! from any known plaintext and offers no confidentiality.

/// Fixed obfuscation key
pub const KEY: u8 = 0x41;

/// Transform a single byte
#[inline]
#[must_use]
pub fn transform_byte(byte: u8) -> u8 {
    byte ^ KEY
}

/// Transform a byte slice into a new vector
#[must_use]
pub fn transform(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().map(|&b| transform_byte(b)).collect()
}

/// Transform a byte slice in place
pub fn apply_in_place(bytes: &mut [u8]) {
    for b in bytes.iter_mut() {
        *b = transform_byte(*b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_vector() {
        // 'H' = 0x48, 0x48 ^ 0x41 = 0x09
        assert_eq!(transform(b"HELLO"), vec![0x09, 0x04, 0x0d, 0x0d, 0x0e]);
    }

    #[test]
    fn test_key_byte_maps_to_zero() {
        assert_eq!(transform_byte(KEY), 0);
        assert_eq!(transform_byte(0), KEY);
    }

    #[test]
    fn test_in_place_matches_copying() {
        let mut data = b"obfuscate me".to_vec();
        let expected = transform(&data);
        apply_in_place(&mut data);
        assert_eq!(data, expected);
    }

    #[test]
    fn test_empty_input() {
        assert!(transform(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_transform_is_involution(b in any::<u8>()) {
            prop_assert_eq!(transform_byte(transform_byte(b)), b);
        }

        #[test]
        fn prop_transform_preserves_length(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let once = transform(&data);
            prop_assert_eq!(once.len(), data.len());
            prop_assert_eq!(transform(&once), data);
        }
    }
}
