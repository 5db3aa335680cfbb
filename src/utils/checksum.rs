//! Additive checksums over raw byte values.
//!
//! These are self-verification tags for obfuscated fields, not integrity
//! protection. All three variants sum unsigned byte values and wrap silently.

/// Byte sum modulo 2^8, used by node hash tokens.
pub fn sum8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Low 16 bits of the byte sum, used by key information file names.
pub fn sum16(data: &[u8]) -> u16 {
    (sum32(data) & 0xFFFF) as u16
}

/// Byte sum modulo 2^32.
pub fn sum32(data: &[u8]) -> u32 {
    data.iter().fold(0u32, |acc, &b| acc.wrapping_add(u32::from(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sums_of_abc() {
        assert_eq!(sum32(b"abc"), 294);
        assert_eq!(sum16(b"abc"), 294);
        assert_eq!(sum8(b"abc"), (294 % 256) as u8);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sum8(&[]), 0);
        assert_eq!(sum16(&[]), 0);
        assert_eq!(sum32(&[]), 0);
    }

    #[test]
    fn test_sum16_is_low_half_of_sum32() {
        let data = vec![0xFFu8; 1000];
        assert_eq!(sum32(&data), 255_000);
        assert_eq!(u32::from(sum16(&data)), 255_000 & 0xFFFF);
    }

    #[test]
    fn test_sum32_wraps_at_two_pow_32() {
        // 2^32 = 16_843_009 * 255 + 1, so that many 0xFF bytes plus one 0x01
        // sum to exactly 2^32.
        let mut data = vec![0xFFu8; 16_843_009];
        data.push(0x01);
        assert_eq!(sum32(&data), 0);
        assert_eq!(sum16(&data), 0);
    }
}
