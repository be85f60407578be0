/// Digits, then lowercase, then uppercase letters.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Encodes `value` in base62, most significant digit first.
pub fn encode(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(11);
    while value > 0 {
        digits.push(ALPHABET[(value % 62) as usize]);
        value /= 62;
    }
    digits.reverse();

    // Every byte comes from ALPHABET, which is ASCII.
    digits.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_zero() {
        assert_eq!(encode(0), "0");
    }

    #[test]
    fn encodes_single_digits() {
        assert_eq!(encode(9), "9");
        assert_eq!(encode(10), "a");
        assert_eq!(encode(35), "z");
        assert_eq!(encode(36), "A");
        assert_eq!(encode(61), "Z");
    }

    #[test]
    fn carries_into_next_digit() {
        assert_eq!(encode(62), "10");
        assert_eq!(encode(62 * 62 - 1), "ZZ");
        assert_eq!(encode(62 * 62), "100");
    }

    #[test]
    fn encodes_max_value() {
        assert_eq!(encode(u64::MAX), "lYGhA16ahyf");
    }
}
