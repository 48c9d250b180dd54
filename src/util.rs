//! Small string and number-formatting helpers shared by every phase
//!
//! Grounded in `original_source/second_pass_utils.c` (`to_base4_word`,
//! `to_base4_addr`) and `first_pass_utils.c` (`delete_white`,
//! `copy_first_word`), re-expressed as `&str`-based helpers instead of
//! fixed C buffers.

/// The four base-4 digit characters, in order.
const QUAD_DIGITS: [char; 4] = ['a', 'b', 'c', 'd'];

/// Format a 10-bit word as exactly 5 base-4 digits, most significant first.
///
/// Only the low 10 bits of `value` are considered.
pub fn word_to_base4(value: u16) -> String {
    to_base4_fixed_width(value as u32 & 0x3FF, 5)
}

/// Format an absolute address as exactly 4 base-4 digits, most significant
/// first.
pub fn addr_to_base4(value: u16) -> String {
    to_base4_fixed_width(value as u32, 4)
}

fn to_base4_fixed_width(mut value: u32, width: usize) -> String {
    let mut digits = vec!['a'; width];
    for slot in digits.iter_mut().rev() {
        *slot = QUAD_DIGITS[(value % 4) as usize];
        value /= 4;
    }
    digits.into_iter().collect()
}

/// Decode a fixed-width base-4 string back into its integer value.
///
/// Used only by tests to assert the round-trip property from the spec's
/// testable properties section. Unknown characters are treated as zero.
#[cfg(test)]
pub fn base4_to_value(digits: &str) -> u32 {
    digits.chars().fold(0, |acc, c| {
        let d = QUAD_DIGITS.iter().position(|&q| q == c).unwrap_or(0) as u32;
        acc * 4 + d
    })
}

/// Split a line into its first whitespace-delimited token and the
/// (trimmed) remainder, mirroring `copy_first_word` + `delete_white`.
pub fn split_first_token(line: &str) -> (&str, &str) {
    let trimmed = line.trim_start();
    match trimmed.find(char::is_whitespace) {
        Some(idx) => (&trimmed[..idx], trimmed[idx..].trim_start()),
        None => (trimmed, ""),
    }
}

/// Number of logical characters in a line, excluding the trailing newline.
pub fn logical_len(line: &str) -> usize {
    line.strip_suffix('\n').unwrap_or(line).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_encodes_five_digits() {
        assert_eq!(word_to_base4(0), "aaaaa");
        assert_eq!(word_to_base4(0x3FF), "ddddd");
    }

    #[test]
    fn addr_encodes_four_digits() {
        let encoded = addr_to_base4(100);
        assert_eq!(encoded.len(), 4);
        assert_eq!(base4_to_value(&encoded), 100);
    }

    #[test]
    fn base4_round_trips() {
        for v in [0u16, 1, 42, 255, 511, 1023] {
            let word = v & 0x3FF;
            let encoded = word_to_base4(word);
            assert_eq!(base4_to_value(&encoded), word as u32);
        }
    }

    #[test]
    fn split_first_token_handles_leading_whitespace() {
        assert_eq!(split_first_token("  mov r1, r2"), ("mov", "r1, r2"));
        assert_eq!(split_first_token("lone"), ("lone", ""));
        assert_eq!(split_first_token(""), ("", ""));
    }
}
