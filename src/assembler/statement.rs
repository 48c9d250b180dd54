//! Line-level tokenizing and syntax validation shared by both directive
//! and instruction handling.
//!
//! Grounded in `original_source/first_pass_utils.c` (`is_reg_name`,
//! `there_is_colon`) and `data_handling.c` (`is_valid_commas`).

use super::context::PassContext;
use super::encode::{MAX_REG, MIN_REG};
use crate::macro_expander::validate::is_reserved_word;

/// Longest permitted label name, in characters.
pub const MAX_LABEL_LEN: usize = 30;

/// If `token` names a register, return its number. The original matches
/// against the eight exact strings `"r0"`..`"r7"` with `strcmp`, so a
/// leading-zero spelling like `"r007"` is not a register name at all —
/// only a single digit after the `r` counts.
pub fn register_number(token: &str) -> Option<u8> {
    let digits = token.strip_prefix('r')?;
    if digits.len() != 1 {
        return None;
    }
    let n: u8 = digits.parse().ok()?;
    if (MIN_REG..=MAX_REG).contains(&n) {
        Some(n)
    } else {
        None
    }
}

/// Syntactic validity only: first char a letter, the rest letters/digits,
/// within the length limit. Conflicts (duplicates, reserved words,
/// register names, macro names) are checked separately by the caller,
/// which has access to the symbol table and macro table.
pub fn is_valid_label_syntax(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_LABEL_LEN {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

/// Whether `name` may legally be declared as a label: valid syntax, not a
/// register name, not a reserved word.
pub fn is_declarable_label_name(name: &str) -> bool {
    is_valid_label_syntax(name) && register_number(name).is_none() && !is_reserved_word(name)
}

/// Detects a colon before the first whitespace run — used to reject a
/// line whose label-looking prefix is too long to have been captured in
/// full by the fixed-width first-token scan.
pub fn has_early_colon(line: &str) -> bool {
    line.chars().take_while(|c| !c.is_whitespace()).any(|c| c == ':')
}

/// Validate comma placement between a directive/instruction's operand
/// tokens: no leading/trailing/doubled commas, and no missing comma
/// between two bare tokens separated only by whitespace.
pub fn validate_commas(rest: &str, ctx: &mut PassContext) -> bool {
    if rest.is_empty() {
        return true;
    }
    let mut expect_comma = false;
    let mut was_space = false;
    for (i, c) in rest.char_indices() {
        if c == ',' {
            if !expect_comma {
                if i == 0 {
                    ctx.report_error("There is a comma before parameters");
                } else {
                    ctx.report_error("There is more than one comma between parameters");
                }
                return false;
            }
            expect_comma = false;
        } else if c.is_whitespace() {
            was_space = true;
        } else if !expect_comma {
            expect_comma = true;
            was_space = false;
        } else if was_space {
            ctx.report_error("Missing comma between parameters");
            return false;
        }
    }
    if !expect_comma {
        ctx.report_error("There is a comma after all parameters");
        return false;
    }
    true
}

/// Split a comma/whitespace-validated operand list into its tokens.
pub fn comma_separated_tokens(rest: &str) -> Vec<&str> {
    rest.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|tok| !tok.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_number_accepts_r0_through_r7() {
        assert_eq!(register_number("r0"), Some(0));
        assert_eq!(register_number("r7"), Some(7));
        assert_eq!(register_number("r8"), None);
        assert_eq!(register_number("rx"), None);
    }

    #[test]
    fn register_number_rejects_leading_zero_spellings() {
        assert_eq!(register_number("r007"), None);
        assert_eq!(register_number("r00"), None);
        assert_eq!(register_number("r01"), None);
    }

    #[test]
    fn label_syntax_requires_leading_letter() {
        assert!(is_valid_label_syntax("LOOP1"));
        assert!(!is_valid_label_syntax("1LOOP"));
        assert!(!is_valid_label_syntax(""));
    }

    #[test]
    fn declarable_label_excludes_registers_and_reserved_words() {
        assert!(!is_declarable_label_name("r3"));
        assert!(!is_declarable_label_name("mov"));
        assert!(is_declarable_label_name("COUNTER"));
    }

    #[test]
    fn early_colon_detects_oversize_label_prefix() {
        assert!(has_early_colon("TOOLONGLABELNAME:"));
        assert!(!has_early_colon("mov r1, r2"));
    }

    #[test]
    fn validate_commas_rejects_leading_comma() {
        let mut ctx = PassContext::new("t.am");
        assert!(!validate_commas(",5,6", &mut ctx));
    }

    #[test]
    fn validate_commas_rejects_missing_comma() {
        let mut ctx = PassContext::new("t.am");
        assert!(!validate_commas("5 6", &mut ctx));
    }

    #[test]
    fn validate_commas_accepts_well_formed_list() {
        let mut ctx = PassContext::new("t.am");
        assert!(validate_commas("5, 6, 7", &mut ctx));
    }

    #[test]
    fn comma_separated_tokens_splits_on_commas_and_spaces() {
        assert_eq!(comma_separated_tokens("5, 6,7"), vec!["5", "6", "7"]);
    }
}
