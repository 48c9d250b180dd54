//! `.data`, `.string`, and `.mat` directive handlers
//!
//! `.entry`/`.extern` are handled directly by the first pass since they
//! manipulate the symbol table rather than an image — see
//! `original_source/first_pass.c`, which special-cases them the same way
//! before falling through to this module's table of directive handlers.
//!
//! Grounded in `original_source/data_handling.c`.

use super::context::{Fatal, PassContext, DATA_MAX, DATA_MIN};
use super::statement::validate_commas;
use crate::util::split_first_token;

/// `.data 7, -3, 12`
pub fn data_cmd(ctx: &mut PassContext, rest: &str) -> Result<(), Fatal> {
    if !validate_commas(rest, ctx) {
        return Ok(());
    }
    for token in rest.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
        match parse_data_num(token) {
            Some(value) => {
                ctx.push_data_word(value as u16 & 0x3FF)?;
            }
            None => {
                ctx.report_error("The parameter is invalid - expecting an integer to be received");
                break;
            }
        }
    }
    Ok(())
}

/// `.string "hello"`
pub fn string_cmd(ctx: &mut PassContext, rest: &str) -> Result<(), Fatal> {
    let trimmed_end = rest.trim_end();
    if !trimmed_end.starts_with('"') {
        ctx.report_error("Invalid string - missing opening quotes");
        return Ok(());
    }
    if trimmed_end.len() < 2 || !trimmed_end.ends_with('"') {
        ctx.report_error("Invalid string - missing closing quotes");
        return Ok(());
    }
    let body = &trimmed_end[1..trimmed_end.len() - 1];
    for ch in body.chars() {
        if (32..127).contains(&(ch as u32)) {
            ctx.push_data_word(ch as u16)?;
        } else {
            ctx.report_error("Invalid string - invisible character");
            return Ok(());
        }
    }
    ctx.push_data_word(0)?;
    Ok(())
}

/// `.mat [2][2] 1, 2, 3, 4` — missing cells are zero-filled; extra values
/// overflow into an error.
pub fn mat_cmd(ctx: &mut PassContext, rest: &str) -> Result<(), Fatal> {
    let (mat_def, after_def) = split_first_token(rest);

    let (rows, cols) = match parse_data_dimensions(mat_def) {
        Ok(dims) => dims,
        Err(msg) => {
            ctx.report_error(msg);
            return Ok(());
        }
    };

    let mut remaining = (rows as usize) * (cols as usize);
    if remaining == 0 {
        ctx.report_error("A matrix of size zero is invalid");
        return Ok(());
    }

    if !validate_commas(after_def, ctx) {
        return Ok(());
    }

    let tokens: Vec<&str> = after_def
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    let mut overflowed = false;
    for token in &tokens {
        if remaining == 0 {
            overflowed = true;
            break;
        }
        match parse_data_num(token) {
            Some(value) => {
                ctx.push_data_word(value as u16 & 0x3FF)?;
                remaining -= 1;
            }
            None => {
                ctx.report_error("The parameter is invalid - expecting an integer to be received");
                return Ok(());
            }
        }
    }

    if overflowed {
        ctx.report_error("There are unnecessary parameter(s), overflow from the defined matrix");
        return Ok(());
    }

    for _ in 0..remaining {
        ctx.push_data_word(0)?;
    }
    Ok(())
}

fn parse_data_num(token: &str) -> Option<i32> {
    let value: i32 = token.parse().ok()?;
    if (DATA_MIN..=DATA_MAX).contains(&value) {
        Some(value)
    } else {
        None
    }
}

/// Parse a `.mat` directive's `[rows][cols]` size prefix (decimal
/// literals, unlike the `[r<i>][r<i>]` register-index syntax used by a
/// matrix *operand*).
fn parse_data_dimensions(def: &str) -> Result<(u16, u16), &'static str> {
    let rest = def.strip_prefix('[').ok_or("Missing opening bracket or another character was received")?;
    let (row_tok, rest) = rest.split_once(']').ok_or("Missing closing bracket or another character was received")?;
    let rest = rest.strip_prefix('[').ok_or("Missing opening bracket or another character was received")?;
    let (col_tok, rest) = rest.split_once(']').ok_or("Missing closing bracket or another character was received")?;
    if !rest.is_empty() {
        return Err("An extra character appears after a matrix definition");
    }
    let rows: u16 = row_tok.parse().map_err(|_| "A number is missing or a different character was received")?;
    let cols: u16 = col_tok.parse().map_err(|_| "A number is missing or a different character was received")?;
    Ok((rows, cols))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_cmd_pushes_each_value() {
        let mut ctx = PassContext::new("t.am");
        data_cmd(&mut ctx, "1, 2, -3").unwrap();
        assert_eq!(ctx.data_image.len(), 3);
    }

    #[test]
    fn data_cmd_rejects_out_of_range_value() {
        let mut ctx = PassContext::new("t.am");
        data_cmd(&mut ctx, "99999").unwrap();
        assert!(ctx.had_error);
    }

    #[test]
    fn string_cmd_appends_null_terminator() {
        let mut ctx = PassContext::new("t.am");
        string_cmd(&mut ctx, "\"hi\"").unwrap();
        assert_eq!(ctx.data_image, vec!['h' as u16, 'i' as u16, 0]);
    }

    #[test]
    fn string_cmd_rejects_missing_quotes() {
        let mut ctx = PassContext::new("t.am");
        string_cmd(&mut ctx, "hi\"").unwrap();
        assert!(ctx.had_error);
    }

    #[test]
    fn mat_cmd_zero_fills_missing_cells() {
        let mut ctx = PassContext::new("t.am");
        mat_cmd(&mut ctx, "[2][2] 1, 2").unwrap();
        assert_eq!(ctx.data_image, vec![1, 2, 0, 0]);
    }

    #[test]
    fn mat_cmd_rejects_overflow() {
        let mut ctx = PassContext::new("t.am");
        mat_cmd(&mut ctx, "[1][1] 1, 2").unwrap();
        assert!(ctx.had_error);
    }
}
