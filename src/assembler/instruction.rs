//! Instruction encoding: operand parsing and the title-word-first dispatch
//! for two-, one-, and zero-operand instructions.
//!
//! Grounded in `original_source/instruction_handling.c` (`handle_two_prms`,
//! `handle_one_prm`, `handle_no_prm`, `parse_encode_arguments`).

use super::context::{Fatal, PassContext, IMM_MAX, IMM_MIN};
use super::encode::{self, AddressingMode, Opcode, OperandPosition};
use super::statement::{comma_separated_tokens, register_number, validate_commas};

/// Encode one instruction line's operands and patch its title word.
///
/// Reports non-fatal errors through `ctx` and returns `Ok(())` in every
/// case except an unrecoverable capacity failure — matching the
/// original's "report and keep scanning" policy for malformed statements.
pub fn encode_instruction(ctx: &mut PassContext, opcode: Opcode, rest: &str) -> Result<(), Fatal> {
    let arity = opcode.arity();
    if arity == 0 {
        return encode_zero_operand(ctx, opcode, rest);
    }
    if !validate_commas(rest, ctx) {
        return Ok(());
    }
    let tokens = comma_separated_tokens(rest);

    match arity {
        1 => encode_one_operand(ctx, opcode, &tokens),
        2 => encode_two_operand(ctx, opcode, &tokens),
        _ => unreachable!("opcodes only take 0, 1, or 2 operands"),
    }
}

/// Zero-operand opcodes take no comma-separated token list at all — the
/// original's `handle_no_prm` reads the next whitespace-delimited token
/// with `strtok(NULL, " \t\n")`, which never splits on commas. A literal
/// `","` token only ever shows up as a leftover comma right after the
/// command name; anything else left over is an unnecessary parameter.
fn encode_zero_operand(ctx: &mut PassContext, opcode: Opcode, rest: &str) -> Result<(), Fatal> {
    ctx.push_instruction_word(encode::title_word(opcode, None, None))?;
    let rest = rest.trim_start();
    if rest.starts_with(',') {
        ctx.report_error("There is an extra comma after the command name");
    } else if !rest.is_empty() {
        ctx.report_error("There are unnecessary parameter(s)");
    }
    Ok(())
}

fn encode_one_operand(ctx: &mut PassContext, opcode: Opcode, tokens: &[&str]) -> Result<(), Fatal> {
    let title_index = ctx.push_instruction_word(0)?;

    let Some(&token) = tokens.first() else {
        ctx.report_error("Missing parameter");
        return Ok(());
    };

    let dst_mode = match encode_operand(ctx, token, OperandPosition::Destination, opcode)? {
        Some(mode) => mode,
        None => return Ok(()),
    };

    if tokens.len() > 1 {
        ctx.report_error("There are unnecessary parameter(s)");
        return Ok(());
    }

    ctx.instruction_image[title_index] = encode::title_word(opcode, None, Some(dst_mode));
    Ok(())
}

fn encode_two_operand(ctx: &mut PassContext, opcode: Opcode, tokens: &[&str]) -> Result<(), Fatal> {
    let title_index = ctx.push_instruction_word(0)?;

    let mut modes: [Option<AddressingMode>; 2] = [None, None];
    let positions = [OperandPosition::Source, OperandPosition::Destination];

    for (i, position) in positions.into_iter().enumerate() {
        let Some(&token) = tokens.get(i) else {
            ctx.report_error(if i == 0 { "Missing parameters" } else { "Missing parameter" });
            return Ok(());
        };
        match encode_operand(ctx, token, position, opcode)? {
            Some(mode) => modes[i] = Some(mode),
            None => return Ok(()),
        }
    }
    ctx.was_reg = false;

    if tokens.len() > 2 {
        ctx.report_error("There are unnecessary parameter(s)");
        return Ok(());
    }

    ctx.instruction_image[title_index] = encode::title_word(opcode, modes[0], modes[1]);
    Ok(())
}

/// Parse and emit one operand's word(s), returning its addressing mode.
///
/// `Ok(None)` means a non-fatal error was already reported; the caller
/// should stop processing this statement's remaining operands.
fn encode_operand(
    ctx: &mut PassContext,
    token: &str,
    position: OperandPosition,
    opcode: Opcode,
) -> Result<Option<AddressingMode>, Fatal> {
    let mode = classify_operand(token);

    if !opcode.allowed_modes(position).contains(&mode) {
        ctx.report_error(match position {
            OperandPosition::Source => "The source parameter type does not match the command",
            OperandPosition::Destination => "The destination parameter type does not match the command",
        });
        return Ok(None);
    }

    match mode {
        AddressingMode::Immediate => {
            let value = match parse_immediate(&token[1..]) {
                Some(v) => v,
                None => {
                    ctx.report_error("The parameter is invalid - expecting an integer to be received");
                    return Ok(None);
                }
            };
            ctx.push_instruction_word(encode::immediate_word(value as i16))?;
        }
        AddressingMode::Direct => {
            let index = ctx.push_instruction_word(0)?;
            ctx.add_pending(token, index);
        }
        AddressingMode::Matrix => {
            let Some((name, bracket_part)) = split_matrix_name(token) else {
                ctx.report_error("Matrix name is missing");
                return Ok(None);
            };
            let index = ctx.push_instruction_word(0)?;
            ctx.add_pending(name, index);

            let (row_tok, col_tok) = match split_index_brackets(bracket_part) {
                Some(pair) => pair,
                None => {
                    ctx.report_error("Missing opening bracket or another character was received");
                    return Ok(None);
                }
            };
            let row = match parse_bracket_register(row_tok) {
                Ok(r) => r,
                Err(msg) => {
                    ctx.report_error(msg);
                    return Ok(None);
                }
            };
            let col = match parse_bracket_register(col_tok) {
                Ok(c) => c,
                Err(msg) => {
                    ctx.report_error(msg);
                    return Ok(None);
                }
            };
            ctx.push_instruction_word(encode::matrix_index_word(row, col))?;
        }
        AddressingMode::Register => {
            let reg = register_number(token).expect("classify_operand already confirmed this");
            match position {
                OperandPosition::Source => {
                    ctx.was_reg = true;
                    ctx.push_instruction_word(encode::register_src_word(reg))?;
                }
                OperandPosition::Destination => {
                    if ctx.was_reg {
                        let last = ctx.instruction_image.last_mut().expect("source word was just pushed");
                        *last = encode::merge_register_dst(*last, reg);
                    } else {
                        ctx.push_instruction_word(encode::register_dst_word(reg))?;
                    }
                }
            }
        }
    }
    Ok(Some(mode))
}

fn classify_operand(token: &str) -> AddressingMode {
    if token.starts_with('#') {
        AddressingMode::Immediate
    } else if register_number(token).is_some() {
        AddressingMode::Register
    } else if token.contains(['[', ']']) {
        AddressingMode::Matrix
    } else {
        AddressingMode::Direct
    }
}

fn parse_immediate(digits: &str) -> Option<i32> {
    let value: i32 = digits.parse().ok()?;
    if (IMM_MIN..=IMM_MAX).contains(&value) {
        Some(value)
    } else {
        None
    }
}

fn split_matrix_name(token: &str) -> Option<(&str, &str)> {
    let idx = token.find(['[', ']'])?;
    if idx == 0 {
        return None;
    }
    let (name, bracket_part) = token.split_at(idx);
    if !bracket_part.starts_with('[') {
        return None;
    }
    Some((name, bracket_part))
}

fn split_index_brackets(s: &str) -> Option<(&str, &str)> {
    let rest = s.strip_prefix('[')?;
    let (row_tok, rest) = rest.split_once(']')?;
    let rest = rest.strip_prefix('[')?;
    let (col_tok, rest) = rest.split_once(']')?;
    if !rest.is_empty() {
        return None;
    }
    Some((row_tok, col_tok))
}

fn parse_bracket_register(tok: &str) -> Result<u8, &'static str> {
    if !tok.starts_with('r') {
        return Err("Using an array expects to receive only register names as parameters, inside []");
    }
    match register_number(tok) {
        Some(n) => Ok(n),
        None => Err("A register with this name does not exist"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_register_operands_share_one_word() {
        let mut ctx = PassContext::new("t.am");
        encode_instruction(&mut ctx, Opcode::Mov, "r2, r3").unwrap();
        assert_eq!(ctx.instruction_image.len(), 2);
        let operand_word = ctx.instruction_image[1];
        assert_eq!(operand_word, encode::register_src_word(2) | encode::register_dst_word(3));
    }

    #[test]
    fn direct_operand_pushes_placeholder_and_pending_ref() {
        let mut ctx = PassContext::new("t.am");
        encode_instruction(&mut ctx, Opcode::Jmp, "LOOP").unwrap();
        assert_eq!(ctx.instruction_image, vec![0, 0]);
        assert_eq!(ctx.pending.len(), 1);
        assert_eq!(ctx.pending[0].label_name, "LOOP");
        assert_eq!(ctx.pending[0].word_index, 1);
    }

    #[test]
    fn immediate_out_of_range_is_non_fatal_error() {
        let mut ctx = PassContext::new("t.am");
        encode_instruction(&mut ctx, Opcode::Mov, "#999, r1").unwrap();
        assert!(ctx.had_error);
    }

    #[test]
    fn matrix_operand_emits_pending_ref_then_index_word() {
        let mut ctx = PassContext::new("t.am");
        encode_instruction(&mut ctx, Opcode::Mov, "M1[r2][r3], r0").unwrap();
        assert_eq!(ctx.pending[0].label_name, "M1");
        assert_eq!(ctx.instruction_image[2], encode::matrix_index_word(2, 3));
    }

    #[test]
    fn matrix_operand_rejects_leading_zero_register_index() {
        let mut ctx = PassContext::new("t.am");
        encode_instruction(&mut ctx, Opcode::Mov, "M1[r02][r3], r0").unwrap();
        assert!(ctx.had_error);
    }

    #[test]
    fn zero_operand_instruction_rejects_extra_tokens() {
        let mut ctx = PassContext::new("t.am");
        encode_instruction(&mut ctx, Opcode::Stop, "r1").unwrap();
        assert!(ctx.had_error);
    }

    #[test]
    fn zero_operand_instruction_rejects_trailing_comma() {
        let mut ctx = PassContext::new("t.am");
        encode_instruction(&mut ctx, Opcode::Stop, ",").unwrap();
        assert!(ctx.had_error);
        assert_eq!(ctx.instruction_image.len(), 1);
    }

    #[test]
    fn lea_rejects_immediate_source() {
        let mut ctx = PassContext::new("t.am");
        encode_instruction(&mut ctx, Opcode::Lea, "#5, r1").unwrap();
        assert!(ctx.had_error);
    }
}
