//! Phase 2: scans `<basename>.am`, builds the symbol table and the
//! instruction/data images, and collects pending label references.
//!
//! Grounded in `original_source/first_pass.c`.

use super::context::{Fatal, PassContext};
use super::directives;
use super::encode::Opcode;
use super::instruction::encode_instruction;
use super::statement::{has_early_colon, register_number};
use super::symbol::{Linkage, SymbolKind};
use crate::logging;
use crate::macro_expander::table::MacroTable;
use crate::macro_expander::validate::is_reserved_word;
use crate::util::split_first_token;
use std::fs;

/// Outcome of a first pass that completed without a fatal error. Carries
/// everything the second pass needs.
pub struct PassOutcome {
    pub ctx: PassContext,
}

pub fn run_first_pass(basename: &str, macros: &MacroTable) -> Result<PassOutcome, Fatal> {
    let path = format!("{basename}.am");
    let source = fs::read_to_string(&path)?;
    let mut ctx = PassContext::new(format!("{basename}.am"));

    for (idx, raw_line) in source.lines().enumerate() {
        ctx.line_number = idx + 1;

        if raw_line.starts_with(';') {
            continue;
        }

        let line_p = raw_line.trim_start();
        if line_p.starts_with(';') {
            ctx.report_error("A comment line begin with a semicolon, not a blank character");
            continue;
        }
        if line_p.is_empty() {
            continue;
        }

        process_line(&mut ctx, macros, line_p)?;
    }

    for symbol in ctx.symbols.iter() {
        if symbol.kind == SymbolKind::Unknown {
            let line = symbol.address as usize;
            ctx.had_error = true;
            logging::diagnostic(
                &ctx.file_label,
                line,
                format!(
                    "A label was declared internal and was not defined in this file: {}",
                    symbol.name
                ),
            );
        }
    }

    Ok(PassOutcome { ctx })
}

fn process_line(ctx: &mut PassContext, macros: &MacroTable, line_p: &str) -> Result<(), Fatal> {
    let (first_token, after_first) = split_first_token(line_p);

    let mut label_name: Option<String> = None;
    let mut rest_of_line = line_p;

    let mut had_label_token = false;
    if let Some(candidate) = first_token.strip_suffix(':') {
        if candidate.is_empty() {
            ctx.report_error("Missing name label");
            return Ok(());
        }
        if !validate_label_declaration(ctx, macros, candidate) {
            return Ok(());
        }
        label_name = Some(candidate.to_string());
        rest_of_line = after_first;
        had_label_token = true;
    }

    let rest_of_line = rest_of_line.trim_start();
    if rest_of_line.is_empty() {
        ctx.report_error("No content after label");
        return Ok(());
    }

    if let Some(directive_body) = rest_of_line.strip_prefix('.') {
        return process_directive(ctx, label_name.as_deref(), directive_body);
    }

    // Only meaningful once we know the line isn't a directive: a colon
    // found before the first whitespace run, when that token wasn't
    // already accepted as a label, means a label-looking prefix too long
    // to have been captured whole by the fixed-width token scan.
    if !had_label_token && has_early_colon(first_token) {
        ctx.report_error("Invalid label length");
        return Ok(());
    }

    process_instruction(ctx, label_name.as_deref(), rest_of_line)
}

/// Syntax + conflict validation for a label about to be declared,
/// mirroring `is_valid_label`.
fn validate_label_declaration(ctx: &mut PassContext, macros: &MacroTable, name: &str) -> bool {
    if !name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        ctx.report_error("Invalid label name - first character must be a letter");
        return false;
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        ctx.report_error("Invalid label name - A valid label name contains only numbers or letters");
        return false;
    }
    if let Some(existing) = ctx.symbols.get(name) {
        if existing.kind != SymbolKind::Unknown {
            ctx.report_error("A label with the same name already exists");
            return false;
        }
    }
    if register_number(name).is_some() {
        ctx.report_error("The label name is invalid - it is a register name");
        return false;
    }
    if is_reserved_word(name) {
        ctx.report_error("The label name is invalid - it is a reserved word");
        return false;
    }
    if macros.contains(name) {
        ctx.report_error("The label name is invalid - it is a macro name");
        return false;
    }
    true
}

fn process_directive(ctx: &mut PassContext, label_name: Option<&str>, body: &str) -> Result<(), Fatal> {
    if body.is_empty() {
        ctx.report_error("No command and parameters");
        return Ok(());
    }
    if body.starts_with(char::is_whitespace) {
        ctx.report_error("There is a blank character after the period");
        return Ok(());
    }

    let (name, after_name) = split_first_token(body);

    if name == "entry" {
        process_entry_directive(ctx, after_name);
        return Ok(());
    }
    if name == "extern" {
        process_extern_directive(ctx, after_name);
        return Ok(());
    }

    let rest = after_name.trim_start();
    if rest.is_empty() {
        ctx.report_error("Missing parameters");
        return Ok(());
    }

    if let Some(label) = label_name {
        ctx.declare_definition(label, SymbolKind::Data);
    }

    match name {
        "data" => directives::data_cmd(ctx, rest),
        "string" => directives::string_cmd(ctx, rest),
        "mat" => directives::mat_cmd(ctx, rest),
        _ => {
            ctx.report_error("Invalid command name");
            Ok(())
        }
    }
}

fn process_entry_directive(ctx: &mut PassContext, after_name: &str) {
    let (target, after_target) = split_first_token(after_name.trim_start());
    if target.is_empty() {
        ctx.report_error("Missing label name after declaration");
        return;
    }
    if let Some(existing) = ctx.symbols.get(target) {
        match (existing.kind, existing.linkage) {
            (_, Linkage::External) => {
                ctx.report_error("A label with this name is defined as external");
                return;
            }
            (SymbolKind::Unknown, _) => {
                // already pending as an entry; nothing more to do
            }
            (_, Linkage::Entry) => {
                logging::warning(format!("label '{target}' is already declared as an entry"));
            }
            (_, Linkage::Regular) => {
                ctx.symbols.mark_entry(target);
            }
        }
    } else {
        ctx.declare_entry_placeholder(target);
    }
    if !after_target.trim_start().is_empty() {
        ctx.report_error("Additional character(s) received after label name");
    }
}

fn process_extern_directive(ctx: &mut PassContext, after_name: &str) {
    let (target, after_target) = split_first_token(after_name.trim_start());
    if target.is_empty() {
        ctx.report_error("Missing label name after declaration");
        return;
    }
    if ctx.symbols.contains(target) {
        ctx.report_error("A label with this name is defined as internal");
        return;
    }
    ctx.declare_external(target);
    if !after_target.trim_start().is_empty() {
        ctx.report_error("Additional character(s) received after label name");
    }
}

fn process_instruction(ctx: &mut PassContext, label_name: Option<&str>, line: &str) -> Result<(), Fatal> {
    let (name, after_name) = split_first_token(line);

    if let Some(label) = label_name {
        ctx.declare_definition(label, SymbolKind::Instruction);
    }

    let opcode = match Opcode::from_name(name) {
        Some(op) => op,
        None => {
            ctx.report_error("Invalid command name");
            return Ok(());
        }
    };

    encode_instruction(ctx, opcode, after_name.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> PassOutcome {
        let macros = MacroTable::new();
        let mut ctx = PassContext::new("t.am");
        for (idx, raw_line) in source.lines().enumerate() {
            ctx.line_number = idx + 1;
            let line_p = raw_line.trim_start();
            if line_p.is_empty() || line_p.starts_with(';') {
                continue;
            }
            process_line(&mut ctx, &macros, line_p).unwrap();
        }
        PassOutcome { ctx }
    }

    #[test]
    fn label_on_instruction_is_declared_at_current_ic() {
        let outcome = run("LOOP: add r1, r2\njmp LOOP\n");
        let sym = outcome.ctx.symbols.get("LOOP").unwrap();
        assert_eq!(sym.kind, SymbolKind::Instruction);
        assert_eq!(sym.address, 0);
    }

    #[test]
    fn extern_label_is_resolved_with_are_external_later() {
        let outcome = run(".extern FOO\njmp FOO\n");
        let sym = outcome.ctx.symbols.get("FOO").unwrap();
        assert_eq!(sym.linkage, Linkage::External);
        assert_eq!(outcome.ctx.pending.len(), 1);
    }

    #[test]
    fn entry_before_definition_creates_unknown_placeholder() {
        let outcome = run(".entry LOOP\nLOOP: add r1, r2\n");
        let sym = outcome.ctx.symbols.get("LOOP").unwrap();
        assert_eq!(sym.kind, SymbolKind::Instruction);
        assert_eq!(sym.linkage, Linkage::Entry);
    }

    #[test]
    fn undefined_entry_is_flagged_as_error() {
        let outcome = run(".entry NEVER_DEFINED\n");
        assert!(outcome.ctx.had_error);
    }

    #[test]
    fn duplicate_label_declaration_is_an_error() {
        let outcome = run("X: add r1, r2\nX: sub r1, r2\n");
        assert!(outcome.ctx.had_error);
    }

    #[test]
    fn matrix_directive_zero_fills() {
        let outcome = run("M: .mat [2][2] 1, 2\n");
        assert_eq!(outcome.ctx.data_image, vec![1, 2, 0, 0]);
    }

    #[test]
    fn label_is_declared_even_when_instruction_mnemonic_is_invalid() {
        let outcome = run("LOOP: frobnicate\njmp LOOP\n");
        assert!(outcome.ctx.had_error);
        let sym = outcome.ctx.symbols.get("LOOP").unwrap();
        assert_eq!(sym.kind, SymbolKind::Instruction);
        assert_eq!(outcome.ctx.pending.len(), 1);
    }

    #[test]
    fn whitespace_after_period_is_reported_even_for_entry_like_names() {
        let outcome = run(".  entry LOOP\n");
        assert!(outcome.ctx.had_error);
        assert!(outcome.ctx.symbols.get("LOOP").is_none());
    }

    #[test]
    fn early_colon_check_does_not_apply_to_directive_lines() {
        let outcome = run(".fo:o 5\n");
        assert!(outcome.ctx.had_error);
        assert!(outcome.ctx.data_image.is_empty());
    }
}
