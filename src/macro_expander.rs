//! Phase 1: expands `mcro`/`mcroend` blocks into an inlined `.am` file
//!
//! Reads `<basename>.as`, recognizes macro declarations and invocations,
//! and writes `<basename>.am` with every invocation replaced by the
//! macro's captured body. Grounded in `original_source/pre_assembler.c`.
//!
//! Comments (`;`) and blank lines are always copied straight through to
//! the output, even while a macro body is being captured — the original
//! implementation's scan dispatches on them before it checks whether a
//! macro block is open, so they never end up inside a captured body.

pub mod table;
pub mod validate;

use crate::logging;
use crate::util::{logical_len, split_first_token};
use std::fs;
use table::MacroTable;
use validate::parse_macro_start;

/// A normal source line may not exceed this many logical characters.
pub const MAX_LINE_LENGTH: usize = 80;

/// Expand `<basename>.as` into `<basename>.am`.
///
/// On success, returns the [MacroTable] so the first pass can forbid macro
/// names from being reused as labels. On failure, `<basename>.am` is not
/// left on disk and diagnostics have already been printed to stderr.
pub fn expand_file(basename: &str) -> Result<MacroTable, ()> {
    let input_path = format!("{basename}.as");
    let output_path = format!("{basename}.am");

    let source = fs::read_to_string(&input_path).map_err(|_| {
        logging::error(format!("Cannot open input file: {input_path}"));
    })?;

    match expand(&source, &input_path) {
        Ok((expanded, table)) => fs::write(&output_path, expanded)
            .map(|_| table)
            .map_err(|_| logging::error(format!("Cannot create output file: {output_path}"))),
        Err(()) => {
            let _ = fs::remove_file(&output_path);
            Err(())
        }
    }
}

/// A macro body being accumulated between `mcro` and `mcroend`.
struct OpenMacro {
    /// `None` when the declaration itself was invalid — lines are still
    /// captured (to keep scanning past the error) but discarded at `mcroend`.
    name: Option<String>,
    lines: Vec<String>,
}

fn expand(source: &str, file_label: &str) -> Result<(String, MacroTable), ()> {
    let mut table = MacroTable::new();
    let mut had_error = false;
    let mut output = String::new();
    let mut open: Option<OpenMacro> = None;
    let mut last_line_number = 0;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_number = idx + 1;
        last_line_number = line_number;
        let line_with_newline = format!("{raw_line}\n");

        if logical_len(raw_line) > MAX_LINE_LENGTH {
            logging::diagnostic(file_label, line_number, "Line too long");
            had_error = true;
            continue;
        }

        if raw_line.is_empty() || raw_line.starts_with(';') {
            output.push_str(&line_with_newline);
            continue;
        }

        let (first_token, _rest) = split_first_token(raw_line);

        if first_token == "mcro" {
            if open.is_some() {
                logging::diagnostic(file_label, line_number, "Nested macros not supported");
                had_error = true;
            }
            let name = match parse_macro_start(raw_line, &table) {
                Ok(name) => Some(name),
                Err(err) => {
                    logging::diagnostic(file_label, line_number, err.message());
                    had_error = true;
                    None
                }
            };
            open = Some(OpenMacro { name, lines: Vec::new() });
            continue;
        }

        if first_token == "mcroend" {
            if raw_line.split_whitespace().count() != 1 {
                logging::diagnostic(
                    file_label,
                    line_number,
                    "Unexpected token(s) after 'mcroend'",
                );
                had_error = true;
            }
            match open.take() {
                Some(block) => {
                    if block.lines.is_empty() {
                        logging::diagnostic(file_label, line_number, "Empty macro is not allowed");
                        had_error = true;
                    }
                    if let Some(name) = block.name {
                        table.insert(name, block.lines);
                    }
                }
                None => {
                    logging::diagnostic(
                        file_label,
                        line_number,
                        "'mcroend' without matching 'mcro'",
                    );
                    had_error = true;
                }
            }
            continue;
        }

        if let Some(block) = open.as_mut() {
            block.lines.push(line_with_newline);
            continue;
        }

        match table.lookup(first_token) {
            Some(body) => {
                for body_line in body {
                    output.push_str(body_line);
                }
            }
            None => output.push_str(&line_with_newline),
        }
    }

    if open.is_some() {
        logging::diagnostic(file_label, last_line_number, "Macro not closed before end of file");
        had_error = true;
    }

    if had_error {
        Err(())
    } else {
        Ok((output, table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> Result<(String, MacroTable), ()> {
        expand(source, "test.as")
    }

    #[test]
    fn invocation_is_replaced_verbatim_with_captured_body() {
        let source = "mcro M1\n    add r1, r2\nmcroend\nM1\n";
        let (expanded, _) = run(source).unwrap();
        assert_eq!(expanded, "    add r1, r2\n");
    }

    #[test]
    fn comments_and_blanks_pass_through_even_inside_macro() {
        let source = "mcro M1\n; a note\nadd r1, r2\n\nmcroend\nM1\n";
        let (expanded, _) = run(source).unwrap();
        assert_eq!(expanded, "; a note\n\nadd r1, r2\n");
    }

    #[test]
    fn empty_macro_body_is_rejected() {
        let source = "mcro M1\nmcroend\n";
        assert!(run(source).is_err());
    }

    #[test]
    fn unclosed_macro_is_rejected() {
        let source = "mcro M1\nadd r1, r2\n";
        assert!(run(source).is_err());
    }

    #[test]
    fn duplicate_macro_name_is_rejected() {
        let source = "mcro M1\nadd r1, r2\nmcroend\nmcro M1\nadd r3, r4\nmcroend\n";
        assert!(run(source).is_err());
    }

    #[test]
    fn reserved_word_cannot_be_a_macro_name() {
        let source = "mcro mov\nadd r1, r2\nmcroend\n";
        assert!(run(source).is_err());
    }

    #[test]
    fn overlong_line_is_rejected_but_scanning_continues() {
        let long_line = "a".repeat(100);
        let source = format!("{long_line}\nadd r1, r2\n");
        assert!(run(&source).is_err());
    }

    #[test]
    fn non_macro_lines_are_copied_through_unchanged() {
        let source = "add r1, r2\nmov r0, #5\n";
        let (expanded, _) = run(source).unwrap();
        assert_eq!(expanded, source);
    }
}
