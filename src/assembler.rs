//! Three-phase assembler for a 10-bit-word virtual machine: macro
//! expansion, a two-pass translator, and base-4 object-file emission.
//!
//! ```ignore
//! LOOP:   mov r1, r2
//!         add #5, r1
//!         jmp LOOP
//! .entry LOOP
//! .extern PRINTER
//! ```
//!
//! Source files are given as a basename without extension; `assemble_file`
//! reads `<basename>.as`, and on success writes `<basename>.ob` (always),
//! `<basename>.ent` (if any label is an entry point), and `<basename>.ext`
//! (if any external label is referenced).

pub mod context;
pub mod directives;
pub mod encode;
pub mod first_pass;
pub mod instruction;
pub mod second_pass;
pub mod statement;
pub mod symbol;

use context::Fatal;
use first_pass::run_first_pass;
use second_pass::run_second_pass;

/// Run all three phases for one source file.
///
/// Returns `Ok(true)` if `.ob` (and possibly `.ent`/`.ext`) were written,
/// `Ok(false)` if the file had errors that were reported but were not
/// fatal to the overall run. `Err(Fatal)` propagates a capacity or I/O
/// failure that should abort the whole run, not just this file.
pub fn assemble_file(basename: &str) -> Result<bool, Fatal> {
    let macros = match crate::macro_expander::expand_file(basename) {
        Ok(macros) => macros,
        Err(()) => return Ok(false),
    };
    let outcome = run_first_pass(basename, &macros)?;
    run_second_pass(basename, outcome)
}
