//! Pretty-printing messages to the console
//!
//! Kept in the teacher's style (`colored` + bold prefixes to stderr), but
//! extended with the `File <name>, line <n>: <msg>` framing the assembler's
//! passes use, grounded in `original_source/first_pass_utils.c`'s
//! `report_error_pass` and `macro_utils.c`'s `report_error`.

use colored::Colorize;

/// Pretty-print a bare error message to the console
pub fn error(message: impl AsRef<str>) {
    let error_title = "error:".red().bold();
    eprintln!("{} {}", error_title, message.as_ref());
}

/// Pretty-print a bare warning message to the console
pub fn warning(message: impl AsRef<str>) {
    let warning_title = "warning:".yellow().bold();
    eprintln!("{} {}", warning_title, message.as_ref());
}

/// Pretty-print a diagnostic tied to a source line: `File <name>, line <n>: <msg>`
pub fn diagnostic(file_name: &str, line_number: usize, message: impl AsRef<str>) {
    let error_title = "error:".red().bold();
    eprintln!(
        "{} File {}, line {}: {}",
        error_title,
        file_name,
        line_number,
        message.as_ref()
    );
}
