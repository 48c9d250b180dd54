//! Owned per-file pass state
//!
//! The original implementation tracks `ic`, `dc`, `line_count`, `error`,
//! and `was_reg` as module-level globals shared across both passes
//! (`first_pass.c`). Here they live on one struct, constructed fresh per
//! input file and threaded through both passes explicitly.

use super::symbol::{Linkage, SymbolKind, SymbolTable};
use crate::logging;

/// Total words of memory available to instructions and data combined.
pub const MEM_AVAIL_WORDS: usize = 156;

/// Absolute address the instruction image is loaded at.
pub const ORIGIN: u16 = 100;

/// Valid range for `.data`/`.mat` values (10-bit signed).
pub const DATA_MIN: i32 = -512;
pub const DATA_MAX: i32 = 511;

/// Valid range for instruction immediate values (8-bit signed).
pub const IMM_MIN: i32 = -128;
pub const IMM_MAX: i32 = 127;

/// A forward label reference awaiting resolution in the second pass.
#[derive(Debug, Clone)]
pub struct PendingRef {
    pub label_name: String,
    pub word_index: usize,
    pub source_line: usize,
}

/// Unrecoverable condition: abort this file's first pass immediately.
///
/// The original's memory-exhaustion and `realloc` failure paths both
/// return `FATAL_ERROR`; since a `Vec` has no meaningful "allocation
/// failed, try to recover" path in Rust, only the logical capacity limit
/// survives here as fatal.
#[derive(Debug)]
pub enum Fatal {
    MemoryExhausted,
    Io(std::io::Error),
}

impl From<std::io::Error> for Fatal {
    fn from(err: std::io::Error) -> Self {
        Fatal::Io(err)
    }
}

impl std::fmt::Display for Fatal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fatal::MemoryExhausted => write!(f, "memory capacity exhausted"),
            Fatal::Io(err) => write!(f, "{err}"),
        }
    }
}

pub struct PassContext {
    pub symbols: SymbolTable,
    pub pending: Vec<PendingRef>,
    pub instruction_image: Vec<u16>,
    pub data_image: Vec<u16>,
    pub was_reg: bool,
    pub had_error: bool,
    pub line_number: usize,
    pub file_label: String,
}

impl PassContext {
    pub fn new(file_label: impl Into<String>) -> Self {
        PassContext {
            symbols: SymbolTable::new(),
            pending: Vec::new(),
            instruction_image: Vec::new(),
            data_image: Vec::new(),
            was_reg: false,
            had_error: false,
            line_number: 0,
            file_label: file_label.into(),
        }
    }

    /// Report a diagnostic tied to the current line and flag this file as
    /// having a non-fatal error (second pass still runs, but no output is
    /// kept — spec §5).
    pub fn report_error(&mut self, message: impl AsRef<str>) {
        self.had_error = true;
        logging::diagnostic(&self.file_label, self.line_number, message);
    }

    fn words_used(&self) -> usize {
        self.instruction_image.len() + self.data_image.len()
    }

    /// Append one word to the instruction image, returning its index.
    pub fn push_instruction_word(&mut self, word: u16) -> Result<usize, Fatal> {
        if self.words_used() >= MEM_AVAIL_WORDS {
            self.report_error("There are no free cells in memory");
            return Err(Fatal::MemoryExhausted);
        }
        self.instruction_image.push(word);
        Ok(self.instruction_image.len() - 1)
    }

    /// Append one word to the data image, returning its index.
    pub fn push_data_word(&mut self, word: u16) -> Result<usize, Fatal> {
        if self.words_used() >= MEM_AVAIL_WORDS {
            self.report_error("There are no free cells in memory");
            return Err(Fatal::MemoryExhausted);
        }
        self.data_image.push(word);
        Ok(self.data_image.len() - 1)
    }

    pub fn add_pending(&mut self, label_name: impl Into<String>, word_index: usize) {
        self.pending.push(PendingRef {
            label_name: label_name.into(),
            word_index,
            source_line: self.line_number,
        });
    }

    /// Declare a label seen as an instruction/data definition. Address is
    /// the current image length (the definition's offset within its
    /// section), finalizing any `.entry` placeholder of the same name.
    pub fn declare_definition(&mut self, name: &str, kind: SymbolKind) -> bool {
        let address = match kind {
            SymbolKind::Data => self.data_image.len() as u16,
            SymbolKind::Instruction => self.instruction_image.len() as u16,
            SymbolKind::Unknown => unreachable!("definitions are never Unknown"),
        };
        if self.symbols.contains(name) {
            self.symbols.declare(name, kind, Linkage::Entry, address)
        } else {
            self.symbols.declare(name, kind, Linkage::Regular, address)
        }
    }

    /// Declare an `.entry` placeholder for a label not yet seen, using the
    /// declaring line number as its address (only read back if the label
    /// is never defined, for the end-of-pass diagnostic).
    pub fn declare_entry_placeholder(&mut self, name: &str) -> bool {
        self.symbols
            .declare(name, SymbolKind::Unknown, Linkage::Entry, self.line_number as u16)
    }

    /// Declare an `.extern` label; its address is irrelevant until the
    /// second pass, which always treats it as value 0.
    pub fn declare_external(&mut self, name: &str) -> bool {
        self.symbols.declare(name, SymbolKind::Instruction, Linkage::External, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_instruction_word_tracks_combined_capacity() {
        let mut ctx = PassContext::new("t.am");
        for _ in 0..MEM_AVAIL_WORDS {
            ctx.push_instruction_word(0).unwrap();
        }
        assert!(matches!(ctx.push_data_word(0), Err(Fatal::MemoryExhausted)));
        assert!(ctx.had_error);
    }

    #[test]
    fn declare_definition_uses_current_image_length_as_address() {
        let mut ctx = PassContext::new("t.am");
        ctx.push_instruction_word(0).unwrap();
        ctx.declare_definition("LOOP", SymbolKind::Instruction);
        assert_eq!(ctx.symbols.get("LOOP").unwrap().address, 1);
    }
}
