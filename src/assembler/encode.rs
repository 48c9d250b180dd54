//! Opcodes, addressing modes, and 10-bit word encoding
//!
//! Grounded in `original_source/first_pass.h` (shift constants) and
//! `instruction_handling.c` (title word / operand word layouts).
//!
//! The original dispatches the set of legal addressing modes per opcode
//! through a variadic-argument call at each call site
//! (`parse_encode_arguments(..., num_addr_modes, ...)`); here that
//! dispatch is a single static table indexed by `(Opcode, OperandPosition)`.

/// Lowest/highest valid register number.
pub const MIN_REG: u8 = 0;
pub const MAX_REG: u8 = 7;

/// One of the sixteen instruction opcodes. Declared in the same order as
/// the original's `OPCODES` enum — `as u16` must keep matching that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Mov,
    Cmp,
    Add,
    Sub,
    Lea,
    Clr,
    Not,
    Inc,
    Dec,
    Jmp,
    Bne,
    Jsr,
    Red,
    Prn,
    Rts,
    Stop,
}

impl Opcode {
    pub fn from_name(name: &str) -> Option<Opcode> {
        use Opcode::*;
        Some(match name {
            "mov" => Mov,
            "cmp" => Cmp,
            "add" => Add,
            "sub" => Sub,
            "lea" => Lea,
            "clr" => Clr,
            "not" => Not,
            "inc" => Inc,
            "dec" => Dec,
            "jmp" => Jmp,
            "bne" => Bne,
            "jsr" => Jsr,
            "red" => Red,
            "prn" => Prn,
            "rts" => Rts,
            "stop" => Stop,
            _ => return None,
        })
    }

    pub fn bits(self) -> u16 {
        self as u16
    }

    /// Number of operands this opcode takes: 2, 1, or 0.
    pub fn arity(self) -> usize {
        use Opcode::*;
        match self {
            Mov | Cmp | Add | Sub | Lea => 2,
            Clr | Not | Inc | Dec | Jmp | Bne | Jsr | Red | Prn => 1,
            Rts | Stop => 0,
        }
    }

    /// Addressing modes this opcode accepts at `position`, in the order
    /// the original's varargs list them (irrelevant here since lookup is
    /// by membership, not position).
    pub fn allowed_modes(self, position: OperandPosition) -> &'static [AddressingMode] {
        use AddressingMode::*;
        use Opcode::*;
        use OperandPosition::*;
        match (self, position) {
            (Mov, Source) | (Add, Source) | (Sub, Source) | (Cmp, Source) | (Cmp, Destination) => {
                &[Immediate, Direct, Matrix, Register]
            }
            (Lea, Source) => &[Direct, Matrix],
            (Mov, Destination) | (Add, Destination) | (Sub, Destination) | (Lea, Destination) => {
                &[Direct, Matrix, Register]
            }
            (Prn, Destination) => &[Immediate, Direct, Matrix, Register],
            (Clr, Destination)
            | (Not, Destination)
            | (Inc, Destination)
            | (Dec, Destination)
            | (Jmp, Destination)
            | (Bne, Destination)
            | (Jsr, Destination)
            | (Red, Destination) => &[Direct, Matrix, Register],
            _ => &[],
        }
    }
}

/// Which operand slot is being encoded — affects both the legal
/// addressing modes and the register-packing behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandPosition {
    Source,
    Destination,
}

/// How an operand's value is supplied. Declared in the same order as the
/// original's `ADDRESS` enum (the bit pattern written into a title word's
/// src/dst fields depends on this order).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Immediate,
    Direct,
    Matrix,
    Register,
}

/// A word's ARE attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Are {
    Absolute = 0,
    External = 1,
    Relocatable = 2,
}

/// Build an instruction's title word: opcode in bits 9:6, source
/// addressing mode in bits 5:4, destination addressing mode in bits 3:2.
/// ARE is always `Absolute` for a title word.
pub fn title_word(opcode: Opcode, src_mode: Option<AddressingMode>, dst_mode: Option<AddressingMode>) -> u16 {
    let opcode_bits = opcode.bits() << 6;
    let src_bits = src_mode.map(|m| (m as u16) << 4).unwrap_or(0);
    let dst_bits = dst_mode.map(|m| (m as u16) << 2).unwrap_or(0);
    opcode_bits | src_bits | dst_bits
}

/// Encode an immediate operand word: the 8-bit signed value in bits 9:2,
/// ARE absolute.
pub fn immediate_word(value: i16) -> u16 {
    let byte = (value as i8) as u8;
    (byte as u16) << 2
}

/// Encode a register word when the register is a source operand.
pub fn register_src_word(reg: u8) -> u16 {
    (reg as u16) << 6
}

/// Encode a register word when the register is a destination operand.
pub fn register_dst_word(reg: u8) -> u16 {
    (reg as u16) << 2
}

/// OR a destination register into a word that already holds a packed
/// source register (the `was_reg` merge case).
pub fn merge_register_dst(existing_word: u16, reg: u8) -> u16 {
    existing_word | register_dst_word(reg)
}

/// Encode a matrix operand's register-index word: row register in bits
/// 9:6, column register in bits 5:2.
pub fn matrix_index_word(row_reg: u8, col_reg: u8) -> u16 {
    ((row_reg as u16) << 6) | ((col_reg as u16) << 2)
}

/// Patch a resolved label reference into a placeholder word: the 8-bit
/// address/value in bits 9:2, ARE in bits 1:0.
pub fn patch_word(are: Are, value_8bit: u8) -> u16 {
    ((value_8bit as u16) << 2) | (are as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_word_packs_opcode_and_modes() {
        let word = title_word(Opcode::Mov, Some(AddressingMode::Register), Some(AddressingMode::Direct));
        assert_eq!(word, (Opcode::Mov.bits() << 6) | (3 << 4) | (1 << 2));
    }

    #[test]
    fn immediate_word_handles_negative_values() {
        let word = immediate_word(-1);
        assert_eq!(word, (0xFFu16) << 2);
    }

    #[test]
    fn register_words_pack_into_distinct_fields() {
        assert_eq!(register_src_word(5), 5 << 6);
        assert_eq!(register_dst_word(5), 5 << 2);
    }

    #[test]
    fn merge_register_dst_ors_into_existing_word() {
        let src_word = register_src_word(3);
        let merged = merge_register_dst(src_word, 6);
        assert_eq!(merged, (3 << 6) | (6 << 2));
    }

    #[test]
    fn patch_word_encodes_value_and_are() {
        let word = patch_word(Are::Relocatable, 7);
        assert_eq!(word, (7 << 2) | 2);
    }
}
