//! Phase 3: resolves pending label references and emits `.ob`/`.ent`/`.ext`
//!
//! Grounded in `original_source/second_pass.c` and `second_pass_utils.c`.
//! Outputs are built in memory and only written if no error occurred
//! anywhere in either pass — equivalent in final on-disk state to the
//! original's "write eagerly, then remove on error" approach, without the
//! transient file churn.

use super::context::{Fatal, PassContext, ORIGIN};
use super::encode::{self, Are};
use super::first_pass::PassOutcome;
use super::symbol::{Linkage, SymbolKind};
use crate::logging;
use crate::util::{addr_to_base4, word_to_base4};
use std::fs;

/// 8-bit operand value ceiling; an internal address that doesn't fit is a
/// non-fatal error (see the REDESIGN FLAGS section of the expanded spec).
const ADDR_VALUE_MAX: u32 = 0xFF;

/// `true` if output files were written, `false` if errors suppressed them.
pub fn run_second_pass(basename: &str, outcome: PassOutcome) -> Result<bool, Fatal> {
    let PassOutcome { mut ctx } = outcome;
    let ic_final = ctx.instruction_image.len();
    let mut had_error = ctx.had_error;
    let mut ext_lines = Vec::new();

    let pending = std::mem::take(&mut ctx.pending);
    for pref in &pending {
        let Some(symbol) = ctx.symbols.get(&pref.label_name) else {
            logging::error(format!(
                "undefined label '{}' (source line {})",
                pref.label_name, pref.source_line
            ));
            had_error = true;
            continue;
        };

        let word = if symbol.linkage == Linkage::External {
            ext_lines.push(format!("{} {}\n", symbol.name, addr_to_base4(ORIGIN + pref.word_index as u16)));
            encode::patch_word(Are::External, 0)
        } else {
            let abs_val: u32 = if symbol.kind == SymbolKind::Data {
                ORIGIN as u32 + ic_final as u32 + symbol.address as u32
            } else {
                ORIGIN as u32 + symbol.address as u32
            };
            if abs_val > ADDR_VALUE_MAX {
                had_error = true;
                logging::diagnostic(
                    &ctx.file_label,
                    pref.source_line,
                    format!("address of '{}' does not fit in the 8-bit operand field", symbol.name),
                );
            }
            encode::patch_word(Are::Relocatable, (abs_val & ADDR_VALUE_MAX) as u8)
        };
        ctx.instruction_image[pref.word_index] = word;
    }

    let mut ent_lines = Vec::new();
    for symbol in ctx.symbols.iter() {
        if symbol.linkage == Linkage::Entry && symbol.kind != SymbolKind::Unknown {
            let abs_addr = if symbol.kind == SymbolKind::Data {
                ORIGIN + ic_final as u16 + symbol.address
            } else {
                ORIGIN + symbol.address
            };
            ent_lines.push(format!("{} {}\n", symbol.name, addr_to_base4(abs_addr)));
        }
    }

    if had_error {
        let _ = fs::remove_file(format!("{basename}.ob"));
        let _ = fs::remove_file(format!("{basename}.ent"));
        let _ = fs::remove_file(format!("{basename}.ext"));
        return Ok(false);
    }

    let mut ob = format!(" {} {}\n", addr_to_base4(ic_final as u16), addr_to_base4(ctx.data_image.len() as u16));
    for (i, &word) in ctx.instruction_image.iter().enumerate() {
        ob.push_str(&format!("{}\t{}\n", addr_to_base4(ORIGIN + i as u16), word_to_base4(word)));
    }
    for (i, &word) in ctx.data_image.iter().enumerate() {
        ob.push_str(&format!("{}\t{}\n", addr_to_base4(ORIGIN + ic_final as u16 + i as u16), word_to_base4(word)));
    }
    fs::write(format!("{basename}.ob"), ob)?;

    if !ent_lines.is_empty() {
        fs::write(format!("{basename}.ent"), ent_lines.concat())?;
    }
    if !ext_lines.is_empty() {
        fs::write(format!("{basename}.ext"), ext_lines.concat())?;
    }

    Ok(true)
}
