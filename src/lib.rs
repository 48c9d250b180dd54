//! A three-phase assembler for a 10-bit-word virtual machine, featuring:
//! - a macro expander (`mcro`/`mcroend` block inlining)
//! - a two-pass translator (symbol table, images, pending references)
//! - base-4 object/entry/external file emission

pub mod assembler;
pub mod logging;
pub mod macro_expander;
pub mod util;
