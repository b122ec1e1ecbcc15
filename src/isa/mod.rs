//! MIPS32 instruction set definitions and the decoder.
//!
//! This is the "consumed" ISA table: the assembler and the authoritative
//! encoding source live outside this crate's core responsibility, but the
//! mnemonic table, operand syntax, and decoder the pipeline relies on are
//! still implemented and tested here.

mod decode;
pub mod encode;
mod mnemonic;
mod regnames;

pub use decode::{decode, DecodedFields};
pub use mnemonic::{Mnemonic, Operand};
pub use regnames::register_index;
