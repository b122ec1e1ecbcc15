//! Shared types, constants, and error handling.
//!
//! Provides the fundamental `Word` helpers, the architectural register file,
//! and the error type used by the loader and configuration layers.

mod error;
mod reg;
mod word;

pub use error::MipsError;
pub use reg::RegisterFile;
pub use word::{sext, signed, zext};

/// A 32-bit MIPS machine word.
pub type Word = u32;
