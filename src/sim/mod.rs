//! Program loading and top-level simulation wiring (spec §5, §6).

pub mod loader;
pub mod system;

pub use loader::ProgramImage;
pub use system::System;
