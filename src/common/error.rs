//! Crate-level error type.
//!
//! Loader and configuration failures surface through `MipsError`. Simulation
//! fatal conditions (undefined instruction, unknown syscall) are not errors
//! in this sense — they print a diagnostic and terminate the process, matching
//! the reference implementation's behavior exactly.

use std::fmt;

/// Errors that can occur while configuring or loading a simulation run.
#[derive(Debug)]
pub enum MipsError {
    /// The configuration or program-image file could not be read.
    Io(String),
    /// The TOML configuration could not be parsed.
    Config(String),
    /// The program image did not match the expected section layout.
    Image(String),
}

impl fmt::Display for MipsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MipsError::Io(msg) => write!(f, "I/O error: {msg}"),
            MipsError::Config(msg) => write!(f, "configuration error: {msg}"),
            MipsError::Image(msg) => write!(f, "program image error: {msg}"),
        }
    }
}

impl std::error::Error for MipsError {}

impl From<std::io::Error> for MipsError {
    fn from(err: std::io::Error) -> Self {
        MipsError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for MipsError {
    fn from(err: toml::de::Error) -> Self {
        MipsError::Config(err.to_string())
    }
}
