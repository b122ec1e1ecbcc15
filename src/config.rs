//! TOML configuration for the core, memory hierarchy, and caches.
//!
//! Mirrors the teacher crate's `#[serde(default = "fn_name")]` per-optional-
//! field pattern: every field has a sensible default so a mostly-empty
//! config file is valid.

use serde::Deserialize;

use crate::common::MipsError;

const DEFAULT_TEXT_BASE: u32 = 0x0400_0000;
const DEFAULT_DATA_BASE: u32 = 0x1000_0000;
const DEFAULT_START_PC: u32 = DEFAULT_TEXT_BASE;
const DEFAULT_BACKEND_LATENCY: u32 = 2;
const DEFAULT_REG_SEED: u32 = 0x1234_5678;
const DEFAULT_MEM_SEED: u32 = 0x9e37_79b9;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub icache: CacheConfig,
    #[serde(default)]
    pub dcache: CacheConfig,
}

impl Config {
    /// Loads and parses a config file; a missing file is not an error here —
    /// callers decide whether to fall back to `Config::default()`.
    pub fn load(path: &std::path::Path) -> Result<Self, MipsError> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&text)?;
        Ok(config)
    }
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_start_pc")]
    pub start_pc: String,
    #[serde(default = "default_text_base")]
    pub text_base: String,
    #[serde(default = "default_data_base")]
    pub data_base: String,
    #[serde(default = "default_reg_seed")]
    pub reg_seed: u32,
    #[serde(default)]
    pub trace: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            start_pc: default_start_pc(),
            text_base: default_text_base(),
            data_base: default_data_base(),
            reg_seed: default_reg_seed(),
            trace: false,
        }
    }
}

impl GeneralConfig {
    pub fn start_pc_val(&self) -> u32 {
        parse_hex(&self.start_pc, DEFAULT_START_PC)
    }

    pub fn text_base_val(&self) -> u32 {
        parse_hex(&self.text_base, DEFAULT_TEXT_BASE)
    }

    pub fn data_base_val(&self) -> u32 {
        parse_hex(&self.data_base, DEFAULT_DATA_BASE)
    }
}

#[derive(Debug, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_backend_ports")]
    pub ports: usize,
    #[serde(default = "default_backend_latency")]
    pub latency: u32,
    #[serde(default = "default_mem_seed")]
    pub seed: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            ports: default_backend_ports(),
            latency: default_backend_latency(),
            seed: default_mem_seed(),
        }
    }
}

/// Cache kind selection for one port (spec §4.3-§4.5).
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CacheKind {
    PassThrough,
    DirectMapped,
    SetAssociative,
}

#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_kind")]
    pub kind: CacheKind,
    #[serde(default = "default_cache_size")]
    pub size: usize,
    #[serde(default = "default_line_size")]
    pub line_size: usize,
    #[serde(default = "default_ways")]
    pub ways: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            kind: default_cache_kind(),
            size: default_cache_size(),
            line_size: default_line_size(),
            ways: default_ways(),
        }
    }
}

fn parse_hex(s: &str, default: u32) -> u32 {
    let s = s.trim_start_matches("0x");
    u32::from_str_radix(s, 16).unwrap_or(default)
}

fn default_start_pc() -> String {
    format!("{DEFAULT_START_PC:#x}")
}

fn default_text_base() -> String {
    format!("{DEFAULT_TEXT_BASE:#x}")
}

fn default_data_base() -> String {
    format!("{DEFAULT_DATA_BASE:#x}")
}

fn default_reg_seed() -> u32 {
    DEFAULT_REG_SEED
}

fn default_backend_ports() -> usize {
    2
}

fn default_backend_latency() -> u32 {
    DEFAULT_BACKEND_LATENCY
}

fn default_mem_seed() -> u32 {
    DEFAULT_MEM_SEED
}

fn default_cache_kind() -> CacheKind {
    CacheKind::PassThrough
}

fn default_cache_size() -> usize {
    4096
}

fn default_line_size() -> usize {
    16
}

fn default_ways() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses_hex_bases() {
        let cfg = Config::default();
        assert_eq!(cfg.general.text_base_val(), DEFAULT_TEXT_BASE);
        assert_eq!(cfg.general.data_base_val(), DEFAULT_DATA_BASE);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let toml_text = "[general]\ntrace = true\n";
        let cfg: Config = toml::from_str(toml_text).unwrap();
        assert!(cfg.general.trace);
        assert_eq!(cfg.memory.ports, default_backend_ports());
    }

    #[test]
    fn cache_kind_parses_from_kebab_case() {
        let toml_text = "[icache]\nkind = \"direct-mapped\"\nsize = 1024\n";
        let cfg: Config = toml::from_str(toml_text).unwrap();
        assert_eq!(cfg.icache.kind, CacheKind::DirectMapped);
        assert_eq!(cfg.icache.size, 1024);
    }
}
