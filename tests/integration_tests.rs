//! End-to-end scenarios driving the whole pipeline through `System`: a
//! small hand-assembled program is loaded into backend memory and ticked to
//! completion, then the architectural state is checked.

use mips_pipeline_sim::config::{CacheConfig, CacheKind, Config};
use mips_pipeline_sim::isa::{encode, Mnemonic};
use mips_pipeline_sim::sim::loader::Section;
use mips_pipeline_sim::sim::{ProgramImage, System};

const MAX_TICKS: u32 = 100_000;

fn assemble(words: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for word in words {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    bytes
}

fn run_to_exit(config: &Config, words: &[u32]) -> System {
    let image = ProgramImage {
        text: Section {
            base_addr: config.general.text_base_val(),
            bytes: assemble(words),
        },
        data: Section {
            base_addr: config.general.data_base_val(),
            bytes: Vec::new(),
        },
    };
    let mut system = System::new(config);
    system.load_image(&image);
    for _ in 0..MAX_TICKS {
        system.tick();
        if system.exit_status().is_some() {
            return system;
        }
    }
    panic!("program did not exit within {MAX_TICKS} ticks");
}

fn upper(addr: u32) -> u32 {
    addr >> 16
}

fn lower(addr: u32) -> u32 {
    addr & 0xffff
}

#[test]
fn hello_store_load_round_trips_through_data_memory() {
    let config = Config::default();
    let data_base = config.general.data_base_val();
    let words = [
        encode::i(Mnemonic::Lui, 2, 0, upper(data_base)),
        encode::i(Mnemonic::Addiu, 1, 0, 42),
        encode::i(Mnemonic::Sw, 1, 2, 0),
        encode::i(Mnemonic::Lw, 3, 2, 0),
        encode::r(Mnemonic::Addu, 4, 3, 0, 0),
        encode::i(Mnemonic::Addiu, 2, 0, 17),
        encode::r(Mnemonic::Syscall, 0, 0, 0, 0),
    ];
    let system = run_to_exit(&config, &words);
    assert_eq!(system.exit_status(), Some(42));
    assert_eq!(system.cpu().reg(3), 42);
}

#[test]
fn branch_taken_skips_the_intervening_instructions() {
    let config = Config::default();
    let words = [
        encode::i(Mnemonic::Addiu, 1, 0, 5),
        encode::i(Mnemonic::Addiu, 2, 0, 5),
        encode::i(Mnemonic::Beq, 1, 2, 2),
        encode::i(Mnemonic::Addiu, 4, 0, 111),
        encode::i(Mnemonic::Addiu, 4, 0, 222),
        encode::i(Mnemonic::Addiu, 4, 0, 333),
        encode::i(Mnemonic::Addiu, 2, 0, 17),
        encode::r(Mnemonic::Syscall, 0, 0, 0, 0),
    ];
    let system = run_to_exit(&config, &words);
    assert_eq!(system.exit_status(), Some(333));
}

#[test]
fn back_to_back_dependent_adds_forward_without_corrupting_results() {
    let config = Config::default();
    let words = [
        encode::i(Mnemonic::Addiu, 1, 0, 10),
        encode::r(Mnemonic::Addu, 2, 1, 1, 0),
        encode::r(Mnemonic::Addu, 3, 2, 2, 0),
        encode::r(Mnemonic::Addu, 4, 3, 0, 0),
        encode::i(Mnemonic::Addiu, 2, 0, 17),
        encode::r(Mnemonic::Syscall, 0, 0, 0, 0),
    ];
    let system = run_to_exit(&config, &words);
    assert_eq!(system.exit_status(), Some(40));
}

#[test]
fn load_use_hazard_stalls_until_the_loaded_value_is_ready() {
    let config = Config::default();
    let data_base = config.general.data_base_val();
    let words = [
        encode::i(Mnemonic::Lui, 2, 0, upper(data_base)),
        encode::i(Mnemonic::Addiu, 1, 0, 99),
        encode::i(Mnemonic::Sw, 1, 2, 0),
        encode::i(Mnemonic::Lw, 3, 2, 0),
        encode::r(Mnemonic::Addu, 4, 3, 0, 0),
        encode::i(Mnemonic::Addiu, 2, 0, 17),
        encode::r(Mnemonic::Syscall, 0, 0, 0, 0),
    ];
    let system = run_to_exit(&config, &words);
    assert_eq!(system.exit_status(), Some(99));
}

#[test]
fn direct_mapped_cache_misses_once_then_hits_on_repeat_access() {
    let config = Config {
        dcache: CacheConfig {
            kind: CacheKind::DirectMapped,
            size: 64,
            line_size: 16,
            ways: 1,
        },
        ..Config::default()
    };
    let data_base = config.general.data_base_val();
    let words = [
        encode::i(Mnemonic::Lui, 2, 0, upper(data_base)),
        encode::i(Mnemonic::Addiu, 1, 0, 7),
        encode::i(Mnemonic::Sw, 1, 2, 0),
        encode::i(Mnemonic::Lw, 3, 2, 0),
        encode::i(Mnemonic::Lw, 3, 2, 0),
        encode::r(Mnemonic::Addu, 4, 3, 0, 0),
        encode::i(Mnemonic::Addiu, 2, 0, 17),
        encode::r(Mnemonic::Syscall, 0, 0, 0, 0),
    ];
    let system = run_to_exit(&config, &words);
    assert_eq!(system.exit_status(), Some(7));
    assert_eq!(system.dcache_misses(), 1);
    assert!(system.dcache_hits() >= 2);
}

#[test]
fn jr_mispredict_squashes_the_fallthrough_path() {
    let config = Config::default();
    let text_base = config.general.text_base_val();
    let target = text_base + 0x1c;
    let words = [
        encode::i(Mnemonic::Lui, 5, 0, upper(target)),
        encode::i(Mnemonic::Ori, 5, 5, lower(target)),
        encode::r(Mnemonic::Jr, 0, 5, 0, 0),
        encode::i(Mnemonic::Addiu, 4, 0, 111),
        encode::i(Mnemonic::Addiu, 4, 0, 999),
        encode::i(Mnemonic::Addiu, 2, 0, 55),
        encode::r(Mnemonic::Syscall, 0, 0, 0, 0),
        encode::i(Mnemonic::Addiu, 4, 0, 222),
        encode::i(Mnemonic::Addiu, 2, 0, 17),
        encode::r(Mnemonic::Syscall, 0, 0, 0, 0),
    ];
    let system = run_to_exit(&config, &words);
    assert_eq!(system.exit_status(), Some(222));
    assert_eq!(system.cpu().reg(4), 222);
}
