//! Writeback (spec §4.11): stages the register file write and scoreboard
//! release rather than applying them live, so that Decode (which runs later
//! in this same tick's reverse execution order) still observes last tick's
//! committed state. `Cpu::tick` applies `pending_rf_writes` and
//! `pending_scoreboard_releases` at tick end.

use crate::core::Cpu;
use crate::isa::Mnemonic;

pub fn writeback(cpu: &mut Cpu) -> String {
    let dinst = match cpu.m2w.take() {
        Some(d) => d,
        None => return " ".to_string(),
    };

    if dinst.squashed {
        return "- squashed".to_string();
    }

    if dinst.mnemonic == Mnemonic::Syscall {
        cpu.pending_block_d_clear = true;
    }

    if dinst.wb_en {
        if let Some(val) = dinst.wb_data {
            for &r in &dinst.dep_w {
                cpu.pending_rf_writes.push((r, val));
                cpu.pending_scoreboard_releases.push(r);
            }
        }
    }

    cpu.instruction_completed = true;
    cpu.last_retired = Some(dinst.mnemonic);
    format!("W {:?}", dinst.mnemonic)
}
