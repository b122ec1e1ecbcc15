//! Fetch (spec §4.7): issues an I-cache request for the current PC, tagged
//! with the current epoch, and advances the PC speculatively. Never touches
//! the register file or the scoreboard.

use crate::core::pipeline::FetchLatch;
use crate::core::Cpu;
use crate::mem::cache::{MemOp, MemRequest};
use crate::mem::{Cache, MemoryBackend};

pub fn fetch(cpu: &mut Cpu, icache: &mut Cache, backend: &mut MemoryBackend) -> String {
    if cpu.f2d.is_some() {
        return "S <<<".to_string();
    }
    if !icache.can_req(backend) {
        return "S imem".to_string();
    }

    let pc = cpu.pc;
    let npc = pc.wrapping_add(4);
    icache.send_req(
        backend,
        MemRequest {
            op: MemOp::Read,
            addr: pc,
            size: 4,
            data: Vec::new(),
            mask: None,
            tag: cpu.epoch,
        },
    );
    cpu.f2d = Some(FetchLatch { pc, npc });
    cpu.pc = npc;
    format!("F {pc:#010x}")
}
