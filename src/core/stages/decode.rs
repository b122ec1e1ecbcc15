//! Decode (spec §4.8): receives the buffered I-cache response, discards
//! wrong-path fetches by epoch, discovers register dependencies, resolves
//! reads against the forwarding snapshot (stalling when not forwardable),
//! claims scoreboard writes, and computes direct-jump targets.

use crate::core::pipeline::{DecodedInst, Forward, ForwardingSnapshot};
use crate::core::Cpu;
use crate::isa::{self, Mnemonic, Operand};
use crate::mem::{Cache, MemoryBackend};

pub fn decode(
    cpu: &mut Cpu,
    snapshot: &ForwardingSnapshot,
    icache: &mut Cache,
    backend: &mut MemoryBackend,
) -> String {
    if cpu.d2x.is_some() {
        return "S <<<".to_string();
    }
    let latch = match cpu.f2d {
        Some(l) => l,
        None => return " ".to_string(),
    };
    if cpu.block_d {
        return "S sys".to_string();
    }

    if cpu.fetch_resp_buf.is_none() {
        if icache.has_resp(backend) {
            cpu.fetch_resp_buf = Some(icache.recv_resp(backend));
        } else {
            return "S imem".to_string();
        }
    }

    let resp = cpu.fetch_resp_buf.as_ref().unwrap();
    let word = u32::from_le_bytes([resp.data[0], resp.data[1], resp.data[2], resp.data[3]]);
    let squashed = resp.tag < cpu.epoch || cpu.pending_squash.is_some();

    let fields = isa::decode(word);
    let mut dinst = build_decoded_inst(&fields, word, latch.pc, latch.npc);

    if squashed {
        dinst.squashed = true;
        cpu.fetch_resp_buf = None;
        cpu.f2d = None;
        cpu.d2x = Some(dinst);
        return "- squashed".to_string();
    }

    let (reads_rs, reads_rt, write_rt) = operand_flags(fields.mnemonic, fields.rt as usize);
    let write_rd = operand_writes_rd(fields.mnemonic, fields.rd) || fields.mnemonic == Mnemonic::Jal;
    let rd_target = if fields.mnemonic == Mnemonic::Jal { 31 } else { fields.rd as usize };

    if write_rd {
        dinst.dep_w.push(rd_target);
    }
    if write_rt {
        dinst.dep_w.push(fields.rt as usize);
    }
    if reads_rs {
        dinst.dep_r.push(fields.rs as usize);
    }
    if reads_rt {
        dinst.dep_r.push(fields.rt as usize);
    }

    let rs_src = resolve_source(cpu, snapshot, reads_rs, fields.rs as usize);
    let rt_src = resolve_source(cpu, snapshot, reads_rt, fields.rt as usize);
    let stall_hazard = rs_src == Forward::Stall || rt_src == Forward::Stall;

    let is_syscall = fields.mnemonic == Mnemonic::Syscall;
    let stall_syscall = is_syscall && cpu.scoreboard.outstanding_writers() > 0;

    if stall_syscall {
        return "S sys".to_string();
    }
    if stall_hazard {
        return "S <<<".to_string();
    }

    if reads_rs {
        dinst.rs_data = match rs_src {
            Forward::Value(v) => v,
            Forward::NoWriter => cpu.regs.read(fields.rs as usize),
            Forward::Stall => unreachable!(),
        };
    }
    if reads_rt {
        dinst.rt_data = match rt_src {
            Forward::Value(v) => v,
            Forward::NoWriter => cpu.regs.read(fields.rt as usize),
            Forward::Stall => unreachable!(),
        };
    }

    if write_rd {
        cpu.scoreboard.claim(rd_target);
    }
    if write_rt {
        cpu.scoreboard.claim(fields.rt as usize);
    }

    let mut npc = latch.npc;
    if matches!(fields.mnemonic, Mnemonic::J | Mnemonic::Jal) {
        npc = (latch.pc & 0xf000_0000) | (fields.imm26 << 2);
    }

    if is_syscall {
        cpu.block_d = true;
    }

    let taken = npc != latch.npc;
    cpu.branch_predictor.train(latch.pc, npc, taken);
    if taken {
        cpu.pending_squash = Some(npc);
    }

    dinst.npc = npc;
    cpu.fetch_resp_buf = None;
    cpu.f2d = None;
    cpu.d2x = Some(dinst);
    format!("D {:?}", fields.mnemonic)
}

fn resolve_source(cpu: &Cpu, snapshot: &ForwardingSnapshot, reads: bool, reg: usize) -> Forward {
    if !reads {
        return Forward::NoWriter;
    }
    if cpu.scoreboard.is_pending(reg) {
        snapshot.resolve(reg)
    } else {
        Forward::NoWriter
    }
}

fn operand_flags(mnemonic: Mnemonic, rt: usize) -> (bool, bool, bool) {
    let mut reads_rs = false;
    let mut reads_rt = false;
    let mut write_rt = false;
    for op in mnemonic.operands() {
        match op {
            Operand::WriteRt => {
                if rt != 0 {
                    write_rt = true;
                }
            }
            Operand::ReadRs | Operand::ReadRsAsBase => reads_rs = true,
            Operand::ReadRt => reads_rt = true,
            Operand::WriteRd => {}
        }
    }
    (reads_rs, reads_rt, write_rt)
}

fn operand_writes_rd(mnemonic: Mnemonic, rd: u32) -> bool {
    rd != 0 && mnemonic.operands().contains(&Operand::WriteRd)
}

fn build_decoded_inst(
    fields: &crate::isa::DecodedFields,
    inst: u32,
    pc: u32,
    npc: u32,
) -> DecodedInst {
    DecodedInst {
        inst,
        mnemonic: fields.mnemonic,
        squashed: false,
        rs: fields.rs as usize,
        rt: fields.rt as usize,
        rd: fields.rd as usize,
        rs_data: 0,
        rt_data: 0,
        shamt: fields.shamt,
        imm16: fields.imm16,
        imm26: fields.imm26,
        is_mem: fields.mnemonic.is_mem(),
        pc,
        npc,
        dep_r: Vec::new(),
        dep_w: Vec::new(),
        wb_data: None,
        wb_en: false,
    }
}
