//! Execute (spec §4.9): ALU/shift/immediate arithmetic, branch and `jr`
//! target resolution (squashing on mispredict), load/store address
//! computation and request issue, and syscall emulation.
//!
//! `Sra`/`Srav` and the multiply/divide family (`Mul`, `Muh`, `Mulu`,
//! `Muhu`, `Div`, `Mod`, `Divu`, `Modu`) are legal at Decode but have no
//! semantics here — they fall through to a no-op, leaving `wb_en` false and
//! their scoreboard claim permanently outstanding. This mirrors a documented
//! gap in the reference implementation rather than a bug.

use crate::common::sext;
use crate::core::Cpu;
use crate::isa::Mnemonic;
use crate::mem::cache::{MemOp, MemRequest};
use crate::mem::{Cache, MemoryBackend};

pub fn execute(cpu: &mut Cpu, dcache: &mut Cache, backend: &mut MemoryBackend) -> String {
    if cpu.x2m.is_some() {
        return "S <<<".to_string();
    }
    let mut dinst = match cpu.d2x.take() {
        Some(d) => d,
        None => return " ".to_string(),
    };

    if dinst.squashed {
        cpu.x2m = Some(dinst);
        return "- squashed".to_string();
    }

    if dinst.is_mem && !dcache.can_req(backend) {
        cpu.d2x = Some(dinst);
        return "S dmem".to_string();
    }

    let rs = dinst.rs_data;
    let rt = dinst.rt_data;
    let imm_s = sext(dinst.imm16, 16);

    match dinst.mnemonic {
        Mnemonic::Add | Mnemonic::Addu => wb(&mut dinst, rs.wrapping_add(rt)),
        Mnemonic::Sub | Mnemonic::Subu => wb(&mut dinst, rs.wrapping_sub(rt)),
        Mnemonic::And => wb(&mut dinst, rs & rt),
        Mnemonic::Or => wb(&mut dinst, rs | rt),
        Mnemonic::Xor => wb(&mut dinst, rs ^ rt),
        Mnemonic::Nor => wb(&mut dinst, !(rs | rt)),
        Mnemonic::Addi | Mnemonic::Addiu => wb(&mut dinst, rs.wrapping_add(imm_s)),
        Mnemonic::Andi => {
            let imm16 = dinst.imm16;
            wb(&mut dinst, rs & imm16)
        }
        Mnemonic::Ori => {
            let imm16 = dinst.imm16;
            wb(&mut dinst, rs | imm16)
        }
        Mnemonic::Xori => {
            let imm16 = dinst.imm16;
            wb(&mut dinst, rs ^ imm16)
        }
        Mnemonic::Lui => {
            let imm16 = dinst.imm16;
            wb(&mut dinst, imm16 << 16)
        }
        Mnemonic::Sll => {
            let shamt = dinst.shamt;
            wb(&mut dinst, rs << shamt)
        }
        Mnemonic::Srl => {
            let shamt = dinst.shamt;
            wb(&mut dinst, rs >> shamt)
        }
        Mnemonic::Sllv => wb(&mut dinst, rs << (rt & 0x1f)),
        Mnemonic::Srlv => wb(&mut dinst, rs >> (rt & 0x1f)),
        Mnemonic::Sra | Mnemonic::Srav | Mnemonic::Mul | Mnemonic::Muh | Mnemonic::Mulu
        | Mnemonic::Muhu | Mnemonic::Div | Mnemonic::Mod | Mnemonic::Divu | Mnemonic::Modu => {}

        Mnemonic::Lb | Mnemonic::Lh | Mnemonic::Lw | Mnemonic::Lbu | Mnemonic::Lhu => {
            let ea = rs.wrapping_add(imm_s);
            let size = match dinst.mnemonic {
                Mnemonic::Lb | Mnemonic::Lbu => 1,
                Mnemonic::Lh | Mnemonic::Lhu => 2,
                _ => 4,
            };
            dcache.send_req(
                backend,
                MemRequest {
                    op: MemOp::Read,
                    addr: ea,
                    size,
                    data: Vec::new(),
                    mask: None,
                    tag: 0,
                },
            );
            dinst.wb_en = true;
        }
        Mnemonic::Sb | Mnemonic::Sh | Mnemonic::Sw => {
            let ea = rs.wrapping_add(imm_s);
            let size = match dinst.mnemonic {
                Mnemonic::Sb => 1,
                Mnemonic::Sh => 2,
                _ => 4,
            };
            let data = rt.to_le_bytes()[..size].to_vec();
            dcache.send_req(
                backend,
                MemRequest {
                    op: MemOp::Write,
                    addr: ea,
                    size,
                    data,
                    mask: None,
                    tag: 0,
                },
            );
        }

        Mnemonic::Beq | Mnemonic::Bne | Mnemonic::Bltz | Mnemonic::Bgez | Mnemonic::Blez
        | Mnemonic::Bgtz => {
            let taken = match dinst.mnemonic {
                Mnemonic::Beq => rs == rt,
                Mnemonic::Bne => rs != rt,
                Mnemonic::Bltz => (rs as i32) < 0,
                Mnemonic::Bgez => (rs as i32) >= 0,
                Mnemonic::Blez => (rs as i32) <= 0,
                Mnemonic::Bgtz => (rs as i32) > 0,
                _ => unreachable!(),
            };
            let pred_npc = dinst.npc;
            let mut npc = pred_npc;
            if taken {
                npc = dinst.pc.wrapping_add(4).wrapping_add(imm_s << 2);
            }
            cpu.branch_predictor.train(dinst.pc, npc, taken);
            if npc != pred_npc {
                cpu.pending_squash = Some(npc);
            }
        }
        Mnemonic::Jr => {
            let pred_npc = dinst.npc;
            cpu.branch_predictor.train(dinst.pc, rs, true);
            if rs != pred_npc {
                cpu.pending_squash = Some(rs);
            }
        }
        Mnemonic::Jal => {
            let ret_addr = dinst.pc.wrapping_add(4);
            wb(&mut dinst, ret_addr)
        }
        Mnemonic::J => {}

        Mnemonic::Syscall => execute_syscall(cpu, backend),

        Mnemonic::Undef => {
            use std::io::Write;
            std::io::stdout().flush().ok();
            eprintln!();
            eprintln!("Error! Encountered an undefined instruction");
            eprintln!("  inst: {:#010x}", dinst.inst);
            eprintln!("  pc  : {:#010x}", dinst.pc);
            std::process::exit(127);
        }
    }

    let label = format!("X {:?}", dinst.mnemonic);
    cpu.x2m = Some(dinst);
    label
}

fn wb(dinst: &mut crate::core::pipeline::DecodedInst, value: u32) {
    dinst.wb_data = Some(value);
    dinst.wb_en = true;
}

/// Emulates one of the fixed syscall codes against the *live* architectural
/// register file (spec §4.12): by the time a `syscall` reaches Execute, the
/// scoreboard drain Decode enforced guarantees no other instruction is
/// in flight, so this reads `$v0`/`$a0` directly rather than through
/// `rs_data`/`rt_data`.
fn execute_syscall(cpu: &mut Cpu, backend: &mut MemoryBackend) {
    use std::io::Write;

    let code = cpu.regs.read(2);
    let a0 = cpu.regs.read(4);
    match code {
        0 => {}
        1 => print!("{}", a0),
        4 => {
            let mut addr = a0;
            loop {
                let byte = backend.read_byte_direct(addr);
                if byte == 0 {
                    break;
                }
                print!("{}", byte as char);
                addr = addr.wrapping_add(1);
            }
        }
        10 => cpu.exit_code = Some(0),
        11 => print!("{}", (a0 as u8) as char),
        17 => cpu.exit_code = Some(a0),
        88 => {
            cpu.roi = !cpu.roi;
            cpu.roi_toggles += 1;
        }
        other => {
            std::io::stdout().flush().ok();
            eprintln!();
            eprintln!("Error! Unknown requested system call.");
            eprintln!("  code: {other}");
            std::process::exit(126);
        }
    }
    std::io::stdout().flush().ok();
}
