//! Memory (spec §4.10): drains the D-cache response for any memory
//! instruction — load or store alike — and, for loads, reassembles and
//! sign-extends the loaded bytes into `wb_data`.

use crate::core::Cpu;
use crate::isa::Mnemonic;
use crate::mem::{Cache, MemoryBackend};

pub fn memory(cpu: &mut Cpu, dcache: &mut Cache, backend: &mut MemoryBackend) -> String {
    if cpu.m2w.is_some() {
        return "S <<<".to_string();
    }
    let mut dinst = match cpu.x2m.take() {
        Some(d) => d,
        None => return " ".to_string(),
    };

    if dinst.squashed {
        cpu.m2w = Some(dinst);
        return "- squashed".to_string();
    }

    if dinst.is_mem {
        if !dcache.has_resp(backend) {
            cpu.x2m = Some(dinst);
            return "S dmem".to_string();
        }
        let resp = dcache.recv_resp(backend);
        if dinst.wb_en {
            let mut data = 0u32;
            for (i, b) in resp.data.iter().enumerate() {
                data |= (*b as u32) << (8 * i);
            }
            data = match dinst.mnemonic {
                Mnemonic::Lb => crate::common::sext(data, 8),
                Mnemonic::Lh => crate::common::sext(data, 16),
                _ => data,
            };
            dinst.wb_data = Some(data);
        }
    }

    let label = format!("M {:?}", dinst.mnemonic);
    cpu.m2w = Some(dinst);
    label
}
