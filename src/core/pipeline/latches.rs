//! The inter-stage pipeline latches and the decoded-instruction record that
//! flows through D2X, X2M, and M2W.

use crate::isa::Mnemonic;

/// The F2D latch: Fetch has issued a request and recorded the PC it
/// belongs to, but the instruction is not yet decoded.
#[derive(Debug, Clone, Copy)]
pub struct FetchLatch {
    pub pc: u32,
    pub npc: u32,
}

/// A decoded instruction as it flows through D2X, X2M, and M2W.
///
/// Created at Decode, destroyed after Writeback; advances at most one latch
/// per tick.
#[derive(Debug, Clone)]
pub struct DecodedInst {
    pub inst: u32,
    pub mnemonic: Mnemonic,
    pub squashed: bool,

    pub rs: usize,
    pub rt: usize,
    pub rd: usize,
    pub rs_data: u32,
    pub rt_data: u32,
    pub shamt: u32,
    pub imm16: u32,
    pub imm26: u32,

    pub is_mem: bool,
    pub pc: u32,
    pub npc: u32,

    pub dep_r: Vec<usize>,
    pub dep_w: Vec<usize>,

    pub wb_data: Option<u32>,
    pub wb_en: bool,
}

impl DecodedInst {
    /// A squashed placeholder carrying only enough shape to flow through
    /// the remaining stages as a no-op, mirroring the reference
    /// implementation's `squashDinst`.
    pub fn squashed_at(pc: u32, npc: u32) -> Self {
        Self {
            inst: 0,
            mnemonic: Mnemonic::Undef,
            squashed: true,
            rs: 0,
            rt: 0,
            rd: 0,
            rs_data: 0xdead_beef,
            rt_data: 0xdead_cafe,
            shamt: 0,
            imm16: 0,
            imm26: 0,
            is_mem: false,
            pc,
            npc,
            dep_r: Vec::new(),
            dep_w: Vec::new(),
            wb_data: None,
            wb_en: false,
        }
    }
}
