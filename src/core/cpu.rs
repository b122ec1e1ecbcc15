//! The five-stage pipeline core (spec §4.6): wires the register file,
//! pipeline latches, scoreboard, epoch/squash state, and syscall emulation
//! around a pair of caller-supplied I/D caches.

use super::pipeline::{DecodedInst, FetchLatch, ForwardingSnapshot, Scoreboard};
use super::stages;
use super::BranchPredictor;
use crate::common::RegisterFile;
use crate::mem::cache::MemResponse;
use crate::mem::{Cache, MemoryBackend};

/// The pipeline core. Owns architectural state and the four inter-stage
/// latches; does not own the caches or the backend memory — those are
/// supplied by the caller (`sim::System`) on every `tick`, since they are
/// shared with the I-side and D-side independently.
pub struct Cpu {
    pub(super) regs: RegisterFile,
    pub(super) scoreboard: Scoreboard,
    pub(super) block_d: bool,

    pub(super) pending_rf_writes: Vec<(usize, u32)>,
    pub(super) pending_scoreboard_releases: Vec<usize>,
    pub(super) pending_block_d_clear: bool,

    pub(super) pc: u32,
    pub(super) epoch: u32,
    pub(super) pending_squash: Option<u32>,

    pub(super) f2d: Option<FetchLatch>,
    pub(super) d2x: Option<DecodedInst>,
    pub(super) x2m: Option<DecodedInst>,
    pub(super) m2w: Option<DecodedInst>,

    /// A fetch response received from the I-cache but not yet consumable by
    /// Decode (D2X still occupied, or blocked); retained across ticks
    /// rather than re-received (spec §4.8).
    pub(super) fetch_resp_buf: Option<MemResponse>,

    pub(super) branch_predictor: Box<dyn BranchPredictor>,

    pub(super) exit_code: Option<u32>,
    pub(super) roi: bool,
    pub(super) roi_toggles: u64,
    pub(super) instruction_completed: bool,
    pub(super) last_retired: Option<crate::isa::Mnemonic>,

    linetrace: String,
}

impl Cpu {
    /// Creates a core with `pc` at the given start address and the
    /// register file / epoch counter reset. `seed` drives the register
    /// file's deterministic-but-arbitrary initial contents (spec §9).
    pub fn new(start_pc: u32, seed: u32, branch_predictor: Box<dyn BranchPredictor>) -> Self {
        Self {
            regs: RegisterFile::new(seed),
            scoreboard: Scoreboard::new(),
            block_d: false,
            pending_rf_writes: Vec::new(),
            pending_scoreboard_releases: Vec::new(),
            pending_block_d_clear: false,
            pc: start_pc,
            epoch: 0,
            pending_squash: None,
            f2d: None,
            d2x: None,
            x2m: None,
            m2w: None,
            fetch_resp_buf: None,
            branch_predictor,
            exit_code: None,
            roi: false,
            roi_toggles: 0,
            instruction_completed: false,
            last_retired: None,
            linetrace: String::new(),
        }
    }

    /// Advances the core by one tick: W, M, X, D, F in that order (spec
    /// §4.6, §5), then commits the shadow writeback state and applies any
    /// pending squash.
    pub fn tick(&mut self, icache: &mut Cache, dcache: &mut Cache, backend: &mut MemoryBackend) {
        self.instruction_completed = false;
        self.last_retired = None;

        let snapshot = ForwardingSnapshot::capture(&self.d2x, &self.x2m, &self.m2w);

        let w = stages::writeback::writeback(self);
        let m = stages::memory::memory(self, dcache, backend);
        let x = stages::execute::execute(self, dcache, backend);
        let d = stages::decode::decode(self, &snapshot, icache, backend);
        let f = stages::fetch::fetch(self, icache, backend);

        self.linetrace = [f, d, x, m, w].join(" | ");

        for (r, val) in self.pending_rf_writes.drain(..) {
            self.regs.write(r, val);
        }
        for r in self.pending_scoreboard_releases.drain(..) {
            self.scoreboard.release(r);
        }
        if self.pending_block_d_clear {
            self.block_d = false;
            self.pending_block_d_clear = false;
        }

        if let Some(squash_pc) = self.pending_squash.take() {
            self.epoch += 1;
            self.pc = squash_pc;
        }
    }

    /// `(exit_requested, code)`, polled by the top-level driver after every
    /// tick (spec §6).
    pub fn exit_status(&self) -> Option<u32> {
        self.exit_code
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn reg(&self, idx: usize) -> u32 {
        self.regs.read(idx)
    }

    /// Whether a (non-squashed) instruction retired at Writeback this tick.
    pub fn instruction_completed(&self) -> bool {
        self.instruction_completed
    }

    /// The mnemonic of the instruction that retired this tick, if any
    /// (informational; used for instruction-mix statistics).
    pub fn last_retired(&self) -> Option<crate::isa::Mnemonic> {
        self.last_retired
    }

    /// The ROI toggle flag (syscall 88); an external statistics gate, not
    /// consulted by the core itself (spec glossary).
    pub fn roi_flag(&self) -> bool {
        self.roi
    }

    pub fn roi_toggles(&self) -> u64 {
        self.roi_toggles
    }

    /// The `" | "`-joined per-stage status tokens for this tick (spec §1:
    /// "per-stage line traces"); formatting beyond this raw string is a
    /// driver/CLI concern.
    pub fn last_linetrace(&self) -> &str {
        &self.linetrace
    }
}
