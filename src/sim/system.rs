//! Top-level system wiring (spec §5): a `Cpu` plus an I-side and D-side
//! cache, each bound 1:1 to its own backend port, advanced every tick in
//! the fixed order `core -> icache -> dcache` (each cache's own `tick`
//! advances the shared backend internally during refill handling, which is
//! the documented "two call site" backend-advance quirk, not a bug).

use crate::config::{CacheConfig, CacheKind, Config};
use crate::core::{Cpu, NoOpPredictor};
use crate::mem::cache::{DirectMapped, PassThrough, SetAssociative};
use crate::mem::{Cache, MemoryBackend};
use crate::sim::loader::ProgramImage;
use crate::stats::SimStats;

const ICACHE_PORT: usize = 0;
const DCACHE_PORT: usize = 1;

/// The whole simulated machine: core, caches, backend memory, and
/// statistics, wired together per the configured topology.
pub struct System {
    cpu: Cpu,
    icache: Cache,
    dcache: Cache,
    backend: MemoryBackend,
    stats: SimStats,
}

impl System {
    pub fn new(config: &Config) -> Self {
        let backend = MemoryBackend::new(config.memory.ports, config.memory.latency, config.memory.seed);
        let icache = build_cache(ICACHE_PORT, &config.icache);
        let dcache = build_cache(DCACHE_PORT, &config.dcache);
        let cpu = Cpu::new(
            config.general.start_pc_val(),
            config.general.reg_seed,
            Box::new(NoOpPredictor),
        );
        Self {
            cpu,
            icache,
            dcache,
            backend,
            stats: SimStats::new(),
        }
    }

    /// Writes a program image into backend memory ahead of the first tick.
    pub fn load_image(&mut self, image: &ProgramImage) {
        image.load_into(&mut self.backend);
    }

    /// Advances the whole machine by one tick: the core, then the I-cache,
    /// then the D-cache, then the backend itself (spec §5). A cache also
    /// advances the backend internally while handling a refill; the
    /// explicit call here is the second of the two documented call sites,
    /// needed so a pass-through (uncached) port still makes progress.
    pub fn tick(&mut self) {
        self.cpu.tick(&mut self.icache, &mut self.dcache, &mut self.backend);
        self.icache.tick(&mut self.backend);
        self.dcache.tick(&mut self.backend);
        self.backend.tick();
        self.stats.record_tick(self.cpu.last_retired());
    }

    /// `Some(code)` once the program has issued an exit syscall.
    pub fn exit_status(&self) -> Option<u32> {
        self.cpu.exit_status()
    }

    pub fn last_linetrace(&self) -> &str {
        self.cpu.last_linetrace()
    }

    pub fn roi_flag(&self) -> bool {
        self.cpu.roi_flag()
    }

    /// Finalizes cache counters into `stats` and prints the report.
    pub fn print_stats(&mut self) {
        self.stats.icache_hits = self.icache.hits();
        self.stats.icache_misses = self.icache.misses();
        self.stats.dcache_hits = self.dcache.hits();
        self.stats.dcache_misses = self.dcache.misses();
        self.stats.roi_toggles = self.cpu.roi_toggles();
        self.stats.print();
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn icache_hits(&self) -> u64 {
        self.icache.hits()
    }

    pub fn icache_misses(&self) -> u64 {
        self.icache.misses()
    }

    pub fn dcache_hits(&self) -> u64 {
        self.dcache.hits()
    }

    pub fn dcache_misses(&self) -> u64 {
        self.dcache.misses()
    }
}

fn build_cache(port: usize, cfg: &CacheConfig) -> Cache {
    match cfg.kind {
        CacheKind::PassThrough => Cache::PassThrough(PassThrough::new(port)),
        CacheKind::DirectMapped => Cache::DirectMapped(DirectMapped::new(port, cfg.size, cfg.line_size)),
        CacheKind::SetAssociative => {
            Cache::SetAssociative(SetAssociative::new(port, cfg.size, cfg.ways, cfg.line_size))
        }
    }
}
