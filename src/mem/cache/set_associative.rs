//! N-way set-associative L1 cache with LRU replacement (spec §4.5).
//!
//! Shares the direct-mapped cache's protocol, counters, penalty timing, and
//! store-merge-without-write-back behavior; only the set/way lookup and
//! replacement differ.

use super::lru::LruStack;
use super::{MemOp, MemRequest, MemResponse, MemoryBackend, MISS_PENALTY};

fn write_into_line(line: &mut [u8], offset: usize, data: &[u8], mask: Option<&[bool]>) {
    for (i, byte) in data.iter().enumerate() {
        if mask.map(|m| m[i]).unwrap_or(true) {
            line[offset + i] = *byte;
        }
    }
}

struct PendingMiss {
    set: usize,
    way: usize,
    orig: MemRequest,
}

/// An N-way set-associative cache bound to one backend port.
pub struct SetAssociative {
    port: usize,
    line_size: usize,
    ways: usize,
    n_sets: usize,
    valid: Vec<Vec<bool>>,
    tags: Vec<Vec<u32>>,
    lines: Vec<Vec<Vec<u8>>>,
    lru: LruStack,
    resp_buf: Option<MemResponse>,
    penalty_rem: u32,
    pending: Option<PendingMiss>,
    miss_issued: bool,
    pub hits: u64,
    pub misses: u64,
}

impl SetAssociative {
    pub fn new(port: usize, size: usize, ways: usize, line_size: usize) -> Self {
        let n_sets = (size / line_size) / ways;
        Self {
            port,
            line_size,
            ways,
            n_sets,
            valid: vec![vec![false; ways]; n_sets],
            tags: vec![vec![0; ways]; n_sets],
            lines: vec![vec![vec![0u8; line_size]; ways]; n_sets],
            lru: LruStack::new(n_sets, ways),
            resp_buf: None,
            penalty_rem: 0,
            pending: None,
            miss_issued: false,
            hits: 0,
            misses: 0,
        }
    }

    fn decompose(&self, addr: u32) -> (usize, usize, u32) {
        let line_size = self.line_size as u32;
        let offset = (addr % line_size) as usize;
        let set = ((addr / line_size) as usize) % self.n_sets;
        let tag = addr / (line_size * self.n_sets as u32);
        (offset, set, tag)
    }

    fn find_way(&self, set: usize, tag: u32) -> Option<usize> {
        (0..self.ways).find(|&w| self.valid[set][w] && self.tags[set][w] == tag)
    }

    pub fn can_req(&self) -> bool {
        self.resp_buf.is_none() && self.penalty_rem == 0 && self.pending.is_none()
    }

    pub fn send_req(&mut self, req: MemRequest) {
        assert!(self.can_req(), "send_req on a busy set-associative cache");
        let (offset, set, tag) = self.decompose(req.addr);
        if let Some(way) = self.find_way(set, tag) {
            self.hits += 1;
            self.lru.touch(set, way);
            if req.op == MemOp::Write {
                write_into_line(&mut self.lines[set][way], offset, &req.data, req.mask.as_deref());
            }
            let data = self.lines[set][way][offset..offset + req.size].to_vec();
            self.resp_buf = Some(MemResponse {
                op: req.op,
                addr: req.addr,
                size: req.size,
                data,
                mask: req.mask,
                tag: req.tag,
            });
        } else {
            self.misses += 1;
            self.penalty_rem = MISS_PENALTY;
            let victim = self.lru.evict_victim(set);
            self.pending = Some(PendingMiss {
                set,
                way: victim,
                orig: req,
            });
            self.miss_issued = false;
        }
    }

    pub fn has_resp(&self) -> bool {
        self.resp_buf.is_some()
    }

    pub fn recv_resp(&mut self) -> MemResponse {
        self.resp_buf.take().expect("recv_resp with no response")
    }

    /// Advances the cache one tick. While a refill is outstanding, this also
    /// ticks the bound backend port as a side effect — the documented
    /// second call site for advancing the backend (spec §5), harmless
    /// because the port is monopolized by this cache during a miss. An idle
    /// cache relies on the system-level backend tick instead.
    pub fn tick(&mut self, backend: &mut MemoryBackend) {
        if self.penalty_rem > 0 {
            self.penalty_rem -= 1;
            return;
        }
        if self.pending.is_none() {
            return;
        }

        if let Some(pm) = &self.pending {
            if !self.miss_issued && backend.can_req(self.port) {
                let line_size = self.line_size as u32;
                let line_addr = (pm.orig.addr / line_size) * line_size;
                backend.send_req(
                    self.port,
                    MemRequest {
                        op: MemOp::Read,
                        addr: line_addr,
                        size: self.line_size,
                        data: Vec::new(),
                        mask: None,
                        tag: line_addr,
                    },
                );
                self.miss_issued = true;
            }
        }

        backend.tick();

        if backend.has_resp(self.port) {
            let pm = self.pending.take().unwrap();
            let resp = backend.recv_resp(self.port);

            for (i, byte) in resp.data.iter().enumerate() {
                self.lines[pm.set][pm.way][i] = *byte;
            }
            self.valid[pm.set][pm.way] = true;
            let (_, _, tag) = self.decompose(pm.orig.addr);
            self.tags[pm.set][pm.way] = tag;
            self.lru.touch(pm.set, pm.way);

            let (offset, _, _) = self.decompose(pm.orig.addr);
            if pm.orig.op == MemOp::Write {
                write_into_line(
                    &mut self.lines[pm.set][pm.way],
                    offset,
                    &pm.orig.data,
                    pm.orig.mask.as_deref(),
                );
            }
            let data = self.lines[pm.set][pm.way][offset..offset + pm.orig.size].to_vec();
            self.resp_buf = Some(MemResponse {
                op: pm.orig.op,
                addr: pm.orig.addr,
                size: pm.orig.size,
                data,
                mask: pm.orig.mask,
                tag: pm.orig.tag,
            });
            self.miss_issued = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_req(addr: u32, size: usize) -> MemRequest {
        MemRequest {
            op: MemOp::Read,
            addr,
            size,
            data: Vec::new(),
            mask: None,
            tag: 0,
        }
    }

    fn drive_miss(cache: &mut SetAssociative, backend: &mut MemoryBackend) {
        while !cache.has_resp() {
            cache.tick(backend);
        }
    }

    #[test]
    fn extra_cold_line_causes_exactly_one_eviction() {
        let mut backend = MemoryBackend::new(1, 0, 1);
        let mut cache = SetAssociative::new(0, 16, 4, 4);

        for way in 0..4u32 {
            let addr = way * 16;
            cache.send_req(read_req(addr, 4));
            drive_miss(&mut cache, &mut backend);
            cache.recv_resp();
        }
        assert_eq!(cache.misses, 4);

        cache.send_req(read_req(0x1000, 4));
        drive_miss(&mut cache, &mut backend);
        cache.recv_resp();
        assert_eq!(cache.misses, 5);

        cache.send_req(read_req(0x0, 4));
        assert_eq!(cache.misses, 6);
    }

    #[test]
    fn accessed_lines_are_not_evicted_out_of_order() {
        let mut backend = MemoryBackend::new(1, 0, 1);
        let mut cache = SetAssociative::new(0, 16, 4, 4);

        for way in 0..4u32 {
            let addr = way * 16;
            cache.send_req(read_req(addr, 4));
            drive_miss(&mut cache, &mut backend);
            cache.recv_resp();
        }
        cache.send_req(read_req(0x0, 4));
        assert_eq!(cache.hits, 1);
        cache.recv_resp();

        cache.send_req(read_req(0x1000, 4));
        assert_eq!(cache.misses, 5);
        drive_miss(&mut cache, &mut backend);
        cache.recv_resp();

        cache.send_req(read_req(0x0, 4));
        assert_eq!(cache.hits, 2);
    }
}
