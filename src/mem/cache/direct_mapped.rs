//! Direct-mapped L1 cache (spec §4.4): single-way line storage, a fixed
//! miss-penalty countdown, and at most one outstanding miss.
//!
//! Stores merge into the resident line on both hit and miss-refill, so a
//! load of the same line that has not since been evicted sees the stored
//! value. The line is never written back to the backend (spec §9: no dirty
//! bit), so a store is lost once its line is evicted before a matching load.

use super::{MemOp, MemRequest, MemResponse, MemoryBackend, MISS_PENALTY};

fn write_into_line(line: &mut [u8], offset: usize, data: &[u8], mask: Option<&[bool]>) {
    for (i, byte) in data.iter().enumerate() {
        if mask.map(|m| m[i]).unwrap_or(true) {
            line[offset + i] = *byte;
        }
    }
}

struct PendingMiss {
    index: usize,
    orig: MemRequest,
}

/// A direct-mapped cache bound to one backend port.
pub struct DirectMapped {
    port: usize,
    line_size: usize,
    n_lines: usize,
    valid: Vec<bool>,
    tags: Vec<u32>,
    lines: Vec<Vec<u8>>,
    resp_buf: Option<MemResponse>,
    penalty_rem: u32,
    pending: Option<PendingMiss>,
    miss_issued: bool,
    pub hits: u64,
    pub misses: u64,
}

impl DirectMapped {
    pub fn new(port: usize, size: usize, line_size: usize) -> Self {
        let n_lines = size / line_size;
        Self {
            port,
            line_size,
            n_lines,
            valid: vec![false; n_lines],
            tags: vec![0; n_lines],
            lines: vec![vec![0u8; line_size]; n_lines],
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
        let index = ((addr / line_size) as usize) % self.n_lines;
        let tag = addr / (line_size * self.n_lines as u32);
        (offset, index, tag)
    }

    pub fn can_req(&self) -> bool {
        self.resp_buf.is_none() && self.penalty_rem == 0 && self.pending.is_none()
    }

    pub fn send_req(&mut self, req: MemRequest) {
        assert!(self.can_req(), "send_req on a busy direct-mapped cache");
        let (offset, index, tag) = self.decompose(req.addr);
        if self.valid[index] && self.tags[index] == tag {
            self.hits += 1;
            if req.op == MemOp::Write {
                write_into_line(&mut self.lines[index], offset, &req.data, req.mask.as_deref());
            }
            let data = self.lines[index][offset..offset + req.size].to_vec();
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
            self.pending = Some(PendingMiss { index, orig: req });
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
    /// ticks the bound backend port as a side effect (spec §4.4 step 3 /
    /// §5) — the documented second call site for advancing the backend,
    /// harmless because the port is monopolized by this cache during a
    /// miss. An idle cache (no pending miss) relies on the system-level
    /// backend tick instead and does not advance it again here.
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
                self.lines[pm.index][i] = *byte;
            }
            self.valid[pm.index] = true;
            let (_, _, tag) = self.decompose(pm.orig.addr);
            self.tags[pm.index] = tag;

            let (offset, _, _) = self.decompose(pm.orig.addr);
            if pm.orig.op == MemOp::Write {
                write_into_line(
                    &mut self.lines[pm.index],
                    offset,
                    &pm.orig.data,
                    pm.orig.mask.as_deref(),
                );
            }
            let data = self.lines[pm.index][offset..offset + pm.orig.size].to_vec();
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

    fn drive_miss(cache: &mut DirectMapped, backend: &mut MemoryBackend) {
        while !cache.has_resp() {
            cache.tick(backend);
        }
    }

    #[test]
    fn cold_access_misses_then_resolves() {
        let mut backend = MemoryBackend::new(1, 1, 1);
        let mut cache = DirectMapped::new(0, 16, 4);
        cache.send_req(read_req(0x100, 4));
        assert_eq!(cache.misses, 1);
        drive_miss(&mut cache, &mut backend);
        assert!(cache.has_resp());
        cache.recv_resp();
    }

    #[test]
    fn repeat_access_to_same_line_hits() {
        let mut backend = MemoryBackend::new(1, 1, 1);
        let mut cache = DirectMapped::new(0, 16, 4);
        cache.send_req(read_req(0x100, 4));
        drive_miss(&mut cache, &mut backend);
        cache.recv_resp();

        cache.send_req(read_req(0x102, 2));
        assert_eq!(cache.hits, 1);
        assert!(cache.has_resp());
    }

    #[test]
    fn single_line_cache_thrashes_on_different_tags_same_index() {
        let mut backend = MemoryBackend::new(1, 0, 1);
        let mut cache = DirectMapped::new(0, 4, 4);

        cache.send_req(read_req(0x0, 4));
        drive_miss(&mut cache, &mut backend);
        cache.recv_resp();

        cache.send_req(read_req(0x1000, 4));
        drive_miss(&mut cache, &mut backend);
        cache.recv_resp();

        assert_eq!(cache.hits, 0);
        assert_eq!(cache.misses, 2);
    }

    #[test]
    fn penalty_counts_down_before_downstream_request_issued() {
        let mut backend = MemoryBackend::new(1, 0, 1);
        let mut cache = DirectMapped::new(0, 16, 4);
        cache.send_req(read_req(0x10, 4));
        for _ in 0..(MISS_PENALTY - 1) {
            cache.tick(&mut backend);
            assert!(!cache.has_resp());
        }
    }
}
