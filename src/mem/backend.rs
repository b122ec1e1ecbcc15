//! Multi-ported sparse paged memory backend (spec §4.1).
//!
//! Storage is a mapping from 4 KiB page index to a page of bytes, allocated
//! lazily on first touch and filled with arbitrary (but reproducible, given
//! a seed) contents. Each port has a single in-flight request slot with a
//! remaining-delay countdown and a single response slot; a port never holds
//! both a pending request and a ready response at once.

use std::collections::HashMap;

use super::cache::{MemOp, MemRequest, MemResponse};

const PAGE_SIZE: usize = 4096;
const PAGE_SHIFT: u32 = 12;

struct Port {
    latency: u32,
    pending: Option<(MemRequest, u32)>,
    response: Option<MemResponse>,
}

/// The shared backend store behind the cache hierarchy.
pub struct MemoryBackend {
    pages: HashMap<u32, [u8; PAGE_SIZE]>,
    ports: Vec<Port>,
    seed: u32,
}

impl MemoryBackend {
    /// Creates a backend with `nports` independent lanes, each with the
    /// given fixed per-port latency, and `seed` controlling the arbitrary
    /// fill of freshly allocated pages.
    pub fn new(nports: usize, latency: u32, seed: u32) -> Self {
        Self {
            pages: HashMap::new(),
            ports: (0..nports)
                .map(|_| Port {
                    latency,
                    pending: None,
                    response: None,
                })
                .collect(),
            seed,
        }
    }

    /// True iff port `i`'s request slot is empty.
    pub fn can_req(&self, port: usize) -> bool {
        self.ports[port].pending.is_none() && self.ports[port].response.is_none()
    }

    /// Submits a request on port `i`. Requires `can_req(i)`. A zero-latency
    /// port processes the request immediately.
    pub fn send_req(&mut self, port: usize, req: MemRequest) {
        assert!(self.can_req(port), "send_req on a busy port");
        let latency = self.ports[port].latency;
        if latency == 0 {
            let resp = self.execute(&req);
            self.ports[port].response = Some(resp);
        } else {
            self.ports[port].pending = Some((req, latency));
        }
    }

    /// Advances every port by one tick: decrements non-zero delays, and
    /// moves a request whose delay has reached zero into the response slot.
    pub fn tick(&mut self) {
        for port in self.ports.iter_mut() {
            let ready = if let Some((_, delay)) = port.pending.as_mut() {
                if *delay > 0 {
                    *delay -= 1;
                }
                *delay == 0
            } else {
                false
            };
            if ready && port.response.is_none() {
                let (req, _) = port.pending.take().unwrap();
                let resp = execute_access(&mut self.pages, self.seed, &req);
                port.response = Some(resp);
            }
        }
    }

    /// True iff port `i` has a response ready to be received.
    pub fn has_resp(&self, port: usize) -> bool {
        self.ports[port].response.is_some()
    }

    /// Delivers and clears port `i`'s response. Requires `has_resp(i)`.
    pub fn recv_resp(&mut self, port: usize) -> MemResponse {
        self.ports[port]
            .response
            .take()
            .expect("recv_resp on a port with no response")
    }

    fn execute(&mut self, req: &MemRequest) -> MemResponse {
        execute_access(&mut self.pages, self.seed, req)
    }

    /// A direct, unbuffered byte read bypassing the port/latency handshake
    /// entirely. Used only by the NUL-terminated-string syscall (spec
    /// §4.12) and the program image loader, neither of which is part of
    /// the timing model the cache hierarchy simulates.
    pub fn read_byte_direct(&mut self, addr: u32) -> u8 {
        read_byte(&mut self.pages, self.seed, addr)
    }

    /// A direct, unbuffered byte write, used by the program image loader to
    /// place `.text`/`.data` contents before simulation starts.
    pub fn write_byte_direct(&mut self, addr: u32, val: u8) {
        write_byte(&mut self.pages, self.seed, addr, val);
    }
}

fn execute_access(
    pages: &mut HashMap<u32, [u8; PAGE_SIZE]>,
    seed: u32,
    req: &MemRequest,
) -> MemResponse {
    match req.op {
        MemOp::Read => {
            let mut data = Vec::with_capacity(req.size);
            for i in 0..req.size {
                let addr = req.addr.wrapping_add(i as u32);
                data.push(read_byte(pages, seed, addr));
            }
            MemResponse {
                op: req.op,
                addr: req.addr,
                size: req.size,
                data,
                mask: req.mask.clone(),
                tag: req.tag,
            }
        }
        MemOp::Write => {
            for i in 0..req.size {
                let write = req.mask.as_ref().map(|m| m[i]).unwrap_or(true);
                if write {
                    let addr = req.addr.wrapping_add(i as u32);
                    write_byte(pages, seed, addr, req.data[i]);
                }
            }
            MemResponse {
                op: req.op,
                addr: req.addr,
                size: req.size,
                data: req.data.clone(),
                mask: req.mask.clone(),
                tag: req.tag,
            }
        }
    }
}

fn page_of(pages: &mut HashMap<u32, [u8; PAGE_SIZE]>, seed: u32, addr: u32) -> &mut [u8; PAGE_SIZE] {
    let page_idx = addr >> PAGE_SHIFT;
    pages.entry(page_idx).or_insert_with(|| fill_page(seed, page_idx))
}

fn read_byte(pages: &mut HashMap<u32, [u8; PAGE_SIZE]>, seed: u32, addr: u32) -> u8 {
    let offset = (addr as usize) & (PAGE_SIZE - 1);
    page_of(pages, seed, addr)[offset]
}

fn write_byte(pages: &mut HashMap<u32, [u8; PAGE_SIZE]>, seed: u32, addr: u32, val: u8) {
    let offset = (addr as usize) & (PAGE_SIZE - 1);
    page_of(pages, seed, addr)[offset] = val;
}

fn fill_page(seed: u32, page_idx: u32) -> [u8; PAGE_SIZE] {
    let mut state = seed ^ page_idx.wrapping_mul(0x9e37_79b9) ^ 0xdead_beef;
    if state == 0 {
        state = 0x1234_5678;
    }
    let mut page = [0u8; PAGE_SIZE];
    for byte in page.iter_mut() {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        *byte = (state & 0xff) as u8;
    }
    page
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

    fn write_req(addr: u32, data: Vec<u8>) -> MemRequest {
        let size = data.len();
        MemRequest {
            op: MemOp::Write,
            addr,
            size,
            data,
            mask: None,
            tag: 0,
        }
    }

    #[test]
    fn zero_latency_port_resolves_immediately() {
        let mut mem = MemoryBackend::new(1, 0, 1);
        mem.send_req(0, write_req(0x1000, vec![1, 2, 3, 4]));
        assert!(mem.has_resp(0));
        let resp = mem.recv_resp(0);
        assert_eq!(resp.data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn store_then_load_round_trips() {
        let mut mem = MemoryBackend::new(1, 0, 7);
        mem.send_req(0, write_req(0x2000, vec![0xde, 0xad, 0xbe, 0xef]));
        mem.recv_resp(0);
        mem.send_req(0, read_req(0x2000, 4));
        let resp = mem.recv_resp(0);
        assert_eq!(resp.data, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn nonzero_latency_delays_response() {
        let mut mem = MemoryBackend::new(1, 3, 5);
        mem.send_req(0, read_req(0x3000, 1));
        assert!(!mem.can_req(0));
        assert!(!mem.has_resp(0));
        mem.tick();
        mem.tick();
        assert!(!mem.has_resp(0));
        mem.tick();
        assert!(mem.has_resp(0));
    }

    #[test]
    fn ports_are_independent() {
        let mut mem = MemoryBackend::new(2, 2, 9);
        mem.send_req(0, read_req(0x0, 1));
        mem.tick();
        assert!(!mem.has_resp(0));
        assert!(mem.can_req(1));
    }

    #[test]
    fn fresh_pages_are_deterministic_for_a_seed() {
        let mut a = MemoryBackend::new(1, 0, 99);
        let mut b = MemoryBackend::new(1, 0, 99);
        a.send_req(0, read_req(0x5000, 4));
        let ra = a.recv_resp(0);
        b.send_req(0, read_req(0x5000, 4));
        let rb = b.recv_resp(0);
        assert_eq!(ra.data, rb.data);
    }
}
