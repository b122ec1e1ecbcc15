//! Pass-through cache: delegates the handshake unchanged to the bound
//! backend port. Used when caching is disabled (spec §4.3).

use super::{MemRequest, MemResponse, MemoryBackend};

/// A cache that forwards every call straight to its bound backend port.
pub struct PassThrough {
    port: usize,
}

impl PassThrough {
    pub fn new(port: usize) -> Self {
        Self { port }
    }

    pub fn can_req(&self, backend: &MemoryBackend) -> bool {
        backend.can_req(self.port)
    }

    pub fn send_req(&mut self, backend: &mut MemoryBackend, req: MemRequest) {
        backend.send_req(self.port, req);
    }

    pub fn has_resp(&self, backend: &MemoryBackend) -> bool {
        backend.has_resp(self.port)
    }

    pub fn recv_resp(&mut self, backend: &mut MemoryBackend) -> MemResponse {
        backend.recv_resp(self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::cache::MemOp;

    #[test]
    fn delegates_to_backend_unchanged() {
        let mut backend = MemoryBackend::new(1, 0, 3);
        let mut cache = PassThrough::new(0);
        assert!(cache.can_req(&backend));
        cache.send_req(
            &mut backend,
            MemRequest {
                op: MemOp::Write,
                addr: 0x100,
                size: 1,
                data: vec![0xab],
                mask: None,
                tag: 0,
            },
        );
        assert!(cache.has_resp(&backend));
        let resp = cache.recv_resp(&mut backend);
        assert_eq!(resp.data, vec![0xab]);
    }
}
