//! The memory hierarchy: a multi-ported sparse backend behind a
//! configurable L1 (pass-through, direct-mapped, or N-way set-associative).

pub mod backend;
pub mod cache;

pub use backend::MemoryBackend;
pub use cache::{Cache, MemOp, MemRequest, MemResponse};
