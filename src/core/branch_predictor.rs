//! A trainable branch-predictor seam.
//!
//! The core trains this hook on every resolved control-flow instruction but
//! never consults it to steer fetch; branch prediction beyond this stub is
//! out of scope. `pc`/`target` are the resolved addresses, `taken` is the
//! outcome.

/// A seam for a future branch predictor. The pipeline calls `train` after
/// every control-flow resolution (branches, jumps, `jr`); nothing currently
/// implements speculative redirection from it.
pub trait BranchPredictor {
    fn train(&mut self, pc: u32, target: u32, taken: bool);
}

/// The default predictor: records nothing, predicts nothing.
#[derive(Default)]
pub struct NoOpPredictor;

impl BranchPredictor for NoOpPredictor {
    fn train(&mut self, _pc: u32, _target: u32, _taken: bool) {}
}
