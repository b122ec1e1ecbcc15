//! The five-stage pipeline core: stages, latches, scoreboard, forwarding,
//! and the epoch/squash mechanism (spec §4.6-§4.12).

mod branch_predictor;
mod cpu;
pub mod pipeline;
mod stages;

pub use branch_predictor::{BranchPredictor, NoOpPredictor};
pub use cpu::Cpu;
