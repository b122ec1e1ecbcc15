//! Pipeline latches, the scoreboard, and the forwarding snapshot (spec §3).

mod latches;
mod scoreboard;
mod snapshot;

pub use latches::{DecodedInst, FetchLatch};
pub use scoreboard::Scoreboard;
pub use snapshot::{Forward, ForwardingSnapshot};
