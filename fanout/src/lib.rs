//! Fan-out/fan-in aggregation over tokio tasks.
//!
//! [`FanOutEngine`] spawns one task per input item. Each task sends its result
//! into a shared channel and counts down a [`CompletionLatch`]; a
//! [`ChannelCloser`] closes the channel once the latch releases, which ends
//! the drain loop in [`aggregator::drain`]. [`wait_with_timeout`] races the
//! same latch against a deadline to surface stalls as [`WaitOutcome::TimedOut`].

pub mod aggregator;
pub mod channel;
pub mod closer;
pub mod config;
pub mod counter;
pub mod engine;
pub mod latch;
pub mod supervisor;


pub use channel::{result_channel, CloseHandle, ResultReceiver, ResultSender};
pub use closer::ChannelCloser;
pub use config::{ConfigError, ConfigResult, FanConfig};
pub use counter::SharedCounter;
pub use engine::{FanOut, FanOutEngine, Stalled};
pub use latch::CompletionLatch;
pub use supervisor::{wait_with_timeout, BoundedWaitSupervisor, WaitOutcome};
