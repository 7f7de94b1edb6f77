//! Shared-state primitives used alongside channels.
//!
//! Channels are the only synchronization point of the message-passing code. These
//! cover the remaining cases: a counter several workers bump, and a barrier that
//! waits for a known number of tasks to finish.

mod counter;
mod wait_group;

pub use counter::SafeCounter;
pub use wait_group::{DoneGuard, WaitGroup};
