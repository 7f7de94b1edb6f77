//! Thread-backed channels and the patterns built on them.
//!
//! Every task is a dedicated OS thread and every channel wraps a
//! [crossbeam](https://docs.rs/crossbeam-channel) channel. Simple to run and reason
//! about, but each blocked task holds on to a whole thread.
//!
//! ```
//! use conduit::synchronous::{bounded, spawn};
//!
//! let jobs = bounded(3);
//! let worker = {
//!     let jobs = jobs.receiver();
//!     spawn("summer", move || jobs.iter().sum::<u32>())
//! };
//!
//! for n in 1..=3 {
//!     jobs.send(n);
//! }
//! jobs.close();
//!
//! assert_eq!(worker.join(), Ok(6));
//! ```

pub mod channel;
pub mod fan_in;
pub mod pool;
pub mod select;
pub mod task;

pub use channel::{bounded, unbounded, Channel, Iter, Receiver, Sender};
pub use fan_in::{fan_in, source, FanIn};
pub use pool::{process_all, WorkerPool};
pub use select::Select;
pub use task::{spawn, try_spawn, TaskHandle};
