//! Channels with explicit closing, a randomized select, worker pools and fan-in.
//!
//! The same vocabulary is offered by two backends:
//! * [`synchronous`] - every task is an OS thread, channels wrap
//!   [crossbeam](https://docs.rs/crossbeam-channel) channels.
//!     * Simple to run and test.
//!     * Each blocked task holds a whole thread.
//!
//! * [`asynchronous`] - tasks run on a [`Scheduler`](asynchronous::Scheduler) that
//!   multiplexes them onto a handful of threads, channels wrap tokio's mpsc.
//!     * Many thousands of tasks are cheap.
//!     * Every spawn goes through an explicit scheduler, so tests stay isolated.
//!
//! A channel has a capacity (zero means every send waits for a receiver) and can be
//! closed exactly once. After closing, buffered values are still delivered in order,
//! then every receive reports `None`. Sending on a closed channel or closing it twice
//! is a bug in the caller and panics.
//!
//! # Example
//!
//! Three workers double five jobs; the result order depends on which worker wins
//! each job.
//!
//!```
//! use conduit::synchronous::{bounded, WorkerPool};
//!
//! let jobs = bounded(5);
//! let results = bounded(5);
//!
//! let pool = WorkerPool::spawn(3, jobs.receiver(), results.sender(), |job: u32| job * 2);
//!
//! for job in 1..=5 {
//!     jobs.send(job);
//! }
//! jobs.close();
//!
//! let mut doubled: Vec<u32> = (0..5).filter_map(|_| results.recv()).collect();
//! doubled.sort();
//! assert_eq!(doubled, vec![2, 4, 6, 8, 10]);
//!
//! assert_eq!(pool.join().unwrap().iter().sum::<usize>(), 5);
//!```

pub mod asynchronous;
pub mod config;
pub mod error;
pub mod fan_in;
pub mod primitives;
pub mod selected;
pub mod synchronous;

pub use config::Config;
pub use error::{RecvTimeoutError, TaskError, TryRecvError, TrySendError};
pub use fan_in::FanInPolicy;
pub use selected::Selected;
