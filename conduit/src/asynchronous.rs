//! Task-backed channels and the patterns built on them.
//!
//! Tasks are [tokio](https://tokio.rs) tasks multiplexed onto the few OS threads of a
//! [`Scheduler`]. A task waiting on a channel gives its thread back to the others, so
//! thousands of tasks can be parked at once.
//!
//! The scheduler is an ordinary value. Nothing here reaches for an ambient runtime:
//! whatever needs to spawn takes a [`Spawner`].
//!
//! ```
//! use conduit::asynchronous::{process_all, Scheduler};
//! use conduit::config::{PoolConfig, SchedulerConfig};
//!
//! let scheduler = Scheduler::new(&SchedulerConfig::default()).unwrap();
//! let spawner = scheduler.spawner();
//!
//! let mut doubled = scheduler
//!     .block_on(process_all(&spawner, &PoolConfig::default(), 1..=5, |job: u32| async move {
//!         job * 2
//!     }))
//!     .unwrap();
//! doubled.sort();
//! assert_eq!(doubled, vec![2, 4, 6, 8, 10]);
//! ```

pub mod channel;
pub mod fan_in;
pub mod pool;
pub mod scheduler;
pub mod select;

pub use channel::{bounded, Channel, Receiver, Sender};
pub use fan_in::{fan_in, source, FanIn};
pub use pool::{process_all, WorkerPool};
pub use scheduler::{Scheduler, Spawner, TaskHandle};
pub use select::Select;
