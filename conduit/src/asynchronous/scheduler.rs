use crate::config::SchedulerConfig;
use crate::error::TaskError;
use std::future::Future;
use std::io;
use tokio::runtime::{self, Handle, Runtime};
use tokio::task::JoinHandle;

/// Owns the runtime that tasks are multiplexed onto.
///
/// Every scheduler is independent: tasks spawned on one never run on another, so
/// tests can each build their own.
#[derive(Debug)]
pub struct Scheduler {
    runtime: Runtime,
}

impl Scheduler {
    /// A multi-threaded scheduler with `config.worker_threads` OS threads.
    pub fn new(config: &SchedulerConfig) -> io::Result<Self> {
        if config.worker_threads == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "a scheduler needs at least one worker thread",
            ));
        }

        let runtime = runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .thread_name(config.thread_name.clone())
            .enable_all()
            .build()?;

        tracing::debug!(
            worker_threads = config.worker_threads,
            thread_name = %config.thread_name,
            "scheduler started"
        );
        Ok(Scheduler { runtime })
    }

    /// A scheduler that runs every task on the thread calling [`block_on`](Self::block_on).
    pub fn current_thread() -> io::Result<Self> {
        let runtime = runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Scheduler { runtime })
    }

    /// A cloneable handle for spawning onto this scheduler from inside its tasks.
    pub fn spawner(&self) -> Spawner {
        Spawner {
            handle: self.runtime.handle().clone(),
        }
    }

    pub fn spawn<F>(&self, future: F) -> TaskHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.spawner().spawn(future)
    }

    /// Drives `future` to completion on the current thread.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

#[derive(Debug, Clone)]
pub struct Spawner {
    handle: Handle,
}

impl Spawner {
    pub fn spawn<F>(&self, future: F) -> TaskHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        TaskHandle {
            inner: self.handle.spawn(future),
        }
    }
}

/// A handle to a spawned task.
#[derive(Debug)]
pub struct TaskHandle<T> {
    inner: JoinHandle<T>,
}

impl<T> TaskHandle<T> {
    /// Waits for the task and returns its value, or the fault that stopped it.
    pub async fn join(self) -> Result<T, TaskError> {
        self.inner.await.map_err(|err| {
            let err = if err.is_panic() {
                TaskError::from_panic(err.into_panic())
            } else {
                TaskError::Cancelled
            };
            tracing::warn!(error = %err, "task faulted");
            err
        })
    }

    pub fn abort(&self) {
        self.inner.abort()
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}
