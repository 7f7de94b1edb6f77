use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Inner {
    pending: Mutex<usize>,
    all_done: Condvar,
}

/// Waits for a set of tasks to finish.
///
/// The owner calls [`add`](WaitGroup::add) once per task it launches, every task calls
/// [`done`](WaitGroup::done) when it is finished, and [`wait`](WaitGroup::wait) blocks
/// until the counter is back at zero. Handles are cheap to clone and share one counter.
///
/// Calling `done` more often than `add` is a usage error and panics.
#[derive(Debug, Clone, Default)]
pub struct WaitGroup {
    inner: Arc<Inner>,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, n: usize) {
        *self.inner.pending.lock() += n;
    }

    pub fn done(&self) {
        let mut pending = self.inner.pending.lock();
        if *pending == 0 {
            panic!("negative wait group counter");
        }
        *pending -= 1;
        if *pending == 0 {
            self.inner.all_done.notify_all();
        }
    }

    /// Blocks the current thread until every added task has called `done`.
    pub fn wait(&self) {
        let mut pending = self.inner.pending.lock();
        while *pending > 0 {
            self.inner.all_done.wait(&mut pending);
        }
    }

    pub fn pending(&self) -> usize {
        *self.inner.pending.lock()
    }

    /// Returns a guard that calls `done` when dropped, including during a panic.
    pub fn done_on_drop(&self) -> DoneGuard {
        DoneGuard { group: self.clone() }
    }
}

/// Marks one task of a [`WaitGroup`] as finished when dropped.
#[derive(Debug)]
pub struct DoneGuard {
    group: WaitGroup,
}

impl Drop for DoneGuard {
    fn drop(&mut self) {
        self.group.done();
    }
}
