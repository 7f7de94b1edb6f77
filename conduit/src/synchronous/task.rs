use crate::error::TaskError;
use std::io;
use std::thread;

/// A handle to a task running on its own thread.
#[derive(Debug)]
pub struct TaskHandle<T> {
    name: String,
    inner: thread::JoinHandle<T>,
}

/// Spawns `f` on a new named thread.
///
/// A panic inside `f` does not escape: it is reported by [`TaskHandle::join`].
pub fn spawn<F, T>(name: impl Into<String>, f: F) -> TaskHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let name = name.into();
    match try_spawn(name.clone(), f) {
        Ok(handle) => handle,
        Err(err) => panic!("failed to spawn thread {}: {}", name, err),
    }
}

/// Like [`spawn`], but reports a failure to create the thread.
pub fn try_spawn<F, T>(name: String, f: F) -> io::Result<TaskHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let inner = thread::Builder::new().name(name.clone()).spawn(f)?;
    Ok(TaskHandle { name, inner })
}

impl<T> TaskHandle<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Waits for the task and returns its value, or the fault that stopped it.
    pub fn join(self) -> Result<T, TaskError> {
        self.inner.join().map_err(|payload| {
            let err = TaskError::from_panic(payload);
            tracing::warn!(task = %self.name, error = %err, "task faulted");
            err
        })
    }
}
