use super::channel::{bounded, Receiver, Sender};
use super::task::{spawn, TaskHandle};
use crate::config::PoolConfig;
use crate::error::TaskError;
use crate::primitives::SafeCounter;
use std::sync::Arc;

/// A fixed set of worker threads draining one job channel into one result channel.
///
/// Every worker loops over `recv -> process -> send` and exits once the job channel
/// is closed and drained. Results arrive in whatever order the workers finish.
#[derive(Debug)]
pub struct WorkerPool {
    workers: Vec<TaskHandle<usize>>,
    processed: Arc<SafeCounter>,
}

impl WorkerPool {
    pub fn spawn<J, R, F>(workers: usize, jobs: Receiver<J>, results: Sender<R>, process: F) -> Self
    where
        J: Send + 'static,
        R: Send + 'static,
        F: Fn(J) -> R + Send + Sync + 'static,
    {
        assert!(workers > 0, "a worker pool needs at least one worker");

        let process = Arc::new(process);
        let processed = Arc::new(SafeCounter::new());

        let workers = (0..workers)
            .map(|id| {
                let jobs = jobs.clone();
                let results = results.clone();
                let process = process.clone();
                let processed = processed.clone();

                spawn(format!("worker-{}", id), move || {
                    tracing::debug!(worker = id, "worker started");
                    let mut handled = 0;
                    for job in jobs.iter() {
                        tracing::trace!(worker = id, "processing job");
                        results.send(process(job));
                        processed.inc();
                        handled += 1;
                    }
                    tracing::debug!(worker = id, handled, "job channel drained, worker exiting");
                    handled
                })
            })
            .collect();

        WorkerPool { workers, processed }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Jobs completed so far across all workers.
    pub fn processed(&self) -> u64 {
        self.processed.value()
    }

    /// Waits for every worker and returns how many jobs each one handled.
    ///
    /// All workers are joined even if one faulted; the first fault is returned.
    pub fn join(self) -> Result<Vec<usize>, TaskError> {
        let mut counts = Vec::with_capacity(self.workers.len());
        let mut fault = None;
        for worker in self.workers {
            match worker.join() {
                Ok(count) => counts.push(count),
                Err(err) => {
                    fault.get_or_insert(err);
                }
            }
        }
        match fault {
            Some(err) => Err(err),
            None => Ok(counts),
        }
    }
}

/// Runs every job through a worker pool and collects one result per job.
///
/// Jobs are submitted from a producer thread which closes the job channel when done.
/// Once every worker has exited the result channel is closed, so collection stops
/// even when a worker faulted; the fault is then returned instead of the results.
pub fn process_all<J, R, F, I>(config: &PoolConfig, jobs: I, process: F) -> Result<Vec<R>, TaskError>
where
    I: IntoIterator<Item = J>,
    I::IntoIter: Send + 'static,
    J: Send + 'static,
    R: Send + 'static,
    F: Fn(J) -> R + Send + Sync + 'static,
{
    let job_channel = bounded(config.job_capacity);
    let result_channel = bounded(config.result_capacity);

    let pool = WorkerPool::spawn(
        config.workers,
        job_channel.receiver(),
        result_channel.sender(),
        process,
    );

    let submitted = {
        let jobs_tx = job_channel.sender();
        let jobs = jobs.into_iter();
        spawn("job-producer", move || {
            let mut submitted = 0;
            for job in jobs {
                jobs_tx.send(job);
                submitted += 1;
            }
            jobs_tx.close();
            submitted
        })
    };

    let closer = {
        let results_tx = result_channel.sender();
        spawn("result-closer", move || {
            let outcome = pool.join();
            results_tx.close();
            outcome
        })
    };

    let results: Vec<R> = result_channel.rx().iter().collect();

    let outcome = closer.join()?;
    // Jobs stranded by a faulted worker would keep the producer blocked.
    for _ in job_channel.rx().iter() {}
    let submitted = submitted.join()?;
    outcome?;

    debug_assert_eq!(submitted, results.len());
    tracing::debug!(jobs = submitted, "worker pool finished");
    Ok(results)
}
