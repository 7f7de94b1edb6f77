use super::channel::{bounded, Receiver, Sender};
use super::scheduler::{Spawner, TaskHandle};
use crate::config::PoolConfig;
use crate::error::TaskError;
use crate::primitives::SafeCounter;
use std::future::Future;
use std::sync::Arc;

/// A fixed set of worker tasks draining one job channel into one result channel.
#[derive(Debug)]
pub struct WorkerPool {
    workers: Vec<TaskHandle<usize>>,
    processed: Arc<SafeCounter>,
}

impl WorkerPool {
    /// Spawns `workers` tasks. Each one loops `recv -> process -> send` and exits once
    /// the job channel is closed and drained.
    pub fn spawn<J, R, F, Fut>(
        spawner: &Spawner,
        workers: usize,
        jobs: Receiver<J>,
        results: Sender<R>,
        process: F,
    ) -> Self
    where
        J: Send + 'static,
        R: Send + 'static,
        F: Fn(J) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
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

                spawner.spawn(async move {
                    tracing::debug!(worker = id, "worker started");
                    let mut handled = 0;
                    while let Some(job) = jobs.recv().await {
                        tracing::trace!(worker = id, "processing job");
                        let result = process(job).await;
                        results.send(result).await;
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

    pub fn processed(&self) -> u64 {
        self.processed.value()
    }

    /// Waits for every worker and returns how many jobs each one handled.
    ///
    /// All workers are joined even if one faulted; the first fault is returned.
    pub async fn join(self) -> Result<Vec<usize>, TaskError> {
        let mut counts = Vec::with_capacity(self.workers.len());
        let mut fault = None;
        for worker in self.workers {
            match worker.join().await {
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
/// The result channel is closed once every worker has exited, so collection stops
/// even when a worker faulted; the fault is then returned instead of the results.
pub async fn process_all<J, R, F, Fut, I>(
    spawner: &Spawner,
    config: &PoolConfig,
    jobs: I,
    process: F,
) -> Result<Vec<R>, TaskError>
where
    I: IntoIterator<Item = J>,
    I::IntoIter: Send + 'static,
    J: Send + 'static,
    R: Send + 'static,
    F: Fn(J) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let job_channel = bounded(config.job_capacity);
    let result_channel = bounded(config.result_capacity);

    let pool = WorkerPool::spawn(
        spawner,
        config.workers,
        job_channel.receiver(),
        result_channel.sender(),
        process,
    );

    let submitted = {
        let jobs_tx = job_channel.sender();
        let jobs = jobs.into_iter();
        spawner.spawn(async move {
            let mut submitted = 0;
            for job in jobs {
                jobs_tx.send(job).await;
                submitted += 1;
            }
            jobs_tx.close();
            submitted
        })
    };

    let closer = {
        let results_tx = result_channel.sender();
        spawner.spawn(async move {
            let outcome = pool.join().await;
            results_tx.close();
            outcome
        })
    };

    let results = result_channel.rx().drain().await;

    let outcome = closer.join().await?;
    // Jobs stranded by a faulted worker would keep the producer waiting.
    while job_channel.recv().await.is_some() {}
    let submitted: usize = submitted.join().await?;
    outcome?;

    debug_assert_eq!(submitted, results.len());
    tracing::debug!(jobs = submitted, "worker pool finished");
    Ok(results)
}
