use conduit::asynchronous::{bounded, process_all, Scheduler, WorkerPool};
use conduit::config::{PoolConfig, SchedulerConfig};
use conduit::TaskError;
use std::collections::BTreeSet;
use std::time::Duration;

fn scheduler() -> Scheduler {
    let config = SchedulerConfig {
        worker_threads: 2,
        ..SchedulerConfig::default()
    };
    Scheduler::new(&config).unwrap()
}

#[test]
fn three_workers_double_five_jobs() {
    let scheduler = scheduler();
    let spawner = scheduler.spawner();
    let results = scheduler
        .block_on(process_all(&spawner, &PoolConfig::default(), 1..=5, |job: u64| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            job * 2
        }))
        .unwrap();

    let results: BTreeSet<u64> = results.into_iter().collect();
    assert_eq!(results, BTreeSet::from([2, 4, 6, 8, 10]));
}

#[test]
fn every_job_yields_exactly_one_result() {
    let scheduler = scheduler();
    let spawner = scheduler.spawner();
    let config = PoolConfig {
        workers: 8,
        job_capacity: 2,
        result_capacity: 0,
    };
    let mut results = scheduler
        .block_on(process_all(&spawner, &config, 0..500, |job: u32| async move { job + 1 }))
        .unwrap();
    results.sort_unstable();
    assert_eq!(results, (1..=500).collect::<Vec<_>>());
}

#[test]
fn workers_exit_once_jobs_are_closed_and_drained() {
    let scheduler = scheduler();
    let spawner = scheduler.spawner();
    scheduler.block_on(async {
        let jobs = bounded(5);
        let results = bounded(5);
        let pool = WorkerPool::spawn(
            &spawner,
            3,
            jobs.receiver(),
            results.sender(),
            |job: i32| async move { job * 2 },
        );
        assert_eq!(pool.size(), 3);

        for job in 1..=5 {
            jobs.send(job).await;
        }
        jobs.close();

        let counts = pool.join().await.unwrap();
        assert_eq!(counts.len(), 3);
        assert_eq!(counts.iter().sum::<usize>(), 5);

        results.close();
        let mut collected = results.rx().drain().await;
        collected.sort_unstable();
        assert_eq!(collected, vec![2, 4, 6, 8, 10]);
    });
}

#[test]
fn processed_counts_completed_jobs() {
    let scheduler = scheduler();
    let spawner = scheduler.spawner();
    scheduler.block_on(async {
        let jobs = bounded(0);
        let results = bounded(10);
        let pool = WorkerPool::spawn(&spawner, 2, jobs.receiver(), results.sender(), |job: u8| {
            async move { job }
        });

        for job in 0..10 {
            jobs.send(job).await;
        }
        jobs.close();

        while pool.processed() < 10 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(results.len(), 10);
        pool.join().await.unwrap();
    });
}

#[test]
fn panicking_job_is_reported_as_a_fault() {
    let scheduler = scheduler();
    let spawner = scheduler.spawner();
    let outcome = scheduler.block_on(process_all(
        &spawner,
        &PoolConfig::default(),
        1..=5,
        |job: u32| async move {
            if job == 3 {
                panic!("job {} is poisoned", job);
            }
            job
        },
    ));

    assert_eq!(
        outcome,
        Err(TaskError::Panicked("job 3 is poisoned".to_string()))
    );
}
