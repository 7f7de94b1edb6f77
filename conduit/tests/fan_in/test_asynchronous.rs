use conduit::asynchronous::{fan_in, source, Receiver, Scheduler, Select};
use conduit::config::SchedulerConfig;
use conduit::{FanInPolicy, Selected};
use std::collections::BTreeSet;
use std::time::Duration;

const SOURCES: u32 = 3;
const PER_SOURCE: u32 = 4;

fn scheduler() -> Scheduler {
    let config = SchedulerConfig {
        worker_threads: 2,
        ..SchedulerConfig::default()
    };
    Scheduler::new(&config).unwrap()
}

fn labelled(source: u32) -> Vec<String> {
    (0..PER_SOURCE)
        .map(|i| format!("source {}: message {}", source, i))
        .collect()
}

fn expected() -> BTreeSet<String> {
    (0..SOURCES).flat_map(labelled).collect()
}

#[test]
fn drained_fan_in_closes_its_output() {
    let scheduler = scheduler();
    let spawner = scheduler.spawner();
    scheduler.block_on(async {
        let upstreams = (0..SOURCES)
            .map(|source_id| source(&spawner, labelled(source_id), 0).0)
            .collect();

        let merged = fan_in(&spawner, upstreams, FanInPolicy::CloseWhenDrained, 0);
        let received = merged.output().drain().await;

        assert_eq!(received.len(), (SOURCES * PER_SOURCE) as usize);
        assert_eq!(received.into_iter().collect::<BTreeSet<_>>(), expected());
        assert_eq!(merged.join().await.unwrap(), (SOURCES * PER_SOURCE) as usize);
    });
}

#[test]
fn per_source_order_is_preserved() {
    let scheduler = scheduler();
    let spawner = scheduler.spawner();
    let received = scheduler.block_on(async {
        let (rx, _producer) = source(&spawner, 0..100, 4);
        let merged = fan_in(&spawner, vec![rx], FanInPolicy::CloseWhenDrained, 4);
        merged.output().drain().await
    });
    assert_eq!(received, (0..100).collect::<Vec<_>>());
}

#[test]
fn open_fan_in_is_stopped_by_a_deadline() {
    let scheduler = scheduler();
    let spawner = scheduler.spawner();
    scheduler.block_on(async {
        let upstreams = (0..SOURCES)
            .map(|source_id| source(&spawner, labelled(source_id), 1).0)
            .collect();
        let merged = fan_in(&spawner, upstreams, FanInPolicy::Open, 1);

        let mut received = BTreeSet::new();
        loop {
            let mut select = Select::new();
            select.recv(merged.output());
            select.timeout(Duration::from_millis(200));
            match select.wait().await {
                Selected::Received {
                    value: Some(value), ..
                } => {
                    received.insert(value);
                }
                Selected::Timeout => break,
                other => panic!("unexpected {:?}", other),
            }
        }

        assert_eq!(received, expected());
        assert!(!merged.output().is_closed());
        assert_eq!(merged.join().await.unwrap(), (SOURCES * PER_SOURCE) as usize);
    });
}

#[test]
fn no_upstreams_closes_immediately() {
    let scheduler = scheduler();
    let spawner = scheduler.spawner();
    scheduler.block_on(async {
        let merged = fan_in(&spawner, Vec::<Receiver<u8>>::new(), FanInPolicy::CloseWhenDrained, 0);
        assert_eq!(merged.output().recv().await, None);
        assert_eq!(merged.join().await.unwrap(), 0);
    });
}
