use conduit::synchronous::{fan_in, source, Select};
use conduit::{FanInPolicy, Selected};
use std::collections::BTreeSet;
use std::time::Duration;

const SOURCES: u32 = 3;
const PER_SOURCE: u32 = 4;

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
    let mut producers = Vec::new();
    let upstreams = (0..SOURCES)
        .map(|source_id| {
            let (rx, producer) = source(labelled(source_id), 0);
            producers.push(producer);
            rx
        })
        .collect();

    let merged = fan_in(upstreams, FanInPolicy::CloseWhenDrained, 0);
    let received: Vec<String> = merged.output().iter().collect();

    assert_eq!(received.len(), (SOURCES * PER_SOURCE) as usize);
    assert_eq!(received.into_iter().collect::<BTreeSet<_>>(), expected());
    assert_eq!(merged.join().unwrap(), (SOURCES * PER_SOURCE) as usize);
    for producer in producers {
        producer.join().unwrap();
    }
}

#[test]
fn per_source_order_is_preserved() {
    let (rx, producer) = source(0..100, 4);
    let merged = fan_in(vec![rx], FanInPolicy::CloseWhenDrained, 4);
    let received: Vec<i32> = merged.output().iter().collect();
    assert_eq!(received, (0..100).collect::<Vec<_>>());
    producer.join().unwrap();
}

#[test]
fn open_fan_in_is_stopped_by_a_deadline() {
    let upstreams = (0..SOURCES)
        .map(|source_id| source(labelled(source_id), 1).0)
        .collect();
    let merged = fan_in(upstreams, FanInPolicy::Open, 1);

    let mut received = BTreeSet::new();
    loop {
        let mut select = Select::new();
        select.recv(merged.output());
        select.timeout(Duration::from_millis(200));
        match select.wait() {
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
    assert_eq!(merged.join().unwrap(), (SOURCES * PER_SOURCE) as usize);
}

#[test]
fn no_upstreams_closes_immediately() {
    let merged = fan_in(Vec::<conduit::synchronous::Receiver<u8>>::new(), FanInPolicy::CloseWhenDrained, 0);
    assert_eq!(merged.output().recv(), None);
    assert_eq!(merged.join().unwrap(), 0);
}
