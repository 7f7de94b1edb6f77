use conduit::synchronous::{bounded, spawn, Select};
use conduit::Selected;
use std::thread;
use std::time::{Duration, Instant};

const TRIALS: usize = 1000;

#[test]
fn picks_whichever_channel_is_ready_first() {
    let slow = bounded(0);
    let fast = bounded(0);

    let slow_tx = slow.sender();
    let fast_tx = fast.sender();
    let _slow_producer = spawn("slow", move || {
        thread::sleep(Duration::from_millis(300));
        let _ = slow_tx.try_send("slow");
    });
    let fast_producer = spawn("fast", move || {
        thread::sleep(Duration::from_millis(30));
        fast_tx.send("fast");
    });

    let mut select = Select::new();
    select.recv(slow.rx());
    let fast_index = select.recv(fast.rx());

    assert_eq!(
        select.wait(),
        Selected::Received {
            index: fast_index,
            value: Some("fast")
        }
    );
    fast_producer.join().unwrap();
}

#[test]
fn ready_candidates_are_chosen_evenly() {
    let left = bounded(1);
    let right = bounded(1);
    left.send("left");
    right.send("right");

    let mut counts = [0usize; 2];
    for _ in 0..TRIALS {
        let mut select = Select::new();
        select.recv(left.rx());
        select.recv(right.rx());

        match select.wait() {
            Selected::Received {
                index,
                value: Some(value),
            } => {
                counts[index] += 1;
                [&left, &right][index].send(value);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    assert_eq!(counts[0] + counts[1], TRIALS);
    assert!(counts[0] > TRIALS / 3, "left starved: {:?}", counts);
    assert!(counts[1] > TRIALS / 3, "right starved: {:?}", counts);
}

#[test]
fn default_runs_when_nothing_is_ready() {
    let ch = bounded::<&str>(0);

    let mut select = Select::new();
    select.recv(ch.rx());
    select.default_case();
    assert_eq!(select.wait(), Selected::Default);

    let tx = ch.sender();
    let producer = spawn("producer", move || tx.send("Hello"));
    thread::sleep(Duration::from_millis(100));

    let mut select = Select::new();
    select.recv(ch.rx());
    select.default_case();
    assert_eq!(
        select.wait(),
        Selected::Received {
            index: 0,
            value: Some("Hello")
        }
    );
    producer.join().unwrap();
}

#[test]
fn timeout_fires_no_earlier_than_its_duration() {
    let ch = bounded::<u8>(0);
    let timeout = Duration::from_millis(100);

    let started = Instant::now();
    let mut select = Select::new();
    select.recv(ch.rx());
    select.timeout(timeout);
    let outcome = select.wait();
    let elapsed = started.elapsed();

    assert_eq!(outcome, Selected::Timeout);
    assert!(elapsed >= timeout, "fired early: {:?}", elapsed);
    assert!(elapsed < timeout + Duration::from_millis(250), "fired late: {:?}", elapsed);
}

#[test]
fn closed_channel_is_ready_with_no_value() {
    let ch = bounded::<u8>(0);
    ch.close();

    let mut select = Select::new();
    select.recv(ch.rx());
    select.timeout(Duration::from_secs(5));
    assert_eq!(
        select.wait(),
        Selected::Received {
            index: 0,
            value: None
        }
    );
}

#[test]
fn send_goes_to_a_channel_with_room() {
    let full = bounded(1);
    let empty = bounded(1);
    full.send("already here");

    let mut select = Select::new();
    select.send(full.tx(), "to full");
    let empty_index = select.send(empty.tx(), "to empty");
    select.default_case();

    assert_eq!(select.wait(), Selected::Sent { index: empty_index });
    assert_eq!(empty.recv(), Some("to empty"));
    assert_eq!(full.recv(), Some("already here"));
}

#[test]
fn both_full_falls_back_to_default() {
    let a = bounded(1);
    let b = bounded(1);
    a.send(1);
    b.send(2);

    let mut select = Select::new();
    select.send(a.tx(), 10);
    select.send(b.tx(), 20);
    select.default_case();
    assert_eq!(select.wait(), Selected::Default);
}

#[test]
fn loop_with_deadline_drains_then_sees_close() {
    let ch = bounded(5);
    let tx = ch.sender();
    let producer = spawn("producer", move || {
        for i in 1..=5 {
            tx.send(i);
            thread::sleep(Duration::from_millis(10));
        }
        tx.close();
    });

    let mut received = Vec::new();
    loop {
        let mut select = Select::new();
        select.recv(ch.rx());
        select.timeout(Duration::from_secs(1));
        match select.wait() {
            Selected::Received {
                value: Some(value), ..
            } => received.push(value),
            Selected::Received { value: None, .. } => break,
            other => panic!("unexpected {:?}", other),
        }
    }

    assert_eq!(received, vec![1, 2, 3, 4, 5]);
    producer.join().unwrap();
}

#[test]
fn empty_select_with_timeout_just_sleeps() {
    let started = Instant::now();
    let mut select = Select::<u8>::new();
    select.timeout(Duration::from_millis(30));
    assert_eq!(select.wait(), Selected::Timeout);
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[test]
#[should_panic(expected = "select with no candidates would block forever")]
fn empty_blocking_select_panics() {
    Select::<u8>::new().wait();
}

#[test]
#[should_panic(expected = "send on closed channel")]
fn send_candidate_on_closed_channel_panics() {
    let ch = bounded(1);
    ch.close();
    let mut select = Select::new();
    select.send(ch.tx(), 1);
    select.wait();
}
