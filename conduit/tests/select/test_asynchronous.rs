use conduit::asynchronous::{bounded, Scheduler, Select};
use conduit::config::SchedulerConfig;
use conduit::Selected;
use std::time::Duration;
use tokio::time::Instant;

const TRIALS: usize = 1000;

fn scheduler() -> Scheduler {
    let config = SchedulerConfig {
        worker_threads: 2,
        ..SchedulerConfig::default()
    };
    Scheduler::new(&config).unwrap()
}

#[test]
fn picks_whichever_channel_is_ready_first() {
    let scheduler = scheduler();
    scheduler.block_on(async {
        let slow = bounded(0);
        let fast = bounded(0);

        let slow_tx = slow.sender();
        let fast_tx = fast.sender();
        scheduler.spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            let _ = slow_tx.try_send("slow");
        });
        scheduler.spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            fast_tx.send("fast").await;
        });

        let mut select = Select::new();
        select.recv(slow.rx());
        let fast_index = select.recv(fast.rx());

        assert_eq!(
            select.wait().await,
            Selected::Received {
                index: fast_index,
                value: Some("fast")
            }
        );
    });
}

#[test]
fn ready_candidates_are_chosen_evenly() {
    let scheduler = scheduler();
    let counts = scheduler.block_on(async {
        let left = bounded(1);
        let right = bounded(1);
        left.send("left").await;
        right.send("right").await;

        let mut counts = [0usize; 2];
        for _ in 0..TRIALS {
            let mut select = Select::new();
            select.recv(left.rx());
            select.recv(right.rx());

            match select.wait().await {
                Selected::Received {
                    index,
                    value: Some(value),
                } => {
                    counts[index] += 1;
                    [&left, &right][index].send(value).await;
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        counts
    });

    assert_eq!(counts[0] + counts[1], TRIALS);
    assert!(counts[0] > TRIALS / 3, "left starved: {:?}", counts);
    assert!(counts[1] > TRIALS / 3, "right starved: {:?}", counts);
}

#[test]
fn default_runs_when_nothing_is_ready() {
    let scheduler = scheduler();
    scheduler.block_on(async {
        let ch = bounded::<&str>(1);

        let mut select = Select::new();
        select.recv(ch.rx());
        select.default_case();
        assert_eq!(select.wait().await, Selected::Default);

        ch.send("Hello").await;

        let mut select = Select::new();
        select.recv(ch.rx());
        select.default_case();
        assert_eq!(
            select.wait().await,
            Selected::Received {
                index: 0,
                value: Some("Hello")
            }
        );
    });
}

#[test]
fn timeout_fires_no_earlier_than_its_duration() {
    let scheduler = scheduler();
    let (outcome, elapsed) = scheduler.block_on(async {
        let ch = bounded::<u8>(0);
        let started = Instant::now();
        let mut select = Select::new();
        select.recv(ch.rx());
        select.timeout(Duration::from_millis(100));
        let outcome = select.wait().await;
        (outcome, started.elapsed())
    });

    let timeout = Duration::from_millis(100);
    assert_eq!(outcome, Selected::Timeout);
    assert!(elapsed >= timeout, "fired early: {:?}", elapsed);
    assert!(elapsed < timeout + Duration::from_millis(250), "fired late: {:?}", elapsed);
}

#[test]
fn closed_channel_is_ready_with_no_value() {
    let scheduler = scheduler();
    let outcome = scheduler.block_on(async {
        let ch = bounded::<u8>(0);
        ch.close();

        let mut select = Select::new();
        select.recv(ch.rx());
        select.timeout(Duration::from_secs(5));
        select.wait().await
    });
    assert_eq!(
        outcome,
        Selected::Received {
            index: 0,
            value: None
        }
    );
}

#[test]
fn send_goes_to_a_channel_with_room() {
    let scheduler = scheduler();
    scheduler.block_on(async {
        let full = bounded(1);
        let empty = bounded(1);
        full.send("already here").await;

        let mut select = Select::new();
        select.send(full.tx(), "to full");
        let empty_index = select.send(empty.tx(), "to empty");
        select.default_case();

        assert_eq!(select.wait().await, Selected::Sent { index: empty_index });
        assert_eq!(empty.recv().await, Some("to empty"));
        assert_eq!(full.recv().await, Some("already here"));
    });
}

#[test]
fn rendezvous_send_candidate_waits_for_pickup() {
    let scheduler = scheduler();
    scheduler.block_on(async {
        let ch = bounded(0);
        let rx = ch.receiver();
        let receiver = scheduler.spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            rx.recv().await
        });

        let mut select = Select::new();
        select.send(ch.tx(), 9);
        select.timeout(Duration::from_secs(5));
        assert_eq!(select.wait().await, Selected::Sent { index: 0 });
        assert_eq!(receiver.join().await.unwrap(), Some(9));
    });
}

#[test]
fn rendezvous_send_without_receiver_takes_default() {
    let scheduler = scheduler();
    let outcome = scheduler.block_on(async {
        let ch = bounded::<u8>(0);
        let mut select = Select::new();
        select.send(ch.tx(), 1);
        select.default_case();
        tokio::time::timeout(Duration::from_millis(500), select.wait()).await
    });
    assert_eq!(outcome, Ok(Selected::Default));
}

#[test]
fn rendezvous_send_without_receiver_times_out() {
    let scheduler = scheduler();
    let outcome = scheduler.block_on(async {
        let ch = bounded::<u8>(0);
        let mut select = Select::new();
        select.send(ch.tx(), 1);
        select.timeout(Duration::from_millis(50));
        tokio::time::timeout(Duration::from_millis(500), select.wait()).await
    });
    assert_eq!(outcome, Ok(Selected::Timeout));
}

#[test]
fn rendezvous_send_to_a_waiting_receiver_beats_default() {
    let scheduler = scheduler();
    scheduler.block_on(async {
        let ch = bounded(0);
        let rx = ch.receiver();
        let receiver = scheduler.spawn(async move { rx.recv().await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut select = Select::new();
        select.send(ch.tx(), 3);
        select.default_case();
        assert_eq!(select.wait().await, Selected::Sent { index: 0 });
        assert_eq!(receiver.join().await.unwrap(), Some(3));
    });
}

#[test]
fn timer_candidate_races_a_late_value() {
    let scheduler = scheduler();
    scheduler.block_on(async {
        let ch = bounded(0);
        let tx = ch.sender();
        scheduler.spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            let _ = tx.try_send("Data arrived");
        });

        let mut select = Select::new();
        select.recv(ch.rx());
        select.timeout(Duration::from_millis(50));
        assert_eq!(select.wait().await, Selected::Timeout);
    });
}

#[test]
#[should_panic(expected = "select with no candidates would block forever")]
fn empty_blocking_select_panics() {
    let scheduler = scheduler();
    scheduler.block_on(Select::<u8>::new().wait());
}
