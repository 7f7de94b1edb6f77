//! Scenarios on the thread backend. Every task is an OS thread.

use crate::Scenario;
use conduit::primitives::{SafeCounter, WaitGroup};
use conduit::synchronous::{bounded, fan_in, process_all, source, spawn, Receiver, Select, Sender};
use conduit::{Config, FanInPolicy, Selected};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub fn run(scenario: Scenario, config: &Config) -> anyhow::Result<()> {
    for scenario in scenario.expand() {
        tracing::info!(?scenario, "=== running ===");
        match scenario {
            Scenario::All => unreachable!("expanded above"),
            Scenario::Unbuffered => unbuffered()?,
            Scenario::Buffered => buffered(),
            Scenario::Closing => closing(),
            Scenario::Range => range_over_closed(),
            Scenario::BasicSelect => basic_select(),
            Scenario::MultipleReady => multiple_ready(),
            Scenario::SelectDefault => select_default()?,
            Scenario::SelectTimeout => select_timeout(),
            Scenario::SelectLoop => select_loop()?,
            Scenario::Directional => directional(),
            Scenario::SelectSend => select_send(),
            Scenario::WorkerPool => worker_pool(config)?,
            Scenario::FanIn => fan_in_with_deadline()?,
            Scenario::PingPong => ping_pong()?,
            Scenario::SafeCounter => safe_counter()?,
            Scenario::WaitGroup => wait_group(),
        }
    }
    Ok(())
}

fn unbuffered() -> anyhow::Result<()> {
    let ch = bounded(0);
    let tx = ch.sender();
    let sender = spawn("sender", move || {
        tracing::info!("sending 42");
        tx.send(42);
        tracing::info!("42 was taken");
    });

    thread::sleep(Duration::from_millis(500));
    let number = ch.recv();
    tracing::info!(?number, "received");
    sender.join()?;
    Ok(())
}

fn buffered() {
    let ch = bounded(3);
    ch.send("first");
    ch.send("second");
    ch.send("third");
    tracing::info!(len = ch.len(), "three values buffered without blocking");

    for _ in 0..3 {
        tracing::info!(value = ?ch.recv(), "read");
    }
}

fn closing() {
    let ch = bounded(3);
    for value in 1..=3 {
        ch.send(value);
    }
    ch.close();

    while let Some(value) = ch.recv() {
        tracing::info!(value, "read from closed channel");
    }
    tracing::info!(value = ?ch.recv(), "closed and drained");
}

fn range_over_closed() {
    let ch = bounded(3);
    for word in ["first", "second", "third"] {
        ch.send(word);
    }
    ch.close();

    for word in ch.rx() {
        tracing::info!(word, "received");
    }
    tracing::info!("range finished");
}

fn basic_select() {
    let slow = bounded(0);
    let fast = bounded(0);
    let (slow_tx, fast_tx) = (slow.sender(), fast.sender());
    spawn("slow", move || {
        thread::sleep(Duration::from_secs(1));
        if slow_tx.try_send("message from channel 1").is_err() {
            tracing::info!("channel 1 had no receiver left");
        }
    });
    spawn("fast", move || {
        thread::sleep(Duration::from_millis(500));
        fast_tx.send("message from channel 2");
    });

    let mut select = Select::new();
    select.recv(slow.rx());
    select.recv(fast.rx());
    if let Selected::Received { index, value } = select.wait() {
        tracing::info!(index, ?value, "only one case ran");
    }
}

fn multiple_ready() {
    let first = bounded(1);
    let second = bounded(1);
    first.send("channel 1");
    second.send("channel 2");

    let mut select = Select::new();
    select.recv(first.rx());
    select.recv(second.rx());
    if let Selected::Received { value, .. } = select.wait() {
        tracing::info!(?value, "picked at random");
    }
}

fn select_default() -> anyhow::Result<()> {
    let ch = bounded(0);

    let mut select = Select::new();
    select.recv(ch.rx());
    select.default_case();
    tracing::info!(outcome = ?select.wait(), "nothing ready yet");

    let tx = ch.sender();
    let sender = spawn("greeter", move || tx.send("Hello"));
    thread::sleep(Duration::from_millis(100));

    let mut select = Select::new();
    select.recv(ch.rx());
    select.default_case();
    tracing::info!(outcome = ?select.wait(), "after a sender showed up");
    sender.join()?;
    Ok(())
}

fn select_timeout() {
    let ch = bounded(0);
    let tx = ch.sender();
    spawn("late", move || {
        thread::sleep(Duration::from_secs(2));
        if tx.try_send("data arrived").is_err() {
            tracing::info!("data arrived after everyone stopped listening");
        }
    });

    let mut select = Select::new();
    select.recv(ch.rx());
    select.timeout(Duration::from_secs(1));
    match select.wait() {
        Selected::Timeout => tracing::info!("timed out after 1s"),
        other => tracing::info!(?other, "received"),
    }
}

fn select_loop() -> anyhow::Result<()> {
    let ch = bounded(5);
    let tx = ch.sender();
    let producer = spawn("producer", move || {
        for i in 1..=5 {
            tx.send(i);
            thread::sleep(Duration::from_millis(300));
        }
        tx.close();
    });

    loop {
        let mut select = Select::new();
        select.recv(ch.rx());
        select.timeout(Duration::from_secs(1));
        match select.wait() {
            Selected::Received {
                value: Some(value), ..
            } => tracing::info!(value, "received"),
            Selected::Received { value: None, .. } => {
                tracing::info!("channel closed, leaving loop");
                break;
            }
            _ => {
                tracing::info!("timed out waiting for data");
                break;
            }
        }
    }
    producer.join()?;
    Ok(())
}

fn send_only(tx: &Sender<&'static str>) {
    tx.send("Hello");
    tx.send("World");
}

fn receive_only(rx: &Receiver<&'static str>) {
    let first = rx.recv();
    let second = rx.recv();
    tracing::info!(?first, ?second, "received through the receive half");
}

fn directional() {
    let (tx, rx) = bounded(2).split();
    send_only(&tx);
    receive_only(&rx);
}

fn select_send() {
    let first = bounded(1);
    let second = bounded(1);

    let mut select = Select::new();
    select.send(first.tx(), "sent to ch1");
    select.send(second.tx(), "sent to ch2");
    select.default_case();
    match select.wait() {
        Selected::Sent { index } => tracing::info!(index, "send succeeded"),
        _ => tracing::info!("both channels are full"),
    }

    let mut select = Select::new();
    select.recv(first.rx());
    select.recv(second.rx());
    if let Selected::Received { index, value } = select.wait() {
        tracing::info!(index, ?value, "read back");
    }
}

fn worker_pool(config: &Config) -> anyhow::Result<()> {
    let results = process_all(&config.pool, 1..=5u64, |job| {
        tracing::info!(job, worker = ?thread::current().name(), "processing");
        thread::sleep(Duration::from_millis(200));
        job * 2
    })?;
    for result in results {
        tracing::info!(result, "result");
    }
    Ok(())
}

fn fan_in_with_deadline() -> anyhow::Result<()> {
    let mut producers = Vec::new();
    let upstreams = (1..=3u32)
        .map(|id| {
            let values: Vec<u32> = (1..=3).map(|i| id * 10 + i).collect();
            let (rx, producer) = source(values, 0);
            producers.push(producer);
            rx
        })
        .collect();

    let merged = fan_in(upstreams, FanInPolicy::Open, 0);
    let deadline = Instant::now() + Duration::from_secs(1);
    loop {
        let mut select = Select::new();
        select.recv(merged.output());
        select.deadline(deadline);
        match select.wait() {
            Selected::Received {
                value: Some(value), ..
            } => tracing::info!(value, "received"),
            _ => {
                tracing::info!("done receiving");
                break;
            }
        }
    }

    for producer in producers {
        producer.join()?;
    }
    let forwarded = merged.join()?;
    tracing::info!(forwarded, "fan-in relays finished");
    Ok(())
}

fn ping_pong() -> anyhow::Result<()> {
    let ping = bounded(0);
    let pong = bounded(0);

    let (ping_rx, pong_tx) = (ping.receiver(), pong.sender());
    let player = spawn("ping", move || {
        for _ in 0..3 {
            let msg = ping_rx.recv();
            tracing::info!(?msg, "ping received");
            thread::sleep(Duration::from_millis(200));
            pong_tx.send("pong");
        }
    });

    for _ in 0..3 {
        ping.send("ping");
        let msg = pong.recv();
        tracing::info!(?msg, "pong received");
    }
    player.join()?;
    Ok(())
}

fn safe_counter() -> anyhow::Result<()> {
    let counter = Arc::new(SafeCounter::new());
    let incrementers: Vec<_> = (0..10)
        .map(|id| {
            let counter = counter.clone();
            spawn(format!("incrementer-{}", id), move || {
                for _ in 0..100 {
                    counter.inc();
                }
            })
        })
        .collect();
    for incrementer in incrementers {
        incrementer.join()?;
    }
    tracing::info!(count = counter.value(), "counter");
    Ok(())
}

fn wait_group() {
    let group = WaitGroup::new();
    for id in 0..5 {
        group.add(1);
        let done = group.done_on_drop();
        spawn(format!("member-{}", id), move || {
            let _done = done;
            tracing::info!(id, "working");
        });
    }
    group.wait();
    tracing::info!("all five finished");
}
