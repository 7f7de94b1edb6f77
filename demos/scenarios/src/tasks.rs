//! Scenarios on the tokio backend. Every task runs on the scheduler built from the
//! configuration, not on a process-wide runtime.

use crate::Scenario;
use conduit::asynchronous::{bounded, fan_in, process_all, source, Receiver, Select, Sender, Spawner};
use conduit::primitives::{SafeCounter, WaitGroup};
use conduit::{Config, FanInPolicy, Selected};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

pub async fn run(spawner: &Spawner, scenario: Scenario, config: &Config) -> anyhow::Result<()> {
    for scenario in scenario.expand() {
        tracing::info!(?scenario, "=== running ===");
        match scenario {
            Scenario::All => unreachable!("expanded above"),
            Scenario::Unbuffered => unbuffered(spawner).await?,
            Scenario::Buffered => buffered().await,
            Scenario::Closing => closing().await,
            Scenario::Range => range_over_closed().await,
            Scenario::BasicSelect => basic_select(spawner).await,
            Scenario::MultipleReady => multiple_ready().await,
            Scenario::SelectDefault => select_default(spawner).await?,
            Scenario::SelectTimeout => select_timeout(spawner).await,
            Scenario::SelectLoop => select_loop(spawner).await?,
            Scenario::Directional => directional().await,
            Scenario::SelectSend => select_send().await,
            Scenario::WorkerPool => worker_pool(spawner, config).await?,
            Scenario::FanIn => fan_in_with_deadline(spawner).await?,
            Scenario::PingPong => ping_pong(spawner).await?,
            Scenario::SafeCounter => safe_counter(spawner).await?,
            Scenario::WaitGroup => wait_group(spawner).await?,
        }
    }
    Ok(())
}

async fn unbuffered(spawner: &Spawner) -> anyhow::Result<()> {
    let ch = bounded(0);
    let tx = ch.sender();
    let sender = spawner.spawn(async move {
        tracing::info!("sending 42");
        tx.send(42).await;
        tracing::info!("42 was taken");
    });

    sleep(Duration::from_millis(500)).await;
    let number = ch.recv().await;
    tracing::info!(?number, "received");
    sender.join().await?;
    Ok(())
}

async fn buffered() {
    let ch = bounded(3);
    ch.send("first").await;
    ch.send("second").await;
    ch.send("third").await;
    tracing::info!(len = ch.len(), "three values buffered without waiting");

    for _ in 0..3 {
        tracing::info!(value = ?ch.recv().await, "read");
    }
}

async fn closing() {
    let ch = bounded(3);
    for value in 1..=3 {
        ch.send(value).await;
    }
    ch.close();

    while let Some(value) = ch.recv().await {
        tracing::info!(value, "read from closed channel");
    }
    tracing::info!(value = ?ch.recv().await, "closed and drained");
}

async fn range_over_closed() {
    let ch = bounded(3);
    for word in ["first", "second", "third"] {
        ch.send(word).await;
    }
    ch.close();

    for word in ch.rx().drain().await {
        tracing::info!(word, "received");
    }
    tracing::info!("range finished");
}

async fn basic_select(spawner: &Spawner) {
    let slow = bounded(0);
    let fast = bounded(0);
    let (slow_tx, fast_tx) = (slow.sender(), fast.sender());
    spawner.spawn(async move {
        sleep(Duration::from_secs(1)).await;
        if slow_tx.try_send("message from channel 1").is_err() {
            tracing::info!("channel 1 had no receiver left");
        }
    });
    spawner.spawn(async move {
        sleep(Duration::from_millis(500)).await;
        fast_tx.send("message from channel 2").await;
    });

    let mut select = Select::new();
    select.recv(slow.rx());
    select.recv(fast.rx());
    if let Selected::Received { index, value } = select.wait().await {
        tracing::info!(index, ?value, "only one case ran");
    }
}

async fn multiple_ready() {
    let first = bounded(1);
    let second = bounded(1);
    first.send("channel 1").await;
    second.send("channel 2").await;

    let mut select = Select::new();
    select.recv(first.rx());
    select.recv(second.rx());
    if let Selected::Received { value, .. } = select.wait().await {
        tracing::info!(?value, "picked at random");
    }
}

async fn select_default(spawner: &Spawner) -> anyhow::Result<()> {
    let ch = bounded(0);

    let mut select = Select::new();
    select.recv(ch.rx());
    select.default_case();
    tracing::info!(outcome = ?select.wait().await, "nothing ready yet");

    let tx = ch.sender();
    let sender = spawner.spawn(async move { tx.send("Hello").await });
    sleep(Duration::from_millis(100)).await;

    let mut select = Select::new();
    select.recv(ch.rx());
    select.default_case();
    tracing::info!(outcome = ?select.wait().await, "after a sender showed up");
    sender.join().await?;
    Ok(())
}

async fn select_timeout(spawner: &Spawner) {
    let ch = bounded(0);
    let tx = ch.sender();
    spawner.spawn(async move {
        sleep(Duration::from_secs(2)).await;
        if tx.try_send("data arrived").is_err() {
            tracing::info!("data arrived after everyone stopped listening");
        }
    });

    let mut select = Select::new();
    select.recv(ch.rx());
    select.timeout(Duration::from_secs(1));
    match select.wait().await {
        Selected::Timeout => tracing::info!("timed out after 1s"),
        other => tracing::info!(?other, "received"),
    }
}

async fn select_loop(spawner: &Spawner) -> anyhow::Result<()> {
    let ch = bounded(5);
    let tx = ch.sender();
    let producer = spawner.spawn(async move {
        for i in 1..=5 {
            tx.send(i).await;
            sleep(Duration::from_millis(300)).await;
        }
        tx.close();
    });

    loop {
        let mut select = Select::new();
        select.recv(ch.rx());
        select.timeout(Duration::from_secs(1));
        match select.wait().await {
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
    producer.join().await?;
    Ok(())
}

async fn send_only(tx: &Sender<&'static str>) {
    tx.send("Hello").await;
    tx.send("World").await;
}

async fn receive_only(rx: &Receiver<&'static str>) {
    let first = rx.recv().await;
    let second = rx.recv().await;
    tracing::info!(?first, ?second, "received through the receive half");
}

async fn directional() {
    let (tx, rx) = bounded(2).split();
    send_only(&tx).await;
    receive_only(&rx).await;
}

async fn select_send() {
    let first = bounded(1);
    let second = bounded(1);

    let mut select = Select::new();
    select.send(first.tx(), "sent to ch1");
    select.send(second.tx(), "sent to ch2");
    select.default_case();
    match select.wait().await {
        Selected::Sent { index } => tracing::info!(index, "send succeeded"),
        _ => tracing::info!("both channels are full"),
    }

    let mut select = Select::new();
    select.recv(first.rx());
    select.recv(second.rx());
    if let Selected::Received { index, value } = select.wait().await {
        tracing::info!(index, ?value, "read back");
    }
}

async fn worker_pool(spawner: &Spawner, config: &Config) -> anyhow::Result<()> {
    let results = process_all(spawner, &config.pool, 1..=5u64, |job| async move {
        tracing::info!(job, "processing");
        sleep(Duration::from_millis(200)).await;
        job * 2
    })
    .await?;
    for result in results {
        tracing::info!(result, "result");
    }
    Ok(())
}

async fn fan_in_with_deadline(spawner: &Spawner) -> anyhow::Result<()> {
    let mut producers = Vec::new();
    let upstreams = (1..=3u32)
        .map(|id| {
            let values: Vec<u32> = (1..=3).map(|i| id * 10 + i).collect();
            let (rx, producer) = source(spawner, values, 0);
            producers.push(producer);
            rx
        })
        .collect();

    let merged = fan_in(spawner, upstreams, FanInPolicy::Open, 0);
    let deadline = Instant::now() + Duration::from_secs(1);
    loop {
        let mut select = Select::new();
        select.recv(merged.output());
        select.deadline(deadline);
        match select.wait().await {
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
        producer.join().await?;
    }
    let forwarded = merged.join().await?;
    tracing::info!(forwarded, "fan-in relays finished");
    Ok(())
}

async fn ping_pong(spawner: &Spawner) -> anyhow::Result<()> {
    let ping = bounded(0);
    let pong = bounded(0);

    let (ping_rx, pong_tx) = (ping.receiver(), pong.sender());
    let player = spawner.spawn(async move {
        for _ in 0..3 {
            let msg = ping_rx.recv().await;
            tracing::info!(?msg, "ping received");
            sleep(Duration::from_millis(200)).await;
            pong_tx.send("pong").await;
        }
    });

    for _ in 0..3 {
        ping.send("ping").await;
        let msg = pong.recv().await;
        tracing::info!(?msg, "pong received");
    }
    player.join().await?;
    Ok(())
}

async fn safe_counter(spawner: &Spawner) -> anyhow::Result<()> {
    let counter = Arc::new(SafeCounter::new());
    let incrementers: Vec<_> = (0..10)
        .map(|_| {
            let counter = counter.clone();
            spawner.spawn(async move {
                for _ in 0..100 {
                    counter.inc();
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();
    for incrementer in incrementers {
        incrementer.join().await?;
    }
    tracing::info!(count = counter.value(), "counter");
    Ok(())
}

/// Tasks cannot park on [`WaitGroup::wait`] without stalling a scheduler thread, so
/// the group is only used for counting here and completion is awaited through joins.
async fn wait_group(spawner: &Spawner) -> anyhow::Result<()> {
    let group = WaitGroup::new();
    let members: Vec<_> = (0..5)
        .map(|id| {
            group.add(1);
            let done = group.done_on_drop();
            spawner.spawn(async move {
                let _done = done;
                tracing::info!(id, "working");
            })
        })
        .collect();

    for member in members {
        member.join().await?;
    }
    tracing::info!(pending = group.pending(), "all five finished");
    Ok(())
}
