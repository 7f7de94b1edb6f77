use super::channel::{bounded, Receiver};
use super::scheduler::{Spawner, TaskHandle};
use crate::error::TaskError;
use crate::fan_in::FanInPolicy;

/// A running merge of several upstream channels into one output channel.
#[derive(Debug)]
pub struct FanIn<T> {
    output: Receiver<T>,
    supervisor: TaskHandle<Result<usize, TaskError>>,
}

/// Spawns one relay task per upstream, each forwarding into a shared output channel
/// of the given capacity until its upstream is closed and drained.
///
/// A supervisor task joins the relays. Under [`FanInPolicy::CloseWhenDrained`] it
/// closes the output afterwards.
pub fn fan_in<T>(
    spawner: &Spawner,
    upstreams: Vec<Receiver<T>>,
    policy: FanInPolicy,
    capacity: usize,
) -> FanIn<T>
where
    T: Send + 'static,
{
    let output = bounded(capacity);

    let relays: Vec<TaskHandle<usize>> = upstreams
        .into_iter()
        .enumerate()
        .map(|(id, upstream)| {
            let downstream = output.sender();
            spawner.spawn(async move {
                let mut forwarded = 0;
                while let Some(value) = upstream.recv().await {
                    downstream.send(value).await;
                    forwarded += 1;
                }
                tracing::debug!(relay = id, forwarded, "upstream drained");
                forwarded
            })
        })
        .collect();

    let supervisor = {
        let downstream = output.sender();
        spawner.spawn(async move {
            let mut total = 0;
            let mut fault = None;
            for relay in relays {
                match relay.join().await {
                    Ok(forwarded) => total += forwarded,
                    Err(err) => {
                        fault.get_or_insert(err);
                    }
                }
            }
            if policy == FanInPolicy::CloseWhenDrained {
                downstream.close();
            }
            match fault {
                Some(err) => Err(err),
                None => Ok(total),
            }
        })
    };

    FanIn {
        output: output.receiver(),
        supervisor,
    }
}

impl<T> FanIn<T> {
    pub fn output(&self) -> &Receiver<T> {
        &self.output
    }

    /// Waits for every relay and returns how many values were forwarded in total.
    pub async fn join(self) -> Result<usize, TaskError> {
        self.supervisor.join().await?
    }
}

/// Spawns a producer task that sends every item into a fresh channel, then closes it.
pub fn source<T, I>(spawner: &Spawner, items: I, capacity: usize) -> (Receiver<T>, TaskHandle<()>)
where
    T: Send + 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
{
    let channel = bounded(capacity);
    let tx = channel.sender();
    let items = items.into_iter();
    let handle = spawner.spawn(async move {
        for item in items {
            tx.send(item).await;
        }
        tx.close();
    });
    (channel.receiver(), handle)
}
