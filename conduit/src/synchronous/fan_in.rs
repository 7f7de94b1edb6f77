use super::channel::{bounded, Receiver};
use super::task::{spawn, TaskHandle};
use crate::error::TaskError;
use crate::fan_in::FanInPolicy;
use crate::primitives::WaitGroup;

/// A running merge of several upstream channels into one output channel.
#[derive(Debug)]
pub struct FanIn<T> {
    output: Receiver<T>,
    supervisor: TaskHandle<Result<usize, TaskError>>,
}

/// Spawns one relay thread per upstream, each forwarding into a shared output channel
/// of the given capacity until its upstream is closed and drained.
///
/// With [`FanInPolicy::CloseWhenDrained`] the output is closed once every relay has
/// finished. With [`FanInPolicy::Open`] it is never closed and the consumer has to
/// stop on its own, typically through a select deadline.
pub fn fan_in<T>(upstreams: Vec<Receiver<T>>, policy: FanInPolicy, capacity: usize) -> FanIn<T>
where
    T: Send + 'static,
{
    let output = bounded(capacity);
    let relays_done = WaitGroup::new();
    relays_done.add(upstreams.len());

    let relays: Vec<TaskHandle<usize>> = upstreams
        .into_iter()
        .enumerate()
        .map(|(id, upstream)| {
            let downstream = output.sender();
            let done = relays_done.done_on_drop();
            spawn(format!("relay-{}", id), move || {
                let _done = done;
                let mut forwarded = 0;
                for value in upstream.iter() {
                    downstream.send(value);
                    forwarded += 1;
                }
                tracing::debug!(relay = id, forwarded, "upstream drained");
                forwarded
            })
        })
        .collect();

    let supervisor = {
        let downstream = output.sender();
        spawn("fan-in-supervisor", move || {
            relays_done.wait();
            if policy == FanInPolicy::CloseWhenDrained {
                downstream.close();
            }

            let mut total = 0;
            let mut fault = None;
            for relay in relays {
                match relay.join() {
                    Ok(forwarded) => total += forwarded,
                    Err(err) => {
                        fault.get_or_insert(err);
                    }
                }
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
    /// The merged channel.
    pub fn output(&self) -> &Receiver<T> {
        &self.output
    }

    /// Waits for every relay and returns how many values were forwarded in total.
    ///
    /// Under [`FanInPolicy::Open`] this only returns once every upstream is closed.
    pub fn join(self) -> Result<usize, TaskError> {
        self.supervisor.join()?
    }
}

/// Spawns a producer that sends every item into a fresh channel, then closes it.
pub fn source<T, I>(items: I, capacity: usize) -> (Receiver<T>, TaskHandle<()>)
where
    T: Send + 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
{
    let channel = bounded(capacity);
    let tx = channel.sender();
    let items = items.into_iter();
    let handle = spawn("source", move || {
        for item in items {
            tx.send(item);
        }
        tx.close();
    });
    (channel.receiver(), handle)
}
