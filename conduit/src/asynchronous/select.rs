use super::channel::{Envelope, Receiver, Sender};
use crate::selected::Selected;
use futures::future::{self, FutureExt};
use rand::seq::SliceRandom;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

enum Candidate<'a, T> {
    Recv(&'a Receiver<T>),
    Send(&'a Sender<T>, T),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fallback {
    Block,
    Default,
    Deadline(Instant),
}

/// What the winning racer brings back. Nothing has been sent yet for `Reserved`;
/// the value is only committed once the race is decided.
enum Ready<T> {
    Received(usize, Option<Envelope<T>>),
    Reserved(usize, mpsc::OwnedPermit<Envelope<T>>),
    Elapsed,
}

type Racer<'a, T> = Pin<Box<dyn Future<Output = Ready<T>> + Send + 'a>>;

/// Waits on several channel operations and runs exactly one of them.
///
/// Every candidate becomes a future and the futures race each other. They are
/// shuffled before the race, so among candidates that are ready at the same time the
/// winner is uniformly random. A timeout adds one more racer backed by a timer.
///
/// ```
/// use conduit::asynchronous::{bounded, Scheduler, Select};
/// use conduit::Selected;
/// use std::time::Duration;
///
/// let scheduler = Scheduler::current_thread().unwrap();
/// let idle = bounded::<u8>(0);
///
/// let outcome = scheduler.block_on(async {
///     let mut select = Select::new();
///     select.recv(idle.rx());
///     select.timeout(Duration::from_millis(20));
///     select.wait().await
/// });
/// assert_eq!(outcome, Selected::Timeout);
/// ```
pub struct Select<'a, T> {
    candidates: Vec<Candidate<'a, T>>,
    fallback: Fallback,
}

impl<'a, T: Send + 'a> Select<'a, T> {
    pub fn new() -> Self {
        Select {
            candidates: Vec::new(),
            fallback: Fallback::Block,
        }
    }

    /// Adds a receive candidate and returns its index.
    pub fn recv(&mut self, rx: &'a Receiver<T>) -> usize {
        self.candidates.push(Candidate::Recv(rx));
        self.candidates.len() - 1
    }

    /// Adds a send candidate and returns its index.
    ///
    /// The value is dropped if another candidate is chosen.
    pub fn send(&mut self, tx: &'a Sender<T>, value: T) -> usize {
        self.candidates.push(Candidate::Send(tx, value));
        self.candidates.len() - 1
    }

    /// Do not wait: if nothing is ready on the first poll, return [`Selected::Default`].
    pub fn default_case(&mut self) -> &mut Self {
        self.fallback = Fallback::Default;
        self
    }

    /// Race a timer that fires with [`Selected::Timeout`] after `timeout`.
    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.deadline(Instant::now() + timeout)
    }

    pub fn deadline(&mut self, deadline: Instant) -> &mut Self {
        self.fallback = Fallback::Deadline(deadline);
        self
    }

    /// Waits until one candidate is ready and performs it.
    ///
    /// A send on a rendezvous channel is only ready while a receiver is waiting, and
    /// once chosen it also waits for that receiver to take the value.
    ///
    /// # Panics
    ///
    /// Panics if a send candidate's channel is closed, or if there are no candidates
    /// and no default or timeout, since that wait could never end.
    pub async fn wait(self) -> Selected<T> {
        let Select {
            candidates,
            fallback,
        } = self;

        if candidates.is_empty() {
            return match fallback {
                Fallback::Block => panic!("select with no candidates would block forever"),
                Fallback::Default => Selected::Default,
                Fallback::Deadline(deadline) => {
                    tokio::time::sleep_until(deadline.into()).await;
                    Selected::Timeout
                }
            };
        }

        let mut senders = Vec::with_capacity(candidates.len());
        let mut payloads = Vec::with_capacity(candidates.len());
        let mut racers: Vec<Racer<'a, T>> = Vec::with_capacity(candidates.len() + 1);

        for (index, candidate) in candidates.into_iter().enumerate() {
            match candidate {
                Candidate::Recv(rx) => {
                    senders.push(None);
                    payloads.push(None);
                    racers.push(Box::pin(async move {
                        Ready::Received(index, rx.recv_envelope().await)
                    }));
                }
                Candidate::Send(tx, value) => {
                    let live = tx.live();
                    senders.push(Some(tx));
                    payloads.push(Some(value));
                    racers.push(Box::pin(async move {
                        // A rendezvous send is only ready while someone is receiving.
                        tx.receiver_ready().await;
                        match live.reserve_owned().await {
                            Ok(permit) => Ready::Reserved(index, permit),
                            Err(_) => unreachable!("the channel owns its receiver"),
                        }
                    }));
                }
            }
        }

        if let Fallback::Deadline(deadline) = fallback {
            racers.push(Box::pin(async move {
                tokio::time::sleep_until(deadline.into()).await;
                Ready::Elapsed
            }));
        }

        racers.shuffle(&mut rand::thread_rng());
        let race = future::select_all(racers);

        let ready = match fallback {
            Fallback::Default => match race.now_or_never() {
                Some((ready, _, _)) => ready,
                None => return Selected::Default,
            },
            Fallback::Block | Fallback::Deadline(_) => race.await.0,
        };

        match ready {
            Ready::Received(index, envelope) => Selected::Received {
                index,
                value: envelope.map(Envelope::open),
            },
            Ready::Reserved(index, permit) => {
                let (tx, value) = match (senders[index], payloads[index].take()) {
                    (Some(tx), Some(value)) => (tx, value),
                    _ => unreachable!("send candidates carry a sender and a value"),
                };
                let (envelope, picked_up) = tx.wrap(value);
                permit.send(envelope);
                if let Some(picked_up) = picked_up {
                    let _ = picked_up.await;
                }
                Selected::Sent { index }
            }
            Ready::Elapsed => Selected::Timeout,
        }
    }
}

impl<'a, T: Send + 'a> Default for Select<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}
