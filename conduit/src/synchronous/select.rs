use super::channel::{Receiver, Sender};
use crate::selected::Selected;
use crossbeam_channel as cb;
use std::thread;
use std::time::{Duration, Instant};

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

/// Waits on several channel operations and runs exactly one of them.
///
/// When more than one candidate is ready, one is picked uniformly at random;
/// crossbeam shuffles the registered operations on every selection.
///
/// ```
/// use conduit::synchronous::{bounded, Select};
/// use conduit::Selected;
/// use std::time::Duration;
///
/// let fast = bounded(1);
/// let slow = bounded::<&str>(1);
/// fast.send("fast");
///
/// let mut select = Select::new();
/// let first = select.recv(fast.rx());
/// select.recv(slow.rx());
/// select.timeout(Duration::from_millis(100));
///
/// match select.wait() {
///     Selected::Received { index, value } => {
///         assert_eq!(index, first);
///         assert_eq!(value, Some("fast"));
///     }
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
pub struct Select<'a, T> {
    candidates: Vec<Candidate<'a, T>>,
    fallback: Fallback,
}

impl<'a, T> Select<'a, T> {
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

    /// Do not block: if nothing is ready right away, `wait` returns [`Selected::Default`].
    pub fn default_case(&mut self) -> &mut Self {
        self.fallback = Fallback::Default;
        self
    }

    /// Give up with [`Selected::Timeout`] if nothing is ready after `timeout`.
    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.deadline(Instant::now() + timeout)
    }

    pub fn deadline(&mut self, deadline: Instant) -> &mut Self {
        self.fallback = Fallback::Deadline(deadline);
        self
    }

    /// Blocks until one candidate is ready and performs it.
    ///
    /// # Panics
    ///
    /// Panics if a send candidate's channel is closed, or if there are no candidates
    /// and no default or timeout, since that wait could never end.
    pub fn wait(self) -> Selected<T> {
        let Select {
            candidates,
            fallback,
        } = self;

        if candidates.is_empty() {
            return match fallback {
                Fallback::Block => panic!("select with no candidates would block forever"),
                Fallback::Default => Selected::Default,
                Fallback::Deadline(deadline) => {
                    thread::sleep(deadline.saturating_duration_since(Instant::now()));
                    Selected::Timeout
                }
            };
        }

        // Values and senders live outside the crossbeam select so the chosen
        // value can be moved out while the select still borrows the senders.
        let mut receivers = Vec::with_capacity(candidates.len());
        let mut senders = Vec::with_capacity(candidates.len());
        let mut payloads = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match candidate {
                Candidate::Recv(rx) => {
                    receivers.push(Some(rx.inner()));
                    senders.push(None);
                    payloads.push(None);
                }
                Candidate::Send(tx, value) => {
                    receivers.push(None);
                    senders.push(Some(tx.live()));
                    payloads.push(Some(value));
                }
            }
        }

        let mut select = cb::Select::new();
        for (rx, tx) in receivers.iter().zip(senders.iter()) {
            match (rx, tx) {
                (Some(rx), _) => select.recv(*rx),
                (None, Some(tx)) => select.send(tx),
                (None, None) => unreachable!("every candidate registers one operation"),
            };
        }

        let operation = match fallback {
            Fallback::Block => select.select(),
            Fallback::Default => match select.try_select() {
                Ok(operation) => operation,
                Err(_) => return Selected::Default,
            },
            Fallback::Deadline(deadline) => {
                match select.select_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(operation) => operation,
                    Err(_) => return Selected::Timeout,
                }
            }
        };

        let index = operation.index();
        match (receivers[index], senders[index].as_ref()) {
            (Some(rx), _) => Selected::Received {
                index,
                value: operation.recv(rx).ok(),
            },
            (None, Some(tx)) => {
                let value = match payloads[index].take() {
                    Some(value) => value,
                    None => unreachable!("send candidates carry a value"),
                };
                if operation.send(tx, value).is_err() {
                    unreachable!("the channel owns its receiver");
                }
                Selected::Sent { index }
            }
            (None, None) => unreachable!("every candidate registers one operation"),
        }
    }
}

impl<'a, T> Default for Select<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}
