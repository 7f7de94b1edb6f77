use crate::error::{RecvTimeoutError, TryRecvError, TrySendError, CLOSE_OF_CLOSED, SEND_ON_CLOSED};
use crossbeam_channel as cb;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// State shared by every handle of one channel.
///
/// Closing drops the stored crossbeam sender. Once the last in-flight clone of it is
/// gone, crossbeam reports the receiver as disconnected, which is how receivers
/// learn that the channel is closed and drained. The receiver is owned here, so a
/// send can never fail because nobody is listening.
struct Shared<T> {
    tx: RwLock<Option<cb::Sender<T>>>,
    rx: cb::Receiver<T>,
    capacity: Option<usize>,
}

impl<T> Shared<T> {
    fn live_sender(&self) -> cb::Sender<T> {
        match self.tx.read().as_ref() {
            Some(tx) => tx.clone(),
            None => panic!("{}", SEND_ON_CLOSED),
        }
    }

    fn close(&self) {
        if self.tx.write().take().is_none() {
            panic!("{}", CLOSE_OF_CLOSED);
        }
    }

    fn is_closed(&self) -> bool {
        self.tx.read().is_none()
    }
}

/// Creates a channel holding at most `capacity` values.
///
/// A capacity of zero gives a rendezvous channel: every send waits until a
/// receiver takes the value.
pub fn bounded<T>(capacity: usize) -> Channel<T> {
    let (tx, rx) = cb::bounded(capacity);
    Channel::from_parts(tx, rx, Some(capacity))
}

/// Creates a channel whose sends never block.
pub fn unbounded<T>() -> Channel<T> {
    let (tx, rx) = cb::unbounded();
    Channel::from_parts(tx, rx, None)
}

/// The sending half of a channel. It can send and close, but not receive.
pub struct Sender<T> {
    shared: Arc<Shared<T>>,
}

/// The receiving half of a channel. It can receive, but not send or close.
pub struct Receiver<T> {
    shared: Arc<Shared<T>>,
}

/// A bidirectional channel handle.
///
/// Cloning gives another handle to the same channel.
pub struct Channel<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> Channel<T> {
    fn from_parts(tx: cb::Sender<T>, rx: cb::Receiver<T>, capacity: Option<usize>) -> Self {
        let shared = Arc::new(Shared {
            tx: RwLock::new(Some(tx)),
            rx,
            capacity,
        });
        Channel {
            tx: Sender {
                shared: shared.clone(),
            },
            rx: Receiver { shared },
        }
    }

    /// A send-only handle to this channel.
    pub fn sender(&self) -> Sender<T> {
        self.tx.clone()
    }

    /// A receive-only handle to this channel.
    pub fn receiver(&self) -> Receiver<T> {
        self.rx.clone()
    }

    pub fn split(self) -> (Sender<T>, Receiver<T>) {
        (self.tx, self.rx)
    }

    pub fn tx(&self) -> &Sender<T> {
        &self.tx
    }

    pub fn rx(&self) -> &Receiver<T> {
        &self.rx
    }

    pub fn send(&self, value: T) {
        self.tx.send(value)
    }

    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        self.tx.try_send(value)
    }

    pub fn recv(&self) -> Option<T> {
        self.rx.recv()
    }

    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub fn close(&self) {
        self.tx.close()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// `None` for an unbounded channel.
    pub fn capacity(&self) -> Option<usize> {
        self.tx.shared.capacity
    }
}

impl<T> Sender<T> {
    /// Sends a value, blocking while the channel is full.
    ///
    /// # Panics
    ///
    /// Panics if the channel has been closed.
    pub fn send(&self, value: T) {
        let tx = self.shared.live_sender();
        if tx.send(value).is_err() {
            unreachable!("the channel owns its receiver");
        }
    }

    /// Sends a value only if that can be done without blocking.
    ///
    /// # Panics
    ///
    /// Panics if the channel has been closed.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        let tx = self.shared.live_sender();
        match tx.try_send(value) {
            Ok(()) => Ok(()),
            Err(cb::TrySendError::Full(value)) => Err(TrySendError(value)),
            Err(cb::TrySendError::Disconnected(_)) => {
                unreachable!("the channel owns its receiver")
            }
        }
    }

    /// Closes the channel. Values already buffered can still be received.
    ///
    /// A send that was already blocked on a full channel when it closed still
    /// completes; only sends started after the close panic.
    ///
    /// # Panics
    ///
    /// Panics if the channel is already closed.
    pub fn close(&self) {
        self.shared.close()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Clones the live crossbeam sender for a select.
    pub(crate) fn live(&self) -> cb::Sender<T> {
        self.shared.live_sender()
    }
}

impl<T> Receiver<T> {
    /// Blocks until a value arrives. Returns `None` once the channel is closed and drained.
    pub fn recv(&self) -> Option<T> {
        self.shared.rx.recv().ok()
    }

    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.shared.rx.try_recv().map_err(|err| match err {
            cb::TryRecvError::Empty => TryRecvError::Empty,
            cb::TryRecvError::Disconnected => TryRecvError::Closed,
        })
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.shared.rx.recv_timeout(timeout).map_err(|err| match err {
            cb::RecvTimeoutError::Timeout => RecvTimeoutError::Timeout,
            cb::RecvTimeoutError::Disconnected => RecvTimeoutError::Closed,
        })
    }

    /// Iterates over received values until the channel is closed and drained.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { rx: self }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    pub fn len(&self) -> usize {
        self.shared.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.rx.is_empty()
    }

    pub(crate) fn inner(&self) -> &cb::Receiver<T> {
        &self.shared.rx
    }
}

/// Blocking iterator over a [`Receiver`].
pub struct Iter<'a, T> {
    rx: &'a Receiver<T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.rx.recv()
    }
}

impl<'a, T> IntoIterator for &'a Receiver<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Sender {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        Receiver {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Channel {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
        }
    }
}

impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("capacity", &self.capacity)
            .field("len", &self.rx.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T> fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sender").field(&self.shared).finish()
    }
}

impl<T> fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Receiver").field(&self.shared).finish()
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tx.shared.fmt(f)
    }
}
