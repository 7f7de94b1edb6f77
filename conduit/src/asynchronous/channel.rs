use crate::error::{RecvTimeoutError, TryRecvError, TrySendError, CLOSE_OF_CLOSED, SEND_ON_CLOSED};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex, Notify};

/// A value in flight. On a rendezvous channel the sender waits on `ack` until a
/// receiver has taken the value.
pub(crate) struct Envelope<T> {
    value: T,
    ack: Option<oneshot::Sender<()>>,
}

impl<T> Envelope<T> {
    pub(crate) fn open(self) -> T {
        if let Some(ack) = self.ack {
            // The sender may have stopped waiting; the value is delivered regardless.
            let _ = ack.send(());
        }
        self.value
    }
}

/// Hand-off acknowledgement for a rendezvous send.
pub(crate) type PickedUp = Option<oneshot::Receiver<()>>;

struct Shared<T> {
    tx: Mutex<Option<mpsc::Sender<Envelope<T>>>>,
    // tokio's mpsc has a single consumer; the lock lets any number of receivers
    // share it. Waiters are served in FIFO order.
    rx: AsyncMutex<mpsc::Receiver<Envelope<T>>>,
    capacity: usize,
    // Receivers currently inside a receive. A rendezvous hand-off only starts
    // while this is non-zero.
    parked: AtomicUsize,
    receiver_parked: Notify,
}

/// Counts one receiver as parked for as long as it is alive.
struct Parked<'a> {
    parked: &'a AtomicUsize,
}

impl Drop for Parked<'_> {
    fn drop(&mut self) {
        self.parked.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<T> Shared<T> {
    fn live_sender(&self) -> mpsc::Sender<Envelope<T>> {
        match self.tx.lock().as_ref() {
            Some(tx) => tx.clone(),
            None => panic!("{}", SEND_ON_CLOSED),
        }
    }

    fn close(&self) {
        if self.tx.lock().take().is_none() {
            panic!("{}", CLOSE_OF_CLOSED);
        }
    }

    fn is_closed(&self) -> bool {
        self.tx.lock().is_none()
    }

    fn park(&self) -> Parked<'_> {
        self.parked.fetch_add(1, Ordering::SeqCst);
        self.receiver_parked.notify_waiters();
        Parked {
            parked: &self.parked,
        }
    }

    fn has_parked_receiver(&self) -> bool {
        self.parked.load(Ordering::SeqCst) > 0
    }

    /// Resolves once a receiver is parked. Immediate on a buffered channel.
    async fn receiver_ready(&self) {
        if self.capacity > 0 {
            return;
        }
        loop {
            // Registered before the check so a concurrent park is not missed.
            let parked = self.receiver_parked.notified();
            if self.has_parked_receiver() {
                return;
            }
            parked.await;
        }
    }

    fn wrap(&self, value: T) -> (Envelope<T>, PickedUp) {
        if self.capacity == 0 {
            let (ack, picked_up) = oneshot::channel();
            (
                Envelope {
                    value,
                    ack: Some(ack),
                },
                Some(picked_up),
            )
        } else {
            (Envelope { value, ack: None }, None)
        }
    }
}

/// Creates a channel holding at most `capacity` values.
///
/// With a capacity of zero, a send completes only once a receiver has taken the value.
pub fn bounded<T>(capacity: usize) -> Channel<T> {
    // tokio needs room for at least one message; the rendezvous hand-off slot.
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let shared = Arc::new(Shared {
        tx: Mutex::new(Some(tx)),
        rx: AsyncMutex::new(rx),
        capacity,
        parked: AtomicUsize::new(0),
        receiver_parked: Notify::new(),
    });
    Channel {
        tx: Sender {
            shared: shared.clone(),
        },
        rx: Receiver { shared },
    }
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
pub struct Channel<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> Channel<T> {
    pub fn sender(&self) -> Sender<T> {
        self.tx.clone()
    }

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

    pub async fn send(&self, value: T) {
        self.tx.send(value).await
    }

    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        self.tx.try_send(value)
    }

    pub async fn recv(&self) -> Option<T> {
        self.rx.recv().await
    }

    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.rx.try_recv()
    }

    pub async fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.rx.recv_timeout(timeout).await
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

    pub fn capacity(&self) -> usize {
        self.tx.shared.capacity
    }
}

impl<T> Sender<T> {
    /// Sends a value, waiting while the channel is full.
    ///
    /// On a rendezvous channel this also waits until a receiver has taken the value.
    ///
    /// # Panics
    ///
    /// Panics if the channel has been closed.
    pub async fn send(&self, value: T) {
        let (envelope, picked_up) = self.shared.wrap(value);
        {
            // Dropped before waiting on the hand-off so a concurrent close is not held up.
            let tx = self.shared.live_sender();
            if tx.send(envelope).await.is_err() {
                unreachable!("the channel owns its receiver");
            }
        }
        if let Some(picked_up) = picked_up {
            let _ = picked_up.await;
        }
    }

    /// Sends a value only if there is room for it right now.
    ///
    /// On a rendezvous channel there is room only while a receiver is waiting; the
    /// value goes to that receiver without waiting for it to be taken.
    ///
    /// # Panics
    ///
    /// Panics if the channel has been closed.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        let tx = self.shared.live_sender();
        if self.shared.capacity == 0 && !self.shared.has_parked_receiver() {
            return Err(TrySendError(value));
        }
        match tx.try_send(Envelope { value, ack: None }) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(envelope)) => Err(TrySendError(envelope.value)),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                unreachable!("the channel owns its receiver")
            }
        }
    }

    /// Closes the channel. Values already buffered can still be received.
    ///
    /// A send that was already waiting for room when the channel closed still
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

    pub(crate) fn live(&self) -> mpsc::Sender<Envelope<T>> {
        self.shared.live_sender()
    }

    pub(crate) fn wrap(&self, value: T) -> (Envelope<T>, PickedUp) {
        self.shared.wrap(value)
    }

    /// Resolves once a send could be handed over: immediately on a buffered
    /// channel, once a receiver is parked on a rendezvous one.
    pub(crate) async fn receiver_ready(&self) {
        self.shared.receiver_ready().await
    }
}

impl<T> Receiver<T> {
    /// Waits for a value. Returns `None` once the channel is closed and drained.
    pub async fn recv(&self) -> Option<T> {
        self.recv_envelope().await.map(Envelope::open)
    }

    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        // Another receiver holds the channel and is waiting, so nothing is buffered.
        let mut rx = match self.shared.rx.try_lock() {
            Ok(rx) => rx,
            Err(_) => return Err(TryRecvError::Empty),
        };
        match rx.try_recv() {
            Ok(envelope) => Ok(envelope.open()),
            Err(mpsc::error::TryRecvError::Empty) => Err(TryRecvError::Empty),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(TryRecvError::Closed),
        }
    }

    pub async fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        match tokio::time::timeout(timeout, self.recv()).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(RecvTimeoutError::Closed),
            Err(_) => Err(RecvTimeoutError::Timeout),
        }
    }

    /// Receives until the channel is closed and drained.
    pub async fn drain(&self) -> Vec<T> {
        let mut values = Vec::new();
        while let Some(value) = self.recv().await {
            values.push(value);
        }
        values
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    pub fn len(&self) -> usize {
        match self.shared.rx.try_lock() {
            Ok(rx) => rx.len(),
            Err(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cancel safe: the value is only taken when the future completes.
    pub(crate) async fn recv_envelope(&self) -> Option<Envelope<T>> {
        let _parked = self.shared.park();
        self.shared.rx.lock().await.recv().await
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
