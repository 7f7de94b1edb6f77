//! Error types shared by both backends.
//!
//! Only expected outcomes are represented here. Misusing a channel (sending on a
//! closed channel, closing it twice) is a programming error and panics instead.

use std::any::Any;
use std::io;
use thiserror::Error;

/// Panic message for a send on a closed channel.
pub(crate) const SEND_ON_CLOSED: &str = "send on closed channel";

/// Panic message for closing a channel twice.
pub(crate) const CLOSE_OF_CLOSED: &str = "close of closed channel";

/// Returned by `try_send` when the value could not be handed over without blocking.
///
/// The rejected value is given back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("channel is full")]
pub struct TrySendError<T>(pub T);

impl<T> TrySendError<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// An error returned from a non-blocking receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TryRecvError {
    /// Nothing is buffered right now, but the channel is still open.
    #[error("channel is empty")]
    Empty,
    /// The channel is closed and every buffered value has been received.
    #[error("channel is closed and drained")]
    Closed,
}

/// An error returned from [`recv_timeout`](crate::synchronous::Receiver::recv_timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecvTimeoutError {
    #[error("timed out waiting on channel")]
    Timeout,
    #[error("channel is closed and drained")]
    Closed,
}

/// The outcome of a task that did not return a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The task panicked. Holds the panic message when it was a string.
    #[error("task panicked: {0}")]
    Panicked(String),
    /// The task was aborted before it finished.
    #[error("task was cancelled")]
    Cancelled,
}

impl TaskError {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_string(),
                Err(_) => String::from("non-string panic payload"),
            },
        };
        TaskError::Panicked(message)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] io::Error),
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
