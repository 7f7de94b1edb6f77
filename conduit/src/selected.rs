/// The branch a select ended up taking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selected<T> {
    /// A receive candidate fired. `value` is `None` when its channel is closed and drained.
    Received { index: usize, value: Option<T> },
    /// A send candidate handed its value over.
    Sent { index: usize },
    /// Nothing was ready and the select was non-blocking.
    Default,
    /// The timer candidate fired first.
    Timeout,
}

impl<T> Selected<T> {
    /// The index of the channel candidate that fired, if any.
    pub fn index(&self) -> Option<usize> {
        match self {
            Selected::Received { index, .. } | Selected::Sent { index } => Some(*index),
            Selected::Default | Selected::Timeout => None,
        }
    }
}
