use parking_lot::Mutex;

/// A counter that can be incremented from many threads or tasks at once.
#[derive(Debug, Default)]
pub struct SafeCounter {
    count: Mutex<u64>,
}

impl SafeCounter {
    pub fn new() -> Self {
        SafeCounter {
            count: Mutex::new(0),
        }
    }

    pub fn inc(&self) -> u64 {
        self.add(1)
    }

    /// Adds `n` and returns the new value.
    pub fn add(&self, n: u64) -> u64 {
        let mut count = self.count.lock();
        *count += n;
        *count
    }

    pub fn value(&self) -> u64 {
        *self.count.lock()
    }
}
