use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::warn;

/// FIFO of process names awaiting a core.
///
/// Producers are submissions and round-robin requeues; the dispatcher is the
/// sole consumer. Popping from an empty queue returns `None` rather than
/// blocking — the dispatcher has other cores to service each tick.
pub struct ReadyQueue {
    inner: Mutex<VecDeque<String>>,
}

impl ReadyQueue {
    pub fn new() -> ReadyQueue {
        ReadyQueue {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    /// Append `name` to the back of the queue.
    ///
    /// The queue must never hold the same process twice; a duplicate push is
    /// dropped, as it can only come from a caller that lost a dispatch race.
    pub fn push(&self, name: String) {
        let mut inner = self.inner.lock().unwrap();
        if inner.contains(&name) {
            warn!(process = %name, "dropping duplicate ready-queue entry");
            return;
        }
        inner.push_back(name);
    }

    pub fn pop(&self) -> Option<String> {
        self.inner.lock().unwrap().pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Names currently queued, front first.
    pub fn names(&self) -> Vec<String> {
        self.inner.lock().unwrap().iter().cloned().collect()
    }
}

impl Default for ReadyQueue {
    fn default() -> Self {
        Self::new()
    }
}
