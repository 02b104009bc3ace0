use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::debug;

/// Items traveling the inbound channel, host to generation loop
#[derive(Debug)]
pub(crate) enum Command<M> {
    /// Dispatch one control message to the handler
    Message(M),
    /// Shut the generation loop down
    Quit,
}

/// Producer-to-host buffer of generated values.
///
/// FIFO with an optional capacity cap. The generation loop is the only
/// writer and the host the only reader; a message handler may additionally
/// observe the buffer and [`clear`](Outbound::clear) it through the handle
/// passed to [`Production::handle_message`](crate::Production::handle_message).
pub struct Outbound<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    queue: Mutex<VecDeque<T>>,
    capacity: Option<usize>,
    available: Notify,
}

impl<T> Clone for Outbound<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Outbound<T> {
    /// `None` capacity means unbounded
    pub(crate) fn new(capacity: Option<usize>) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(VecDeque::new()),
                capacity,
                available: Notify::new(),
            }),
        }
    }

    /// Number of values currently buffered
    pub fn len(&self) -> usize {
        self.inner.queue.lock().len()
    }

    /// Check whether the buffer holds no values
    pub fn is_empty(&self) -> bool {
        self.inner.queue.lock().is_empty()
    }

    /// Check whether the buffer is at capacity (always false when unbounded)
    pub fn is_full(&self) -> bool {
        match self.inner.capacity {
            Some(cap) => self.inner.queue.lock().len() >= cap,
            None => false,
        }
    }

    /// Configured capacity, if bounded
    pub fn capacity(&self) -> Option<usize> {
        self.inner.capacity
    }

    /// Drop all buffered values.
    ///
    /// For message handlers invalidating output that predates a
    /// reconfiguration.
    pub fn clear(&self) {
        let drained = {
            let mut queue = self.inner.queue.lock();
            let n = queue.len();
            queue.clear();
            n
        };
        if drained > 0 {
            debug!(drained, "Cleared outbound buffer");
        }
    }

    /// Enqueue one value unless the buffer is at capacity.
    ///
    /// The capacity check happens under the queue lock, so the bound holds
    /// against a concurrent reader.
    pub(crate) fn push(&self, value: T) -> bool {
        {
            let mut queue = self.inner.queue.lock();
            if let Some(cap) = self.inner.capacity {
                if queue.len() >= cap {
                    return false;
                }
            }
            queue.push_back(value);
        }
        self.inner.available.notify_one();
        true
    }

    /// Non-blocking dequeue
    pub(crate) fn try_pop(&self) -> Option<T> {
        self.inner.queue.lock().pop_front()
    }

    /// Dequeue the oldest value, suspending until one is available
    pub(crate) async fn pop(&self) -> T {
        loop {
            // Register for a wakeup before checking, so a push landing
            // between the check and the await is not missed
            let notified = self.inner.available.notified();
            if let Some(value) = self.try_pop() {
                return value;
            }
            notified.await;
        }
    }
}
