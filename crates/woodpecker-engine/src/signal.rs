//! Coalescing change notification.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// A single-slot "state changed" flag.
///
/// Raising the signal while it is already pending is a no-op, so any number
/// of updates between two reads collapse into one wake-up. It carries no
/// data: a woken reader re-reads the [`ViewModel`](crate::ViewModel).
///
/// Intended for a single consumer.
#[derive(Debug, Default)]
pub struct DirtySignal {
    pending: AtomicBool,
    notify: Notify,
}

impl DirtySignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the state as changed, waking the consumer if it is idle.
    pub(crate) fn raise(&self) {
        if !self.pending.swap(true, Ordering::AcqRel) {
            self.notify.notify_one();
        }
    }

    /// Whether a change is waiting to be observed.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Consume the pending change, returning whether there was one.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Wait until a change is pending, then consume it.
    pub async fn wait(&self) {
        loop {
            if self.take() {
                return;
            }
            self.notify.notified().await;
        }
    }
}
