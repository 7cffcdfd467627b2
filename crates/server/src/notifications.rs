use crossbeam_queue::ArrayQueue;
use fleetboard::prelude::*;
use tracing::info;

/// Keeps the latest notifications until a client collects them.
/// Once full, the oldest entry is dropped.
pub struct QueueNotifier {
    queue: ArrayQueue<Notification>,
}

impl QueueNotifier {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity.max(1)),
        }
    }

    pub fn drain(&self) -> Vec<Notification> {
        std::iter::from_fn(|| self.queue.pop()).collect()
    }
}

impl Notifier for QueueNotifier {
    fn notify(&self, notification: Notification) {
        info!("{}: {}", notification.title, notification.message);
        let _ = self.queue.force_push(notification);
    }
}
