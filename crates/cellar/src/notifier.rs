use std::fmt;

use tokio::sync::broadcast;

/// A live feed of values committed to a cell.
///
/// Only writes made after subscribing are delivered. A subscriber that
/// falls more than the channel capacity behind receives
/// [`broadcast::error::RecvError::Lagged`] and resumes with newer values.
pub type ChangeStream<T> = broadcast::Receiver<T>;

/// Fan-out broadcast of committed values.
///
/// Publishing never blocks and never fails: with no subscribers the value
/// is dropped. The channel stays open for as long as the owning cell lives.
pub struct ChangeNotifier<T> {
    sender: broadcast::Sender<T>,
}

impl<T: Clone> ChangeNotifier<T> {
    /// Create a notifier whose subscribers each buffer up to `capacity`
    /// undelivered values. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> ChangeStream<T> {
        self.sender.subscribe()
    }

    /// Deliver `value` to every current subscriber. Returns how many
    /// subscribers it reached.
    pub fn publish(&self, value: T) -> usize {
        self.sender.send(value).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T> fmt::Debug for ChangeNotifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}
