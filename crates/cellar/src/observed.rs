//! In-memory values that announce every assignment after it happens.
//!
//! Unlike a cell's [`ChangeNotifier`](crate::ChangeNotifier), these keep the
//! latest value in the channel: a new subscriber sees the current value
//! immediately and then every later assignment.

use std::fmt;

use tokio::sync::watch;

/// Receiving side of an [`Observed`] value or [`TransitionSubject`].
pub type ValueStream<T> = watch::Receiver<T>;

/// A value whose subscribers are told about each assignment once it has
/// taken effect, starting with the value current at subscription.
pub struct Observed<T> {
    sender: watch::Sender<T>,
}

impl<T> Observed<T> {
    pub fn new(value: T) -> Self {
        let (sender, _) = watch::channel(value);
        Self { sender }
    }

    /// Replace the value and notify subscribers. Returns the previous value.
    pub fn set(&self, value: T) -> T {
        self.sender.send_replace(value)
    }

    /// Modify the value in place and notify subscribers.
    pub fn modify(&self, f: impl FnOnce(&mut T)) {
        self.sender.send_modify(f);
    }

    /// The current value, marked as seen by the returned stream.
    pub fn subscribe(&self) -> ValueStream<T> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T: Clone> Observed<T> {
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }
}

impl<T: fmt::Debug> fmt::Debug for Observed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observed")
            .field("value", &*self.sender.borrow())
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

/// One assignment: what the value was before, and what it is now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition<T> {
    /// `None` only for the initial value, which replaced nothing.
    pub old: Option<T>,
    pub current: T,
}

/// A value whose subscribers receive `(old, current)` pairs.
pub struct TransitionSubject<T> {
    sender: watch::Sender<Transition<T>>,
}

impl<T: Clone> TransitionSubject<T> {
    pub fn new(value: T) -> Self {
        let (sender, _) = watch::channel(Transition {
            old: None,
            current: value,
        });
        Self { sender }
    }

    pub fn get(&self) -> T {
        self.sender.borrow().current.clone()
    }

    /// Replace the value and publish the transition from the previous one.
    pub fn set(&self, value: T) {
        self.sender.send_modify(|t| {
            let old = std::mem::replace(&mut t.current, value);
            t.old = Some(old);
        });
    }

    /// The latest transition, then every later one.
    pub fn subscribe(&self) -> ValueStream<Transition<T>> {
        self.sender.subscribe()
    }
}

impl<T: fmt::Debug> fmt::Debug for TransitionSubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionSubject")
            .field("value", &self.sender.borrow().current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_starts_with_current_value() {
        let volume = Observed::new(3u8);
        volume.set(5);
        let rx = volume.subscribe();
        assert_eq!(*rx.borrow(), 5);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn value_is_updated_before_subscribers_look() {
        let volume = Observed::new(3u8);
        let mut rx = volume.subscribe();
        assert_eq!(volume.set(7), 3);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 7);
        assert_eq!(volume.get(), 7);
    }

    #[test]
    fn set_without_subscribers_still_updates() {
        let name = Observed::new(String::from("a"));
        name.modify(|s| s.push('b'));
        assert_eq!(name.get(), "ab");
        assert_eq!(name.subscriber_count(), 0);
    }

    #[test]
    fn transitions_carry_old_and_current() {
        let mode = TransitionSubject::new("light");
        let rx = mode.subscribe();
        assert_eq!(
            *rx.borrow(),
            Transition {
                old: None,
                current: "light"
            }
        );

        mode.set("dark");
        assert_eq!(
            *rx.borrow(),
            Transition {
                old: Some("light"),
                current: "dark"
            }
        );
        assert_eq!(mode.get(), "dark");
    }

    #[tokio::test]
    async fn waiting_subscriber_wakes_on_set() {
        let flag = Observed::new(false);
        let mut rx = flag.subscribe();
        let handle = tokio::spawn(async move {
            rx.changed().await.unwrap();
            let on = *rx.borrow();
            on
        });
        tokio::task::yield_now().await;
        flag.set(true);
        assert!(handle.await.unwrap());
    }
}
