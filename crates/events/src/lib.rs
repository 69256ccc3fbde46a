//! Event bus primitives.

use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

/// Fan-out channel: every subscriber sees every event published after it
/// subscribed.
#[derive(Debug, Clone)]
pub struct EventBus<T: Clone> {
    sender: broadcast::Sender<T>,
}

impl<T: Clone + Send + 'static> EventBus<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event, returning how many subscribers received it.
    ///
    /// Publishing with nobody listening is not an error.
    pub fn publish(&self, event: T) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::trace!(target: "tumae-events", "event published with no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T: Clone + Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half handed out by [`EventBus::subscribe`].
#[derive(Debug)]
pub struct Subscription<T: Clone> {
    receiver: broadcast::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    /// Wait for the next event. Returns `None` once the bus is gone.
    ///
    /// A subscriber that fell behind skips the events it missed.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(target: "tumae-events", skipped, "subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<T> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_sees_each_event() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        assert_eq!(bus.publish("login"), 2);

        assert_eq!(first.recv().await, Some("login"));
        assert_eq!(second.recv().await, Some("login"));
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus: EventBus<u8> = EventBus::new();
        assert_eq!(bus.publish(1), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn closed_bus_ends_subscription() {
        let bus = EventBus::new();
        let mut subscription = bus.subscribe();
        bus.publish(7u32);
        drop(bus);

        assert_eq!(subscription.recv().await, Some(7));
        assert_eq!(subscription.recv().await, None);
    }

    #[test]
    fn lagging_subscriber_skips_to_newest() {
        let bus = EventBus::with_capacity(2);
        let mut subscription = bus.subscribe();
        for n in 0..5u32 {
            bus.publish(n);
        }

        assert_eq!(subscription.try_recv(), Some(3));
        assert_eq!(subscription.try_recv(), Some(4));
        assert_eq!(subscription.try_recv(), None);
    }
}
