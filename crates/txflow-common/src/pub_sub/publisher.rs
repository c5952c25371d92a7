//! Snapshot producer

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::subscription::Subscription;
use super::{Error, DEFAULT_CHANNEL_SIZE};

/// Sending half of a subscription
pub(crate) struct Slot<T> {
    sender: mpsc::Sender<T>,
    lagged: Arc<Mutex<Option<T>>>,
}

impl<T> Slot<T> {
    /// Buffer the snapshot, or collapse it into the lagged slot when the buffer is full
    fn send(&self, snapshot: T) -> Result<(), Error> {
        let mut lagged = self.lagged.lock();

        if lagged.is_some() {
            *lagged = Some(snapshot);
            return Ok(());
        }

        match self.sender.try_send(snapshot) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(snapshot)) => {
                *lagged = Some(snapshot);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Internal subscriber index
pub(crate) type SubscriberMap<T> = Arc<RwLock<BTreeMap<usize, Slot<T>>>>;

/// Publisher of snapshots
pub struct Publisher<T>
where
    T: Clone + Send + 'static,
{
    subscribers: SubscriberMap<T>,
    unique_subscription_counter: AtomicUsize,
    active_subscribers: Arc<AtomicUsize>,
    capacity: usize,
}

impl<T> Default for Publisher<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_SIZE)
    }
}

impl<T> fmt::Debug for Publisher<T>
where
    T: Clone + Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("active_subscribers", &self.active_subscribers())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T> Publisher<T>
where
    T: Clone + Send + 'static,
{
    /// Create a new instance buffering up to `capacity` snapshots per subscriber
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Default::default(),
            unique_subscription_counter: 0.into(),
            active_subscribers: Arc::new(0.into()),
            capacity: capacity.max(1),
        }
    }

    /// Total number of active subscribers
    pub fn active_subscribers(&self) -> usize {
        self.active_subscribers.load(Ordering::Relaxed)
    }

    /// Publish a snapshot to every subscriber, right away
    ///
    /// Callers that need ordering across threads must serialize calls to `publish` and
    /// `subscribe` themselves.
    pub fn publish(&self, snapshot: &T) {
        let mut closed = Vec::new();

        {
            let subscribers = self.subscribers.read();
            for (id, slot) in subscribers.iter() {
                if let Err(err) = slot.send(snapshot.clone()) {
                    tracing::debug!("Dropping subscriber {}: {}", id, err);
                    closed.push(*id);
                }
            }
        }

        if !closed.is_empty() {
            let mut subscribers = self.subscribers.write();
            for id in closed {
                if subscribers.remove(&id).is_some() {
                    self.active_subscribers.fetch_sub(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// Subscribe, receiving `latest` first
    pub fn subscribe(&self, latest: T) -> Result<Subscription<T>, Error> {
        let (sender, receiver) = mpsc::channel(self.capacity);
        sender.try_send(latest)?;

        let lagged = Arc::new(Mutex::new(None));
        let id = self
            .unique_subscription_counter
            .fetch_add(1, Ordering::Relaxed);

        self.subscribers.write().insert(
            id,
            Slot {
                sender,
                lagged: lagged.clone(),
            },
        );
        self.active_subscribers.fetch_add(1, Ordering::Relaxed);

        Ok(Subscription::new(
            id,
            receiver,
            lagged,
            self.subscribers.clone(),
            self.active_subscribers.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_latest_then_in_order() {
        let publisher = Publisher::new(8);
        let mut subscription = publisher.subscribe(0u32).unwrap();

        publisher.publish(&1);
        publisher.publish(&2);

        assert_eq!(subscription.recv().await, Some(0));
        assert_eq!(subscription.recv().await, Some(1));
        assert_eq!(subscription.recv().await, Some(2));
        assert_eq!(subscription.try_recv(), None);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_ends_on_latest() {
        let publisher = Publisher::new(2);
        let mut subscription = publisher.subscribe(0u32).unwrap();

        for value in 1..=10 {
            publisher.publish(&value);
        }

        let mut received = Vec::new();
        while let Some(value) = subscription.try_recv() {
            received.push(value);
        }

        assert_eq!(received, vec![0, 1, 10]);
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let publisher = Publisher::new(4);
        let subscription = publisher.subscribe(0u32).unwrap();
        let other = publisher.subscribe(0u32).unwrap();
        assert_eq!(publisher.active_subscribers(), 2);

        drop(subscription);
        assert_eq!(publisher.active_subscribers(), 1);

        publisher.publish(&1);
        drop(other);
        assert_eq!(publisher.active_subscribers(), 0);
    }
}
