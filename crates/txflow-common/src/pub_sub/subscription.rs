//! Active subscription

use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::publisher::SubscriberMap;

/// Active Subscription
///
/// Dropping it unsubscribes.
pub struct Subscription<T>
where
    T: Clone + Send + 'static,
{
    id: usize,
    receiver: mpsc::Receiver<T>,
    lagged: Arc<Mutex<Option<T>>>,
    subscribers: SubscriberMap<T>,
    active_subscribers: Arc<AtomicUsize>,
}

impl<T> Subscription<T>
where
    T: Clone + Send + 'static,
{
    pub(crate) fn new(
        id: usize,
        receiver: mpsc::Receiver<T>,
        lagged: Arc<Mutex<Option<T>>>,
        subscribers: SubscriberMap<T>,
        active_subscribers: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            id,
            receiver,
            lagged,
            subscribers,
            active_subscribers,
        }
    }

    /// Receives the next snapshot
    pub async fn recv(&mut self) -> Option<T> {
        if let Some(snapshot) = self.try_recv() {
            return Some(snapshot);
        }
        self.receiver.recv().await
    }

    /// Try receive a snapshot or return None right away
    pub fn try_recv(&mut self) -> Option<T> {
        let mut lagged = self.lagged.lock();
        if let Ok(snapshot) = self.receiver.try_recv() {
            return Some(snapshot);
        }
        lagged.take()
    }
}

impl<T> Stream for Subscription<T>
where
    T: Clone + Send + 'static,
{
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(snapshot) = this.try_recv() {
            return Poll::Ready(Some(snapshot));
        }

        this.receiver.poll_recv(cx)
    }
}

impl<T> fmt::Debug for Subscription<T>
where
    T: Clone + Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl<T> Drop for Subscription<T>
where
    T: Clone + Send + 'static,
{
    fn drop(&mut self) {
        if self.subscribers.write().remove(&self.id).is_some() {
            self.active_subscribers.fetch_sub(1, Ordering::Relaxed);
        }
    }
}
