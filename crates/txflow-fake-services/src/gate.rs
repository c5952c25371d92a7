//! Latency gates
//!
//! Let a test hold a service call for a given amount until it is released, so the order in
//! which concurrent calls resolve is chosen by the test instead of the scheduler.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::Notify;

/// Calls held per amount
#[derive(Debug, Default)]
pub struct Gate {
    held: Mutex<HashMap<Decimal, Arc<Notify>>>,
    seen: Mutex<Vec<Decimal>>,
    arrivals: Notify,
}

impl Gate {
    /// Hold calls for `amount` until [`Gate::release`]
    pub fn hold(&self, amount: Decimal) {
        self.held
            .lock()
            .entry(amount.normalize())
            .or_insert_with(|| Arc::new(Notify::new()));
    }

    /// Let the held call for `amount` resolve
    pub fn release(&self, amount: Decimal) {
        if let Some(notify) = self.held.lock().remove(&amount.normalize()) {
            // Stores a permit if the call did not arrive yet
            notify.notify_one();
        }
    }

    /// Called by the service, waits while `amount` is held
    pub async fn pass(&self, amount: Decimal) {
        let notify = self.held.lock().get(&amount.normalize()).cloned();

        self.seen.lock().push(amount);
        self.arrivals.notify_waiters();

        if let Some(notify) = notify {
            tracing::debug!("Holding call for {}", amount);
            notify.notified().await;
        }
    }

    /// Amounts of every call so far, in arrival order
    pub fn calls(&self) -> Vec<Decimal> {
        self.seen.lock().clone()
    }

    /// Wait until at least `count` calls arrived
    pub async fn wait_for_calls(&self, count: usize) {
        loop {
            let arrived = self.arrivals.notified();
            tokio::pin!(arrived);
            arrived.as_mut().enable();

            if self.seen.lock().len() >= count {
                return;
            }

            arrived.await;
        }
    }
}
