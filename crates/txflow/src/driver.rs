//! Background drivers
//!
//! Long running tasks feeding non-cancelling actions into a form. Each returns the
//! [`CancellationToken`] that stops it; dropping the token does not.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use txflow_common::WalletProvider;

use crate::action::Action;
use crate::machine::FormStateMachine;

impl FormStateMachine {
    /// Send [`Action::Refresh`] every `refresh_interval_secs` of the form's settings so quotes
    /// never outlive their window
    pub fn spawn_refresh(&self) -> CancellationToken {
        let period = Duration::from_secs(
            self.current_state()
                .environment
                .settings
                .refresh_interval_secs
                .max(1),
        );
        tracing::debug!("Refreshing every {}s", period.as_secs());

        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();
        let machine = self.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = cancel_clone.cancelled() => {
                        break;
                    }
                    _ = interval.tick() => {
                        machine.accept(Action::Refresh).await;
                    }
                }
            }

            tracing::debug!("Refresh driver stopped");
        });

        cancel
    }

    /// Forward the wallet's balances into the form as [`Action::UpdateBalances`]
    pub fn spawn_balance_watch(&self, provider: Arc<dyn WalletProvider>) -> CancellationToken {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();
        let machine = self.clone();

        tokio::spawn(async move {
            match provider.wallets().await {
                Ok(balances) => {
                    machine.accept(Action::UpdateBalances(balances)).await;
                }
                Err(err) => tracing::warn!("Could not load balances: {}", err),
            }

            let mut updates = provider.observe_balances();

            loop {
                tokio::select! {
                    _ = cancel_clone.cancelled() => {
                        break;
                    }
                    balances = updates.next() => {
                        match balances {
                            Some(balances) => {
                                machine.accept(Action::UpdateBalances(balances)).await;
                            }
                            None => break,
                        }
                    }
                }
            }

            tracing::debug!("Balance watch stopped");
        });

        cancel
    }
}
