//! Fake wallet provider

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use txflow_common::{Balances, ServiceError, WalletProvider};

/// In-memory balances a test can change
#[derive(Debug)]
pub struct FakeWallet {
    balances: watch::Sender<Balances>,
}

impl FakeWallet {
    /// Create new [`FakeWallet`]
    pub fn new(balances: Balances) -> Self {
        let (sender, _) = watch::channel(balances);
        Self { balances: sender }
    }

    /// Replace the balances, notifying observers
    pub fn set_balances(&self, balances: Balances) {
        self.balances.send_replace(balances);
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn wallets(&self) -> Result<Balances, ServiceError> {
        Ok(self.balances.borrow().clone())
    }

    fn observe_balances(&self) -> BoxStream<'static, Balances> {
        WatchStream::from_changes(self.balances.subscribe()).boxed()
    }
}
