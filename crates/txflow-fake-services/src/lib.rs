//! txflow fake services
//!
//! In-memory implementations of every service port, for tests and demos. Rates, fees and
//! prices are fixed by the caller; failures are injected per call and latency is controlled
//! through [`Gate`]s so concurrent scenarios resolve in a chosen order.
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;
use txflow_common::{Balances, FormServices};

pub mod fee;
pub mod gate;
pub mod price;
pub mod route;
pub mod transaction;
pub mod wallet;

pub use fee::FakeFees;
pub use gate::Gate;
pub use price::FakePrices;
pub use route::FakeRoutes;
pub use transaction::FakeTransactions;
pub use wallet::FakeWallet;

/// Every fake, shared with the form through [`FakeServices::form_services`]
#[derive(Debug, Clone)]
pub struct FakeServices {
    /// Prices
    pub prices: Arc<FakePrices>,
    /// Fees
    pub fees: Arc<FakeFees>,
    /// Routes
    pub routes: Arc<FakeRoutes>,
    /// Transactions
    pub transactions: Arc<FakeTransactions>,
    /// Wallet
    pub wallet: Arc<FakeWallet>,
}

impl FakeServices {
    /// Create fakes charging `network_fee` with the given wallet balances
    pub fn new(network_fee: Decimal, balances: Balances) -> Self {
        Self {
            prices: Arc::new(FakePrices::default()),
            fees: Arc::new(FakeFees::new(network_fee)),
            routes: Arc::new(FakeRoutes::default()),
            transactions: Arc::new(FakeTransactions::default()),
            wallet: Arc::new(FakeWallet::new(balances)),
        }
    }

    /// Replace the route fake
    pub fn with_routes(mut self, routes: FakeRoutes) -> Self {
        self.routes = Arc::new(routes);
        self
    }

    /// Replace the price fake
    pub fn with_prices(mut self, prices: FakePrices) -> Self {
        self.prices = Arc::new(prices);
        self
    }

    /// Ports handed to a form
    pub fn form_services(&self) -> FormServices {
        FormServices::new(
            self.prices.clone(),
            self.fees.clone(),
            self.routes.clone(),
            self.transactions.clone(),
        )
    }
}

/// Install a `tracing` subscriber for tests, `RUST_LOG` overrides the default filter
pub fn setup_tracing() {
    let default_filter = "debug";

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Ok if successful, Err if already initialized
    // Allows us to setup tracing at the start of several parallel tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}
