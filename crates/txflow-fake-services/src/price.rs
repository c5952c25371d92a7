//! Fake price service

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use txflow_common::{PriceService, ServiceError, TokenId};

/// Fixed fiat prices
#[derive(Debug, Default)]
pub struct FakePrices {
    prices: Mutex<HashMap<TokenId, Decimal>>,
    unavailable: Mutex<bool>,
}

impl FakePrices {
    /// Set the price of a token
    pub fn with_price<T: Into<TokenId>>(self, token: T, price: Decimal) -> Self {
        self.set_price(token, price);
        self
    }

    /// Change the price of a token
    pub fn set_price<T: Into<TokenId>>(&self, token: T, price: Decimal) {
        self.prices.lock().insert(token.into(), price);
    }

    /// Make every lookup fail with a network error
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock() = unavailable;
    }
}

#[async_trait]
impl PriceService for FakePrices {
    async fn current_price(&self, token: &TokenId) -> Result<Option<Decimal>, ServiceError> {
        if *self.unavailable.lock() {
            return Err(ServiceError::Network("price feed unreachable".to_string()));
        }

        Ok(self.prices.lock().get(token).copied())
    }
}
