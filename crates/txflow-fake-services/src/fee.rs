//! Fake fee service

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::instrument;
use txflow_common::{
    FeeBreakdown, FeeItem, FeeKind, FeeRequest, FeeService, ServiceError, TokenAmount,
};

use crate::gate::Gate;

/// Charges a fixed network fee in the requested fee token
#[derive(Debug, Default)]
pub struct FakeFees {
    network_fee: Mutex<Decimal>,
    account_creation_fee: Mutex<Decimal>,
    fail_next: Mutex<Option<ServiceError>>,
    requests: Mutex<Vec<FeeRequest>>,
    /// Latency gate keyed by requested amount
    pub gate: Gate,
}

impl FakeFees {
    /// Create new [`FakeFees`] charging `network_fee`
    pub fn new(network_fee: Decimal) -> Self {
        Self {
            network_fee: Mutex::new(network_fee),
            ..Default::default()
        }
    }

    /// Change the network fee
    pub fn set_network_fee(&self, fee: Decimal) {
        *self.network_fee.lock() = fee;
    }

    /// Charge an account creation fee on top, zero disables it
    pub fn set_account_creation_fee(&self, fee: Decimal) {
        *self.account_creation_fee.lock() = fee;
    }

    /// Fail the next request with `err`
    pub fn fail_next(&self, err: ServiceError) {
        *self.fail_next.lock() = Some(err);
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<FeeRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl FeeService for FakeFees {
    #[instrument(skip_all, fields(fee_token = %request.fee_token))]
    async fn compute_fee(&self, request: &FeeRequest) -> Result<FeeBreakdown, ServiceError> {
        self.requests.lock().push(request.clone());
        self.gate.pass(request.amount).await;

        if let Some(err) = self.fail_next.lock().take() {
            return Err(err);
        }

        let amount = |value: Decimal| {
            TokenAmount::new(request.fee_token.clone(), value)
                .map_err(|err| ServiceError::Unknown(err.to_string()))
        };

        let mut items = vec![FeeItem::new(
            FeeKind::Network,
            amount(*self.network_fee.lock())?,
        )];

        let account_creation = *self.account_creation_fee.lock();
        if !account_creation.is_zero() {
            items.push(FeeItem::new(
                FeeKind::AccountCreation,
                amount(account_creation)?,
            ));
        }

        Ok(FeeBreakdown::new(items))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[tokio::test]
    async fn test_fee_in_requested_token() {
        let fees = FakeFees::new(dec!(0.001));
        fees.set_account_creation_fee(dec!(0.002));

        let request = FeeRequest {
            input: "sol".into(),
            output: None,
            fee_token: "sol".into(),
            amount: dec!(1),
            route: None,
        };

        let fee = fees.compute_fee(&request).await.unwrap();
        assert_eq!(fee.total_in(&"sol".into()).unwrap(), dec!(0.003));
        assert_eq!(
            fee.amount_of(FeeKind::AccountCreation, &"sol".into())
                .unwrap(),
            dec!(0.002)
        );
        assert_eq!(fees.requests().len(), 1);
    }
}
