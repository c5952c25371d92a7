//! Fake route service

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::instrument;
use txflow_common::format::truncate_fraction;
use txflow_common::util::unix_time;
use txflow_common::{EditingSide, Route, RouteRequest, RouteService, ServiceError, TokenId};

use crate::gate::Gate;

/// Quotes at fixed rates
#[derive(Debug)]
pub struct FakeRoutes {
    rates: Mutex<HashMap<(TokenId, TokenId), Decimal>>,
    limits: Mutex<(Option<Decimal>, Option<Decimal>)>,
    ttl_secs: u64,
    fail_next: Mutex<Option<ServiceError>>,
    requests: Mutex<Vec<RouteRequest>>,
    /// Latency gate keyed by requested amount
    pub gate: Gate,
}

impl Default for FakeRoutes {
    fn default() -> Self {
        Self::new(30)
    }
}

impl FakeRoutes {
    /// Create new [`FakeRoutes`] whose quotes stay fresh for `ttl_secs`
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            rates: Mutex::new(HashMap::new()),
            limits: Mutex::new((None, None)),
            ttl_secs,
            fail_next: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            gate: Gate::default(),
        }
    }

    /// Quote `output` per unit of `input`, and the inverse for the reverse pair
    pub fn with_rate<I, O>(self, input: I, output: O, rate: Decimal) -> Self
    where
        I: Into<TokenId>,
        O: Into<TokenId>,
    {
        self.set_rate(input, output, rate);
        self
    }

    /// Change the rate of a pair
    pub fn set_rate<I, O>(&self, input: I, output: O, rate: Decimal)
    where
        I: Into<TokenId>,
        O: Into<TokenId>,
    {
        let (input, output) = (input.into(), output.into());
        let mut rates = self.rates.lock();

        if let Some(inverse) = Decimal::ONE.checked_div(rate) {
            rates.insert((output.clone(), input.clone()), inverse);
        }
        rates.insert((input, output), rate);
    }

    /// Input bounds reported with every quote
    pub fn set_limits(&self, min_in: Option<Decimal>, max_in: Option<Decimal>) {
        *self.limits.lock() = (min_in, max_in);
    }

    /// Fail the next request with `err`
    pub fn fail_next(&self, err: ServiceError) {
        *self.fail_next.lock() = Some(err);
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RouteRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl RouteService for FakeRoutes {
    #[instrument(skip_all, fields(amount = %request.amount))]
    async fn compute_route(&self, request: &RouteRequest) -> Result<Route, ServiceError> {
        self.requests.lock().push(request.clone());
        self.gate.pass(request.amount).await;

        if let Some(err) = self.fail_next.lock().take() {
            return Err(err);
        }

        let rate = self
            .rates
            .lock()
            .get(&(request.input.id.clone(), request.output.id.clone()))
            .copied()
            .ok_or(ServiceError::RouteNotFound)?;

        let (in_amount, out_amount) = match request.side {
            EditingSide::Input => {
                let out = request
                    .amount
                    .checked_mul(rate)
                    .ok_or_else(|| ServiceError::Provider("amount too large".to_string()))?;
                (request.amount, truncate_fraction(out, request.output.decimals))
            }
            EditingSide::Output => {
                let input = request
                    .amount
                    .checked_div(rate)
                    .ok_or_else(|| ServiceError::Provider("invalid rate".to_string()))?;
                (
                    input.round_dp_with_strategy(
                        request.input.decimals,
                        RoundingStrategy::AwayFromZero,
                    ),
                    request.amount,
                )
            }
        };

        let (min_in, max_in) = *self.limits.lock();

        Ok(Route {
            input: request.input.id.clone(),
            output: request.output.id.clone(),
            side: request.side,
            in_amount,
            out_amount,
            price_impact_bps: 0,
            min_in,
            max_in,
            provider: "fake".to_string(),
            fetched_at: unix_time(),
            ttl_secs: self.ttl_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use txflow_common::Token;

    use super::*;

    fn request(side: EditingSide, amount: Decimal) -> RouteRequest {
        RouteRequest {
            input: Token::new("sol", "SOL", 9),
            output: Token::new("usdc", "USDC", 6),
            side,
            amount,
            slippage_bps: 50,
        }
    }

    #[tokio::test]
    async fn test_exact_in_and_out() {
        let routes = FakeRoutes::default().with_rate("sol", "usdc", dec!(20));

        let route = routes
            .compute_route(&request(EditingSide::Input, dec!(1.5)))
            .await
            .unwrap();
        assert_eq!(route.out_amount, dec!(30));

        let route = routes
            .compute_route(&request(EditingSide::Output, dec!(30)))
            .await
            .unwrap();
        assert_eq!(route.in_amount, dec!(1.5));
        assert_eq!(route.out_amount, dec!(30));
    }

    #[tokio::test]
    async fn test_failures() {
        let routes = FakeRoutes::default();
        assert_eq!(
            routes
                .compute_route(&request(EditingSide::Input, dec!(1)))
                .await,
            Err(ServiceError::RouteNotFound)
        );

        let routes = routes.with_rate("sol", "usdc", dec!(20));
        routes.fail_next(ServiceError::Network("timeout".to_string()));
        assert!(routes
            .compute_route(&request(EditingSide::Input, dec!(1)))
            .await
            .is_err());
        assert!(routes
            .compute_route(&request(EditingSide::Input, dec!(1)))
            .await
            .is_ok());
        assert_eq!(routes.requests().len(), 3);
    }
}
