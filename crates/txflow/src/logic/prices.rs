//! Fiat values
//!
//! Prices are display only: a failed lookup falls back to the environment snapshot and never
//! fails the chain.

use rust_decimal::Decimal;
use tracing::instrument;
use txflow_common::format::to_fiat;
use txflow_common::{Environment, FormServices, TokenId};

use crate::state::{FiatValues, FormState};

async fn fetch_price(
    services: &FormServices,
    environment: &Environment,
    token: &TokenId,
) -> Option<Decimal> {
    match services.prices.current_price(token).await {
        Ok(Some(price)) => Some(price),
        Ok(None) => environment.price_of(token),
        Err(err) => {
            tracing::warn!("Price of {} unavailable: {}", token, err);
            environment.price_of(token)
        }
    }
}

fn fiat_values(
    state: &FormState,
    input_price: Option<Decimal>,
    output_price: Option<Decimal>,
    fee_price: Option<Decimal>,
) -> FiatValues {
    let output_price = if state.is_swap() {
        output_price
    } else {
        input_price
    };

    let fee = state
        .fee
        .as_ref()
        .and_then(|fee| fee.total_in(&state.fee_token.id).ok());

    FiatValues {
        input: input_price.and_then(|price| to_fiat(state.amount_input, price)),
        output: output_price.and_then(|price| to_fiat(state.amount_output, price)),
        fee: fee
            .zip(fee_price)
            .and_then(|(fee, price)| to_fiat(fee, price)),
    }
}

/// Fetch the prices of the form's tokens concurrently and compute the fiat values
#[instrument(skip_all)]
pub async fn refresh_prices(mut state: FormState, services: &FormServices) -> FormState {
    let environment = state.environment.clone();
    let output = state.output_token.as_ref().map(|token| token.id.clone());

    let (input_price, output_price, fee_price) = futures::join!(
        fetch_price(services, &environment, &state.input_token.id),
        async {
            match &output {
                Some(token) => fetch_price(services, &environment, token).await,
                None => None,
            }
        },
        fetch_price(services, &environment, &state.fee_token.id),
    );

    state.fiat = fiat_values(&state, input_price, output_price, fee_price);
    state
}

/// Compute the fiat values from the environment prices
pub fn recompute_fiat(mut state: FormState) -> FormState {
    let environment = state.environment.clone();
    let output_price = state
        .output_token
        .as_ref()
        .and_then(|token| environment.price_of(&token.id));

    state.fiat = fiat_values(
        &state,
        environment.price_of(&state.input_token.id),
        output_price,
        environment.price_of(&state.fee_token.id),
    );
    state
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal_macros::dec;
    use txflow_common::{
        FeeBreakdown, FeeItem, FeeKind, FormSettings, Token, TokenAmount,
    };

    use super::*;
    use crate::state::InitContext;

    #[test]
    fn test_recompute_fiat() {
        let env = Environment::new(FormSettings::default())
            .with_tokens(vec![
                Token::new("sol", "SOL", 9),
                Token::new("usdc", "USDC", 6),
            ])
            .with_prices(HashMap::from([
                ("sol".into(), dec!(20.5)),
                ("usdc".into(), dec!(1)),
            ]));
        let mut state = FormState::initial(InitContext::swap(env, "sol", "usdc")).unwrap();
        state.amount_input = dec!(1.5);
        state.amount_output = dec!(30.75);
        state.fee = Some(FeeBreakdown::new(vec![FeeItem::new(
            FeeKind::Network,
            TokenAmount::new("sol", dec!(0.001)).unwrap(),
        )]));

        let state = recompute_fiat(state);

        assert_eq!(state.fiat.input, Some(dec!(30.75)));
        assert_eq!(state.fiat.output, Some(dec!(30.75)));
        assert_eq!(state.fiat.fee, Some(dec!(0.02)));
    }
}
