//! Suppression predicate
//!
//! An action is dropped when it would not change anything observable. Equality is decided per
//! field: tokens by [`txflow_common::TokenId`], amounts by parsed decimal value, environment
//! maps by content.

use txflow_common::format::{from_fiat, parse_decimal, FIAT_DECIMALS};
use txflow_common::route::BPS_IN_ONE;
use txflow_common::{EditingSide, ErrorReason, Stage};

use crate::action::Action;
use crate::state::{FormState, Status};

/// Whether `action` must be performed on `state`
pub fn should_perform(state: &FormState, action: &Action) -> bool {
    match &state.status {
        Status::Finished(_) => return matches!(action, Action::Initialize(_)),
        // A broadcast cannot be cancelled, only the environment may move
        Status::Submitting => {
            return matches!(action, Action::UpdateBalances(_) | Action::UpdatePrices(_))
        }
        _ => {}
    }

    let environment = &state.environment;

    match action {
        Action::Initialize(_) => true,
        Action::ChangeAmount { side, text } => {
            match parse_decimal(text, state.token(*side).decimals) {
                Ok(value) => !same_amount(state, *side, value),
                Err(_) => true,
            }
        }
        Action::ChangeAmountInFiat(text) => {
            let value = parse_decimal(text, FIAT_DECIMALS).ok().and_then(|fiat| {
                environment
                    .price_of(&state.input_token.id)
                    .and_then(|price| from_fiat(fiat, price, state.input_token.decimals))
            });

            match value {
                Some(value) => !same_amount(state, EditingSide::Input, value),
                None => true,
            }
        }
        Action::ChangeInputToken(token) => {
            environment.is_enabled(&token.id) && !state.input_token.same_asset(token)
        }
        Action::ChangeOutputToken(token) => {
            environment.is_enabled(&token.id)
                && !state
                    .output_token
                    .as_ref()
                    .is_some_and(|output| output.same_asset(token))
        }
        Action::ChangeFeeToken(token) => {
            environment.is_enabled(&token.id) && !state.fee_token.same_asset(token)
        }
        Action::SwitchTokens => state.is_swap(),
        Action::ChangeSlippage(bps) => {
            u32::from(*bps) <= BPS_IN_ONE && *bps != state.slippage_bps
        }
        Action::UpdateBalances(balances) => balances != &environment.balances,
        Action::UpdatePrices(prices) => prices != &environment.prices,
        Action::Refresh => {
            !matches!(
                state.status,
                Status::Evaluating | Status::CreatingTransaction
            ) && !is_input_invalid(state)
        }
        Action::Submit => match &state.status {
            Status::Ready => !state.amount_input.is_zero(),
            Status::Error(err) => matches!(err.stage, Stage::Transaction | Stage::Submission),
            _ => false,
        },
    }
}

fn is_input_invalid(state: &FormState) -> bool {
    state
        .error()
        .is_some_and(|err| err.reason == ErrorReason::InputInvalid)
}

/// Same side, same value, and the field is not currently flagged as invalid
fn same_amount(state: &FormState, side: EditingSide, value: rust_decimal::Decimal) -> bool {
    state.editing_side == side && state.amount(side) == value && !is_input_invalid(state)
}
