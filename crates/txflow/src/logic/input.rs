//! Primary transforms
//!
//! Apply the user's change to the form inputs. Everything derived from the previous inputs is
//! dropped so that no step can read a route or fee computed for other values.

use std::sync::Arc;

use txflow_common::format::{from_fiat, parse_decimal, FIAT_DECIMALS};
use txflow_common::{
    Balances, EditingSide, Environment, ErrorReason, FormError, Prices, Stage, Token,
};

use crate::action::Action;
use crate::state::{FormState, InitContext, Status};

/// Apply `action` to the inputs of `state`, producing the progress state
pub fn primary(state: FormState, action: &Action) -> FormState {
    match action {
        Action::Initialize(context) => initialize(state, context),
        Action::ChangeAmount { side, text } => change_amount(state, *side, text),
        Action::ChangeAmountInFiat(text) => change_amount_in_fiat(state, text),
        Action::ChangeInputToken(token) => change_input_token(state, token),
        Action::ChangeOutputToken(token) => change_output_token(state, token),
        Action::ChangeFeeToken(token) => change_fee_token(state, token),
        Action::SwitchTokens => switch_tokens(state),
        Action::ChangeSlippage(bps) => change_slippage(state, *bps),
        Action::UpdateBalances(balances) => update_balances(state, balances),
        Action::UpdatePrices(prices) => update_prices(state, prices),
        Action::Refresh => refresh(state),
        Action::Submit => {
            let mut state = state;
            state.status = Status::CreatingTransaction;
            state
        }
    }
}

fn evaluating(mut state: FormState) -> FormState {
    state.status = Status::Evaluating;
    state
}

fn invalid(mut state: FormState, reason: ErrorReason) -> FormState {
    state.invalidate();
    state.status = Status::Error(FormError::validation(reason));
    state
}

fn initialize(state: FormState, context: &InitContext) -> FormState {
    match FormState::initial(context.clone()) {
        Ok(initial) => evaluating(initial),
        Err(err) => {
            tracing::warn!("Could not initialize form: {}", err);
            let mut state = state;
            state.status = Status::Error(FormError::new(
                ErrorReason::Unknown(err.to_string()),
                Stage::Validation,
            ));
            state
        }
    }
}

fn change_amount(mut state: FormState, side: EditingSide, text: &str) -> FormState {
    match parse_decimal(text, state.token(side).decimals) {
        Ok(value) => {
            state.set_amount(side, value);
            evaluating(state)
        }
        Err(err) => {
            tracing::debug!("Rejecting amount: {}", err);
            state.editing_side = side;
            invalid(state, ErrorReason::InputInvalid)
        }
    }
}

fn change_amount_in_fiat(mut state: FormState, text: &str) -> FormState {
    let fiat = match parse_decimal(text, FIAT_DECIMALS) {
        Ok(fiat) => fiat,
        Err(err) => {
            tracing::debug!("Rejecting fiat amount: {}", err);
            state.editing_side = EditingSide::Input;
            return invalid(state, ErrorReason::InputInvalid);
        }
    };

    let Some(price) = state.environment.price_of(&state.input_token.id) else {
        let reason = ErrorReason::Provider(format!("no price for {}", state.input_token));
        return invalid(state, reason);
    };

    match from_fiat(fiat, price, state.input_token.decimals) {
        Some(value) => {
            state.set_amount(EditingSide::Input, value);
            evaluating(state)
        }
        None => invalid(state, ErrorReason::InputInvalid),
    }
}

/// Keep the typed amount, re-truncated to the decimals of the token now on that side
fn retype_amount(mut state: FormState) -> FormState {
    let side = state.editing_side;
    let value = state.exact_amount();
    state.set_amount(side, value);
    evaluating(state)
}

fn change_input_token(mut state: FormState, token: &Token) -> FormState {
    if state
        .output_token
        .as_ref()
        .is_some_and(|output| output.same_asset(token))
    {
        return switch_tokens(state);
    }

    state.input_token = token.clone();
    retype_amount(state)
}

fn change_output_token(mut state: FormState, token: &Token) -> FormState {
    if state.input_token.same_asset(token) {
        return switch_tokens(state);
    }

    state.output_token = Some(token.clone());
    retype_amount(state)
}

fn change_fee_token(mut state: FormState, token: &Token) -> FormState {
    state.fee_token = token.clone();
    state.fee = None;
    state.draft = None;
    evaluating(state)
}

fn switch_tokens(mut state: FormState) -> FormState {
    let Some(output) = state.output_token.take() else {
        return state;
    };

    let input = std::mem::replace(&mut state.input_token, output);
    state.output_token = Some(input);

    let amount = state.amount_output;
    state.set_amount(EditingSide::Input, amount);
    evaluating(state)
}

fn change_slippage(mut state: FormState, bps: u16) -> FormState {
    state.slippage_bps = bps;
    state.invalidate();
    evaluating(state)
}

/// Whether an environment update re-runs the local checks on `status`
fn revalidates(status: &Status) -> bool {
    match status {
        Status::Ready => true,
        Status::Error(err) => {
            err.reason.is_validation() && err.reason != ErrorReason::InputInvalid
        }
        _ => false,
    }
}

fn replace_environment<F>(mut state: FormState, update: F) -> FormState
where
    F: FnOnce(&mut Environment),
{
    let mut environment = (*state.environment).clone();
    update(&mut environment);
    state.environment = Arc::new(environment);
    state
}

fn update_balances(state: FormState, balances: &Balances) -> FormState {
    let mut state = replace_environment(state, |env| env.balances = balances.clone());
    if revalidates(&state.status) {
        state.status = Status::Evaluating;
    }
    state
}

fn update_prices(state: FormState, prices: &Prices) -> FormState {
    replace_environment(state, |env| env.prices = prices.clone())
}

fn refresh(mut state: FormState) -> FormState {
    state.fee = None;
    state.draft = None;
    evaluating(state)
}
