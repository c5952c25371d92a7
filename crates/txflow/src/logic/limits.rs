//! Limit validation

use rust_decimal::Decimal;
use txflow_common::format::exceeds;
use txflow_common::{ErrorReason, FormError, Stage};

use crate::state::{FormState, Status};

/// Compute the spendable maximum and run the limit checks on the input amount
pub fn validate_limits(mut state: FormState) -> FormState {
    let reserved = match &state.fee {
        Some(fee) => match fee.total_in(&state.input_token.id) {
            Ok(reserved) => reserved,
            Err(err) => {
                tracing::error!("Could not sum fee: {}", err);
                state.status = Status::Error(FormError::new(
                    ErrorReason::Unknown(err.to_string()),
                    Stage::Validation,
                ));
                return state;
            }
        },
        None => Decimal::ZERO,
    };

    state.max_amount_input = state
        .balance()
        .checked_sub(reserved)
        .unwrap_or(Decimal::ZERO)
        .max(Decimal::ZERO);

    if let Err(reason) = check_limits(&state) {
        tracing::debug!("Amount {} rejected: {}", state.amount_input, reason);
        state.status = Status::Error(FormError::validation(reason));
    }

    state
}

/// Limit checks in precedence order, the first failure wins:
/// zero, below minimum, above spendable maximum, above provider maximum.
pub fn check_limits(state: &FormState) -> Result<(), ErrorReason> {
    let amount = state.amount_input;

    if amount.is_zero() {
        return Err(ErrorReason::InputZero);
    }

    let limits = state.environment.settings.limits_for(&state.input_token.id);
    let route = state.route.as_ref();

    let min = [limits.min, route.and_then(|route| route.min_in)]
        .into_iter()
        .flatten()
        .max();
    if let Some(min) = min {
        if amount < min {
            return Err(ErrorReason::InputTooLow { min });
        }
    }

    if exceeds(amount, state.max_amount_input) {
        return Err(ErrorReason::InsufficientFunds {
            max: state.max_amount_input,
        });
    }

    let max = [limits.max, route.and_then(|route| route.max_in)]
        .into_iter()
        .flatten()
        .min();
    if let Some(max) = max {
        if exceeds(amount, max) {
            return Err(ErrorReason::InputTooHigh { max });
        }
    }

    Ok(())
}
