//! Fee calculation

use tracing::instrument;
use txflow_common::{FeeRequest, FormServices, Stage};

use super::fail;
use crate::state::FormState;

/// Ask the fee service for the fee of the current inputs.
///
/// Does nothing when the fee is already known; input changes clear it. A zero amount is left
/// to [`super::validate_limits`] without asking the service. Amounts are left untouched, the
/// fee only reduces the spendable maximum.
#[instrument(skip_all, fields(fee_token = %state.fee_token.id))]
pub async fn calculate_fee(mut state: FormState, services: &FormServices) -> FormState {
    if state.fee.is_some() || state.exact_amount().is_zero() {
        return state;
    }

    let request = FeeRequest {
        input: state.input_token.id.clone(),
        output: state.output_token.as_ref().map(|token| token.id.clone()),
        fee_token: state.fee_token.id.clone(),
        amount: state.amount_input,
        route: state.route.clone(),
    };

    match services.fees.compute_fee(&request).await {
        Ok(fee) => {
            state.fee = Some(fee);
            state
        }
        Err(err) => fail(state, err, Stage::Fee),
    }
}
