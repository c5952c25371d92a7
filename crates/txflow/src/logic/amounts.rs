//! Amount derivation

use rust_decimal::Decimal;
use tracing::instrument;
use txflow_common::format::truncate_fraction;
use txflow_common::util::unix_time;
use txflow_common::{EditingSide, FormServices, FormSettings, Route, RouteRequest, Stage};

use super::fail;
use crate::state::FormState;

/// Whether a quote can no longer back the form
fn is_expired(route: &Route, settings: &FormSettings, now: u64) -> bool {
    route.is_stale(now) || now >= route.fetched_at.saturating_add(settings.quote_ttl_secs)
}

/// Derive the amount on the non-editing side.
///
/// Transfers mirror the typed amount. Swaps ask the route service for a quote unless the
/// current route still matches the inputs and is fresh; `requote` forces a new quote. The
/// typed amount is never touched.
#[instrument(skip_all, fields(input = %state.input_token.id, requote = requote))]
pub async fn derive_amounts(
    mut state: FormState,
    services: &FormServices,
    requote: bool,
) -> FormState {
    let side = state.editing_side;
    let amount = state.exact_amount();

    let Some(output) = state.output_token.clone() else {
        state.amount_input = amount;
        state.amount_output = amount;
        state.route = None;
        return state;
    };

    if amount.is_zero() {
        state.amount_input = Decimal::ZERO;
        state.amount_output = Decimal::ZERO;
        state.route = None;
        return state;
    }

    if !requote {
        if let Some(route) = &state.route {
            if route.matches(&state.input_token.id, &output.id, side, amount)
                && !is_expired(route, &state.environment.settings, unix_time())
            {
                return state;
            }
        }
    }

    let request = RouteRequest {
        input: state.input_token.clone(),
        output: output.clone(),
        side,
        amount,
        slippage_bps: state.slippage_bps,
    };

    match services.routes.compute_route(&request).await {
        Ok(route) => {
            tracing::debug!(
                "Quoted {} {} -> {} {} via {}",
                route.in_amount,
                route.input,
                route.out_amount,
                route.output,
                route.provider
            );

            match side {
                EditingSide::Input => {
                    state.amount_output = truncate_fraction(route.out_amount, output.decimals)
                }
                EditingSide::Output => {
                    state.amount_input =
                        truncate_fraction(route.in_amount, state.input_token.decimals)
                }
            }

            if state.route.as_ref() != Some(&route) {
                state.fee = None;
            }
            state.route = Some(route);
            state
        }
        Err(err) => {
            state.route = None;
            fail(state, err, Stage::Route)
        }
    }
}
