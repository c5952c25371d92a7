//! Business logic
//!
//! An accepted [`Action`] first goes through [`primary`], a synchronous transform of the form
//! inputs that yields the progress state, then through the [`Step`]s returned by
//! [`chain_for`]. Each step maps a state to a new one and may await a service port. A step
//! that leaves the state in [`Status::Error`] halts the chain; only display steps keep running
//! after a local validation error.

use std::fmt;

use txflow_common::{ErrorReason, FormError, FormServices, ServiceError, Stage};

use crate::action::Action;
use crate::state::{FormState, Status};

mod amounts;
mod fee;
mod input;
mod limits;
mod prices;
mod suppress;
mod transaction;

pub use amounts::derive_amounts;
pub use fee::calculate_fee;
pub use input::primary;
pub use limits::{check_limits, validate_limits};
pub use prices::{recompute_fiat, refresh_prices};
pub use suppress::should_perform;
pub use transaction::{create_transaction, submit_transaction};

/// Step of a computation chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Quote the route and derive the amount on the non-editing side
    DeriveAmounts {
        /// Replace the route even if it is still fresh
        requote: bool,
    },
    /// Compute the fee when missing
    CalculateFee,
    /// Spendable maximum and limit checks
    ValidateLimits,
    /// Build the transaction draft
    CreateTransaction,
    /// Broadcast the draft
    SubmitTransaction,
    /// Fetch prices and compute fiat values
    RefreshPrices,
    /// Compute fiat values from the environment prices
    RecomputeFiat,
}

impl Step {
    /// Run the step
    pub async fn run(self, state: FormState, services: &FormServices) -> FormState {
        match self {
            Step::DeriveAmounts { requote } => derive_amounts(state, services, requote).await,
            Step::CalculateFee => calculate_fee(state, services).await,
            Step::ValidateLimits => validate_limits(state),
            Step::CreateTransaction => create_transaction(state, services).await,
            Step::SubmitTransaction => submit_transaction(state, services).await,
            Step::RefreshPrices => refresh_prices(state, services).await,
            Step::RecomputeFiat => recompute_fiat(state),
        }
    }

    /// Whether the state produced by this step is published before the chain ends
    pub fn publishes_interim(&self) -> bool {
        matches!(self, Step::CreateTransaction)
    }

    /// Whether the step must not run on `state`
    pub fn is_halted_by(&self, state: &FormState) -> bool {
        match &state.status {
            Status::Finished(_) => true,
            Status::Error(err) => {
                let display = matches!(self, Step::RefreshPrices | Step::RecomputeFiat);
                !(display && err.reason.is_validation())
            }
            _ => false,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::DeriveAmounts { requote: true } => write!(f, "derive_amounts(requote)"),
            Step::DeriveAmounts { requote: false } => write!(f, "derive_amounts"),
            Step::CalculateFee => write!(f, "calculate_fee"),
            Step::ValidateLimits => write!(f, "validate_limits"),
            Step::CreateTransaction => write!(f, "create_transaction"),
            Step::SubmitTransaction => write!(f, "submit_transaction"),
            Step::RefreshPrices => write!(f, "refresh_prices"),
            Step::RecomputeFiat => write!(f, "recompute_fiat"),
        }
    }
}

/// Steps run after the primary transform of `action`.
///
/// `state` is the progress state returned by [`primary`].
pub fn chain_for(action: &Action, state: &FormState) -> Vec<Step> {
    match action {
        Action::UpdateBalances(_) => {
            if state.status == Status::Evaluating {
                vec![Step::ValidateLimits, Step::RecomputeFiat]
            } else {
                Vec::new()
            }
        }
        Action::UpdatePrices(_) => vec![Step::RecomputeFiat],
        Action::Refresh => vec![
            Step::DeriveAmounts { requote: true },
            Step::CalculateFee,
            Step::ValidateLimits,
            Step::RefreshPrices,
        ],
        Action::Submit => vec![
            Step::DeriveAmounts { requote: false },
            Step::CalculateFee,
            Step::ValidateLimits,
            Step::CreateTransaction,
            Step::SubmitTransaction,
        ],
        _ => vec![
            Step::DeriveAmounts { requote: false },
            Step::CalculateFee,
            Step::ValidateLimits,
            Step::RefreshPrices,
        ],
    }
}

/// Resolve the status of a chain that ran to completion
pub fn finalize(mut state: FormState) -> FormState {
    if state.status == Status::Evaluating {
        state.status = Status::Ready;
    }
    state
}

/// Put the form in the error state for a failed service call
pub(crate) fn fail(mut state: FormState, err: ServiceError, stage: Stage) -> FormState {
    let reason = err.reason();

    match &reason {
        ErrorReason::Unknown(_) => tracing::error!("{} step failed: {}", stage, err),
        _ => tracing::debug!("{} step failed: {}", stage, err),
    }

    state.status = Status::Error(FormError::new(reason, stage));
    state
}
