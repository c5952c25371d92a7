//! Transaction draft and submission

use tracing::instrument;
use txflow_common::{ErrorReason, FormError, FormServices, Stage};

use super::fail;
use crate::state::{FormState, Status};

/// Build the transaction draft from the validated form, moving to [`Status::Submitting`]
#[instrument(skip_all)]
pub async fn create_transaction(mut state: FormState, services: &FormServices) -> FormState {
    if state.is_swap() && state.route.is_none() {
        state.status = Status::Error(FormError::new(
            ErrorReason::Provider("route unavailable".to_string()),
            Stage::Transaction,
        ));
        return state;
    }

    let form = match state.validated_form() {
        Ok(form) => form,
        Err(err) => {
            tracing::error!("Invalid form for transaction: {}", err);
            state.status = Status::Error(FormError::new(
                ErrorReason::Unknown(err.to_string()),
                Stage::Transaction,
            ));
            return state;
        }
    };

    match services.transactions.build(&form).await {
        Ok(draft) => {
            tracing::debug!("Built transaction draft {}", draft.id);
            state.draft = Some(draft);
            state.status = Status::Submitting;
            state
        }
        Err(err) => fail(state, err, Stage::Transaction),
    }
}

/// Broadcast the draft, finishing the flow
#[instrument(skip_all)]
pub async fn submit_transaction(mut state: FormState, services: &FormServices) -> FormState {
    let Some(draft) = state.draft.clone() else {
        return state;
    };

    match services.transactions.submit(&draft).await {
        Ok(txid) => {
            tracing::info!("Submitted transaction {}", txid);
            state.status = Status::Finished(txid);
            state
        }
        Err(err) => {
            state.draft = None;
            fail(state, err, Stage::Submission)
        }
    }
}
