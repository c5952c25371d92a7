//! Fake transaction service

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::instrument;
use txflow_common::{
    ServiceError, TransactionDraft, TransactionId, TransactionService, ValidatedForm,
};
use uuid::Uuid;

/// Builds drafts from the serialized form and "broadcasts" them in memory
#[derive(Debug, Default)]
pub struct FakeTransactions {
    fail_next_build: Mutex<Option<ServiceError>>,
    fail_next_submit: Mutex<Option<ServiceError>>,
    submitted: Mutex<Vec<TransactionDraft>>,
}

impl FakeTransactions {
    /// Fail the next build with `err`
    pub fn fail_next_build(&self, err: ServiceError) {
        *self.fail_next_build.lock() = Some(err);
    }

    /// Fail the next submission with `err`
    pub fn fail_next_submit(&self, err: ServiceError) {
        *self.fail_next_submit.lock() = Some(err);
    }

    /// Drafts submitted successfully
    pub fn submitted(&self) -> Vec<TransactionDraft> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl TransactionService for FakeTransactions {
    #[instrument(skip_all)]
    async fn build(&self, form: &ValidatedForm) -> Result<TransactionDraft, ServiceError> {
        if let Some(err) = self.fail_next_build.lock().take() {
            return Err(err);
        }

        let payload =
            serde_json::to_vec(form).map_err(|err| ServiceError::Unknown(err.to_string()))?;

        Ok(TransactionDraft::new(form.clone(), payload))
    }

    #[instrument(skip_all, fields(draft = %draft.id))]
    async fn submit(&self, draft: &TransactionDraft) -> Result<TransactionId, ServiceError> {
        if let Some(err) = self.fail_next_submit.lock().take() {
            return Err(err);
        }

        self.submitted.lock().push(draft.clone());
        Ok(TransactionId::new(Uuid::new_v4().simple().to_string()))
    }
}
