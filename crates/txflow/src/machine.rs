//! Form state machine
//!
//! Owns the current [`FormState`] of one flow and serializes the computation chains started by
//! accepted actions.
//!
//! Every cancelling action bumps a generation counter under the same lock that guards the
//! current snapshot, cancels the token of the previous generation, then publishes its progress
//! state right away. Chains run one at a time behind a FIFO lock; a chain whose token is
//! cancelled drops the step it is awaiting, releases the lock and never publishes.
//! Non-cancelling actions (refresh and environment updates) do not bump the generation and
//! run after the work already queued.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use txflow_common::pub_sub::{Publisher, Subscription};
use txflow_common::{Error, FormServices};

use crate::action::Action;
use crate::logic;
use crate::state::{FormState, InitContext};

/// Subscription to the snapshots of a form
pub type StateSubscription = Subscription<FormState>;

/// Current snapshot and the generation of the work allowed to replace it
#[derive(Debug)]
struct Cell {
    state: FormState,
    generation: u64,
    /// Cancelled when `generation` is superseded
    cancel: CancellationToken,
}

struct Inner {
    cell: Mutex<Cell>,
    publisher: Publisher<FormState>,
    worker: tokio::sync::Mutex<()>,
    services: FormServices,
}

/// Form state machine
///
/// Cheap to clone, clones drive the same form.
#[derive(Clone)]
pub struct FormStateMachine {
    inner: Arc<Inner>,
}

impl fmt::Debug for FormStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.inner.cell.lock();
        f.debug_struct("FormStateMachine")
            .field("status", &cell.state.status)
            .field("generation", &cell.generation)
            .field("publisher", &self.inner.publisher)
            .finish()
    }
}

impl FormStateMachine {
    /// Create a new state machine owning `initial`
    pub fn new(initial: FormState, services: FormServices) -> Self {
        let capacity = initial.environment.settings.channel_capacity;

        Self {
            inner: Arc::new(Inner {
                cell: Mutex::new(Cell {
                    state: initial,
                    generation: 0,
                    cancel: CancellationToken::new(),
                }),
                publisher: Publisher::new(capacity),
                worker: tokio::sync::Mutex::new(()),
                services,
            }),
        }
    }

    /// Create a new state machine from an initialization context
    pub fn from_context(context: InitContext, services: FormServices) -> Result<Self, Error> {
        Ok(Self::new(FormState::initial(context)?, services))
    }

    /// Latest snapshot
    pub fn current_state(&self) -> FormState {
        self.inner.cell.lock().state.clone()
    }

    /// Subscribe to snapshots, starting with the latest one
    pub fn subscribe(&self) -> Result<StateSubscription, Error> {
        let cell = self.inner.cell.lock();
        Ok(self.inner.publisher.subscribe(cell.state.clone())?)
    }

    /// Accept an action.
    ///
    /// Returns once the action's chain finished or was superseded, with the snapshot current
    /// at that point. Suppressed actions return the current snapshot right away.
    #[instrument(skip(self, action), fields(action = %action))]
    pub async fn accept(&self, action: Action) -> FormState {
        let generation = {
            let mut cell = self.inner.cell.lock();

            if !logic::should_perform(&cell.state, &action) {
                tracing::debug!("Action ignored");
                return cell.state.clone();
            }

            if action.is_cancelling() {
                cell.generation = cell.generation.wrapping_add(1);
                cell.cancel.cancel();
                cell.cancel = CancellationToken::new();
                cell.state = logic::primary(cell.state.clone(), &action);
                self.inner.publisher.publish(&cell.state);
            }

            cell.generation
        };

        tracing::debug!("Action triggered, generation {}", generation);

        let _worker = self.inner.worker.lock().await;

        let Some((mut state, cancel)) = self.begin(&action, generation) else {
            tracing::debug!("Action dropped before start");
            return self.current_state();
        };

        for step in logic::chain_for(&action, &state) {
            if cancel.is_cancelled() {
                tracing::debug!("Action superseded before {}", step);
                return self.current_state();
            }

            // Skipped steps do not yield, the next iteration checks for supersession again
            if step.is_halted_by(&state) {
                continue;
            }

            state = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Action superseded during {}", step);
                    return self.current_state();
                }
                state = step.run(state, &self.inner.services) => state,
            };

            let current = if step.publishes_interim() {
                self.publish_if_current(generation, &state)
            } else {
                self.is_current(generation)
            };

            if !current {
                tracing::debug!("Action superseded after {}", step);
                return self.current_state();
            }
        }

        let state = logic::finalize(state);
        if self.publish_if_current(generation, &state) {
            tracing::debug!("Action finished: {}", state.status);
            state
        } else {
            tracing::debug!("Action superseded before publishing");
            self.current_state()
        }
    }

    /// Starting state of the chain and the token cancelled when it is superseded, `None` if
    /// the action was superseded or became a no-op while queued.
    ///
    /// Non-cancelling actions apply their primary transform here, on top of the result of the
    /// work queued before them. A superseded environment update is folded into the current
    /// snapshot so the newer chain reads it.
    fn begin(&self, action: &Action, generation: u64) -> Option<(FormState, CancellationToken)> {
        let mut cell = self.inner.cell.lock();

        if cell.generation != generation {
            if matches!(action, Action::UpdateBalances(_) | Action::UpdatePrices(_))
                && logic::should_perform(&cell.state, action)
            {
                cell.state = logic::primary(cell.state.clone(), action);
            }
            return None;
        }

        if action.is_cancelling() {
            return Some((cell.state.clone(), cell.cancel.clone()));
        }

        if !logic::should_perform(&cell.state, action) {
            return None;
        }

        let progress = logic::primary(cell.state.clone(), action);
        if progress != cell.state {
            cell.state = progress.clone();
            self.inner.publisher.publish(&progress);
        }

        Some((progress, cell.cancel.clone()))
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.cell.lock().generation == generation
    }

    /// Replace and publish the snapshot unless a newer action was accepted
    fn publish_if_current(&self, generation: u64, state: &FormState) -> bool {
        let mut cell = self.inner.cell.lock();

        if cell.generation != generation {
            return false;
        }

        if &cell.state != state {
            cell.state = state.clone();
            self.inner.publisher.publish(state);
        }

        true
    }
}
