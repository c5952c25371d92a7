//! Derived-state engine for wallet transaction forms
//!
//! A form (send, swap, invest) is a single immutable [`FormState`] owned by a
//! [`FormStateMachine`]. Observers send [`Action`]s through
//! [`FormStateMachine::accept`] and read snapshots from [`FormStateMachine::subscribe`]; the
//! machine runs the business logic chain in [`logic`], coordinating the asynchronous service
//! ports from `txflow-common` and discarding work superseded by newer input.
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod action;
mod driver;
pub mod logic;
pub mod machine;
pub mod state;

pub use action::Action;
pub use machine::{FormStateMachine, StateSubscription};
pub use state::{FiatValues, FormState, InitContext, Status};
/// Re-export common types
#[doc(hidden)]
pub use txflow_common::{
    self as common, Decimal, EditingSide, Environment, Error, ErrorReason, FormError,
    FormServices, FormSettings, Stage, Token, TokenId,
};
