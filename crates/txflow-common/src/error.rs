//! Errors

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::token::TokenId;

/// txflow Error
#[derive(Debug, Error)]
pub enum Error {
    /// Token is not enabled by the settings
    #[error("Token disabled: `{0}`")]
    TokenDisabled(TokenId),
    /// Token is not in the environment's token list
    #[error("Token unknown: `{0}`")]
    UnknownToken(TokenId),
    /// Input and output are the same token
    #[error("Input and output token must differ")]
    SameToken,
    /// Amount Error
    #[error(transparent)]
    Amount(#[from] crate::amount::Error),
    /// Settings Error
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Publisher Error
    #[error(transparent)]
    PubSub(#[from] crate::pub_sub::Error),
}

/// Classified reason a form is in the error state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ErrorReason {
    /// Amount text is not a number or is out of range
    InputInvalid,
    /// Amount is zero
    InputZero,
    /// Amount is below the minimum
    InputTooLow {
        /// Minimum accepted amount
        min: Decimal,
    },
    /// Amount is above the provider limit
    InputTooHigh {
        /// Maximum accepted amount
        max: Decimal,
    },
    /// Balance does not cover the amount after fee reservation
    InsufficientFunds {
        /// Maximum spendable amount
        max: Decimal,
    },
    /// A service could not be reached
    Network(String),
    /// A service rejected the request
    Provider(String),
    /// Unclassified failure
    Unknown(String),
}

impl ErrorReason {
    /// Computed locally without any service call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ErrorReason::InputInvalid
                | ErrorReason::InputZero
                | ErrorReason::InputTooLow { .. }
                | ErrorReason::InputTooHigh { .. }
                | ErrorReason::InsufficientFunds { .. }
        )
    }

    /// Whether a retry may succeed without the user changing inputs
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorReason::Network(_) | ErrorReason::Unknown(_))
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorReason::InputInvalid => write!(f, "invalid amount"),
            ErrorReason::InputZero => write!(f, "amount is zero"),
            ErrorReason::InputTooLow { min } => write!(f, "amount below minimum {min}"),
            ErrorReason::InputTooHigh { max } => write!(f, "amount above maximum {max}"),
            ErrorReason::InsufficientFunds { max } => {
                write!(f, "insufficient funds, max {max}")
            }
            ErrorReason::Network(msg) => write!(f, "network error: {msg}"),
            ErrorReason::Provider(msg) => write!(f, "provider error: {msg}"),
            ErrorReason::Unknown(msg) => write!(f, "unknown error: {msg}"),
        }
    }
}

/// Step of the chain that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Local amount and limit checks
    Validation,
    /// Route or quote calculation
    Route,
    /// Fee calculation
    Fee,
    /// Transaction draft creation
    Transaction,
    /// Transaction submission
    Submission,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Stage::Validation => "validation",
            Stage::Route => "route",
            Stage::Fee => "fee",
            Stage::Transaction => "transaction",
            Stage::Submission => "submission",
        };
        write!(f, "{stage}")
    }
}

/// Error placed on a form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormError {
    /// Reason
    pub reason: ErrorReason,
    /// Stage
    pub stage: Stage,
}

impl FormError {
    /// Create new [`FormError`]
    pub fn new(reason: ErrorReason, stage: Stage) -> Self {
        Self { reason, stage }
    }

    /// Local validation error
    pub fn validation(reason: ErrorReason) -> Self {
        Self::new(reason, Stage::Validation)
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.reason)
    }
}
