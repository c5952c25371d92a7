//! txflow shared types and service ports.
//!
//! This crate is the base foundation for the transaction form engine in `txflow` and for the
//! service implementations plugged into it.
//!
//! It contains the shared value types (token amounts, fees, routes, the environment snapshot),
//! the error taxonomy, the asynchronous service ports the engine talks to and the snapshot
//! publisher used to fan state out to observers.

pub mod amount;
pub mod environment;
pub mod error;
pub mod fee;
pub mod format;
pub mod pub_sub;
pub mod route;
pub mod service;
pub mod settings;
pub mod token;
pub mod util;

pub use amount::TokenAmount;
pub use environment::{Balances, Environment, Prices};
pub use error::{Error, ErrorReason, FormError, Stage};
pub use fee::{FeeBreakdown, FeeItem, FeeKind};
pub use route::{EditingSide, Route};
pub use service::{
    FeeRequest, FeeService, FormServices, PriceService, RouteRequest, RouteService,
    ServiceError, TransactionDraft, TransactionId, TransactionService, ValidatedForm,
    WalletProvider,
};
pub use settings::{FormSettings, TokenLimits};
pub use token::{Token, TokenId};

// re-exporting external crates
pub use rust_decimal::{self, Decimal};
