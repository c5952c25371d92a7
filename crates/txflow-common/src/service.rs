//! Service ports
//!
//! Asynchronous collaborators of the form engine. Implementations (RPC clients, price oracles,
//! fee relayers, aggregators) live outside this workspace; they are injected once per flow
//! through [`FormServices`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::amount::TokenAmount;
use crate::environment::Balances;
use crate::error::ErrorReason;
use crate::fee::FeeBreakdown;
use crate::route::{EditingSide, Route};
use crate::token::{Token, TokenId};

/// Service Error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Service unreachable
    #[error("Network error: {0}")]
    Network(String),
    /// Service answered but rejected the request
    #[error("Provider rejected request: {0}")]
    Provider(String),
    /// No route between the tokens
    #[error("No route found")]
    RouteNotFound,
    /// Price moved beyond the accepted slippage
    #[error("Slippage exceeded")]
    SlippageExceeded,
    /// Unclassified failure
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ServiceError {
    /// Classify into the reason shown on the form
    pub fn reason(&self) -> ErrorReason {
        match self {
            ServiceError::Network(msg) => ErrorReason::Network(msg.clone()),
            ServiceError::Provider(msg) => ErrorReason::Provider(msg.clone()),
            ServiceError::RouteNotFound | ServiceError::SlippageExceeded => {
                ErrorReason::Provider(self.to_string())
            }
            ServiceError::Unknown(msg) => ErrorReason::Unknown(msg.clone()),
        }
    }
}

/// Fee calculation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRequest {
    /// Token paid
    pub input: TokenId,
    /// Token received, `None` for plain transfers
    pub output: Option<TokenId>,
    /// Token the fee is paid in
    pub fee_token: TokenId,
    /// Amount of input token
    pub amount: Decimal,
    /// Current route if any
    pub route: Option<Route>,
}

/// Route calculation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Token paid
    pub input: Token,
    /// Token received
    pub output: Token,
    /// Which side `amount` is exact on
    pub side: EditingSide,
    /// Exact amount
    pub amount: Decimal,
    /// Accepted slippage in basis points
    pub slippage_bps: u16,
}

/// Snapshot of a form that passed validation, handed to the transaction builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedForm {
    /// Amount paid
    pub input: TokenAmount,
    /// Amount received for swaps
    pub output: Option<TokenAmount>,
    /// Token the fee is paid in
    pub fee_token: TokenId,
    /// Fee
    pub fee: FeeBreakdown,
    /// Route for swaps
    pub route: Option<Route>,
    /// Accepted slippage in basis points
    pub slippage_bps: u16,
    /// Worst acceptable output
    pub minimum_received: Option<Decimal>,
}

/// Unsigned transaction ready to be submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    /// Draft id
    pub id: Uuid,
    /// Form the draft was built from
    pub form: ValidatedForm,
    /// Opaque payload understood by the submitter
    pub payload: Vec<u8>,
}

impl TransactionDraft {
    /// Create a new draft with a random id
    pub fn new(form: ValidatedForm, payload: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            form,
            payload,
        }
    }
}

/// Identifier of a submitted transaction (signature)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Create new [`TransactionId`]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wallet balances provider
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Current balances
    async fn wallets(&self) -> Result<Balances, ServiceError>;

    /// Stream of balance updates
    fn observe_balances(&self) -> BoxStream<'static, Balances>;
}

/// Fiat price lookup, used for display values only
#[async_trait]
pub trait PriceService: Send + Sync {
    /// Current price of a token, `None` when unknown
    async fn current_price(&self, token: &TokenId) -> Result<Option<Decimal>, ServiceError>;
}

/// Fee calculation
#[async_trait]
pub trait FeeService: Send + Sync {
    /// Compute the fees of a transaction
    async fn compute_fee(&self, request: &FeeRequest) -> Result<FeeBreakdown, ServiceError>;
}

/// Route and quote calculation
///
/// Dropping the returned future cancels the calculation.
#[async_trait]
pub trait RouteService: Send + Sync {
    /// Compute the best route
    async fn compute_route(&self, request: &RouteRequest) -> Result<Route, ServiceError>;
}

/// Transaction builder and submitter
#[async_trait]
pub trait TransactionService: Send + Sync {
    /// Build an unsigned transaction from a validated form
    async fn build(&self, form: &ValidatedForm) -> Result<TransactionDraft, ServiceError>;

    /// Sign and send a draft
    async fn submit(&self, draft: &TransactionDraft) -> Result<TransactionId, ServiceError>;
}

/// Services a flow is constructed with
#[derive(Clone)]
pub struct FormServices {
    /// Prices
    pub prices: Arc<dyn PriceService>,
    /// Fees
    pub fees: Arc<dyn FeeService>,
    /// Routes
    pub routes: Arc<dyn RouteService>,
    /// Transactions
    pub transactions: Arc<dyn TransactionService>,
}

impl FormServices {
    /// Create new [`FormServices`]
    pub fn new(
        prices: Arc<dyn PriceService>,
        fees: Arc<dyn FeeService>,
        routes: Arc<dyn RouteService>,
        transactions: Arc<dyn TransactionService>,
    ) -> Self {
        Self {
            prices,
            fees,
            routes,
            transactions,
        }
    }
}

impl fmt::Debug for FormServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormServices").finish_non_exhaustive()
    }
}
