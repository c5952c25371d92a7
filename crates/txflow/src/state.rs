//! Form state
//!
//! [`FormState`] is the single immutable snapshot of a transaction form. Every accepted action
//! produces a new value; nothing holds a mutable reference into a published snapshot.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use txflow_common::format::truncate_fraction;
use txflow_common::{
    EditingSide, Environment, Error, FeeBreakdown, FormError, Route, Token, TokenAmount,
    TokenId, TransactionDraft, TransactionId, ValidatedForm,
};

/// Lifecycle status of a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Derived values are consistent with the inputs
    Ready,
    /// A computation chain is running
    Evaluating,
    /// Building the transaction draft
    CreatingTransaction,
    /// Broadcasting the draft
    Submitting,
    /// Submitted, terminal for this flow
    Finished(TransactionId),
    /// Chain halted on an error
    Error(FormError),
}

impl Status {
    /// Error, if any
    pub fn error(&self) -> Option<&FormError> {
        match self {
            Status::Error(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => write!(f, "ready"),
            Status::Evaluating => write!(f, "evaluating"),
            Status::CreatingTransaction => write!(f, "creating_transaction"),
            Status::Submitting => write!(f, "submitting"),
            Status::Finished(txid) => write!(f, "finished({txid})"),
            Status::Error(err) => write!(f, "error({err})"),
        }
    }
}

/// Display-only fiat values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiatValues {
    /// Value of the input amount
    pub input: Option<Decimal>,
    /// Value of the output amount
    pub output: Option<Decimal>,
    /// Value of the payable fee
    pub fee: Option<Decimal>,
}

/// Everything needed to start a form
#[derive(Debug, Clone)]
pub struct InitContext {
    /// Balances, prices, tokens and settings
    pub environment: Environment,
    /// Token paid
    pub input_token: TokenId,
    /// Token received, `None` for a plain transfer
    pub output_token: Option<TokenId>,
    /// Token the fee is paid in, defaults to the input token
    pub fee_token: Option<TokenId>,
    /// Slippage, defaults to the settings' default
    pub slippage_bps: Option<u16>,
}

impl InitContext {
    /// Context for a plain transfer of `input_token`
    pub fn transfer<T: Into<TokenId>>(environment: Environment, input_token: T) -> Self {
        Self {
            environment,
            input_token: input_token.into(),
            output_token: None,
            fee_token: None,
            slippage_bps: None,
        }
    }

    /// Context for a swap between two tokens
    pub fn swap<I, O>(environment: Environment, input_token: I, output_token: O) -> Self
    where
        I: Into<TokenId>,
        O: Into<TokenId>,
    {
        Self {
            environment,
            input_token: input_token.into(),
            output_token: Some(output_token.into()),
            fee_token: None,
            slippage_bps: None,
        }
    }

    /// Pay the fee in another token
    pub fn with_fee_token<T: Into<TokenId>>(mut self, fee_token: T) -> Self {
        self.fee_token = Some(fee_token.into());
        self
    }
}

/// Snapshot of a transaction form
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    /// Lifecycle status, carries the error
    pub status: Status,
    /// Token paid
    pub input_token: Token,
    /// Token received, `None` for a plain transfer
    pub output_token: Option<Token>,
    /// Token the fee is paid in
    pub fee_token: Token,
    /// Side the user typed into, the other one is derived
    pub editing_side: EditingSide,
    /// Amount paid
    pub amount_input: Decimal,
    /// Amount received
    pub amount_output: Decimal,
    /// Fee for the current inputs, `None` until computed
    pub fee: Option<FeeBreakdown>,
    /// Route for the current inputs, `None` until computed or for transfers
    pub route: Option<Route>,
    /// Accepted slippage in basis points
    pub slippage_bps: u16,
    /// Largest spendable input amount after fee reservation
    pub max_amount_input: Decimal,
    /// Fiat values
    pub fiat: FiatValues,
    /// Draft built by `Submit`
    pub draft: Option<TransactionDraft>,
    /// Read-only environment snapshot
    pub environment: Arc<Environment>,
}

impl FormState {
    /// Build the initial state of a form, status [`Status::Ready`] with zero amounts
    pub fn initial(context: InitContext) -> Result<Self, Error> {
        let environment = context.environment;

        let input_token = resolve_token(&environment, &context.input_token)?;
        let output_token = match &context.output_token {
            Some(id) => {
                if id == &context.input_token {
                    return Err(Error::SameToken);
                }
                Some(resolve_token(&environment, id)?)
            }
            None => None,
        };
        let fee_token = match &context.fee_token {
            Some(id) => resolve_token(&environment, id)?,
            None => input_token.clone(),
        };

        let slippage_bps = context
            .slippage_bps
            .unwrap_or(environment.settings.default_slippage_bps);

        let mut state = Self {
            status: Status::Ready,
            input_token,
            output_token,
            fee_token,
            editing_side: EditingSide::Input,
            amount_input: Decimal::ZERO,
            amount_output: Decimal::ZERO,
            fee: None,
            route: None,
            slippage_bps,
            max_amount_input: Decimal::ZERO,
            fiat: FiatValues::default(),
            draft: None,
            environment: Arc::new(environment),
        };
        state.max_amount_input = state.balance();

        Ok(state)
    }

    /// Error, if the form is in the error state
    pub fn error(&self) -> Option<&FormError> {
        self.status.error()
    }

    /// Whether the form swaps into another token
    pub fn is_swap(&self) -> bool {
        self.output_token.is_some()
    }

    /// Amount on `side`
    pub fn amount(&self, side: EditingSide) -> Decimal {
        match side {
            EditingSide::Input => self.amount_input,
            EditingSide::Output => self.amount_output,
        }
    }

    /// Token on `side`; a transfer sends and receives the input token
    pub fn token(&self, side: EditingSide) -> &Token {
        match side {
            EditingSide::Input => &self.input_token,
            EditingSide::Output => self.output_token.as_ref().unwrap_or(&self.input_token),
        }
    }

    /// Amount the user typed
    pub fn exact_amount(&self) -> Decimal {
        self.amount(self.editing_side)
    }

    /// Balance of the input token
    pub fn balance(&self) -> Decimal {
        self.environment.balance_of(&self.input_token.id)
    }

    /// Worst acceptable output of a swap after slippage
    pub fn minimum_received(&self) -> Option<Decimal> {
        let output = self.output_token.as_ref()?;
        self.route
            .as_ref()
            .map(|route| route.minimum_received(self.slippage_bps, output.decimals))
    }

    /// Set the amount on `side`, making it the exact side.
    ///
    /// Transfers mirror the value on both sides, swaps zero the derived side until it is
    /// quoted again. Derived values are cleared.
    pub(crate) fn set_amount(&mut self, side: EditingSide, value: Decimal) {
        let value = truncate_fraction(value, self.token(side).decimals);
        self.editing_side = side;

        if self.is_swap() {
            match side {
                EditingSide::Input => {
                    self.amount_input = value;
                    self.amount_output = Decimal::ZERO;
                }
                EditingSide::Output => {
                    self.amount_output = value;
                    self.amount_input = Decimal::ZERO;
                }
            }
        } else {
            self.amount_input = value;
            self.amount_output = value;
        }

        self.invalidate();
    }

    /// Drop everything computed from the previous inputs
    pub(crate) fn invalidate(&mut self) {
        self.route = None;
        self.fee = None;
        self.draft = None;
    }

    /// Snapshot handed to the transaction builder
    pub(crate) fn validated_form(&self) -> Result<ValidatedForm, txflow_common::amount::Error> {
        let input = TokenAmount::new(self.input_token.id.clone(), self.amount_input)?;
        let output = match &self.output_token {
            Some(token) => Some(TokenAmount::new(token.id.clone(), self.amount_output)?),
            None => None,
        };

        Ok(ValidatedForm {
            input,
            output,
            fee_token: self.fee_token.id.clone(),
            fee: self.fee.clone().unwrap_or_else(FeeBreakdown::free),
            route: self.route.clone(),
            slippage_bps: self.slippage_bps,
            minimum_received: self.minimum_received(),
        })
    }
}

fn resolve_token(environment: &Environment, id: &TokenId) -> Result<Token, Error> {
    if !environment.is_enabled(id) {
        return Err(Error::TokenDisabled(id.clone()));
    }

    environment
        .token(id)
        .cloned()
        .ok_or_else(|| Error::UnknownToken(id.clone()))
}
