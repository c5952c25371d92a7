//! Form actions

use std::fmt;

use txflow_common::{Balances, EditingSide, Prices, Token};

use crate::state::InitContext;

/// Input accepted by a [`crate::FormStateMachine`]
#[derive(Debug, Clone)]
pub enum Action {
    /// Start (or restart) the form from a context
    Initialize(Box<InitContext>),
    /// User typed an amount
    ChangeAmount {
        /// Field typed into
        side: EditingSide,
        /// Raw text
        text: String,
    },
    /// User typed a fiat value for the input amount
    ChangeAmountInFiat(String),
    /// Select the token paid
    ChangeInputToken(Token),
    /// Select the token received
    ChangeOutputToken(Token),
    /// Select the token the fee is paid in
    ChangeFeeToken(Token),
    /// Swap input and output tokens
    SwitchTokens,
    /// Change accepted slippage, in basis points
    ChangeSlippage(u16),
    /// New wallet balances
    UpdateBalances(Balances),
    /// New fiat prices
    UpdatePrices(Prices),
    /// Recompute quote, fee and prices for the current inputs
    Refresh,
    /// Build and broadcast the transaction
    Submit,
}

impl Action {
    /// Shorthand for [`Action::ChangeAmount`] on the input side
    pub fn amount_input<S: Into<String>>(text: S) -> Self {
        Action::ChangeAmount {
            side: EditingSide::Input,
            text: text.into(),
        }
    }

    /// Shorthand for [`Action::ChangeAmount`] on the output side
    pub fn amount_output<S: Into<String>>(text: S) -> Self {
        Action::ChangeAmount {
            side: EditingSide::Output,
            text: text.into(),
        }
    }

    /// Shorthand for [`Action::Initialize`]
    pub fn initialize(context: InitContext) -> Self {
        Action::Initialize(Box::new(context))
    }

    /// Whether accepting this action supersedes the work in flight.
    ///
    /// Environment refreshes and `Refresh` queue behind the current chain instead.
    pub fn is_cancelling(&self) -> bool {
        !matches!(
            self,
            Action::Refresh | Action::UpdateBalances(_) | Action::UpdatePrices(_)
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Initialize(context) => write!(f, "initialize({})", context.input_token),
            Action::ChangeAmount { side, text } => match side {
                EditingSide::Input => write!(f, "change_amount(input, \"{text}\")"),
                EditingSide::Output => write!(f, "change_amount(output, \"{text}\")"),
            },
            Action::ChangeAmountInFiat(text) => write!(f, "change_amount_in_fiat(\"{text}\")"),
            Action::ChangeInputToken(token) => write!(f, "change_input_token({})", token.id),
            Action::ChangeOutputToken(token) => write!(f, "change_output_token({})", token.id),
            Action::ChangeFeeToken(token) => write!(f, "change_fee_token({})", token.id),
            Action::SwitchTokens => write!(f, "switch_tokens"),
            Action::ChangeSlippage(bps) => write!(f, "change_slippage({bps})"),
            Action::UpdateBalances(balances) => write!(f, "update_balances({})", balances.len()),
            Action::UpdatePrices(prices) => write!(f, "update_prices({})", prices.len()),
            Action::Refresh => write!(f, "refresh"),
            Action::Submit => write!(f, "submit"),
        }
    }
}
