//! Fees
//!
//! A fee breakdown is a list of [`FeeItem`]s, each tied to the token it is paid in. Liquidity
//! provider fees are already priced into the route's rate and are listed for display only.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::{Error, TokenAmount};
use crate::token::TokenId;

/// Kind of fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeKind {
    /// Network (signature) fee
    Network,
    /// Fee charged by the relay or swap provider
    Provider,
    /// Liquidity provider fee, included in the quoted rate
    Liquidity,
    /// Rent for creating the recipient's token account
    AccountCreation,
}

impl FeeKind {
    /// Whether the fee is paid on top of the amount
    pub fn is_payable(&self) -> bool {
        !matches!(self, FeeKind::Liquidity)
    }
}

/// Single fee line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeItem {
    /// Kind
    pub kind: FeeKind,
    /// Amount
    pub amount: TokenAmount,
}

impl FeeItem {
    /// Create new [`FeeItem`]
    pub fn new(kind: FeeKind, amount: TokenAmount) -> Self {
        Self { kind, amount }
    }
}

/// Computed fee breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// Fee lines
    pub items: Vec<FeeItem>,
}

impl FeeBreakdown {
    /// Create a new breakdown
    pub fn new(items: Vec<FeeItem>) -> Self {
        Self { items }
    }

    /// Breakdown with no fees at all
    pub fn free() -> Self {
        Self::default()
    }

    /// Whether no payable fee is charged
    pub fn is_free(&self) -> bool {
        self.items
            .iter()
            .filter(|item| item.kind.is_payable())
            .all(|item| item.amount.is_zero())
    }

    /// Total payable fee in `token`, liquidity fees excluded
    pub fn total_in(&self, token: &TokenId) -> Result<Decimal, Error> {
        let payable = self
            .items
            .iter()
            .filter(|item| item.kind.is_payable() && &item.amount.token == token)
            .map(|item| &item.amount);

        Ok(TokenAmount::try_sum(token, payable)?.value)
    }

    /// Sum of one kind of fee in `token`
    pub fn amount_of(&self, kind: FeeKind, token: &TokenId) -> Result<Decimal, Error> {
        let items = self
            .items
            .iter()
            .filter(|item| item.kind == kind && &item.amount.token == token)
            .map(|item| &item.amount);

        Ok(TokenAmount::try_sum(token, items)?.value)
    }
}
