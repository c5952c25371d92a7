//! Token amounts
//!
//! Quantities are exact decimals, never binary floating point. A [`TokenAmount`] is always tied
//! to the token it is denominated in so fee reservation and balance checks cannot silently mix
//! assets.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format;
use crate::token::{Token, TokenId};

/// Amount Error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Amount overflow
    #[error("Amount Overflow")]
    AmountOverflow,
    /// Amounts denominated in different tokens
    #[error("Token mismatch: `{0}` and `{1}`")]
    TokenMismatch(TokenId, TokenId),
    /// Negative amount
    #[error("Amount cannot be negative")]
    Negative,
    /// Text is not a decimal number
    #[error("Invalid Amount: {0}")]
    InvalidAmount(String),
    /// More fraction digits than the token declares
    #[error("Amount has more than {0} decimal places")]
    TooManyDecimals(u32),
}

/// Quantity of a specific token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenAmount {
    /// Token the amount is denominated in
    pub token: TokenId,
    /// Exact value
    pub value: Decimal,
}

impl TokenAmount {
    /// Create a new amount, rejecting negative values
    pub fn new<T: Into<TokenId>>(token: T, value: Decimal) -> Result<Self, Error> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(Error::Negative);
        }

        Ok(Self {
            token: token.into(),
            value,
        })
    }

    /// Zero of a token
    pub fn zero<T: Into<TokenId>>(token: T) -> Self {
        Self {
            token: token.into(),
            value: Decimal::ZERO,
        }
    }

    /// Parse user text honoring the token's declared decimals
    pub fn parse(text: &str, token: &Token) -> Result<Self, Error> {
        let value = format::parse_decimal(text, token.decimals)?;
        Self::new(token.id.clone(), value)
    }

    /// Whether the amount is zero
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Checked addition. Fails on overflow or when the tokens differ.
    pub fn checked_add(&self, other: &TokenAmount) -> Result<TokenAmount, Error> {
        self.ensure_same_token(other)?;
        let value = self
            .value
            .checked_add(other.value)
            .ok_or(Error::AmountOverflow)?;

        Ok(Self {
            token: self.token.clone(),
            value,
        })
    }

    /// Checked subtraction. Fails on underflow below zero or when the tokens differ.
    pub fn checked_sub(&self, other: &TokenAmount) -> Result<TokenAmount, Error> {
        self.ensure_same_token(other)?;
        let value = self
            .value
            .checked_sub(other.value)
            .ok_or(Error::AmountOverflow)?;

        Self::new(self.token.clone(), value)
    }

    /// Subtraction that floors at zero
    pub fn saturating_sub(&self, other: &TokenAmount) -> Result<TokenAmount, Error> {
        self.ensure_same_token(other)?;
        let value = self
            .value
            .checked_sub(other.value)
            .filter(|v| !v.is_sign_negative())
            .unwrap_or(Decimal::ZERO);

        Ok(Self {
            token: self.token.clone(),
            value,
        })
    }

    /// Try sum to check for overflow
    pub fn try_sum<'a, I>(token: &TokenId, iter: I) -> Result<TokenAmount, Error>
    where
        I: IntoIterator<Item = &'a TokenAmount>,
    {
        iter.into_iter()
            .try_fold(TokenAmount::zero(token.clone()), |acc, x| acc.checked_add(x))
    }

    fn ensure_same_token(&self, other: &TokenAmount) -> Result<(), Error> {
        if self.token != other.token {
            return Err(Error::TokenMismatch(
                self.token.clone(),
                other.token.clone(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value.normalize(), self.token)
    }
}
