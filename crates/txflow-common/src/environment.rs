//! Environment snapshot
//!
//! Balances, prices, the token list and the form settings a computation chain reads from. A
//! snapshot is immutable; updates produce a new snapshot that the next chain picks up.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::settings::FormSettings;
use crate::token::{Token, TokenId};

/// Available balance per token
pub type Balances = HashMap<TokenId, Decimal>;

/// Fiat price per token
pub type Prices = HashMap<TokenId, Decimal>;

/// Read-only inputs of a form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Wallet balances
    pub balances: Balances,
    /// Fiat prices
    pub prices: Prices,
    /// Known tokens
    pub tokens: Vec<Token>,
    /// Settings of the flow
    pub settings: FormSettings,
}

impl Environment {
    /// Create a new environment with the given settings
    pub fn new(settings: FormSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Set the known tokens
    pub fn with_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Set the balances
    pub fn with_balances(mut self, balances: Balances) -> Self {
        self.balances = balances;
        self
    }

    /// Set the prices
    pub fn with_prices(mut self, prices: Prices) -> Self {
        self.prices = prices;
        self
    }

    /// Balance of a token, zero when the wallet does not hold it
    pub fn balance_of(&self, token: &TokenId) -> Decimal {
        self.balances.get(token).copied().unwrap_or(Decimal::ZERO)
    }

    /// Fiat price of a token
    pub fn price_of(&self, token: &TokenId) -> Option<Decimal> {
        self.prices.get(token).copied()
    }

    /// Token metadata
    pub fn token(&self, id: &TokenId) -> Option<&Token> {
        self.tokens.iter().find(|token| &token.id == id)
    }

    /// Whether the token can be used by the form
    pub fn is_enabled(&self, token: &TokenId) -> bool {
        self.settings.is_enabled(token)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_lookups() {
        let env = Environment::new(FormSettings::default())
            .with_tokens(vec![Token::new("sol", "SOL", 9)])
            .with_balances(HashMap::from([("sol".into(), dec!(5))]))
            .with_prices(HashMap::from([("sol".into(), dec!(20))]));

        assert_eq!(env.balance_of(&"sol".into()), dec!(5));
        assert_eq!(env.balance_of(&"usdc".into()), Decimal::ZERO);
        assert_eq!(env.price_of(&"sol".into()), Some(dec!(20)));
        assert_eq!(env.price_of(&"usdc".into()), None);
        assert_eq!(env.token(&"sol".into()).map(|t| t.decimals), Some(9));
    }
}
