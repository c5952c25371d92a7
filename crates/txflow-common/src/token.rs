//! Tokens

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Token identifier (mint address or symbol, depending on the chain adapter)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    /// Create a new [`TokenId`]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Identifier as str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TokenId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TokenId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl FromStr for TokenId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

/// Token metadata
///
/// Two tokens with the same [`TokenId`] refer to the same asset even if the rest of the metadata
/// differs (e.g. a refreshed token list renamed the symbol). Use [`Token::same_asset`] for that
/// comparison; the derived `PartialEq` compares every field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Identifier
    pub id: TokenId,
    /// Display symbol
    pub symbol: String,
    /// Declared decimal places
    pub decimals: u32,
}

impl Token {
    /// Create new [`Token`]
    pub fn new<I, S>(id: I, symbol: S, decimals: u32) -> Self
    where
        I: Into<TokenId>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Whether both tokens identify the same asset
    pub fn same_asset(&self, other: &Token) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_asset_ignores_metadata() {
        let sol = Token::new("So11111111111111111111111111111111111111112", "SOL", 9);
        let renamed = Token::new("So11111111111111111111111111111111111111112", "wSOL", 9);

        assert!(sol.same_asset(&renamed));
        assert_ne!(sol, renamed);
    }

    #[test]
    fn test_token_id_serde_transparent() {
        let id = TokenId::from("usdc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"usdc\"");
    }
}
