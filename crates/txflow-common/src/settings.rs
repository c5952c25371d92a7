//! Form settings
//!
//! Settings are injected into a flow at `Initialize` time inside the
//! [`Environment`](crate::Environment) and are never read from global state.

use std::collections::HashMap;
use std::path::Path;

use config::{Config, ConfigError, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::token::TokenId;

/// Prefix of the environment variables overriding settings
pub const ENV_PREFIX: &str = "TXFLOW";

/// Per-token amount limits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLimits {
    /// Minimum amount that can be entered
    pub min: Option<Decimal>,
    /// Maximum amount the provider accepts
    pub max: Option<Decimal>,
}

/// Settings of a transaction form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    /// Tokens that can be selected. Empty means every token is enabled.
    pub enabled_tokens: Vec<TokenId>,
    /// Amount limits keyed by token
    pub limits: HashMap<TokenId, TokenLimits>,
    /// Slippage applied to new swap forms, in basis points
    pub default_slippage_bps: u16,
    /// Seconds a quote stays fresh before `Refresh` replaces it
    pub quote_ttl_secs: u64,
    /// Period of the background refresh driver
    pub refresh_interval_secs: u64,
    /// Buffered snapshots per subscriber
    pub channel_capacity: usize,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            enabled_tokens: Vec::new(),
            limits: HashMap::new(),
            default_slippage_bps: 50,
            quote_ttl_secs: 30,
            refresh_interval_secs: 20,
            channel_capacity: 64,
        }
    }
}

impl FormSettings {
    /// Load settings: defaults, overridden by the optional TOML file, overridden by
    /// `TXFLOW__*` environment variables.
    pub fn load<P>(config_file: Option<P>) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path.as_ref()).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Whether the token can be selected in a form
    pub fn is_enabled(&self, token: &TokenId) -> bool {
        self.enabled_tokens.is_empty() || self.enabled_tokens.contains(token)
    }

    /// Limits for a token, empty if not configured
    pub fn limits_for(&self, token: &TokenId) -> TokenLimits {
        self.limits.get(token).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let settings = FormSettings::load::<&Path>(None).unwrap();
        assert_eq!(settings.default_slippage_bps, 50);
        assert_eq!(settings.quote_ttl_secs, 30);
        assert!(settings.is_enabled(&"anything".into()));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
enabled_tokens = ["sol", "usdc"]
quote_ttl_secs = 15

[limits.sol]
min = "0.001"
max = "1000"
"#
        )
        .unwrap();

        let settings = FormSettings::load(Some(file.path())).unwrap();

        assert_eq!(settings.quote_ttl_secs, 15);
        assert_eq!(settings.refresh_interval_secs, 20);
        assert!(settings.is_enabled(&"sol".into()));
        assert!(!settings.is_enabled(&"bonk".into()));

        let limits = settings.limits_for(&"sol".into());
        assert_eq!(limits.min, Some(dec!(0.001)));
        assert_eq!(limits.max, Some(dec!(1000)));
        assert_eq!(settings.limits_for(&"usdc".into()), TokenLimits::default());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(FormSettings::load(Some("/nonexistent/txflow.toml")).is_err());
    }
}
