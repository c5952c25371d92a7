//! Routes and quotes

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::format::truncate_fraction;
use crate::token::TokenId;

/// Basis points in one
pub const BPS_IN_ONE: u32 = 10_000;

/// Which amount field the user is editing, the other one is derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditingSide {
    /// Amount paid (exact in)
    #[default]
    Input,
    /// Amount received (exact out)
    Output,
}

impl EditingSide {
    /// The other side
    pub fn opposite(&self) -> Self {
        match self {
            EditingSide::Input => EditingSide::Output,
            EditingSide::Output => EditingSide::Input,
        }
    }
}

/// Best path and exchange rate between two tokens
///
/// A route is only valid for the inputs it was computed with and for `ttl_secs` after
/// `fetched_at`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    /// Token paid
    pub input: TokenId,
    /// Token received
    pub output: TokenId,
    /// Side that was exact when quoting
    pub side: EditingSide,
    /// Amount paid
    pub in_amount: Decimal,
    /// Amount received
    pub out_amount: Decimal,
    /// Price impact in basis points
    pub price_impact_bps: u16,
    /// Minimum input accepted by the provider
    pub min_in: Option<Decimal>,
    /// Maximum input accepted by the provider
    pub max_in: Option<Decimal>,
    /// Provider label (pool, aggregator)
    pub provider: String,
    /// Unix time the quote was produced
    pub fetched_at: u64,
    /// Seconds the quote stays fresh
    pub ttl_secs: u64,
}

impl Route {
    /// Output per unit of input
    pub fn rate(&self) -> Option<Decimal> {
        self.out_amount.checked_div(self.in_amount)
    }

    /// Whether the quote is older than its staleness window
    pub fn is_stale(&self, now: u64) -> bool {
        now >= self.fetched_at.saturating_add(self.ttl_secs)
    }

    /// Whether the route was computed for these inputs
    pub fn matches(
        &self,
        input: &TokenId,
        output: &TokenId,
        side: EditingSide,
        amount: Decimal,
    ) -> bool {
        let exact = match side {
            EditingSide::Input => self.in_amount,
            EditingSide::Output => self.out_amount,
        };

        &self.input == input && &self.output == output && self.side == side && exact == amount
    }

    /// Worst acceptable output after slippage, truncated to `decimals`
    pub fn minimum_received(&self, slippage_bps: u16, decimals: u32) -> Decimal {
        let keep = Decimal::from(BPS_IN_ONE.saturating_sub(u32::from(slippage_bps)))
            / Decimal::from(BPS_IN_ONE);

        self.out_amount
            .checked_mul(keep)
            .map(|value| truncate_fraction(value, decimals))
            .unwrap_or(Decimal::ZERO)
    }
}
