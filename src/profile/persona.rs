//! Persona classification
//!
//! A wallet gets exactly one persona. Several rules can hold at once (a
//! DeFi-heavy wallet with 60 transactions is also an active trader), so the
//! rule table is evaluated top to bottom and the first match wins:
//!
//! 1. No transactions -> Inactive
//! 2. DeFi share above 30% -> Active DeFi User
//! 3. More than 50 transactions -> Active Trader
//! 4. More than 5 coin types held (only when balances are known) -> Diversified Investor
//! 5. NFT share above 30% -> NFT Collector
//! 6. Older than 30 days with fewer than 10 transactions -> Long-term Holder
//!
//! Anything else is Unclassified.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::profile::category::{Category, CategoryCounts};

/// Share of transactions above which a category dominates the persona
pub const DOMINANT_SHARE: f64 = 0.3;

/// Transaction count above which a wallet is an active trader
pub const ACTIVE_TRADER_MIN_TXS: usize = 50;

/// Distinct coin types above which a wallet is diversified
pub const DIVERSIFIED_MIN_ASSETS: usize = 5;

/// Long-term holder thresholds
pub const HOLDER_MIN_AGE_DAYS: u64 = 30;
pub const HOLDER_MAX_TXS: usize = 10;

/// Wallet persona labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Persona {
    Inactive,
    #[serde(rename = "Active DeFi User")]
    ActiveDefiUser,
    #[serde(rename = "Active Trader")]
    ActiveTrader,
    #[serde(rename = "Diversified Investor")]
    DiversifiedInvestor,
    #[serde(rename = "NFT Collector")]
    NftCollector,
    #[serde(rename = "Long-term Holder")]
    LongTermHolder,
    #[default]
    Unclassified,
}

impl Persona {
    pub fn label(&self) -> &'static str {
        match self {
            Persona::Inactive => "Inactive",
            Persona::ActiveDefiUser => "Active DeFi User",
            Persona::ActiveTrader => "Active Trader",
            Persona::DiversifiedInvestor => "Diversified Investor",
            Persona::NftCollector => "NFT Collector",
            Persona::LongTermHolder => "Long-term Holder",
            Persona::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregate statistics the persona rules are evaluated against
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonaStats {
    pub total_transactions: usize,
    pub defi_count: usize,
    pub nft_count: usize,
    pub wallet_age_days: u64,
    /// Distinct coin types held; `None` when balances were not fetched
    pub asset_types: Option<usize>,
}

impl PersonaStats {
    pub fn from_counts(
        counts: &CategoryCounts,
        total_transactions: usize,
        wallet_age_days: u64,
        asset_types: Option<usize>,
    ) -> Self {
        Self {
            total_transactions,
            defi_count: counts.get(Category::DeFi),
            nft_count: counts.get(Category::Nft),
            wallet_age_days,
            asset_types,
        }
    }

    // Only reached after the Inactive rule, so total is never zero here
    fn share_exceeds(&self, count: usize) -> bool {
        count as f64 > self.total_transactions as f64 * DOMINANT_SHARE
    }
}

/// A single persona rule
pub struct PersonaRule {
    pub persona: Persona,
    pub matches: fn(&PersonaStats) -> bool,
}

fn is_inactive(stats: &PersonaStats) -> bool {
    stats.total_transactions == 0
}

fn is_defi_heavy(stats: &PersonaStats) -> bool {
    stats.share_exceeds(stats.defi_count)
}

fn is_active_trader(stats: &PersonaStats) -> bool {
    stats.total_transactions > ACTIVE_TRADER_MIN_TXS
}

fn is_diversified(stats: &PersonaStats) -> bool {
    stats
        .asset_types
        .map(|n| n > DIVERSIFIED_MIN_ASSETS)
        .unwrap_or(false)
}

fn is_nft_heavy(stats: &PersonaStats) -> bool {
    stats.share_exceeds(stats.nft_count)
}

fn is_long_term_holder(stats: &PersonaStats) -> bool {
    stats.wallet_age_days > HOLDER_MIN_AGE_DAYS && stats.total_transactions < HOLDER_MAX_TXS
}

/// Persona rules in priority order
pub const PERSONA_RULES: &[PersonaRule] = &[
    PersonaRule {
        persona: Persona::Inactive,
        matches: is_inactive,
    },
    PersonaRule {
        persona: Persona::ActiveDefiUser,
        matches: is_defi_heavy,
    },
    PersonaRule {
        persona: Persona::ActiveTrader,
        matches: is_active_trader,
    },
    PersonaRule {
        persona: Persona::DiversifiedInvestor,
        matches: is_diversified,
    },
    PersonaRule {
        persona: Persona::NftCollector,
        matches: is_nft_heavy,
    },
    PersonaRule {
        persona: Persona::LongTermHolder,
        matches: is_long_term_holder,
    },
];

/// Pick the persona of the first matching rule
pub fn classify_persona(stats: &PersonaStats) -> Persona {
    PERSONA_RULES
        .iter()
        .find(|rule| (rule.matches)(stats))
        .map(|rule| rule.persona)
        .unwrap_or_default()
}
