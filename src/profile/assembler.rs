//! Wallet Profile Assembly
//!
//! Combines the normalized record sequence into a single profile:
//! - Wallet age from the earliest transaction
//! - Category distribution and primary activity
//! - Persona from the ordered rule table
//! - Most used functions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

use crate::ledger::resources::{distinct_asset_types, CoinBalance};
use crate::profile::category::CategoryCounts;
use crate::profile::persona::{classify_persona, Persona, PersonaStats};
use crate::profile::record::TransactionRecord;

/// Message reported when a wallet has no usable transactions
pub const NO_DATA_MESSAGE: &str = "No transactions found for this wallet address";

/// Primary activity reported when there are no categories
const NO_ACTIVITY: &str = "None";

const SECS_PER_DAY: i64 = 86_400;

/// Configuration for profile assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Number of normalized records embedded in the profile
    #[serde(default = "default_display_transactions")]
    pub display_transactions: usize,
}

fn default_display_transactions() -> usize {
    20
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            display_transactions: default_display_transactions(),
        }
    }
}

/// Call count for one function name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCount {
    pub name: String,
    pub count: usize,
}

/// Behavioral profile of a wallet
#[derive(Debug, Clone, Serialize)]
pub struct WalletProfile {
    pub address: String,
    pub wallet_age_days: u64,
    pub total_transactions: usize,
    pub primary_activity: String,
    pub persona: Persona,
    pub tx_type_counts: CategoryCounts,
    pub top_functions: Vec<FunctionCount>,
    /// `None` when balances were not fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coin_balances: Option<Vec<CoinBalance>>,
    /// Leading slice of the normalized records, for display
    pub transactions: Vec<TransactionRecord>,
}

/// Outcome of profile assembly
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProfileReport {
    Ready(WalletProfile),
    NoData { error: String },
}

impl ProfileReport {
    pub fn no_data() -> Self {
        ProfileReport::NoData {
            error: NO_DATA_MESSAGE.to_string(),
        }
    }

    pub fn profile(&self) -> Option<&WalletProfile> {
        match self {
            ProfileReport::Ready(profile) => Some(profile),
            ProfileReport::NoData { .. } => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, ProfileReport::NoData { .. })
    }
}

/// Builds wallet profiles from normalized records
#[derive(Debug, Clone, Default)]
pub struct ProfileAssembler {
    config: ProfileConfig,
}

impl ProfileAssembler {
    pub fn new(config: ProfileConfig) -> Self {
        Self { config }
    }

    /// Assemble a profile.
    ///
    /// `balances` feeds the Diversified Investor rule and is skipped by it
    /// when `None`. `now` is the reference instant for the wallet age.
    pub fn assemble(
        &self,
        address: &str,
        records: &[TransactionRecord],
        balances: Option<&[CoinBalance]>,
        now: DateTime<Utc>,
    ) -> ProfileReport {
        let earliest = match records.iter().map(|r| r.timestamp).min() {
            Some(ts) => ts,
            None => {
                debug!(address = %address, "No transactions to profile");
                return ProfileReport::no_data();
            }
        };

        let total_transactions = records.len();
        let wallet_age_days = wallet_age_days(earliest, now);
        let tx_type_counts = CategoryCounts::from_records(records);

        let stats = PersonaStats::from_counts(
            &tx_type_counts,
            total_transactions,
            wallet_age_days,
            balances.map(distinct_asset_types),
        );
        let persona = classify_persona(&stats);

        let primary_activity = tx_type_counts
            .primary()
            .map(|c| c.to_string())
            .unwrap_or_else(|| NO_ACTIVITY.to_string());

        let top_functions = top_functions(records);

        debug!(
            address = %address,
            total_transactions,
            wallet_age_days,
            persona = %persona,
            primary_activity = %primary_activity,
            "Assembled wallet profile"
        );

        ProfileReport::Ready(WalletProfile {
            address: address.to_string(),
            wallet_age_days,
            total_transactions,
            primary_activity,
            persona,
            tx_type_counts,
            top_functions,
            coin_balances: balances.map(<[CoinBalance]>::to_vec),
            transactions: records
                .iter()
                .take(self.config.display_transactions)
                .cloned()
                .collect(),
        })
    }
}

/// Whole days between the earliest transaction and `now`, never negative
pub fn wallet_age_days(earliest: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    ((now - earliest).num_seconds() / SECS_PER_DAY).max(0) as u64
}

/// Function usage counts, most used first; ties keep first-seen order.
///
/// Non entry-function records are counted under the empty name so the counts
/// add up to the total transaction count.
pub fn top_functions(records: &[TransactionRecord]) -> Vec<FunctionCount> {
    let (mut counts, _) = records.iter().fold(
        (Vec::<FunctionCount>::new(), HashMap::<&str, usize>::new()),
        |(mut counts, mut index), record| {
            match index.entry(record.function.as_str()) {
                Entry::Occupied(slot) => counts[*slot.get()].count += 1,
                Entry::Vacant(slot) => {
                    slot.insert(counts.len());
                    counts.push(FunctionCount {
                        name: record.function.clone(),
                        count: 1,
                    });
                }
            }
            (counts, index)
        },
    );

    // Stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::category::Category;
    use chrono::Duration as ChronoDuration;

    fn record_at(function: &str, timestamp: DateTime<Utc>) -> TransactionRecord {
        TransactionRecord {
            version: 0,
            tx_type: "user_transaction".to_string(),
            timestamp,
            sender: "0xwallet".to_string(),
            recipient: String::new(),
            function: function.to_string(),
            amount: String::new(),
            arguments: vec![],
        }
    }

    fn records(functions: &[&str], timestamp: DateTime<Utc>) -> Vec<TransactionRecord> {
        functions.iter().map(|f| record_at(f, timestamp)).collect()
    }

    fn ready(report: ProfileReport) -> WalletProfile {
        match report {
            ProfileReport::Ready(profile) => profile,
            ProfileReport::NoData { error } => panic!("expected profile, got no data: {}", error),
        }
    }

    #[test]
    fn test_empty_input_is_no_data() {
        let report = ProfileAssembler::default().assemble("0xwallet", &[], None, Utc::now());
        assert!(report.is_no_data());
        assert!(report.profile().is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({ "error": NO_DATA_MESSAGE }));
    }

    #[test]
    fn test_defi_priority_over_trader() {
        let now = Utc::now();
        let mut functions = vec!["pool::add_liquidity"; 25];
        functions.extend(vec!["staking::stake"; 35]);
        let records = records(&functions, now - ChronoDuration::days(3));

        let profile = ready(ProfileAssembler::default().assemble("0xwallet", &records, None, now));
        assert_eq!(profile.total_transactions, 60);
        assert_eq!(profile.persona, Persona::ActiveDefiUser);
        assert_eq!(profile.tx_type_counts.get(Category::DeFi), 25);
        assert_eq!(profile.primary_activity, "Other");
    }

    #[test]
    fn test_wallet_age_uses_earliest_record() {
        let now = Utc::now();
        let records = vec![
            record_at("coin::transfer", now - ChronoDuration::days(2)),
            record_at("coin::transfer", now - ChronoDuration::days(45) - ChronoDuration::hours(5)),
            record_at("coin::transfer", now - ChronoDuration::days(10)),
        ];

        let profile = ready(ProfileAssembler::default().assemble("0xwallet", &records, None, now));
        assert_eq!(profile.wallet_age_days, 45);
        assert_eq!(profile.persona, Persona::LongTermHolder);
        assert_eq!(profile.primary_activity, "Transfer");
    }

    #[test]
    fn test_future_timestamp_clamps_age() {
        let now = Utc::now();
        assert_eq!(wallet_age_days(now + ChronoDuration::days(2), now), 0);
        assert_eq!(wallet_age_days(now - ChronoDuration::hours(47), now), 1);
    }

    #[test]
    fn test_top_functions_tie_break() {
        let now = Utc::now();
        let mut functions = vec!["f3"];
        for _ in 0..5 {
            functions.push("f1");
            functions.push("f2");
        }
        let result = top_functions(&records(&functions, now));

        let names: Vec<(&str, usize)> = result.iter().map(|fc| (fc.name.as_str(), fc.count)).collect();
        assert_eq!(names, vec![("f1", 5), ("f2", 5), ("f3", 1)]);
    }

    #[test]
    fn test_display_transactions_truncated() {
        let now = Utc::now();
        let records = records(&["coin::transfer"; 30], now);

        let profile = ready(ProfileAssembler::default().assemble("0xwallet", &records, None, now));
        assert_eq!(profile.transactions.len(), 20);
        assert_eq!(profile.total_transactions, 30);

        let small = ProfileAssembler::new(ProfileConfig {
            display_transactions: 5,
        });
        let profile = ready(small.assemble("0xwallet", &records, None, now));
        assert_eq!(profile.transactions.len(), 5);
    }

    #[test]
    fn test_balances_enable_diversified_rule() {
        let now = Utc::now();
        let records = records(&["coin::transfer", "router::swap"], now);
        let balances: Vec<CoinBalance> = (0..6)
            .map(|i| CoinBalance {
                symbol: format!("COIN{}", i),
                balance: "1".to_string(),
            })
            .collect();

        let assembler = ProfileAssembler::default();
        let without = ready(assembler.assemble("0xwallet", &records, None, now));
        assert_eq!(without.persona, Persona::Unclassified);
        assert!(without.coin_balances.is_none());

        let with = ready(assembler.assemble("0xwallet", &records, Some(&balances), now));
        assert_eq!(with.persona, Persona::DiversifiedInvestor);
        assert_eq!(with.coin_balances.as_ref().map(Vec::len), Some(6));
    }

    #[test]
    fn test_fetched_empty_balances_are_reported() {
        let now = Utc::now();
        let records = records(&["coin::transfer"], now);
        let assembler = ProfileAssembler::default();

        let none_held: Vec<CoinBalance> = Vec::new();
        let fetched =
            serde_json::to_value(assembler.assemble("0xwallet", &records, Some(none_held.as_slice()), now)).unwrap();
        assert_eq!(fetched["coin_balances"], serde_json::json!([]));

        let skipped = serde_json::to_value(assembler.assemble("0xwallet", &records, None, now)).unwrap();
        assert!(skipped.get("coin_balances").is_none());
    }

    #[test]
    fn test_top_functions_many_distinct() {
        let now = Utc::now();
        let names: Vec<String> = (0..5_000).map(|i| format!("m{}::f", i % 1_000)).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let result = top_functions(&records(&names, now));

        assert_eq!(result.len(), 1_000);
        assert!(result.iter().all(|fc| fc.count == 5));
        assert_eq!(result[0].name, "m0::f");
        assert_eq!(result[999].name, "m999::f");
    }

    #[test]
    fn test_profile_json_shape() {
        let now = Utc::now();
        let records = records(&["coin::transfer", ""], now);
        let report = ProfileAssembler::default().assemble("0xwallet", &records, None, now);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["address"], "0xwallet");
        assert_eq!(json["persona"], "Unclassified");
        assert_eq!(json["tx_type_counts"], serde_json::json!({ "Transfer": 1, "Other": 1 }));
        assert_eq!(json["top_functions"][0]["name"], "coin::transfer");
        assert!(json.get("coin_balances").is_none());
        assert_eq!(json["transactions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let now = Utc::now();
        let records = records(&["a::nft_mint", "coin::transfer", "a::nft_mint"], now);
        let assembler = ProfileAssembler::default();

        let first = serde_json::to_value(assembler.assemble("0xwallet", &records, None, now)).unwrap();
        let second = serde_json::to_value(assembler.assemble("0xwallet", &records, None, now)).unwrap();
        assert_eq!(first, second);
    }
}
