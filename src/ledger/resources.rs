//! Coin balances from account resources

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resource type prefix of a coin store
const COIN_STORE_PREFIX: &str = "0x1::coin::CoinStore<";

/// Raw on-chain balance of one coin type (no valuation)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinBalance {
    /// Last segment of the coin type, e.g. "AptosCoin"
    pub symbol: String,
    /// Integer amount in the coin's smallest unit, as reported
    pub balance: String,
}

/// Extract coin balances from an account's resource list.
///
/// Entries that are not coin stores are ignored; a coin store without a
/// readable value reports "0".
pub fn coin_balances(resources: &[Value]) -> Vec<CoinBalance> {
    resources.iter().filter_map(coin_balance).collect()
}

fn coin_balance(resource: &Value) -> Option<CoinBalance> {
    let resource_type = resource.get("type")?.as_str()?;
    let coin_type = resource_type.strip_prefix(COIN_STORE_PREFIX)?;
    let coin_type = coin_type.trim_end_matches('>');
    let symbol = coin_type.rsplit("::").next().unwrap_or(coin_type);

    let balance = resource
        .pointer("/data/coin/value")
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| "0".to_string());

    Some(CoinBalance {
        symbol: symbol.to_string(),
        balance,
    })
}

/// Number of distinct coin types held
pub fn distinct_asset_types(balances: &[CoinBalance]) -> usize {
    let mut symbols: Vec<&str> = balances.iter().map(|b| b.symbol.as_str()).collect();
    symbols.sort_unstable();
    symbols.dedup();
    symbols.len()
}
