//! CLI command implementations

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Error;
use crate::insights::{InsightsGenerator, LlmClient};
use crate::ledger::{AptosClient, CoinBalance};
use crate::profile::{
    normalize_batch, ProfileAssembler, ProfileReport, TimelineSeries, TransactionRecord, TransitionGraph,
};

/// Maximum hex digits in an account address
const MAX_ADDRESS_HEX_DIGITS: usize = 64;

/// Build and print the wallet profile, optionally with insights attached
pub async fn profile(
    config: &Config,
    address: &str,
    with_balances: bool,
    with_insights: bool,
    output: Option<&Path>,
) -> Result<()> {
    validate_address(address)?;
    if with_insights {
        ensure_insights_enabled(config)?;
    }

    let client = AptosClient::new(&config.ledger)?;
    let (records, balances) = fetch_inputs(&client, config, address, with_balances).await?;

    let profile = match assemble(config, address, &records, balances.as_deref()) {
        ProfileReport::Ready(profile) => profile,
        no_data => return emit(&no_data, output),
    };
    info!(
        address = %address,
        persona = %profile.persona,
        total_transactions = profile.total_transactions,
        "Profile ready"
    );

    if !with_insights {
        return emit(&profile, output);
    }

    info!(address = %address, "Requesting insights");
    let enhanced = insights_generator(config)?.enhance(profile, &records).await?;
    emit(&enhanced, output)
}

/// Print the function transition graph
pub async fn graph(config: &Config, address: &str, output: Option<&Path>) -> Result<()> {
    validate_address(address)?;
    let client = AptosClient::new(&config.ledger)?;
    let records = fetch_records(&client, config, address).await?;

    let graph = TransitionGraph::from_records(&records);
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Built transition graph"
    );

    emit(&graph, output)
}

/// Print the per-function timeline
pub async fn timeline(config: &Config, address: &str, output: Option<&Path>) -> Result<()> {
    validate_address(address)?;
    let client = AptosClient::new(&config.ledger)?;
    let records = fetch_records(&client, config, address).await?;

    let timeline = TimelineSeries::from_records(&records);
    info!(functions = timeline.len(), "Built timeline");

    emit(&timeline, output)
}

/// Print language-model insights for the wallet
pub async fn insights(config: &Config, address: &str, output: Option<&Path>) -> Result<()> {
    validate_address(address)?;
    ensure_insights_enabled(config)?;

    let client = AptosClient::new(&config.ledger)?;
    let (records, balances) = fetch_inputs(&client, config, address, true).await?;

    let report = assemble(config, address, &records, balances.as_deref());
    let profile = match report.profile() {
        Some(profile) => profile,
        None => return emit(&report, output),
    };

    info!(address = %address, "Requesting insights");
    let insights = insights_generator(config)?.generate(profile, &records).await?;

    emit(&insights, output)
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

/// Fetch and normalize a wallet's transactions
async fn fetch_records(
    client: &AptosClient,
    config: &Config,
    address: &str,
) -> crate::error::Result<Vec<TransactionRecord>> {
    let raw = client.get_transactions(address, config.ledger.tx_limit).await?;
    let records = normalize_batch(&raw);

    if records.len() < raw.len() {
        warn!(
            dropped = raw.len() - records.len(),
            "Some transactions could not be normalized"
        );
    }

    Ok(records)
}

/// Fetch records and, when requested, coin balances concurrently
async fn fetch_inputs(
    client: &AptosClient,
    config: &Config,
    address: &str,
    with_balances: bool,
) -> crate::error::Result<(Vec<TransactionRecord>, Option<Vec<CoinBalance>>)> {
    if !with_balances {
        return Ok((fetch_records(client, config, address).await?, None));
    }

    let (records, balances) = tokio::try_join!(
        fetch_records(client, config, address),
        client.get_coin_balances(address),
    )?;
    Ok((records, Some(balances)))
}

fn ensure_insights_enabled(config: &Config) -> Result<()> {
    if !config.insights.enabled {
        anyhow::bail!("Insights are disabled (insights.enabled = false)");
    }
    Ok(())
}

fn insights_generator(config: &Config) -> crate::error::Result<InsightsGenerator> {
    let llm = Arc::new(LlmClient::new(&config.insights)?);
    Ok(InsightsGenerator::new(llm, config.insights.clone()))
}

fn assemble(
    config: &Config,
    address: &str,
    records: &[TransactionRecord],
    balances: Option<&[CoinBalance]>,
) -> ProfileReport {
    ProfileAssembler::new(config.profile.clone()).assemble(address, records, balances, Utc::now())
}

/// Reject empty or non-hex account addresses before hitting the network
pub fn validate_address(address: &str) -> crate::error::Result<()> {
    let hex = address.strip_prefix("0x").unwrap_or(address);

    if hex.is_empty() {
        return Err(Error::InvalidAddress("no wallet address provided".to_string()));
    }

    if hex.len() > MAX_ADDRESS_HEX_DIGITS || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidAddress(address.to_string()));
    }

    Ok(())
}

/// Print pretty JSON to stdout, or write it to `output`
fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_validate_address() {
        assert!(validate_address("0xc6318f3c6f47d048ec9b1440025e16dbbe71d2713b11ccd7d22464368e5932f7").is_ok());
        assert!(validate_address("0x1").is_ok());
        assert!(validate_address("abc").is_ok());

        assert!(matches!(validate_address(""), Err(Error::InvalidAddress(_))));
        assert!(matches!(validate_address("0x"), Err(Error::InvalidAddress(_))));
        assert!(matches!(validate_address("0xnothex"), Err(Error::InvalidAddress(_))));
        assert!(validate_address(&format!("0x{}", "a".repeat(65))).is_err());
    }

    #[test]
    fn test_insights_gate() {
        let mut config = Config::default();
        assert!(ensure_insights_enabled(&config).is_ok());

        config.insights.enabled = false;
        assert!(ensure_insights_enabled(&config).is_err());
    }

    #[test]
    fn test_emit_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wallet_profile.json");

        emit(&ProfileReport::no_data(), Some(path.as_path())).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["error"], "No transactions found for this wallet address");
    }
}
