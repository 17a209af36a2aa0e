//! Ledger data retrieval
//!
//! Thin I/O layer in front of the profiling pipeline: fetches raw
//! transaction payloads and account resources from an Aptos fullnode.

pub mod client;
pub mod resources;

pub use client::AptosClient;
pub use resources::{coin_balances, distinct_asset_types, CoinBalance};
