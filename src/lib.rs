//! Wallet Profiler Library
//!
//! Behavioral profiling of Aptos wallets from their transaction history.

pub mod cli;
pub mod config;
pub mod error;
pub mod insights;
pub mod ledger;
pub mod profile;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use profile::{ProfileReport, TimelineSeries, TransactionRecord, TransitionGraph, WalletProfile};
