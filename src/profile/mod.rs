//! Wallet behavior profiling
//!
//! Pure, synchronous pipeline over an already-fetched transaction history:
//! - Normalization of raw ledger payloads into typed records
//! - Category distribution and persona classification
//! - Function-call transition graph
//! - Per-function timeline
//!
//! Normalization must finish before anything else runs; the remaining
//! stages only read the normalized records and are independent of each other.

pub mod assembler;
pub mod category;
pub mod graph;
pub mod persona;
pub mod record;
pub mod sanitize;
pub mod timeline;

pub use assembler::{FunctionCount, ProfileAssembler, ProfileConfig, ProfileReport, WalletProfile};
pub use category::{classify, Category, CategoryCounts};
pub use graph::{TransitionEdge, TransitionGraph};
pub use persona::{classify_persona, Persona, PersonaStats};
pub use record::{normalize, normalize_batch, TransactionRecord};
pub use sanitize::{sanitize, sanitize_arguments};
pub use timeline::{FunctionSeries, TimelineSeries};
