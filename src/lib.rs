//! # forensics-engine
//!
//! Money-mule network detection engine.
//!
//! Given a batch of directed, timestamped transactions between account
//! identifiers, the engine flags accounts with composite suspicion
//! scores, surfaces cyclic fraud rings, and summarizes the batch.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: accounts, transactions, numeric helpers
//! - **graph** — Transaction graph, cycle detection, shell-chain detection
//! - **detection** — Smurfing detection and false-positive filtering
//! - **scoring** — Weighted per-account suspicion aggregation
//! - **simulation** — Synthetic scenario generation for testing
//!
//! The pipeline ([`engine::ForensicsEngine`]) builds the graph once per
//! batch, runs the four detector passes over it read-only, and hands
//! everything to the scorer. There is no state between batches.

pub mod core;
pub mod detection;
pub mod engine;
pub mod graph;
pub mod ingest;
pub mod scoring;
pub mod simulation;
pub mod viz;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::account::AccountId;
    pub use crate::core::transaction::{Transaction, TransactionBatch};
    pub use crate::engine::{AnalysisReport, ForensicsEngine};
    pub use crate::graph::cycle_detection::{CycleConfig, FraudRing};
    pub use crate::graph::shell_chain::ShellChain;
    pub use crate::graph::transaction_graph::TransactionGraph;
    pub use crate::scoring::suspicion::SuspiciousAccount;
}
