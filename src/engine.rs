//! Batch analysis pipeline.
//!
//! Runs the full detection sequence over one transaction batch:
//! graph build, then the four read-only detector passes, then the
//! scorer. The engine keeps no state between batches.

use crate::core::transaction::TransactionBatch;
use crate::core::stats::round_dp;
use crate::detection::false_positive::legitimate_accounts;
use crate::detection::smurfing::detect_smurfing;
use crate::graph::cycle_detection::{detect_cycles, CycleConfig};
use crate::graph::shell_chain::detect_shell_chains;
use crate::graph::transaction_graph::{GraphMetadata, TransactionGraph};
use crate::scoring::suspicion::{
    score_accounts, AnalysisSummary, RingSummary, SuspiciousAccount,
};
use crate::viz::{self, GraphData};
use log::info;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// The complete result of analyzing one batch.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    pub fraud_rings: Vec<RingSummary>,
    pub summary: AnalysisSummary,
    pub graph_data: GraphData,
    #[serde(skip)]
    pub metadata: GraphMetadata,
}

/// Stateless detection engine.
///
/// # Examples
///
/// ```
/// use forensics_engine::core::transaction::TransactionBatch;
/// use forensics_engine::engine::ForensicsEngine;
///
/// let report = ForensicsEngine::new().analyze(&TransactionBatch::new());
/// assert_eq!(report.summary.total_accounts_analyzed, 0);
/// assert_eq!(report.summary.fraud_rings_detected, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ForensicsEngine {
    cycle_config: CycleConfig,
}

impl ForensicsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the ring length bounds.
    pub fn with_cycle_config(cycle_config: CycleConfig) -> Self {
        Self { cycle_config }
    }

    /// Run the full pipeline over a batch.
    ///
    /// The graph is built once, published read-only to the detectors,
    /// and discarded along with their outputs when the report has been
    /// assembled. An empty batch yields an empty report with an
    /// all-zero summary.
    pub fn analyze(&self, batch: &TransactionBatch) -> AnalysisReport {
        let started = Instant::now();

        let graph = TransactionGraph::build(batch);
        let rings = detect_cycles(&graph, &self.cycle_config);
        let smurfing = detect_smurfing(&graph);
        let shell_chains = detect_shell_chains(&graph);
        let legitimate = legitimate_accounts(&graph);

        let mut outcome = score_accounts(&graph, &rings, &smurfing, &shell_chains, &legitimate);
        outcome.summary.processing_time_seconds =
            round_dp(started.elapsed().as_secs_f64(), 1);

        let graph_data = viz::graph_data(&graph, &outcome.suspicious_accounts);

        info!(
            "analyzed {} transactions: {} suspicious accounts, {} rings, {} chains",
            batch.len(),
            outcome.summary.suspicious_accounts_flagged,
            outcome.summary.fraud_rings_detected,
            shell_chains.len()
        );

        AnalysisReport {
            suspicious_accounts: outcome.suspicious_accounts,
            fraud_rings: outcome.fraud_rings,
            summary: outcome.summary,
            graph_data,
            metadata: graph.metadata(),
        }
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Analysis Report ===")?;
        writeln!(
            f,
            "Accounts analyzed:   {}",
            self.summary.total_accounts_analyzed
        )?;
        writeln!(
            f,
            "Suspicious accounts: {}",
            self.summary.suspicious_accounts_flagged
        )?;
        writeln!(
            f,
            "Fraud rings:         {}",
            self.summary.fraud_rings_detected
        )?;
        writeln!(
            f,
            "Processing time:     {:.1}s",
            self.summary.processing_time_seconds
        )?;

        if !self.suspicious_accounts.is_empty() {
            writeln!(f, "\n--- Suspicious Accounts ---")?;
            for account in &self.suspicious_accounts {
                writeln!(
                    f,
                    "  {:<20} score {:>5.1}  [{}]{}",
                    account.account_id,
                    account.suspicion_score,
                    account.detected_patterns.join(", "),
                    account
                        .ring_id
                        .as_deref()
                        .map(|r| format!("  ring {}", r))
                        .unwrap_or_default()
                )?;
            }
        }

        if !self.fraud_rings.is_empty() {
            writeln!(f, "\n--- Fraud Rings ---")?;
            for ring in &self.fraud_rings {
                let members: Vec<String> = ring
                    .member_accounts
                    .iter()
                    .map(|m| m.to_string())
                    .collect();
                writeln!(
                    f,
                    "  {}  risk {:>5.1}  {}",
                    ring.ring_id,
                    ring.risk_score,
                    members.join(" → ")
                )?;
            }
        }
        Ok(())
    }
}
