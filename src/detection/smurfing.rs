use crate::core::account::AccountId;
use crate::core::stats::{coefficient_of_variation, round_dp};
use crate::graph::transaction_graph::TransactionGraph;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::HashSet;

/// Width of the structuring window.
pub const WINDOW_HOURS: i64 = 72;

/// Distinct counterparties required inside one window.
pub const MIN_COUNTERPARTIES: usize = 10;

/// An account that concentrated many distinct senders in one window.
#[derive(Debug, Clone, Serialize)]
pub struct FanInHit {
    pub account_id: AccountId,
    pub pattern: String,
    pub max_unique_senders: usize,
    pub amount_similarity: f64,
}

/// An account that sprayed funds to many distinct receivers in one window.
#[derive(Debug, Clone, Serialize)]
pub struct FanOutHit {
    pub account_id: AccountId,
    pub pattern: String,
    pub max_unique_receivers: usize,
    pub amount_similarity: f64,
}

/// Flagged accounts, partitioned by direction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SmurfingReport {
    pub fan_in: Vec<FanInHit>,
    pub fan_out: Vec<FanOutHit>,
}

impl SmurfingReport {
    pub fn fan_in_for(&self, account: &AccountId) -> Option<&FanInHit> {
        self.fan_in.iter().find(|h| &h.account_id == account)
    }

    pub fn fan_out_for(&self, account: &AccountId) -> Option<&FanOutHit> {
        self.fan_out.iter().find(|h| &h.account_id == account)
    }
}

/// One transfer tagged with the counterparty on the far side.
struct TaggedTransfer {
    counterparty: NodeIndex,
    amount: f64,
    timestamp: DateTime<Utc>,
}

/// The best window found for one node and direction.
struct WindowBest {
    max_unique: usize,
    amount_similarity: f64,
}

/// Detect fan-in / fan-out structuring.
///
/// For every node, each direction is examined independently: all
/// transfers on that side are gathered (tagged with their
/// counterparty), time-sorted, and swept with a monotone two-pointer
/// window of [`WINDOW_HOURS`]. A node is flagged when some window holds
/// at least [`MIN_COUNTERPARTIES`] distinct counterparties; the
/// recorded hit is the window maximizing that count, with an amount
/// similarity derived from the coefficient of variation.
pub fn detect_smurfing(graph: &TransactionGraph) -> SmurfingReport {
    let mut report = SmurfingReport::default();

    for node in graph.node_indices() {
        let incoming = collect_incoming(graph, node);
        if incoming.len() >= MIN_COUNTERPARTIES {
            if let Some(best) = best_window(incoming) {
                report.fan_in.push(FanInHit {
                    account_id: graph.account_id(node).clone(),
                    pattern: "fan_in".to_string(),
                    max_unique_senders: best.max_unique,
                    amount_similarity: best.amount_similarity,
                });
            }
        }

        let outgoing = collect_outgoing(graph, node);
        if outgoing.len() >= MIN_COUNTERPARTIES {
            if let Some(best) = best_window(outgoing) {
                report.fan_out.push(FanOutHit {
                    account_id: graph.account_id(node).clone(),
                    pattern: "fan_out".to_string(),
                    max_unique_receivers: best.max_unique,
                    amount_similarity: best.amount_similarity,
                });
            }
        }
    }

    debug!(
        "smurfing detection flagged {} fan-in, {} fan-out accounts",
        report.fan_in.len(),
        report.fan_out.len()
    );
    report
}

fn collect_incoming(graph: &TransactionGraph, node: NodeIndex) -> Vec<TaggedTransfer> {
    let mut transfers = Vec::new();
    for pred in graph.predecessors(node) {
        if let Some(edge) = graph.edge_between(pred, node) {
            for (amount, timestamp) in edge.amounts.iter().zip(edge.timestamps.iter()) {
                transfers.push(TaggedTransfer {
                    counterparty: pred,
                    amount: *amount,
                    timestamp: *timestamp,
                });
            }
        }
    }
    transfers
}

fn collect_outgoing(graph: &TransactionGraph, node: NodeIndex) -> Vec<TaggedTransfer> {
    let mut transfers = Vec::new();
    for succ in graph.successors(node) {
        if let Some(edge) = graph.edge_between(node, succ) {
            for (amount, timestamp) in edge.amounts.iter().zip(edge.timestamps.iter()) {
                transfers.push(TaggedTransfer {
                    counterparty: succ,
                    amount: *amount,
                    timestamp: *timestamp,
                });
            }
        }
    }
    transfers
}

/// Two-pointer sliding window over time-sorted transfers.
///
/// `right` never moves backwards across iterations of `left`, so the
/// sweep is amortized linear in the number of transfers (set rebuilds
/// aside).
fn best_window(mut transfers: Vec<TaggedTransfer>) -> Option<WindowBest> {
    if transfers.is_empty() {
        return None;
    }
    transfers.sort_by_key(|t| t.timestamp);

    let window = Duration::hours(WINDOW_HOURS);
    let n = transfers.len();
    let mut best: Option<WindowBest> = None;
    let mut best_unique = 0usize;
    let mut right = 0usize;

    for left in 0..n {
        while right < n && transfers[right].timestamp - transfers[left].timestamp <= window {
            right += 1;
        }

        let slice = &transfers[left..right];
        let unique: HashSet<NodeIndex> = slice.iter().map(|t| t.counterparty).collect();

        if unique.len() >= MIN_COUNTERPARTIES && unique.len() > best_unique {
            let amounts: Vec<f64> = slice.iter().map(|t| t.amount).collect();
            let cv = coefficient_of_variation(&amounts);
            best_unique = unique.len();
            best = Some(WindowBest {
                max_unique: unique.len(),
                amount_similarity: round_dp((1.0 - cv).max(0.0), 2),
            });
        }
    }

    best
}
