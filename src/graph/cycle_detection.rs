use crate::core::account::AccountId;
use crate::core::stats::round_dp;
use crate::graph::transaction_graph::TransactionGraph;
use chrono::{DateTime, Utc};
use log::debug;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Rings kept per batch; a safety valve on dense graphs.
pub const MAX_RINGS: usize = 100;

/// Cycles scoring below this are incidental circulation, not rings.
pub const RISK_FLOOR: f64 = 25.0;

/// Length bounds for ring enumeration.
#[derive(Debug, Clone, Copy)]
pub struct CycleConfig {
    /// Minimum member count (inclusive).
    pub min_length: usize,
    /// Maximum member count (inclusive); also bounds the search depth.
    pub max_length: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            min_length: 3,
            max_length: 5,
        }
    }
}

/// A cyclic money-circulation structure — a candidate fraud ring.
///
/// `members` lists the accounts in traversal order; the closing edge
/// from the last member back to the first is implicit.
#[derive(Debug, Clone, Serialize)]
pub struct FraudRing {
    pub ring_id: String,
    pub members: Vec<AccountId>,
    pub cycle_length: usize,
    pub total_amount: f64,
    pub time_compactness: f64,
    pub risk_score: f64,
    pub pattern_type: String,
}

impl FraudRing {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, account: &AccountId) -> bool {
        self.members.iter().any(|m| m == account)
    }
}

/// Enumerate directed simple cycles of bounded length and score them
/// into ranked fraud rings.
///
/// Johnson-style enumeration: a DFS is rooted at every node in index
/// order and only explores higher-indexed successors, so each cycle
/// surfaces exactly once, anchored at its minimal member. The search
/// depth is capped by `max_length`, which also bounds the recursion.
///
/// Two cycles over the same unordered member set count as one ring;
/// the first discovered wins. Emission order is deterministic because
/// node-index order is account-id order.
pub fn detect_cycles(graph: &TransactionGraph, config: &CycleConfig) -> Vec<FraudRing> {
    let mut rings: Vec<FraudRing> = Vec::new();
    let mut seen_sets: HashSet<BTreeSet<NodeIndex>> = HashSet::new();

    for start in graph.node_indices() {
        if rings.len() >= MAX_RINGS {
            break;
        }
        let mut path: Vec<NodeIndex> = Vec::new();
        let mut on_path: HashSet<NodeIndex> = HashSet::new();
        dfs_collect_rings(
            graph,
            config,
            start,
            start,
            &mut path,
            &mut on_path,
            &mut seen_sets,
            &mut rings,
        );
    }

    debug!("cycle detection emitted {} rings", rings.len());
    rings
}

#[allow(clippy::too_many_arguments)]
fn dfs_collect_rings(
    graph: &TransactionGraph,
    config: &CycleConfig,
    current: NodeIndex,
    start: NodeIndex,
    path: &mut Vec<NodeIndex>,
    on_path: &mut HashSet<NodeIndex>,
    seen_sets: &mut HashSet<BTreeSet<NodeIndex>>,
    rings: &mut Vec<FraudRing>,
) {
    if rings.len() >= MAX_RINGS {
        return;
    }
    path.push(current);
    on_path.insert(current);

    for next in graph.successors(current) {
        if next == start && path.len() >= config.min_length {
            // Closed a cycle back to the anchor.
            if path.len() <= config.max_length {
                let member_set: BTreeSet<NodeIndex> = path.iter().copied().collect();
                if seen_sets.insert(member_set) {
                    if let Some(ring) = score_cycle(graph, config, path, rings.len() + 1) {
                        rings.push(ring);
                        if rings.len() >= MAX_RINGS {
                            break;
                        }
                    }
                }
            }
        } else if next > start && !on_path.contains(&next) && path.len() < config.max_length {
            // Only descend into higher-indexed nodes: lower ones anchor
            // their own cycles.
            dfs_collect_rings(graph, config, next, start, path, on_path, seen_sets, rings);
        }
    }

    path.pop();
    on_path.remove(&current);
}

/// Aggregate the edges of a closed cycle and score it. Returns `None`
/// when the risk score falls below [`RISK_FLOOR`].
fn score_cycle(
    graph: &TransactionGraph,
    config: &CycleConfig,
    cycle: &[NodeIndex],
    ring_number: usize,
) -> Option<FraudRing> {
    let len = cycle.len();
    let mut total_amount = 0.0;
    let mut timestamps: Vec<DateTime<Utc>> = Vec::new();

    for i in 0..len {
        let u = cycle[i];
        let v = cycle[(i + 1) % len];
        if let Some(edge) = graph.edge_between(u, v) {
            total_amount += edge.total_amount;
            timestamps.extend_from_slice(&edge.timestamps);
        }
    }

    let compactness = time_compactness(&timestamps);
    let length_factor = len as f64 / config.max_length as f64;
    let amount_factor = (total_amount / 100_000.0).min(1.0);
    let risk_score = (0.3 * length_factor + 0.4 * amount_factor + 0.3 * compactness) * 100.0;

    if risk_score < RISK_FLOOR {
        return None;
    }

    Some(FraudRing {
        ring_id: format!("RING_{:03}", ring_number),
        members: cycle.iter().map(|&n| graph.account_id(n).clone()).collect(),
        cycle_length: len,
        total_amount: round_dp(total_amount, 1),
        time_compactness: round_dp(compactness, 2),
        risk_score: round_dp(risk_score.min(100.0), 1),
        pattern_type: "cycle".to_string(),
    })
}

/// Tighter circulation windows score higher: 1.0 within an hour,
/// linearly down to 0.0 at thirty days.
fn time_compactness(timestamps: &[DateTime<Utc>]) -> f64 {
    if timestamps.len() < 2 {
        return 0.0;
    }
    let (Some(first), Some(last)) = (timestamps.iter().min(), timestamps.iter().max()) else {
        return 0.0;
    };
    let span = (*last - *first).num_seconds() as f64;
    const THIRTY_DAYS: f64 = 30.0 * 86_400.0;
    if span <= 3_600.0 {
        1.0
    } else if span >= THIRTY_DAYS {
        0.0
    } else {
        1.0 - span / THIRTY_DAYS
    }
}
