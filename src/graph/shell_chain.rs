use crate::core::account::AccountId;
use crate::core::stats::round_dp;
use crate::graph::transaction_graph::TransactionGraph;
use chrono::{DateTime, Utc};
use log::debug;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// Maximum chain length in nodes (so at most five hops).
pub const MAX_PATH_LENGTH: usize = 6;

/// Chains emitted per batch; a safety valve on dense graphs.
pub const MAX_CHAINS: usize = 200;

/// A layered pass-through path: money hops through low-degree
/// intermediary accounts that exist only to obscure the trail.
#[derive(Debug, Clone, Serialize)]
pub struct ShellChain {
    pub chain_id: String,
    pub path: Vec<AccountId>,
    /// Number of hops (`path.len() - 1`).
    pub path_length: usize,
    pub total_amount: f64,
    pub risk_score: f64,
    pub time_score: f64,
}

impl ShellChain {
    pub fn contains(&self, account: &AccountId) -> bool {
        self.path.iter().any(|p| p == account)
    }
}

/// Detect layered shell chains via bounded BFS path exploration.
///
/// Sources are nodes that originate flow but receive little
/// (`out_degree >= 1`, `in_degree <= 2`). From each source an explicit
/// work queue expands simple paths outward; a path of four or more
/// nodes whose interior nodes all have total degree <= 3 is emitted as
/// a chain. Paths never revisit a node, and exploration stops at
/// [`MAX_PATH_LENGTH`] nodes.
pub fn detect_shell_chains(graph: &TransactionGraph) -> Vec<ShellChain> {
    let mut chains: Vec<ShellChain> = Vec::new();
    let mut emitted_paths: HashSet<Vec<NodeIndex>> = HashSet::new();

    let sources: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|&n| {
            let node = graph.node(n);
            node.out_degree >= 1 && node.in_degree <= 2
        })
        .collect();

    for source in sources {
        if chains.len() >= MAX_CHAINS {
            break;
        }

        let mut queue: VecDeque<(NodeIndex, Vec<NodeIndex>, Vec<DateTime<Utc>>)> = VecDeque::new();
        queue.push_back((source, vec![source], Vec::new()));

        while let Some((current, path, hop_timestamps)) = queue.pop_front() {
            if chains.len() >= MAX_CHAINS {
                break;
            }
            if path.len() > MAX_PATH_LENGTH {
                continue;
            }

            for successor in graph.successors(current) {
                if path.contains(&successor) {
                    continue;
                }
                let Some(edge) = graph.edge_between(current, successor) else {
                    continue;
                };

                let mut new_path = path.clone();
                new_path.push(successor);
                let mut new_timestamps = hop_timestamps.clone();
                new_timestamps.extend_from_slice(&edge.timestamps);

                if new_path.len() >= 4 && chains.len() < MAX_CHAINS {
                    let intermediates = &new_path[1..new_path.len() - 1];
                    let all_low_degree = intermediates
                        .iter()
                        .all(|&n| graph.node(n).degree() <= 3);

                    if all_low_degree && !emitted_paths.contains(&new_path) {
                        emitted_paths.insert(new_path.clone());
                        chains.push(score_chain(
                            graph,
                            &new_path,
                            &new_timestamps,
                            chains.len() + 1,
                        ));
                    }
                }

                if new_path.len() <= MAX_PATH_LENGTH {
                    queue.push_back((successor, new_path, new_timestamps));
                }
            }
        }
    }

    debug!("shell-chain detection emitted {} chains", chains.len());
    chains
}

fn score_chain(
    graph: &TransactionGraph,
    path: &[NodeIndex],
    timestamps: &[DateTime<Utc>],
    chain_number: usize,
) -> ShellChain {
    let hops = path.len() - 1;
    let mut total_amount = 0.0;
    for i in 0..hops {
        if let Some(edge) = graph.edge_between(path[i], path[i + 1]) {
            total_amount += edge.total_amount;
        }
    }

    let time_score = time_score(timestamps);
    let amount_score = (total_amount / 50_000.0).min(1.0);
    let length_score = ((path.len() as f64 - 3.0) / 3.0).min(1.0);
    let risk_score = (0.4 * time_score + 0.3 * amount_score + 0.3 * length_score) * 100.0;

    ShellChain {
        chain_id: format!("CHAIN_{:03}", chain_number),
        path: path.iter().map(|&n| graph.account_id(n).clone()).collect(),
        path_length: hops,
        total_amount: round_dp(total_amount, 1),
        risk_score: round_dp(risk_score.min(100.0), 1),
        time_score: round_dp(time_score, 2),
    }
}

/// Rapid succession along the chain scores higher: 1.0 inside an hour,
/// stepping down through a day and a week to 0.0.
fn time_score(timestamps: &[DateTime<Utc>]) -> f64 {
    if timestamps.len() < 2 {
        return 0.0;
    }
    let (Some(first), Some(last)) = (timestamps.iter().min(), timestamps.iter().max()) else {
        return 0.0;
    };
    let span = (*last - *first).num_seconds();
    if span < 3_600 {
        1.0
    } else if span < 86_400 {
        0.7
    } else if span < 7 * 86_400 {
        0.3
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::{Transaction, TransactionBatch};
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 26, 8, 0, 0).unwrap()
    }

    fn add(batch: &mut TransactionBatch, from: &str, to: &str, amount: f64, at: DateTime<Utc>) {
        let id = format!("T{}", batch.len() + 1);
        batch.add(Transaction::new(
            id,
            AccountId::new(from),
            AccountId::new(to),
            amount,
            at,
        ));
    }

    /// SRC -> SH1 -> SH2 -> SH3 -> SH4 -> DEST, one transfer per hop,
    /// two hours apart. The shells have no other edges.
    fn shell_batch() -> TransactionBatch {
        let mut batch = TransactionBatch::new();
        let path = ["SRC", "SH1", "SH2", "SH3", "SH4", "ZDEST"];
        for i in 0..path.len() - 1 {
            add(
                &mut batch,
                path[i],
                path[i + 1],
                25_000.0,
                base() + Duration::hours(i as i64 * 2),
            );
        }
        batch
    }

    #[test]
    fn test_full_shell_chain_detected() {
        let graph = TransactionGraph::build(&shell_batch());
        let chains = detect_shell_chains(&graph);
        assert!(!chains.is_empty());

        let full: Vec<&ShellChain> = chains.iter().filter(|c| c.path_length == 5).collect();
        assert_eq!(full.len(), 1);
        let chain = full[0];
        let path: Vec<&str> = chain.path.iter().map(|p| p.as_str()).collect();
        assert_eq!(path, vec!["SRC", "SH1", "SH2", "SH3", "SH4", "ZDEST"]);
        assert_eq!(chain.total_amount, 125_000.0);
        assert!(chain.risk_score >= 25.0);
        assert!(chain.risk_score <= 100.0);
        // Eight hours end to end
        assert_eq!(chain.time_score, 0.7);
    }

    #[test]
    fn test_chain_ids_assigned_in_emission_order() {
        let graph = TransactionGraph::build(&shell_batch());
        let chains = detect_shell_chains(&graph);
        for (i, chain) in chains.iter().enumerate() {
            assert_eq!(chain.chain_id, format!("CHAIN_{:03}", i + 1));
        }
    }

    #[test]
    fn test_short_path_not_a_chain() {
        // Two hops only: below the four-node floor.
        let mut batch = TransactionBatch::new();
        add(&mut batch, "A", "B", 30_000.0, base());
        add(&mut batch, "B", "C", 30_000.0, base() + Duration::hours(1));

        let graph = TransactionGraph::build(&batch);
        assert!(detect_shell_chains(&graph).is_empty());
    }

    #[test]
    fn test_busy_intermediate_breaks_chain() {
        let mut batch = TransactionBatch::new();
        let path = ["SRC", "HUB", "SH2", "SH3", "ZDEST"];
        for i in 0..path.len() - 1 {
            add(
                &mut batch,
                path[i],
                path[i + 1],
                25_000.0,
                base() + Duration::hours(i as i64),
            );
        }
        // HUB trades with four extra counterparties: degree > 3.
        for i in 0..4 {
            add(
                &mut batch,
                &format!("X{}", i),
                "HUB",
                100.0,
                base() + Duration::days(10),
            );
        }

        let graph = TransactionGraph::build(&batch);
        let chains = detect_shell_chains(&graph);
        assert!(
            chains.iter().all(|c| !c.contains(&AccountId::new("HUB"))
                || c.path.first() == Some(&AccountId::new("HUB"))
                || c.path.last() == Some(&AccountId::new("HUB"))),
            "HUB must never appear as an intermediate"
        );
        // The path through HUB is gone entirely: SH2/SH3 remain clean
        // but any 4-node window crossing HUB as interior is rejected.
        assert!(chains
            .iter()
            .all(|c| c.path.get(1) != Some(&AccountId::new("HUB"))));
    }

    #[test]
    fn test_high_in_degree_source_skipped() {
        // A node with three distinct feeders is not a chain source.
        let mut batch = TransactionBatch::new();
        for i in 0..3 {
            add(&mut batch, &format!("F{}", i), "S", 10_000.0, base());
        }
        let path = ["S", "M1", "M2", "M3", "ZEND"];
        for i in 0..path.len() - 1 {
            add(
                &mut batch,
                path[i],
                path[i + 1],
                10_000.0,
                base() + Duration::hours(i as i64),
            );
        }

        let graph = TransactionGraph::build(&batch);
        let chains = detect_shell_chains(&graph);
        // S itself cannot anchor a chain, but the feeders still can:
        // F* -> S -> M1 -> M2 ... passes through S as an intermediate
        // whose degree (3 feeders + 1 out = 4) breaks the criterion.
        assert!(chains
            .iter()
            .all(|c| c.path.first() != Some(&AccountId::new("S"))));
    }

    #[test]
    fn test_time_score_tiers() {
        let t0 = base();
        assert_eq!(time_score(&[t0]), 0.0);
        assert_eq!(time_score(&[t0, t0 + Duration::minutes(30)]), 1.0);
        assert_eq!(time_score(&[t0, t0 + Duration::hours(10)]), 0.7);
        assert_eq!(time_score(&[t0, t0 + Duration::days(3)]), 0.3);
        assert_eq!(time_score(&[t0, t0 + Duration::days(10)]), 0.0);
    }

    #[test]
    fn test_deterministic_output() {
        let graph = TransactionGraph::build(&shell_batch());
        let first = detect_shell_chains(&graph);
        let second = detect_shell_chains(&graph);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.chain_id, b.chain_id);
            assert_eq!(a.path, b.path);
        }
    }
}
