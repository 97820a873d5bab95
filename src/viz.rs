//! Graph visualization payload.
//!
//! Shapes the analyzed graph into the element lists a Cytoscape-style
//! frontend consumes. This is an adapter over the core results: it
//! reads the graph and the flagged accounts, never the other way
//! around.

use crate::core::account::AccountId;
use crate::core::stats::round_dp;
use crate::graph::transaction_graph::TransactionGraph;
use crate::scoring::suspicion::SuspiciousAccount;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct NodeData {
    pub id: AccountId,
    pub total_sent: f64,
    pub total_received: f64,
    pub suspicion_score: f64,
    pub is_suspicious: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeElement {
    pub data: NodeData,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeData {
    pub source: AccountId,
    pub target: AccountId,
    pub amount: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeElement {
    pub data: EdgeData,
}

/// Node and edge elements for the frontend renderer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphData {
    pub nodes: Vec<NodeElement>,
    pub edges: Vec<EdgeElement>,
}

/// Project the graph and flagged accounts into render elements.
///
/// Nodes come out in ascending account-id order and edges in
/// (source, target) order, so the payload is byte-stable across runs.
pub fn graph_data(graph: &TransactionGraph, suspicious: &[SuspiciousAccount]) -> GraphData {
    let scores: HashMap<&AccountId, f64> = suspicious
        .iter()
        .map(|a| (&a.account_id, a.suspicion_score))
        .collect();

    let nodes: Vec<NodeElement> = graph
        .node_indices()
        .map(|idx| {
            let node = graph.node(idx);
            NodeElement {
                data: NodeData {
                    id: node.id.clone(),
                    total_sent: round_dp(node.total_sent, 1),
                    total_received: round_dp(node.total_received, 1),
                    suspicion_score: scores.get(&node.id).copied().unwrap_or(0.0),
                    is_suspicious: scores.contains_key(&node.id),
                },
            }
        })
        .collect();

    let mut edges: Vec<EdgeElement> = graph
        .edges()
        .map(|(source, target, flows)| EdgeElement {
            data: EdgeData {
                source: graph.account_id(source).clone(),
                target: graph.account_id(target).clone(),
                amount: round_dp(flows.total_amount, 1),
                count: flows.count(),
            },
        })
        .collect();
    edges.sort_by(|a, b| {
        (&a.data.source, &a.data.target).cmp(&(&b.data.source, &b.data.target))
    });

    GraphData { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::{Transaction, TransactionBatch};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_payload_shape_and_order() {
        let mut batch = TransactionBatch::new();
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        batch.add(Transaction::new(
            "T1",
            AccountId::new("B"),
            AccountId::new("A"),
            100.05,
            ts,
        ));
        batch.add(Transaction::new(
            "T2",
            AccountId::new("A"),
            AccountId::new("B"),
            40.0,
            ts,
        ));

        let graph = TransactionGraph::build(&batch);
        let flagged = vec![SuspiciousAccount {
            account_id: AccountId::new("A"),
            suspicion_score: 42.5,
            detected_patterns: vec!["high_velocity".to_string()],
            ring_id: None,
        }];

        let data = graph_data(&graph, &flagged);
        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.nodes[0].data.id.as_str(), "A");
        assert!(data.nodes[0].data.is_suspicious);
        assert_eq!(data.nodes[0].data.suspicion_score, 42.5);
        assert!(!data.nodes[1].data.is_suspicious);
        assert_eq!(data.nodes[1].data.total_received, 100.1);

        assert_eq!(data.edges.len(), 2);
        assert_eq!(data.edges[0].data.source.as_str(), "A");
        assert_eq!(data.edges[1].data.source.as_str(), "B");
        assert_eq!(data.edges[1].data.count, 1);
    }

    #[test]
    fn test_empty_graph_empty_payload() {
        let graph = TransactionGraph::build(&TransactionBatch::new());
        let data = graph_data(&graph, &[]);
        assert!(data.nodes.is_empty());
        assert!(data.edges.is_empty());
    }
}
