use crate::core::account::AccountId;
use crate::core::transaction::{Transaction, TransactionBatch};
use chrono::{DateTime, Utc};
use log::debug;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Per-account aggregates accumulated during graph construction.
///
/// All sequences are in ascending timestamp order (construction
/// processes the batch in a stable time sort), and the degree fields
/// count distinct neighbors, frozen once the build completes.
#[derive(Debug, Clone)]
pub struct AccountNode {
    /// The account this node aggregates.
    pub id: AccountId,
    pub total_sent: f64,
    pub total_received: f64,
    /// Incremented on both the sending and the receiving endpoint, so
    /// one transfer bumps this counter on each of its two nodes.
    pub transaction_count: usize,
    pub sent_amounts: Vec<f64>,
    pub received_amounts: Vec<f64>,
    pub sent_timestamps: Vec<DateTime<Utc>>,
    pub received_timestamps: Vec<DateTime<Utc>>,
    /// Union (with duplicates) of sent and received timestamps.
    pub timestamps: Vec<DateTime<Utc>>,
    pub counterparties_sent: HashSet<AccountId>,
    pub counterparties_received: HashSet<AccountId>,
    /// Distinct predecessor count.
    pub in_degree: usize,
    /// Distinct successor count.
    pub out_degree: usize,
}

impl AccountNode {
    fn new(id: AccountId) -> Self {
        Self {
            id,
            total_sent: 0.0,
            total_received: 0.0,
            transaction_count: 0,
            sent_amounts: Vec::new(),
            received_amounts: Vec::new(),
            sent_timestamps: Vec::new(),
            received_timestamps: Vec::new(),
            timestamps: Vec::new(),
            counterparties_sent: HashSet::new(),
            counterparties_received: HashSet::new(),
            in_degree: 0,
            out_degree: 0,
        }
    }

    /// Total undirected degree (distinct predecessors + successors).
    pub fn degree(&self) -> usize {
        self.in_degree + self.out_degree
    }
}

/// The aggregated flow along one directed account pair.
///
/// There is at most one edge per ordered `(sender, receiver)` pair;
/// the individual transfers are kept as parallel amount/timestamp
/// vectors because the detectors always read the two fields together.
#[derive(Debug, Clone, Default)]
pub struct EdgeFlows {
    pub amounts: Vec<f64>,
    pub timestamps: Vec<DateTime<Utc>>,
    pub total_amount: f64,
}

impl EdgeFlows {
    /// Number of individual transfers on this edge.
    pub fn count(&self) -> usize {
        self.amounts.len()
    }
}

/// Build-time summary, reported alongside the analysis.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GraphMetadata {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub total_transactions: usize,
}

/// The labeled directed multigraph (reduced to one edge per ordered
/// pair) that every detection pass reads.
///
/// Account ids are interned into `petgraph` node indices at build
/// time; indices are assigned in ascending id order, so iterating
/// `node_indices()` visits accounts alphabetically and every detector
/// inherits a deterministic enumeration order.
///
/// The graph is immutable once built: detectors share it read-only and
/// it is discarded when the batch's report has been emitted.
///
/// # Examples
///
/// ```
/// use forensics_engine::core::account::AccountId;
/// use forensics_engine::core::transaction::{Transaction, TransactionBatch};
/// use forensics_engine::graph::transaction_graph::TransactionGraph;
/// use chrono::{TimeZone, Utc};
///
/// let mut batch = TransactionBatch::new();
/// let ts = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
/// batch.add(Transaction::new(
///     "TXN_000001",
///     AccountId::new("ACC_A"),
///     AccountId::new("ACC_B"),
///     250.0,
///     ts,
/// ));
///
/// let graph = TransactionGraph::build(&batch);
/// assert_eq!(graph.metadata().total_nodes, 2);
/// assert_eq!(graph.metadata().total_edges, 1);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionGraph {
    graph: DiGraph<AccountNode, EdgeFlows>,
    indices: HashMap<AccountId, NodeIndex>,
    metadata: GraphMetadata,
}

impl TransactionGraph {
    /// Construct the graph from a batch.
    ///
    /// Records are processed in ascending timestamp order with ties
    /// broken by input order, so every per-node and per-edge sequence
    /// comes out time-sorted.
    pub fn build(batch: &TransactionBatch) -> Self {
        let mut ordered: Vec<&Transaction> = batch.transactions().iter().collect();
        ordered.sort_by_key(|t| t.timestamp());

        let mut graph: DiGraph<AccountNode, EdgeFlows> = DiGraph::new();
        let mut indices: HashMap<AccountId, NodeIndex> = HashMap::new();

        // One node per account, created in ascending id order so that
        // node-index order equals id order.
        for id in batch.accounts() {
            let idx = graph.add_node(AccountNode::new(id.clone()));
            indices.insert(id, idx);
        }

        for txn in ordered {
            let sender_idx = indices[txn.sender()];
            let receiver_idx = indices[txn.receiver()];
            let amount = txn.amount();
            let ts = txn.timestamp();

            {
                let sender = &mut graph[sender_idx];
                sender.total_sent += amount;
                sender.transaction_count += 1;
                sender.sent_amounts.push(amount);
                sender.sent_timestamps.push(ts);
                sender.timestamps.push(ts);
                sender.counterparties_sent.insert(txn.receiver().clone());
            }
            {
                let receiver = &mut graph[receiver_idx];
                receiver.total_received += amount;
                receiver.transaction_count += 1;
                receiver.received_amounts.push(amount);
                receiver.received_timestamps.push(ts);
                receiver.timestamps.push(ts);
                receiver.counterparties_received.insert(txn.sender().clone());
            }

            let edge_idx: EdgeIndex = match graph.find_edge(sender_idx, receiver_idx) {
                Some(e) => e,
                None => graph.add_edge(sender_idx, receiver_idx, EdgeFlows::default()),
            };
            let edge = &mut graph[edge_idx];
            edge.amounts.push(amount);
            edge.timestamps.push(ts);
            edge.total_amount += amount;
        }

        // Freeze distinct-neighbor degrees.
        for idx in graph.node_indices().collect::<Vec<_>>() {
            let node = &mut graph[idx];
            node.in_degree = node.counterparties_received.len();
            node.out_degree = node.counterparties_sent.len();
        }

        let metadata = GraphMetadata {
            total_nodes: graph.node_count(),
            total_edges: graph.edge_count(),
            total_transactions: batch.len(),
        };
        debug!(
            "built transaction graph: {} nodes, {} edges, {} transactions",
            metadata.total_nodes, metadata.total_edges, metadata.total_transactions
        );

        Self {
            graph,
            indices,
            metadata,
        }
    }

    pub fn metadata(&self) -> GraphMetadata {
        self.metadata
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Interned index for an account id.
    pub fn index_of(&self, id: &AccountId) -> Option<NodeIndex> {
        self.indices.get(id).copied()
    }

    /// Node aggregates at `idx`. Panics on a foreign index.
    pub fn node(&self, idx: NodeIndex) -> &AccountNode {
        &self.graph[idx]
    }

    /// The account id interned at `idx`.
    pub fn account_id(&self, idx: NodeIndex) -> &AccountId {
        &self.graph[idx].id
    }

    /// All node indices in ascending account-id order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// The flows on the directed edge `from -> to`, if any.
    pub fn edge_between(&self, from: NodeIndex, to: NodeIndex) -> Option<&EdgeFlows> {
        self.graph
            .find_edge(from, to)
            .map(|e| &self.graph[e])
    }

    /// Successor indices of `idx` in ascending account-id order.
    pub fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        out.sort_unstable();
        out
    }

    /// Predecessor indices of `idx` in ascending account-id order.
    pub fn predecessors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .collect();
        out.sort_unstable();
        out
    }

    /// All edges as `(source, target, flows)`, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &EdgeFlows)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight()))
    }
}
