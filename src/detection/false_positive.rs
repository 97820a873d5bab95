use crate::core::account::AccountId;
use crate::core::stats::{mean, shannon_entropy, std_dev};
use crate::graph::transaction_graph::{AccountNode, TransactionGraph};
use log::debug;
use std::collections::BTreeSet;

/// Identify accounts whose activity matches a legitimate archetype.
///
/// Matching any one of the three heuristics — salary recipient,
/// merchant, payroll hub — excludes the account from the suspicious
/// set entirely. The result is a sorted set so downstream iteration is
/// deterministic.
pub fn legitimate_accounts(graph: &TransactionGraph) -> BTreeSet<AccountId> {
    let mut legitimate = BTreeSet::new();

    for idx in graph.node_indices() {
        let node = graph.node(idx);
        if is_salary_recipient(node) || is_merchant(node) || is_payroll_hub(node) {
            legitimate.insert(node.id.clone());
        }
    }

    debug!("false-positive filter excluded {} accounts", legitimate.len());
    legitimate
}

/// Fixed-amount, roughly monthly incoming transfers.
///
/// Requires at least three credits with a positive mean and a
/// coefficient of variation of at most 0.05, where 70% or more of the
/// whole-day gaps between consecutive credits land in [25, 35] days.
fn is_salary_recipient(node: &AccountNode) -> bool {
    let amounts = &node.received_amounts;
    if amounts.len() < 3 {
        return false;
    }
    let mean_amount = mean(amounts);
    if mean_amount <= 0.0 {
        return false;
    }
    if std_dev(amounts) / mean_amount > 0.05 {
        return false;
    }

    let mut timestamps = node.received_timestamps.clone();
    timestamps.sort_unstable();
    if timestamps.len() < 3 {
        return false;
    }
    let intervals: Vec<i64> = timestamps
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .collect();
    let monthly = intervals.iter().filter(|&&d| (25..=35).contains(&d)).count();
    monthly as f64 >= intervals.len() as f64 * 0.7
}

/// Many distinct payers at standardized prices: high in-degree with a
/// low-entropy amount distribution.
fn is_merchant(node: &AccountNode) -> bool {
    if node.in_degree < 50 {
        return false;
    }
    if node.received_amounts.is_empty() {
        return false;
    }
    shannon_entropy(&node.received_amounts) < 2.5
}

/// One account paying near-identical amounts to a wide set of
/// receivers.
fn is_payroll_hub(node: &AccountNode) -> bool {
    if node.out_degree < 20 {
        return false;
    }
    let amounts = &node.sent_amounts;
    if amounts.is_empty() {
        return false;
    }
    let mean_amount = mean(amounts);
    if mean_amount <= 0.0 {
        return false;
    }
    std_dev(amounts) / mean_amount < 0.15
}
