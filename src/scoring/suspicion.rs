use crate::core::account::AccountId;
use crate::core::stats::round_dp;
use crate::detection::smurfing::SmurfingReport;
use crate::graph::cycle_detection::FraudRing;
use crate::graph::shell_chain::ShellChain;
use crate::graph::transaction_graph::TransactionGraph;
use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Accounts scoring below this never appear in the report.
pub const SCORE_THRESHOLD: f64 = 20.0;

/// A flagged account with its composite score and evidence.
#[derive(Debug, Clone, Serialize)]
pub struct SuspiciousAccount {
    pub account_id: AccountId,
    pub suspicion_score: f64,
    pub detected_patterns: Vec<String>,
    pub ring_id: Option<String>,
}

/// A fraud ring projected into the report.
#[derive(Debug, Clone, Serialize)]
pub struct RingSummary {
    pub ring_id: String,
    pub member_accounts: Vec<AccountId>,
    pub pattern_type: String,
    pub risk_score: f64,
}

/// Batch-level roll-up.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisSummary {
    pub total_accounts_analyzed: usize,
    pub suspicious_accounts_flagged: usize,
    pub fraud_rings_detected: usize,
    pub processing_time_seconds: f64,
}

/// Everything the scorer produces; the engine stamps the processing
/// time and attaches the visualization payload afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ScoringOutcome {
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    pub fraud_rings: Vec<RingSummary>,
    pub summary: AnalysisSummary,
}

/// Aggregate all detector outputs into per-account suspicion scores.
///
/// Weights: cycle participation 40, smurfing 30, shell layering 20,
/// velocity 10. Accounts in the legitimate set are skipped outright;
/// everyone else needs a composite of at least [`SCORE_THRESHOLD`] and
/// one supporting pattern tag to be flagged. False-positive membership
/// never removes a ring from the projection — rings describe the
/// structure, not the verdict on each member.
pub fn score_accounts(
    graph: &TransactionGraph,
    rings: &[FraudRing],
    smurfing: &SmurfingReport,
    shell_chains: &[ShellChain],
    legitimate: &BTreeSet<AccountId>,
) -> ScoringOutcome {
    let mut suspicious: Vec<SuspiciousAccount> = Vec::new();

    for idx in graph.node_indices() {
        let node = graph.node(idx);
        if legitimate.contains(&node.id) {
            continue;
        }

        let mut cycle_score = 0.0f64;
        let mut smurf_score = 0.0f64;
        let mut shell_score = 0.0f64;
        let mut patterns: Vec<String> = Vec::new();
        let mut ring_id: Option<String> = None;

        for ring in rings {
            if ring.contains(&node.id) {
                let norm = ring.risk_score / 100.0;
                if norm > cycle_score {
                    cycle_score = norm;
                    ring_id = Some(ring.ring_id.clone());
                }
                patterns.push(format!("cycle_length_{}", ring.cycle_length));
            }
        }

        if let Some(hit) = smurfing.fan_in_for(&node.id) {
            let fan_score = (hit.max_unique_senders as f64 / 20.0).min(1.0)
                * (0.5 + 0.5 * hit.amount_similarity);
            smurf_score = smurf_score.max(fan_score);
            patterns.push("fan_in_smurfing".to_string());
        }

        if let Some(hit) = smurfing.fan_out_for(&node.id) {
            let fan_score = (hit.max_unique_receivers as f64 / 20.0).min(1.0);
            smurf_score = smurf_score.max(fan_score);
            patterns.push("fan_out_smurfing".to_string());
        }

        for chain in shell_chains {
            if chain.contains(&node.id) {
                shell_score = shell_score.max(chain.risk_score / 100.0);
                patterns.push("shell_layering".to_string());
            }
        }

        let velocity = velocity_score(&node.timestamps);
        if velocity > 0.7 {
            patterns.push("high_velocity".to_string());
        }

        let composite =
            40.0 * cycle_score + 30.0 * smurf_score + 20.0 * shell_score + 10.0 * velocity;
        let final_score = round_dp(composite.min(100.0), 1);

        if final_score >= SCORE_THRESHOLD && !patterns.is_empty() {
            suspicious.push(SuspiciousAccount {
                account_id: node.id.clone(),
                suspicion_score: final_score,
                detected_patterns: dedupe_preserving_order(patterns),
                ring_id,
            });
        }
    }

    // Stable sort: ties stay in ascending account-id order.
    suspicious.sort_by(|a, b| b.suspicion_score.total_cmp(&a.suspicion_score));

    let fraud_rings: Vec<RingSummary> = rings
        .iter()
        .map(|ring| RingSummary {
            ring_id: ring.ring_id.clone(),
            member_accounts: ring.members.clone(),
            pattern_type: ring.pattern_type.clone(),
            risk_score: ring.risk_score,
        })
        .collect();

    let summary = AnalysisSummary {
        total_accounts_analyzed: graph.node_count(),
        suspicious_accounts_flagged: suspicious.len(),
        fraud_rings_detected: fraud_rings.len(),
        processing_time_seconds: 0.0,
    };

    debug!(
        "scorer flagged {} of {} accounts",
        summary.suspicious_accounts_flagged, summary.total_accounts_analyzed
    );

    ScoringOutcome {
        suspicious_accounts: suspicious,
        fraud_rings,
        summary,
    }
}

/// Classify burst tempo from the mean gap between consecutive events:
/// under a minute scores 1.0, under an hour 0.7, under a day 0.3.
fn velocity_score(timestamps: &[DateTime<Utc>]) -> f64 {
    if timestamps.len() < 3 {
        return 0.0;
    }
    let mut sorted = timestamps.to_vec();
    sorted.sort_unstable();
    let total_gap: i64 = sorted.windows(2).map(|w| (w[1] - w[0]).num_seconds()).sum();
    let mean_interval = total_gap as f64 / (sorted.len() - 1) as f64;

    if mean_interval < 60.0 {
        1.0
    } else if mean_interval < 3_600.0 {
        0.7
    } else if mean_interval < 86_400.0 {
        0.3
    } else {
        0.0
    }
}

fn dedupe_preserving_order(patterns: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    patterns
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
