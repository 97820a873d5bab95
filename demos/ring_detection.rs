//! Ring detection walkthrough.
//!
//! Builds a small batch containing a three-account circulation ring
//! and shows how the engine surfaces it.

use chrono::{Duration, TimeZone, Utc};
use forensics_engine::core::account::AccountId;
use forensics_engine::core::transaction::{Transaction, TransactionBatch};
use forensics_engine::engine::ForensicsEngine;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  forensics-engine: Fraud Ring Detection      ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let base = Utc.with_ymd_and_hms(2025, 1, 6, 8, 0, 0).unwrap();
    let mut batch = TransactionBatch::new();

    println!("Transfers (three per leg, ~10 000 each):");
    println!("  ACC_ALPHA → ACC_BRAVO → ACC_CHARLIE → ACC_ALPHA\n");

    let legs = [
        ("ACC_ALPHA", "ACC_BRAVO"),
        ("ACC_BRAVO", "ACC_CHARLIE"),
        ("ACC_CHARLIE", "ACC_ALPHA"),
    ];
    let mut counter = 0;
    for (i, (from, to)) in legs.iter().enumerate() {
        for rep in 0..3i64 {
            counter += 1;
            batch.add(Transaction::new(
                format!("TXN_{:06}", counter),
                AccountId::new(*from),
                AccountId::new(*to),
                10_000.0 + rep as f64 * 150.0,
                base + Duration::hours(i as i64 * 2 + rep),
            ));
        }
    }

    let report = ForensicsEngine::new().analyze(&batch);

    println!("━━━ Fraud Rings ━━━\n");
    for ring in &report.fraud_rings {
        let members: Vec<String> = ring.member_accounts.iter().map(|m| m.to_string()).collect();
        println!("  {}: {} → (back to start)", ring.ring_id, members.join(" → "));
        println!("    Risk score: {:.1}", ring.risk_score);
    }

    println!("\n━━━ Flagged Accounts ━━━\n");
    for account in &report.suspicious_accounts {
        println!(
            "  {:<14} score {:>5.1}  patterns: {}",
            account.account_id,
            account.suspicion_score,
            account.detected_patterns.join(", ")
        );
    }
}
