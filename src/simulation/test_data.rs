//! Synthetic scenario generation.
//!
//! Builds batches with known fraud patterns and legitimate archetypes
//! embedded in random background traffic, for end-to-end exercising of
//! the detection pipeline.

use crate::core::account::AccountId;
use crate::core::stats::round_dp;
use crate::core::transaction::{Transaction, TransactionBatch};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Configuration for a generated scenario batch.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Number of random background transfers.
    pub normal_count: usize,
    /// RNG seed; the same seed always yields the same batch.
    pub seed: u64,
    /// Timestamp origin for the whole scenario.
    pub base_time: DateTime<Utc>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            normal_count: 700,
            seed: 42,
            base_time: Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap(),
        }
    }
}

struct TxnIds(usize);

impl TxnIds {
    fn next(&mut self) -> String {
        self.0 += 1;
        format!("TXN_{:06}", self.0)
    }
}

/// Generate a scenario batch with embedded patterns:
///
/// - three cycle rings (3, 4 and 5 members)
/// - one fan-in and one fan-out smurfing cluster (12 counterparties each)
/// - one five-hop shell chain
/// - a payroll hub, a salary receiver and a merchant (all legitimate)
/// - `normal_count` random transfers among 200 background accounts
pub fn generate_scenario(config: &ScenarioConfig) -> TransactionBatch {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut ids = TxnIds(0);
    let mut batch = TransactionBatch::new();
    let base = config.base_time;

    // Cycle rings of increasing size
    let ring1 = ["ACC_C01", "ACC_C02", "ACC_C03"];
    for i in 0..ring1.len() {
        for rep in 0..3i64 {
            batch.add(Transaction::new(
                ids.next(),
                AccountId::new(ring1[i]),
                AccountId::new(ring1[(i + 1) % ring1.len()]),
                round_dp(rng.gen_range(8_000.0..12_000.0), 2),
                base + Duration::days(5) + Duration::hours(rep * 2 + i as i64),
            ));
        }
    }

    let ring2 = ["ACC_C04", "ACC_C05", "ACC_C06", "ACC_C07"];
    for i in 0..ring2.len() {
        for rep in 0..2i64 {
            batch.add(Transaction::new(
                ids.next(),
                AccountId::new(ring2[i]),
                AccountId::new(ring2[(i + 1) % ring2.len()]),
                round_dp(rng.gen_range(15_000.0..25_000.0), 2),
                base + Duration::days(10) + Duration::hours(rep * 3 + i as i64),
            ));
        }
    }

    let ring3 = ["ACC_C08", "ACC_C09", "ACC_C10", "ACC_C11", "ACC_C12"];
    for i in 0..ring3.len() {
        batch.add(Transaction::new(
            ids.next(),
            AccountId::new(ring3[i]),
            AccountId::new(ring3[(i + 1) % ring3.len()]),
            round_dp(rng.gen_range(5_000.0..8_000.0), 2),
            base + Duration::days(15) + Duration::hours(i as i64),
        ));
    }

    // Fan-in: 12 senders converge on one receiver inside 36 hours
    for i in 0..12i64 {
        batch.add(Transaction::new(
            ids.next(),
            AccountId::new(format!("ACC_FI_{:02}", i)),
            AccountId::new("ACC_SMURF_IN"),
            round_dp(rng.gen_range(4_900.0..5_100.0), 2),
            base + Duration::days(20) + Duration::hours(i * 3),
        ));
    }

    // Fan-out: one sender sprays 12 receivers
    for i in 0..12i64 {
        batch.add(Transaction::new(
            ids.next(),
            AccountId::new("ACC_SMURF_OUT"),
            AccountId::new(format!("ACC_FO_{:02}", i)),
            round_dp(rng.gen_range(4_900.0..5_100.0), 2),
            base + Duration::days(22) + Duration::hours(i * 3),
        ));
    }

    // Shell chain: five hops through single-purpose intermediaries
    let chain = [
        "ACC_SRC", "ACC_SH1", "ACC_SH2", "ACC_SH3", "ACC_SH4", "ACC_DEST",
    ];
    for i in 0..chain.len() - 1 {
        batch.add(Transaction::new(
            ids.next(),
            AccountId::new(chain[i]),
            AccountId::new(chain[i + 1]),
            round_dp(rng.gen_range(20_000.0..30_000.0), 2),
            base + Duration::days(25) + Duration::hours(i as i64 * 2),
        ));
    }

    // Payroll hub: identical salaries to 25 employees, monthly
    for month in 0..6i64 {
        for emp in 0..25i64 {
            batch.add(Transaction::new(
                ids.next(),
                AccountId::new("ACC_PAYROLL"),
                AccountId::new(format!("ACC_EMP_{:02}", emp)),
                5_000.0,
                base + Duration::days(30 * month + 1) + Duration::minutes(emp),
            ));
        }
    }

    // Salary receiver: one fixed credit per month
    for month in 0..6i64 {
        batch.add(Transaction::new(
            ids.next(),
            AccountId::new("ACC_EMPLOYER"),
            AccountId::new("ACC_SALARY_RX"),
            75_000.0,
            base + Duration::days(30 * month + 1),
        ));
    }

    // Merchant: 60 unique buyers at standardized price points
    let prices = [29.99, 49.99, 99.99];
    for buyer in 0..60usize {
        let at = base
            + Duration::days(rng.gen_range(1..=180))
            + Duration::hours(rng.gen_range(8..=20));
        batch.add(Transaction::new(
            ids.next(),
            AccountId::new(format!("ACC_BUYER_{:03}", buyer)),
            AccountId::new("ACC_MERCHANT"),
            prices[rng.gen_range(0..prices.len())],
            at,
        ));
    }

    // Background noise
    let normal_accounts: Vec<AccountId> = (0..200)
        .map(|i| AccountId::new(format!("ACC_N{:04}", i)))
        .collect();
    for _ in 0..config.normal_count {
        let sender_idx = rng.gen_range(0..normal_accounts.len());
        let mut receiver_idx = rng.gen_range(0..normal_accounts.len());
        while receiver_idx == sender_idx {
            receiver_idx = rng.gen_range(0..normal_accounts.len());
        }
        let at = base
            + Duration::days(rng.gen_range(0..=180))
            + Duration::hours(rng.gen_range(0..24))
            + Duration::minutes(rng.gen_range(0..60));
        batch.add(Transaction::new(
            ids.next(),
            normal_accounts[sender_idx].clone(),
            normal_accounts[receiver_idx].clone(),
            round_dp(rng.gen_range(50.0..50_000.0), 2),
            at,
        ));
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let config = ScenarioConfig::default();
        let a = generate_scenario(&config);
        let b = generate_scenario(&config);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.transactions().iter().zip(b.transactions().iter()) {
            assert_eq!(x.transaction_id(), y.transaction_id());
            assert_eq!(x.amount(), y.amount());
            assert_eq!(x.timestamp(), y.timestamp());
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate_scenario(&ScenarioConfig::default());
        let b = generate_scenario(&ScenarioConfig {
            seed: 7,
            ..Default::default()
        });
        let differs = a
            .transactions()
            .iter()
            .zip(b.transactions().iter())
            .any(|(x, y)| x.amount() != y.amount());
        assert!(differs);
    }

    #[test]
    fn test_embedded_accounts_present() {
        let batch = generate_scenario(&ScenarioConfig {
            normal_count: 50,
            ..Default::default()
        });
        let accounts = batch.accounts();
        for expected in [
            "ACC_C01",
            "ACC_SMURF_IN",
            "ACC_SMURF_OUT",
            "ACC_SH1",
            "ACC_PAYROLL",
            "ACC_SALARY_RX",
            "ACC_MERCHANT",
        ] {
            assert!(
                accounts.contains(&AccountId::new(expected)),
                "missing {}",
                expected
            );
        }
    }

    #[test]
    fn test_transaction_ids_sequential() {
        let batch = generate_scenario(&ScenarioConfig {
            normal_count: 10,
            ..Default::default()
        });
        assert_eq!(batch.transactions()[0].transaction_id(), "TXN_000001");
        let last = batch.transactions().last().unwrap();
        assert_eq!(
            last.transaction_id(),
            format!("TXN_{:06}", batch.len())
        );
    }
}
