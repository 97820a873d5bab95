use crate::core::account::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single directed transfer between two accounts.
///
/// This is the atomic input record of the engine: `sender` paid
/// `receiver` an `amount` at `timestamp`. Transactions are immutable
/// once created; the engine aggregates them into a graph and never
/// mutates them afterwards.
///
/// The engine is policy-neutral about values: negative or non-finite
/// amounts are carried through unchanged, and `sender == receiver` is
/// allowed (self-transfers can never appear in a ring or chain because
/// path exploration forbids revisits).
///
/// # Examples
///
/// ```
/// use forensics_engine::core::account::AccountId;
/// use forensics_engine::core::transaction::Transaction;
/// use chrono::{TimeZone, Utc};
///
/// let txn = Transaction::new(
///     "TXN_000001",
///     AccountId::new("ACC_A"),
///     AccountId::new("ACC_B"),
///     9_500.0,
///     Utc.with_ymd_and_hms(2025, 1, 6, 9, 30, 0).unwrap(),
/// );
/// assert_eq!(txn.amount(), 9_500.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Caller-assigned opaque identifier.
    transaction_id: String,
    /// The account the money left.
    sender: AccountId,
    /// The account the money arrived at.
    receiver: AccountId,
    /// Transferred amount in the batch's monetary scale.
    amount: f64,
    /// When the transfer happened.
    timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction record.
    pub fn new(
        transaction_id: impl Into<String>,
        sender: AccountId,
        receiver: AccountId,
        amount: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            sender,
            receiver,
            amount,
            timestamp,
        }
    }

    // --- Accessors ---

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn sender(&self) -> &AccountId {
        &self.sender
    }

    pub fn receiver(&self) -> &AccountId {
        &self.receiver
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// A finite batch of transactions submitted for analysis.
///
/// The engine is stateless across batches: every analysis starts from
/// a fresh batch and discards all derived structures when the report
/// is emitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionBatch {
    transactions: Vec<Transaction>,
}

impl TransactionBatch {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    pub fn add(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Sum of all transaction amounts in the batch.
    pub fn total_amount(&self) -> f64 {
        self.transactions.iter().map(|t| t.amount()).sum()
    }

    /// All unique account ids appearing on either side of a transfer,
    /// in ascending order.
    pub fn accounts(&self) -> Vec<AccountId> {
        let mut accounts: Vec<AccountId> = self
            .transactions
            .iter()
            .flat_map(|t| [t.sender().clone(), t.receiver().clone()])
            .collect();
        accounts.sort();
        accounts.dedup();
        accounts
    }
}

impl FromIterator<Transaction> for TransactionBatch {
    fn from_iter<T: IntoIterator<Item = Transaction>>(iter: T) -> Self {
        Self {
            transactions: iter.into_iter().collect(),
        }
    }
}
