//! The canonical transaction type shared by every source API and the store
//! that holds one fetched batch of transactions.

use std::{fmt::Display, sync::Arc};

use serde::Serialize;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// The identifier a source system assigned to a transaction.
///
/// Sources use integers or UUIDs, so the ID is kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Create a transaction ID from the text of a source ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One mobile money transaction, as fetched from a source API.
///
/// Transactions are never modified after they are fetched. A refetch replaces
/// the whole [TransactionStore].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID assigned by the source system. Unique within a batch.
    pub id: TransactionId,
    /// The non-negative amount of money moved, in the source's currency unit.
    pub amount: f64,
    /// The label used for filtering and grouping, e.g., "Coming" or "Going".
    pub category: String,
    /// The finer grained type reported by some sources, e.g., "Airtime".
    pub transaction_type: Option<String>,
    /// When the transaction happened, in the time zone the source reported.
    #[serde(skip)]
    pub date_time: PrimitiveDateTime,
    /// The date exactly as the source sent it.
    #[serde(rename = "date")]
    pub date_text: String,
    /// Who sent the money, if it applies to this kind of transaction.
    pub sender: Option<String>,
    /// Who received the money, if it applies to this kind of transaction.
    pub receiver: Option<String>,
    /// The free text message that came with the transaction.
    pub description: Option<String>,
}

impl Transaction {
    /// The calendar day of the transaction, ignoring the time of day.
    pub fn date(&self) -> Date {
        self.date_time.date()
    }
}

/// One fetched batch of transactions in the order the source returned them.
///
/// The store is cheap to clone so that request handlers can take a snapshot
/// and release the session lock before rendering.
#[derive(Debug, Clone)]
pub struct TransactionStore {
    transactions: Arc<[Transaction]>,
    skipped_records: usize,
    fetched_at: OffsetDateTime,
}

impl TransactionStore {
    /// Create a store from a decoded batch.
    ///
    /// `skipped_records` is the number of records in the response that could
    /// not be turned into transactions.
    pub fn new(transactions: Vec<Transaction>, skipped_records: usize) -> Self {
        Self {
            transactions: transactions.into(),
            skipped_records,
            fetched_at: OffsetDateTime::now_utc(),
        }
    }

    /// All transactions in source order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The number of records that were dropped while decoding the batch.
    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }

    /// When the batch was received.
    pub fn fetched_at(&self) -> OffsetDateTime {
        self.fetched_at
    }

    /// Find a transaction by its ID.
    pub fn get(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions
            .iter()
            .find(|transaction| &transaction.id == id)
    }

    /// Whether the batch contained no usable transactions.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// The number of transactions in the store.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use time::{Date, PrimitiveDateTime, Time};

    use super::{Transaction, TransactionId};

    /// Create a transaction at midnight on `date` with no optional fields.
    pub(crate) fn transaction(id: u32, amount: f64, category: &str, date: Date) -> Transaction {
        Transaction {
            id: TransactionId::new(id.to_string()),
            amount,
            category: category.to_owned(),
            transaction_type: None,
            date_time: PrimitiveDateTime::new(date, Time::MIDNIGHT),
            date_text: date.to_string(),
            sender: None,
            receiver: None,
            description: None,
        }
    }
}
