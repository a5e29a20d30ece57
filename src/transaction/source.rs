//! Adapters from the record shapes of each source API to [Transaction].
//!
//! Every source names and formats its fields a little differently. Each shape
//! gets its own record type and a `TryFrom` conversion, so nothing past this
//! module needs to know which API the data came from.

use std::{collections::HashSet, fmt::Display};

use serde::Deserialize;
use serde_json::Value;

use super::{
    core::{Transaction, TransactionId},
    parse::{parse_amount, parse_date_time},
};

/// The API a dashboard reads its transactions from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceFormat {
    /// The SMS API: `GET /sms` returns an array of parsed SMS records.
    Sms,
    /// The REST API: `GET /transactions` returns pages of ledger records.
    Rest,
    /// The hosted database: `GET /rest/v1/transactions` returns an array of
    /// ledger records and needs an API key.
    Hosted,
}

impl Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SourceFormat::Sms => "sms",
            SourceFormat::Rest => "rest",
            SourceFormat::Hosted => "hosted",
        };

        f.write_str(name)
    }
}

/// Why a source record could not be turned into a transaction.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MalformedRecord {
    /// The record is not an object of the expected shape, e.g., the ID is missing.
    #[error("unexpected record shape: {0}")]
    Shape(String),

    /// A required field is absent or null.
    #[error("missing required field \"{0}\"")]
    MissingField(&'static str),

    /// The amount is not a number, even after removing the currency unit.
    #[error("could not parse amount \"{0}\"")]
    InvalidAmount(String),

    /// Amounts are magnitudes; the direction of a transaction is its category.
    #[error("amount {0} is negative")]
    NegativeAmount(f64),

    /// The date is not in any of the supported formats.
    #[error("could not parse date \"{0}\"")]
    InvalidDate(String),

    /// Another record in the same batch already used this ID.
    #[error("duplicate transaction ID {0}")]
    DuplicateId(TransactionId),
}

/// The transactions decoded from one response.
#[derive(Debug, Default, PartialEq)]
pub struct TransactionBatch {
    /// The valid transactions, in response order.
    pub transactions: Vec<Transaction>,
    /// How many records were dropped as malformed or duplicated.
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for TransactionId {
    fn from(value: RawId) -> Self {
        match value {
            RawId::Number(id) => TransactionId::new(id.to_string()),
            RawId::Text(id) => TransactionId::new(id),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

/// A record from the SMS API.
#[derive(Debug, Deserialize)]
pub struct SmsRecord {
    id: RawId,
    amount: Option<RawAmount>,
    category: Option<String>,
    message_type: Option<String>,
    date: Option<String>,
    message: Option<String>,
}

/// A record from the REST API or the hosted database.
#[derive(Debug, Deserialize)]
pub struct LedgerRecord {
    id: RawId,
    amount: Option<RawAmount>,
    transaction_type: Option<String>,
    date: Option<String>,
    sender: Option<String>,
    receiver: Option<String>,
    message: Option<String>,
}

impl TryFrom<SmsRecord> for Transaction {
    type Error = MalformedRecord;

    fn try_from(record: SmsRecord) -> Result<Self, Self::Error> {
        let amount = required_amount(record.amount)?;
        let category = non_blank(record.category).ok_or(MalformedRecord::MissingField("category"))?;
        let (date_time, date_text) = required_date(record.date)?;

        Ok(Transaction {
            id: record.id.into(),
            amount,
            category,
            transaction_type: non_blank(record.message_type),
            date_time,
            date_text,
            sender: None,
            receiver: None,
            description: non_blank(record.message),
        })
    }
}

impl TryFrom<LedgerRecord> for Transaction {
    type Error = MalformedRecord;

    fn try_from(record: LedgerRecord) -> Result<Self, Self::Error> {
        let amount = required_amount(record.amount)?;
        let category = non_blank(record.transaction_type)
            .ok_or(MalformedRecord::MissingField("transaction_type"))?;
        let (date_time, date_text) = required_date(record.date)?;

        Ok(Transaction {
            id: record.id.into(),
            amount,
            category,
            transaction_type: None,
            date_time,
            date_text,
            sender: non_blank(record.sender),
            receiver: non_blank(record.receiver),
            description: non_blank(record.message),
        })
    }
}

fn required_amount(amount: Option<RawAmount>) -> Result<f64, MalformedRecord> {
    let amount = match amount {
        Some(RawAmount::Number(amount)) => amount,
        Some(RawAmount::Text(text)) => {
            parse_amount(&text).ok_or(MalformedRecord::InvalidAmount(text))?
        }
        None => return Err(MalformedRecord::MissingField("amount")),
    };

    if amount < 0.0 {
        return Err(MalformedRecord::NegativeAmount(amount));
    }

    Ok(amount)
}

fn required_date(
    date: Option<String>,
) -> Result<(time::PrimitiveDateTime, String), MalformedRecord> {
    let text = non_blank(date).ok_or(MalformedRecord::MissingField("date"))?;

    match parse_date_time(&text) {
        Some(date_time) => Ok((date_time, text)),
        None => Err(MalformedRecord::InvalidDate(text)),
    }
}

/// Blank text is treated the same as a missing field.
fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

fn decode_record(source: SourceFormat, record: Value) -> Result<Transaction, MalformedRecord> {
    let shape_error = |error: serde_json::Error| MalformedRecord::Shape(error.to_string());

    match source {
        SourceFormat::Sms => serde_json::from_value::<SmsRecord>(record)
            .map_err(shape_error)?
            .try_into(),
        SourceFormat::Rest | SourceFormat::Hosted => serde_json::from_value::<LedgerRecord>(record)
            .map_err(shape_error)?
            .try_into(),
    }
}

/// Turn the raw records of one response into transactions.
///
/// Malformed records and records that repeat an earlier ID are logged and
/// skipped rather than failing the whole batch.
pub fn decode_batch(source: SourceFormat, records: Vec<Value>) -> TransactionBatch {
    let mut batch = TransactionBatch::default();
    let mut seen_ids = HashSet::new();

    for (index, record) in records.into_iter().enumerate() {
        let result = decode_record(source, record).and_then(|transaction| {
            if seen_ids.insert(transaction.id.clone()) {
                Ok(transaction)
            } else {
                Err(MalformedRecord::DuplicateId(transaction.id))
            }
        });

        match result {
            Ok(transaction) => batch.transactions.push(transaction),
            Err(error) => {
                tracing::warn!("Skipping {source} record at index {index}: {error}");
                batch.skipped += 1;
            }
        }
    }

    if batch.skipped > 0 {
        tracing::warn!(
            "Skipped {} of {} {source} records",
            batch.skipped,
            batch.skipped + batch.transactions.len()
        );
    }

    batch
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use crate::transaction::core::TransactionId;

    use super::{MalformedRecord, SourceFormat, decode_batch, decode_record};

    #[test]
    fn decodes_sms_record() {
        let record = json!({
            "id": "0f8e6c1c-8a47-4f0e-9a55-8d0d1f0f2a11",
            "address": "M-Money",
            "amount": 2000.0,
            "category": "Coming",
            "message_type": "Incoming Money",
            "date": "2024-05-10T16:30:51",
            "message": "You have received 2000 RWF from Jane Smith."
        });

        let transaction = decode_record(SourceFormat::Sms, record).unwrap();

        assert_eq!(
            transaction.id,
            TransactionId::new("0f8e6c1c-8a47-4f0e-9a55-8d0d1f0f2a11")
        );
        assert_eq!(transaction.amount, 2000.0);
        assert_eq!(transaction.category, "Coming");
        assert_eq!(
            transaction.transaction_type.as_deref(),
            Some("Incoming Money")
        );
        assert_eq!(transaction.date_time, datetime!(2024-05-10 16:30:51));
        assert_eq!(transaction.date_text, "2024-05-10T16:30:51");
        assert_eq!(transaction.sender, None);
        assert_eq!(transaction.receiver, None);
        assert!(transaction.description.is_some());
    }

    #[test]
    fn decodes_ledger_record_with_unit_suffix() {
        let record = json!({
            "id": 42,
            "amount": "1,500 RWF",
            "transaction_type": "Payment to Code Holder",
            "date": "2024-05-11",
            "sender": null,
            "receiver": "Jane Smith",
            "message": "TxId: 73214484437. Your payment of 1,500 RWF to Jane Smith has been completed."
        });

        let transaction = decode_record(SourceFormat::Rest, record).unwrap();

        assert_eq!(transaction.id, TransactionId::new("42"));
        assert_eq!(transaction.amount, 1500.0);
        assert_eq!(transaction.category, "Payment to Code Holder");
        assert_eq!(transaction.transaction_type, None);
        assert_eq!(transaction.sender, None);
        assert_eq!(transaction.receiver.as_deref(), Some("Jane Smith"));
    }

    #[test]
    fn blank_optional_fields_are_absent() {
        let record = json!({
            "id": 1,
            "amount": 10,
            "transaction_type": "Airtime",
            "date": "2024-05-11",
            "sender": "  ",
            "receiver": "",
        });

        let transaction = decode_record(SourceFormat::Hosted, record).unwrap();

        assert_eq!(transaction.sender, None);
        assert_eq!(transaction.receiver, None);
        assert_eq!(transaction.description, None);
    }

    #[test]
    fn reports_why_a_record_is_malformed() {
        let cases = [
            (
                json!({"id": 1, "category": "Coming", "date": "2024-01-05"}),
                MalformedRecord::MissingField("amount"),
            ),
            (
                json!({"id": 1, "amount": 5, "date": "2024-01-05"}),
                MalformedRecord::MissingField("category"),
            ),
            (
                json!({"id": 1, "amount": 5, "category": "Coming", "date": null}),
                MalformedRecord::MissingField("date"),
            ),
            (
                json!({"id": 1, "amount": "five", "category": "Coming", "date": "2024-01-05"}),
                MalformedRecord::InvalidAmount("five".to_owned()),
            ),
            (
                json!({"id": 1, "amount": -5, "category": "Coming", "date": "2024-01-05"}),
                MalformedRecord::NegativeAmount(-5.0),
            ),
            (
                json!({"id": 1, "amount": 5, "category": "Coming", "date": "05/01/2024"}),
                MalformedRecord::InvalidDate("05/01/2024".to_owned()),
            ),
        ];

        for (record, want) in cases {
            let got = decode_record(SourceFormat::Sms, record.clone());

            assert_eq!(got, Err(want), "unexpected result for {record}");
        }
    }

    #[test]
    fn record_without_id_has_wrong_shape() {
        let got = decode_record(
            SourceFormat::Sms,
            json!({"amount": 5, "category": "Coming", "date": "2024-01-05"}),
        );

        assert!(matches!(got, Err(MalformedRecord::Shape(_))));
    }

    #[test]
    fn batch_skips_malformed_and_duplicate_records() {
        let records = vec![
            json!({"id": 1, "amount": 100, "category": "Coming", "date": "2024-01-05"}),
            json!({"id": 2, "amount": 50, "category": "Going", "date": "not a date"}),
            json!({"id": 1, "amount": 70, "category": "Going", "date": "2024-01-06"}),
            json!("not an object"),
            json!({"id": 3, "amount": 50, "category": "Going", "date": "2024-02-10"}),
        ];

        let batch = decode_batch(SourceFormat::Sms, records);

        let ids: Vec<_> = batch
            .transactions
            .iter()
            .map(|transaction| transaction.id.as_str())
            .collect();
        assert_eq!(ids, ["1", "3"]);
        assert_eq!(batch.transactions[0].amount, 100.0);
        assert_eq!(batch.skipped, 3);
    }
}
