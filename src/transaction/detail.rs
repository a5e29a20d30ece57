//! Display-ready data for the transaction detail panel.

use super::core::{Transaction, TransactionId};

/// An optional transaction field prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailField {
    /// The source sent a value for the field.
    Value(String),
    /// The field does not apply to this kind of transaction.
    NotApplicable,
}

impl DetailField {
    /// The text shown for [DetailField::NotApplicable].
    pub const NOT_APPLICABLE_TEXT: &'static str = "Not applicable for this transaction type";

    fn from_optional(value: Option<&str>) -> Self {
        match value {
            Some(text) => Self::Value(text.to_owned()),
            None => Self::NotApplicable,
        }
    }

    /// The value, or the not-applicable text.
    pub fn display_text(&self) -> &str {
        match self {
            Self::Value(text) => text,
            Self::NotApplicable => Self::NOT_APPLICABLE_TEXT,
        }
    }
}

/// A single transaction mapped for the detail panel.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDetail {
    pub id: TransactionId,
    pub amount: f64,
    pub category: String,
    pub transaction_type: DetailField,
    pub date: String,
    pub sender: DetailField,
    pub receiver: DetailField,
    pub description: DetailField,
}

impl From<&Transaction> for TransactionDetail {
    fn from(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id.clone(),
            amount: transaction.amount,
            category: transaction.category.clone(),
            transaction_type: DetailField::from_optional(transaction.transaction_type.as_deref()),
            date: transaction.date_text.clone(),
            sender: DetailField::from_optional(transaction.sender.as_deref()),
            receiver: DetailField::from_optional(transaction.receiver.as_deref()),
            description: DetailField::from_optional(transaction.description.as_deref()),
        }
    }
}
