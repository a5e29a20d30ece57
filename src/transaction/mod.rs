//! Mobile money transactions and the engine that works on them.
//!
//! This module contains everything that does not depend on HTML or the network:
//! - The canonical `Transaction` type and the `TransactionStore` for one fetch
//! - Adapters that decode the record shape of each source API
//! - Filtering, grouped totals and the detail view mapping

mod aggregation;
mod core;
mod detail;
mod filter;
mod parse;
mod source;

pub use aggregation::{
    Bucket, INCOMING_CATEGORY, Summary, summarize, totals_by_category, totals_by_month,
    totals_by_type,
};
pub use core::{Transaction, TransactionId, TransactionStore};
pub use detail::{DetailField, TransactionDetail};
pub use filter::{FilterCriteria, FilterQuery, filter_transactions};
pub use source::{SourceFormat, TransactionBatch, decode_batch};

#[cfg(test)]
pub(crate) use core::test_utils;
