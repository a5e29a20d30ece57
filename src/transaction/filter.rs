//! Filtering of the transaction store by the criteria chosen in the dashboard.

use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use super::core::Transaction;

/// The filter controls as they arrive in a query string.
///
/// Every field is optional and kept as text so that a malformed value disables
/// its criterion instead of rejecting the request.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct FilterQuery {
    /// Case-insensitive text to look for.
    pub search: Option<String>,
    /// The exact category to show.
    pub category: Option<String>,
    /// A single calendar day, "YYYY-MM-DD".
    pub date: Option<String>,
    /// The first calendar day to show, "YYYY-MM-DD".
    pub date_from: Option<String>,
    /// The last calendar day to show, "YYYY-MM-DD".
    pub date_to: Option<String>,
    /// The smallest amount to show.
    pub min_amount: Option<String>,
    /// The largest amount to show.
    pub max_amount: Option<String>,
}

/// Validated filter criteria. Absent criteria match every transaction and all
/// present criteria must match.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilterCriteria {
    /// Exact match on [Transaction::category].
    pub category: Option<String>,
    /// Search text as the user typed it, matched without regard to case
    /// against the searchable fields.
    pub search: Option<String>,
    /// Match the calendar day of the transaction.
    pub date: Option<Date>,
    /// Inclusive lower bound on the calendar day.
    pub date_from: Option<Date>,
    /// Inclusive upper bound on the calendar day.
    pub date_to: Option<Date>,
    /// Inclusive lower bound on the amount.
    pub min_amount: Option<f64>,
    /// Inclusive upper bound on the amount.
    pub max_amount: Option<f64>,
}

impl FilterCriteria {
    /// Build criteria from query parameters.
    ///
    /// Blank values are treated as absent. Values that do not parse are
    /// logged and treated as absent too.
    pub fn from_query(query: &FilterQuery) -> Self {
        Self {
            category: non_blank(query.category.as_deref()).map(str::to_owned),
            search: non_blank(query.search.as_deref()).map(str::to_owned),
            date: parse_criterion("date", query.date.as_deref(), parse_date),
            date_from: parse_criterion("date_from", query.date_from.as_deref(), parse_date),
            date_to: parse_criterion("date_to", query.date_to.as_deref(), parse_date),
            min_amount: parse_criterion("min_amount", query.min_amount.as_deref(), parse_bound),
            max_amount: parse_criterion("max_amount", query.max_amount.as_deref(), parse_bound),
        }
    }

    /// Convert the criteria back into query parameters, e.g., for links that
    /// keep the current filters.
    pub fn to_query(&self) -> FilterQuery {
        FilterQuery {
            search: self.search.clone(),
            category: self.category.clone(),
            date: self.date.map(|date| date.to_string()),
            date_from: self.date_from.map(|date| date.to_string()),
            date_to: self.date_to.map(|date| date.to_string()),
            min_amount: self.min_amount.map(|amount| amount.to_string()),
            max_amount: self.max_amount.map(|amount| amount.to_string()),
        }
    }

    /// Whether no criterion is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `transaction` satisfies every criterion that is set.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        let date = transaction.date();

        self.category
            .as_ref()
            .is_none_or(|category| &transaction.category == category)
            && self
                .search
                .as_deref()
                .is_none_or(|search| matches_search(transaction, &search.to_lowercase()))
            && self.date.is_none_or(|wanted| date == wanted)
            && self.date_from.is_none_or(|from| date >= from)
            && self.date_to.is_none_or(|to| date <= to)
            && self.min_amount.is_none_or(|min| transaction.amount >= min)
            && self.max_amount.is_none_or(|max| transaction.amount <= max)
    }
}

/// Look for `search` (already lowercase) in the category, the transaction
/// type, the amount and the date as the source sent it.
fn matches_search(transaction: &Transaction, search: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(search);

    contains(&transaction.category)
        || transaction.transaction_type.as_deref().is_some_and(contains)
        || contains(&transaction.amount.to_string())
        || contains(&transaction.date_text)
}

/// Keep the transactions that match `criteria`, in their original order.
pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    criteria: &FilterCriteria,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|transaction| criteria.matches(transaction))
        .collect()
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|text| !text.is_empty())
}

fn parse_criterion<T>(
    name: &str,
    text: Option<&str>,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    let text = non_blank(text)?;
    let value = parse(text);

    if value.is_none() {
        tracing::debug!("Ignoring filter {name}: could not parse \"{text}\"");
    }

    value
}

fn parse_date(text: &str) -> Option<Date> {
    Date::parse(text, format_description!("[year]-[month]-[day]")).ok()
}

fn parse_bound(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|bound| bound.is_finite())
}
