//! JSON endpoints for the filtered transactions and their grouped totals.
//!
//! Unlike the dashboard page, these endpoints do not change the session's view:
//! every request describes its filters and page in full.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    dashboard::{DashboardQuery, DashboardState},
    pagination::paginate,
    session::SessionState,
    transaction::{
        Bucket, FilterCriteria, FilterQuery, Summary, Transaction, TransactionStore,
        filter_transactions, summarize, totals_by_category, totals_by_month, totals_by_type,
    },
};

/// One page of filtered transactions.
#[derive(Debug, Serialize)]
struct TransactionsPage<'a> {
    items: &'a [&'a Transaction],
    page: u64,
    per_page: u64,
    total_pages: u64,
    total_items: usize,
}

/// The field that [get_summary] groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum GroupBy {
    Category,
    Type,
    Month,
}

impl FromStr for GroupBy {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim().to_lowercase().as_str() {
            "category" => Ok(Self::Category),
            "type" => Ok(Self::Type),
            "month" => Ok(Self::Month),
            _ => Err(Error::InvalidGroupBy(text.to_owned())),
        }
    }
}

/// The query parameters of [get_summary].
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    #[serde(flatten)]
    filters: FilterQuery,
    /// "category" (the default), "type" or "month".
    group_by: Option<String>,
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    group_by: GroupBy,
    summary: Summary,
    buckets: Vec<Bucket>,
}

/// The store to answer from. A fetch that returned nothing answers with no
/// transactions, a session that is loading or failed cannot answer.
fn loaded_store(state: &DashboardState) -> Result<TransactionStore, Error> {
    let session = state
        .session
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire session lock: {error}"))
        .map_err(|_| Error::SessionLockError)?;

    match session.state() {
        SessionState::Ready(store) => Ok(store.clone()),
        SessionState::Empty { skipped_records } => {
            Ok(TransactionStore::new(Vec::new(), *skipped_records))
        }
        SessionState::Loading | SessionState::Error(_) => Err(Error::TransactionsUnavailable),
    }
}

/// Get one page of the transactions that match the filters in the query.
pub async fn get_transactions(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let store = match loaded_store(&state) {
        Ok(store) => store,
        Err(error) => return error.into_json_response(),
    };

    let criteria = FilterCriteria::from_query(&query.filters);
    let filtered = filter_transactions(store.transactions(), &criteria);
    let page_size = state
        .pagination_config
        .clamp_page_size(query.page_size().unwrap_or(state.pagination_config.default_page_size));
    let page = paginate(&filtered, query.page_number().unwrap_or(1), page_size);

    Json(TransactionsPage {
        items: page.visible,
        page: page.page,
        per_page: page.page_size,
        total_pages: page.total_pages,
        total_items: page.total_items,
    })
    .into_response()
}

/// Get the totals of the transactions that match the filters in the query,
/// grouped by category, type or month.
pub async fn get_summary(
    State(state): State<DashboardState>,
    Query(query): Query<SummaryQuery>,
) -> Response {
    let group_by = match query.group_by.as_deref().map(GroupBy::from_str) {
        None => GroupBy::Category,
        Some(Ok(group_by)) => group_by,
        Some(Err(error)) => return error.into_json_response(),
    };

    let store = match loaded_store(&state) {
        Ok(store) => store,
        Err(error) => return error.into_json_response(),
    };

    let criteria = FilterCriteria::from_query(&query.filters);
    let filtered = filter_transactions(store.transactions(), &criteria);
    let buckets = match group_by {
        GroupBy::Category => totals_by_category(&filtered),
        GroupBy::Type => totals_by_type(&filtered),
        GroupBy::Month => totals_by_month(&filtered),
    };

    Json(SummaryResponse {
        group_by,
        summary: summarize(&filtered),
        buckets,
    })
    .into_response()
}
