//! Dashboard HTTP handlers.
//!
//! This module contains:
//! - Route handlers for the dashboard page, the detail panel and refreshes
//! - The query type shared with the JSON endpoints
//! - The function that renders the content for each session state

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HxRequest;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    dashboard::{
        cards::{summary_cards_view, summary_text},
        charts::{build_dashboard_charts, charts_view},
        detail::detail_panel_view,
        tables::{pagination_view, search_preview, transactions_table},
        view::{
            content_container, dashboard_page, empty_view, fetch_error_view, fetched_at_notice,
            loading_view, refreshing_notice, skipped_notice,
        },
    },
    endpoints,
    pagination::{PaginationConfig, create_pagination_indicators, paginate},
    refresh::Refresher,
    session::{
        Session, SessionEvent, SessionSnapshot, SessionState, SharedSession, Transition, ViewState,
    },
    transaction::{
        FilterCriteria, FilterQuery, TransactionDetail, TransactionId, TransactionStore,
        filter_transactions, summarize, totals_by_category, totals_by_month,
    },
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The dashboard session.
    pub session: SharedSession,
    /// Starts refetches of the session's transactions.
    pub refresher: Refresher,
    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
    /// The unit shown next to amounts.
    pub currency: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
            refresher: state.refresher.clone(),
            pagination_config: state.pagination_config.clone(),
            currency: state.currency.clone(),
        }
    }
}

/// The query parameters of the dashboard page: the filter controls plus the
/// page to show and the page size.
///
/// Page numbers are kept as text, like the filters, so that a malformed
/// number is ignored instead of rejecting the request.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct DashboardQuery {
    /// The filter controls.
    #[serde(flatten)]
    pub filters: FilterQuery,
    /// The page to show, 1-based.
    pub page: Option<String>,
    /// The number of rows per page.
    pub per_page: Option<String>,
}

impl DashboardQuery {
    /// The requested page, if it is a number.
    pub fn page_number(&self) -> Option<u64> {
        parse_number("page", self.page.as_deref())
    }

    /// The requested page size, if it is a number.
    pub fn page_size(&self) -> Option<u64> {
        parse_number("per_page", self.per_page.as_deref())
    }

    /// Whether the request carries any filter parameter, even an empty one.
    ///
    /// The filter form always sends every field, so an empty field clears
    /// that filter. A request without filter parameters, e.g., a plain page
    /// load, keeps the current filters.
    fn has_filters(&self) -> bool {
        self.filters != FilterQuery::default()
    }

    /// Turn the query into session events and apply them.
    ///
    /// Filters are applied first, then the page size and finally the page.
    /// The page is ignored when the filters or the page size changed since
    /// both reset the view to the first page.
    fn apply_to(&self, session: &mut Session) {
        let mut reset_to_first_page = false;

        if self.has_filters() {
            let criteria = FilterCriteria::from_query(&self.filters);
            reset_to_first_page |=
                session.apply(SessionEvent::FiltersChanged(criteria)) == Transition::Applied;
        }

        if let Some(page_size) = self.page_size() {
            reset_to_first_page |=
                session.apply(SessionEvent::PageSizeChanged(page_size)) == Transition::Applied;
        }

        if !reset_to_first_page && let Some(page) = self.page_number() {
            session.apply(SessionEvent::PageRequested(page));
        }
    }
}

fn parse_number(name: &str, text: Option<&str>) -> Option<u64> {
    let text = text.map(str::trim).filter(|text| !text.is_empty())?;

    text.parse()
        .inspect_err(|error| tracing::debug!("Ignoring {name} \"{text}\": {error}"))
        .ok()
}

/// Display the dashboard with the view described by the query.
///
/// htmx requests get only the content partial.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    HxRequest(is_htmx_request): HxRequest,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let snapshot = {
        let mut session = state
            .session
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire session lock: {error}"))
            .map_err(|_| Error::SessionLockError)?;

        query.apply_to(&mut session);
        session.snapshot()
    };

    let content = dashboard_content(&snapshot, &state.pagination_config, &state.currency);

    if is_htmx_request {
        return Ok(content.into_response());
    }

    Ok(dashboard_page(
        content,
        &snapshot.view.criteria.to_query(),
        snapshot.view.page_size,
        &state.pagination_config,
    )
    .into_response())
}

/// Display the detail panel for a single transaction.
pub async fn get_transaction_detail(
    State(state): State<DashboardState>,
    Path(transaction_id): Path<String>,
) -> Response {
    let store = match ready_store(&state.session) {
        Ok(Some(store)) => store,
        Ok(None) => return Error::TransactionsUnavailable.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    };

    let transaction_id = TransactionId::new(transaction_id);

    match store.get(&transaction_id) {
        Some(transaction) => {
            detail_panel_view(&TransactionDetail::from(transaction), &state.currency)
                .into_response()
        }
        None => {
            tracing::debug!("No transaction with ID {transaction_id}");
            Error::TransactionNotFound(transaction_id).into_alert_response()
        }
    }
}

/// Schedule a refetch of the transactions and return the updated content.
///
/// The content keeps showing the current data, or the loading state after an
/// error, and asks for itself again until the refetch resolves.
pub async fn post_refresh(State(state): State<DashboardState>) -> Response {
    if let Err(error) = state.refresher.request_refresh() {
        return error.into_alert_response();
    }

    let snapshot = match state.session.lock() {
        Ok(session) => session.snapshot(),
        Err(error) => {
            tracing::error!("could not acquire session lock: {error}");
            return Error::SessionLockError.into_alert_response();
        }
    };

    dashboard_content(&snapshot, &state.pagination_config, &state.currency).into_response()
}

/// The store of a session in the [SessionState::Ready] state.
///
/// The lock is released before the caller uses the store.
fn ready_store(session: &SharedSession) -> Result<Option<TransactionStore>, Error> {
    let session = session
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire session lock: {error}"))
        .map_err(|_| Error::SessionLockError)?;

    match session.state() {
        SessionState::Ready(store) => Ok(Some(store.clone())),
        _ => Ok(None),
    }
}

/// Renders the `#dashboard-content` container for the session state.
fn dashboard_content(
    snapshot: &SessionSnapshot,
    pagination_config: &PaginationConfig,
    currency: &str,
) -> Markup {
    match &snapshot.state {
        SessionState::Loading => content_container(true, loading_view()),
        SessionState::Empty { skipped_records } => content_container(
            snapshot.refreshing,
            html!(
                @if snapshot.refreshing {
                    (refreshing_notice())
                }

                (empty_view(*skipped_records))
            ),
        ),
        SessionState::Error(message) => content_container(false, fetch_error_view(message)),
        SessionState::Ready(store) => content_container(
            snapshot.refreshing,
            ready_view(
                store,
                &snapshot.view,
                snapshot.refreshing,
                pagination_config,
                currency,
            ),
        ),
    }
}

/// Renders the cards, charts and table for the filtered transactions.
fn ready_view(
    store: &TransactionStore,
    view: &ViewState,
    refreshing: bool,
    pagination_config: &PaginationConfig,
    currency: &str,
) -> Markup {
    let filtered = filter_transactions(store.transactions(), &view.criteria);
    let summary = summarize(&filtered);
    let charts = build_dashboard_charts(
        &totals_by_category(&filtered),
        &totals_by_month(&filtered),
        currency,
    );

    let page = paginate(&filtered, view.page, view.page_size);
    let indicators =
        create_pagination_indicators(page.page, page.total_pages, pagination_config.max_pages);
    let filters = view.criteria.to_query();
    let page_size = page.page_size;

    let mut categories: Vec<&str> = Vec::new();
    for transaction in store.transactions() {
        if !categories.contains(&transaction.category.as_str()) {
            categories.push(&transaction.category);
        }
    }

    html!(
        @if refreshing {
            (refreshing_notice())
        }

        (fetched_at_notice(store.fetched_at()))

        @if store.skipped_records() > 0 {
            (skipped_notice(store.skipped_records()))
        }

        datalist id="category-options"
        {
            @for category in &categories {
                option value=(category) {}
            }
        }

        (summary_cards_view(&summary, currency))

        (charts_view(&charts))

        @if let Some(search) = &view.criteria.search {
            (search_preview(search, &filtered, currency))
        }

        section id="transactions" class="w-full"
        {
            div class="flex justify-between items-baseline mb-2"
            {
                h3 class="text-xl font-semibold" { "Transactions" }
                span class="text-sm text-gray-600 dark:text-gray-400"
                {
                    (summary_text(&summary, currency))
                }
            }

            (transactions_table(&page, currency))

            (pagination_view(&indicators, |page| dashboard_url(&filters, page, page_size)))
        }
    )
}

/// The dashboard URL for `page` with the given filters and page size.
fn dashboard_url(filters: &FilterQuery, page: u64, page_size: u64) -> String {
    let mut url = format!(
        "{}?page={page}&per_page={page_size}",
        endpoints::DASHBOARD_VIEW
    );

    match serde_urlencoded::to_string(filters) {
        Ok(filter_params) if !filter_params.is_empty() => {
            url.push('&');
            url.push_str(&filter_params);
        }
        Ok(_) => {}
        Err(error) => tracing::warn!("could not encode filters for page link: {error}"),
    }

    url
}
