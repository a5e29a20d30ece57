//! The dashboard session: the fetched data, the fetch status and the view state.
//!
//! All changes go through [Session::apply]. Fetch results carry the
//! [FetchTicket] they were started with and only the newest ticket may change
//! the data, so a slow response can never overwrite a newer one.

use std::sync::{Arc, Mutex};

use crate::{
    pagination::PaginationConfig,
    transaction::{FilterCriteria, TransactionBatch, TransactionStore},
};

/// The session as shared between request handlers and fetch tasks.
pub type SharedSession = Arc<Mutex<Session>>;

/// Identifies one fetch. Tickets increase with every fetch that is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Where the session is in its fetch lifecycle.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// No fetch has resolved yet, or the last one failed and a refresh was requested.
    Loading,
    /// Data is available.
    Ready(TransactionStore),
    /// The fetch succeeded but no usable transactions came back.
    Empty {
        /// The records in the response that could not be decoded.
        skipped_records: usize,
    },
    /// The fetch failed. Only a refresh leaves this state.
    Error(String),
}

/// What the user is looking at.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// The active filters.
    pub criteria: FilterCriteria,
    /// The requested page, 1-based. Clamped when the page is rendered.
    pub page: u64,
    /// The number of rows per page.
    pub page_size: u64,
}

/// Something that happened to the session.
#[derive(Debug)]
pub enum SessionEvent {
    /// The user asked for the data to be fetched again.
    RefreshRequested,
    /// The filter controls changed.
    FiltersChanged(FilterCriteria),
    /// The user picked a different number of rows per page.
    PageSizeChanged(u64),
    /// The user moved to another page.
    PageRequested(u64),
    /// A fetch finished with a decoded batch.
    FetchSucceeded {
        ticket: FetchTicket,
        batch: TransactionBatch,
    },
    /// A fetch failed with a message that can be shown to the user.
    FetchFailed { ticket: FetchTicket, message: String },
}

/// The outcome of applying a [SessionEvent].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The session changed.
    Applied,
    /// The event did not change anything.
    Unchanged,
    /// The event was the result of an outdated fetch and was discarded.
    Stale,
}

/// A copy of the session that can be rendered after the lock is released.
///
/// Cloning is cheap: the transactions are shared, not copied.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub view: ViewState,
    /// Whether a refresh was requested and has not resolved yet.
    pub refreshing: bool,
}

/// The single dashboard session of the server.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    view: ViewState,
    pagination_config: PaginationConfig,
    latest_ticket: FetchTicket,
    refreshing: bool,
}

impl Session {
    /// Create a session in the [SessionState::Loading] state with no filters.
    pub fn new(pagination_config: PaginationConfig) -> Self {
        let page_size = pagination_config.clamp_page_size(pagination_config.default_page_size);

        Self {
            state: SessionState::Loading,
            view: ViewState {
                criteria: FilterCriteria::default(),
                page: 1,
                page_size,
            },
            pagination_config,
            latest_ticket: FetchTicket(0),
            refreshing: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn pagination_config(&self) -> &PaginationConfig {
        &self.pagination_config
    }

    /// Whether a refresh was requested and has not resolved yet.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// Issue the ticket for a new fetch. Results of earlier fetches become stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_ticket = FetchTicket(self.latest_ticket.0 + 1);
        tracing::debug!("Starting fetch {:?}", self.latest_ticket);

        self.latest_ticket
    }

    /// Copy the session for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            view: self.view.clone(),
            refreshing: self.refreshing,
        }
    }

    /// Apply `event` and report whether it changed the session.
    pub fn apply(&mut self, event: SessionEvent) -> Transition {
        match event {
            SessionEvent::RefreshRequested => {
                self.refreshing = true;

                if let SessionState::Error(_) = self.state {
                    self.state = SessionState::Loading;
                }

                Transition::Applied
            }
            SessionEvent::FiltersChanged(criteria) => {
                if criteria == self.view.criteria {
                    return Transition::Unchanged;
                }

                self.view.criteria = criteria;
                self.view.page = 1;
                Transition::Applied
            }
            SessionEvent::PageSizeChanged(page_size) => {
                let page_size = self.pagination_config.clamp_page_size(page_size);

                if page_size == self.view.page_size {
                    return Transition::Unchanged;
                }

                self.view.page_size = page_size;
                self.view.page = 1;
                Transition::Applied
            }
            SessionEvent::PageRequested(page) => {
                let page = page.max(1);

                if page == self.view.page {
                    return Transition::Unchanged;
                }

                self.view.page = page;
                Transition::Applied
            }
            SessionEvent::FetchSucceeded { ticket, batch } => {
                if ticket != self.latest_ticket {
                    tracing::debug!("Discarding result of stale fetch {ticket:?}");
                    return Transition::Stale;
                }

                tracing::info!(
                    "Fetched {} transactions ({} skipped)",
                    batch.transactions.len(),
                    batch.skipped
                );

                self.refreshing = false;
                self.state = if batch.transactions.is_empty() {
                    SessionState::Empty {
                        skipped_records: batch.skipped,
                    }
                } else {
                    SessionState::Ready(TransactionStore::new(batch.transactions, batch.skipped))
                };

                Transition::Applied
            }
            SessionEvent::FetchFailed { ticket, message } => {
                if ticket != self.latest_ticket {
                    tracing::debug!("Discarding error of stale fetch {ticket:?}: {message}");
                    return Transition::Stale;
                }

                self.refreshing = false;
                self.state = SessionState::Error(message);

                Transition::Applied
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        pagination::PaginationConfig,
        transaction::{FilterCriteria, TransactionBatch, test_utils::transaction},
    };

    use super::{Session, SessionEvent, SessionState, Transition};

    fn batch_of(count: u32) -> TransactionBatch {
        TransactionBatch {
            transactions: (1..=count)
                .map(|id| transaction(id, 10.0, "Coming", date!(2024 - 01 - 05)))
                .collect(),
            skipped: 0,
        }
    }

    fn coming_only() -> FilterCriteria {
        FilterCriteria {
            category: Some("Coming".to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn starts_loading_with_default_view() {
        let session = Session::new(PaginationConfig::default());

        assert!(matches!(session.state(), SessionState::Loading));
        assert_eq!(session.view().page, 1);
        assert_eq!(session.view().page_size, 10);
        assert!(session.view().criteria.is_empty());
    }

    #[test]
    fn successful_fetch_makes_session_ready() {
        let mut session = Session::new(PaginationConfig::default());
        let ticket = session.begin_fetch();

        let got = session.apply(SessionEvent::FetchSucceeded {
            ticket,
            batch: batch_of(3),
        });

        assert_eq!(got, Transition::Applied);
        match session.state() {
            SessionState::Ready(store) => assert_eq!(store.len(), 3),
            state => panic!("expected ready state, got {state:?}"),
        }
    }

    #[test]
    fn fetch_without_rows_makes_session_empty() {
        let mut session = Session::new(PaginationConfig::default());
        let ticket = session.begin_fetch();

        session.apply(SessionEvent::FetchSucceeded {
            ticket,
            batch: TransactionBatch {
                transactions: Vec::new(),
                skipped: 2,
            },
        });

        assert!(matches!(
            session.state(),
            SessionState::Empty { skipped_records: 2 }
        ));
    }

    #[test]
    fn failed_fetch_shows_error_until_refresh() {
        let mut session = Session::new(PaginationConfig::default());
        let ticket = session.begin_fetch();

        session.apply(SessionEvent::FetchFailed {
            ticket,
            message: "connection refused".to_owned(),
        });
        assert!(matches!(session.state(), SessionState::Error(message) if message == "connection refused"));

        session.apply(SessionEvent::PageRequested(2));
        assert!(matches!(session.state(), SessionState::Error(_)));

        session.apply(SessionEvent::RefreshRequested);
        assert!(matches!(session.state(), SessionState::Loading));
        assert!(session.is_refreshing());
    }

    #[test]
    fn refresh_keeps_showing_current_data() {
        let mut session = Session::new(PaginationConfig::default());
        let ticket = session.begin_fetch();
        session.apply(SessionEvent::FetchSucceeded {
            ticket,
            batch: batch_of(2),
        });

        session.apply(SessionEvent::RefreshRequested);

        assert!(matches!(session.state(), SessionState::Ready(_)));
        assert!(session.is_refreshing());

        let ticket = session.begin_fetch();
        session.apply(SessionEvent::FetchSucceeded {
            ticket,
            batch: batch_of(5),
        });

        assert!(!session.is_refreshing());
        assert!(matches!(session.state(), SessionState::Ready(store) if store.len() == 5));
    }

    #[test]
    fn stale_fetch_results_are_discarded() {
        let mut session = Session::new(PaginationConfig::default());
        let first = session.begin_fetch();
        let second = session.begin_fetch();

        let newer = session.apply(SessionEvent::FetchSucceeded {
            ticket: second,
            batch: batch_of(2),
        });
        let older = session.apply(SessionEvent::FetchSucceeded {
            ticket: first,
            batch: batch_of(9),
        });
        let older_error = session.apply(SessionEvent::FetchFailed {
            ticket: first,
            message: "timed out".to_owned(),
        });

        assert_eq!(newer, Transition::Applied);
        assert_eq!(older, Transition::Stale);
        assert_eq!(older_error, Transition::Stale);
        assert!(matches!(session.state(), SessionState::Ready(store) if store.len() == 2));
    }

    #[test]
    fn result_of_superseded_fetch_is_stale_even_if_it_arrives_first() {
        let mut session = Session::new(PaginationConfig::default());
        let first = session.begin_fetch();
        let _second = session.begin_fetch();

        let got = session.apply(SessionEvent::FetchSucceeded {
            ticket: first,
            batch: batch_of(1),
        });

        assert_eq!(got, Transition::Stale);
        assert!(matches!(session.state(), SessionState::Loading));
    }

    #[test]
    fn changing_filters_resets_page() {
        let mut session = Session::new(PaginationConfig::default());
        session.apply(SessionEvent::PageRequested(4));

        let got = session.apply(SessionEvent::FiltersChanged(coming_only()));

        assert_eq!(got, Transition::Applied);
        assert_eq!(session.view().page, 1);
        assert_eq!(session.view().criteria, coming_only());
    }

    #[test]
    fn unchanged_filters_keep_page() {
        let mut session = Session::new(PaginationConfig::default());
        session.apply(SessionEvent::FiltersChanged(coming_only()));
        session.apply(SessionEvent::PageRequested(3));

        let got = session.apply(SessionEvent::FiltersChanged(coming_only()));

        assert_eq!(got, Transition::Unchanged);
        assert_eq!(session.view().page, 3);
    }

    #[test]
    fn changing_page_size_resets_page_and_clamps() {
        let mut session = Session::new(PaginationConfig::default());
        session.apply(SessionEvent::PageRequested(3));

        session.apply(SessionEvent::PageSizeChanged(500));

        assert_eq!(session.view().page, 1);
        assert_eq!(session.view().page_size, 100);

        session.apply(SessionEvent::PageSizeChanged(0));

        assert_eq!(session.view().page_size, 1);
    }

    #[test]
    fn page_zero_is_page_one() {
        let mut session = Session::new(PaginationConfig::default());
        session.apply(SessionEvent::PageRequested(2));

        session.apply(SessionEvent::PageRequested(0));

        assert_eq!(session.view().page, 1);
    }
}
