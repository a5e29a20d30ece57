//! Background fetches that feed their result back into the session.

use std::{sync::Arc, time::Duration};

use crate::{
    Error,
    debounce::Debouncer,
    fetch::FetchClient,
    session::{SessionEvent, SharedSession, Transition},
};

/// Fetch every transaction and apply the result to `session`.
///
/// The fetch takes a ticket before the request is sent. If another fetch was
/// started in the meantime the result is discarded.
pub async fn run_fetch(session: SharedSession, client: FetchClient) {
    let ticket = match session.lock() {
        Ok(mut session) => session.begin_fetch(),
        Err(error) => {
            tracing::error!("could not acquire session lock: {error}");
            return;
        }
    };

    let event = match client.fetch_all().await {
        Ok(batch) => SessionEvent::FetchSucceeded { ticket, batch },
        Err(error) => {
            tracing::error!("Failed to fetch transactions from {}: {error}", client.base_url());
            SessionEvent::FetchFailed {
                ticket,
                message: format!("Failed to load transactions: {error}"),
            }
        }
    };

    match session.lock() {
        Ok(mut session) => {
            if session.apply(event) == Transition::Stale {
                tracing::info!("A newer fetch superseded fetch {ticket:?}");
            }
        }
        Err(error) => tracing::error!("could not acquire session lock: {error}"),
    }
}

/// Starts fetches for the dashboard session.
#[derive(Debug, Clone)]
pub struct Refresher {
    session: SharedSession,
    client: FetchClient,
    debouncer: Arc<Debouncer>,
}

impl Refresher {
    /// Create a refresher whose refreshes wait `delay` for further requests.
    pub fn new(session: SharedSession, client: FetchClient, delay: Duration) -> Self {
        Self {
            session,
            client,
            debouncer: Arc::new(Debouncer::new(delay)),
        }
    }

    /// Start the first fetch immediately.
    ///
    /// A refresh requested before this fetch finishes cancels it.
    pub fn load(&self) {
        tracing::info!(
            "Loading transactions from the {} source at {}",
            self.client.source(),
            self.client.base_url()
        );
        self.debouncer
            .trigger_now(run_fetch(self.session.clone(), self.client.clone()));
    }

    /// Mark the session as refreshing and schedule a debounced fetch.
    ///
    /// A request that arrives while an earlier refresh is still waiting or
    /// running cancels the earlier one.
    ///
    /// # Errors
    /// Returns [Error::SessionLockError] if the session lock is poisoned.
    pub fn request_refresh(&self) -> Result<(), Error> {
        self.session
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire session lock: {error}"))
            .map_err(|_| Error::SessionLockError)?
            .apply(SessionEvent::RefreshRequested);

        self.debouncer
            .trigger(run_fetch(self.session.clone(), self.client.clone()));

        Ok(())
    }
}
