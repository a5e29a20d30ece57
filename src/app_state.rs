//! Implements a struct that holds the state of the dashboard server.

use std::sync::{Arc, Mutex};

use crate::{
    Error,
    config::DashboardConfig,
    fetch::FetchClient,
    pagination::PaginationConfig,
    refresh::Refresher,
    session::{Session, SharedSession},
};

/// The state of the dashboard server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The one dashboard session of this server.
    pub session: SharedSession,

    /// Starts fetches that update `session`.
    pub refresher: Refresher,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,

    /// The unit shown next to amounts, e.g., "RWF".
    pub currency: String,
}

impl AppState {
    /// Create a new [AppState] with a session in the loading state.
    ///
    /// Nothing is fetched until [Refresher::load] is called on `refresher`.
    ///
    /// # Errors
    /// Returns an error if the fetch client cannot be created from `config`,
    /// e.g., the hosted source is used without an API key.
    pub fn new(config: &DashboardConfig) -> Result<Self, Error> {
        let client = FetchClient::new(
            &config.api_url,
            config.source,
            config.api_key.clone(),
            config.request_timeout,
        )
        .inspect_err(|error| tracing::error!("could not create the fetch client: {error}"))?;

        let pagination_config = config.pagination_config();
        let session = Arc::new(Mutex::new(Session::new(pagination_config.clone())));
        let refresher = Refresher::new(session.clone(), client, config.refresh_delay);

        Ok(Self {
            session,
            refresher,
            pagination_config,
            currency: config.currency.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, config::DashboardConfig, fetch::FetchError, transaction::SourceFormat};

    use super::AppState;

    #[tokio::test]
    async fn hosted_source_without_key_fails() {
        let config = DashboardConfig::new("http://localhost:5000", SourceFormat::Hosted);

        let result = AppState::new(&config);

        assert!(matches!(result, Err(Error::Fetch(FetchError::Config(_)))));
    }

    #[tokio::test]
    async fn new_session_starts_loading() {
        let config = DashboardConfig::new("http://localhost:5000", SourceFormat::Sms);

        let state = AppState::new(&config).expect("could not create app state");

        let session = state.session.lock().unwrap();
        assert!(matches!(
            session.state(),
            crate::session::SessionState::Loading
        ));
        assert_eq!(session.view().page_size, 10);
    }
}
