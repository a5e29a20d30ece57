//! Settings for a dashboard server.

use std::time::Duration;

use crate::{pagination::PaginationConfig, transaction::SourceFormat};

/// Everything needed to build the [AppState](crate::AppState) of a dashboard.
///
/// The server binary fills this in from its command line arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// The base URL of the transactions API, e.g., "http://localhost:5000".
    pub api_url: String,
    /// The shape of the API at `api_url`.
    pub source: SourceFormat,
    /// The key sent to the hosted source.
    pub api_key: Option<String>,
    /// The number of rows per page before the user picks another page size.
    pub page_size: u64,
    /// How long a refresh waits for further refresh requests before fetching.
    pub refresh_delay: Duration,
    /// How long a request to the API may take.
    pub request_timeout: Duration,
    /// The unit shown next to amounts, e.g., "RWF".
    pub currency: String,
}

impl DashboardConfig {
    /// A config for `api_url` with the default settings of the server binary.
    pub fn new(api_url: &str, source: SourceFormat) -> Self {
        Self {
            api_url: api_url.to_owned(),
            source,
            api_key: None,
            page_size: PaginationConfig::default().default_page_size,
            refresh_delay: Duration::from_millis(300),
            request_timeout: Duration::from_secs(30),
            currency: "RWF".to_owned(),
        }
    }

    /// The pagination settings with the configured page size.
    pub fn pagination_config(&self) -> PaginationConfig {
        let defaults = PaginationConfig::default();

        PaginationConfig {
            default_page_size: defaults.clamp_page_size(self.page_size),
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::transaction::SourceFormat;

    use super::DashboardConfig;

    #[test]
    fn page_size_is_clamped() {
        let mut config = DashboardConfig::new("http://localhost:5000", SourceFormat::Sms);

        config.page_size = 0;
        assert_eq!(config.pagination_config().default_page_size, 1);

        config.page_size = 1_000;
        assert_eq!(config.pagination_config().default_page_size, 100);

        config.page_size = 25;
        assert_eq!(config.pagination_config().default_page_size, 25);
    }
}
