//! HTTP client that downloads every transaction from the configured source API.
//!
//! The dashboard filters locally, so the client always requests the complete
//! list without filter parameters.

use std::time::Duration;

use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::transaction::{SourceFormat, TransactionBatch, decode_batch};

/// The errors that may occur while fetching transactions.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or the response could not be read,
    /// e.g., the server is down or the request timed out.
    #[error("could not reach {url}: {source}")]
    Network {
        /// The URL that was requested.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server responded with a non-success status code.
    #[error("{url} responded with {status}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The status the server sent.
        status: StatusCode,
    },

    /// The response body was not JSON of the expected shape.
    #[error("could not decode the response from {url}: {message}")]
    Decode {
        /// The URL that was requested.
        url: String,
        /// What the JSON decoder reported.
        message: String,
    },

    /// The client could not be set up from the given settings.
    #[error("invalid fetch settings: {0}")]
    Config(String),
}

/// One page of the REST API's transaction listing.
#[derive(Debug, Deserialize)]
struct TransactionPage {
    transactions: Vec<Value>,
    total: u64,
}

/// Fetches transactions from one source API.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http_client: HttpClient,
    base_url: String,
    source: SourceFormat,
    api_key: Option<String>,
}

impl FetchClient {
    /// The page size requested from the REST API.
    pub const REST_PAGE_SIZE: u64 = 100;

    /// Create a client for the API at `base_url`.
    ///
    /// # Errors
    /// Returns [FetchError::Config] if the hosted source is used without an API
    /// key or the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        source: SourceFormat,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        if source == SourceFormat::Hosted && api_key.is_none() {
            return Err(FetchError::Config(
                "the hosted source needs an API key".to_owned(),
            ));
        }

        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| FetchError::Config(error.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            source,
            api_key,
        })
    }

    pub fn source(&self) -> SourceFormat {
        self.source
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Download and decode every transaction the source has.
    ///
    /// Malformed records are skipped and counted in the batch; only transport,
    /// status and response-shape problems are errors.
    pub async fn fetch_all(&self) -> Result<TransactionBatch, FetchError> {
        let records = match self.source {
            SourceFormat::Sms => self.get_json(&format!("{}/sms", self.base_url), &[]).await?,
            SourceFormat::Hosted => {
                self.get_json(
                    &format!("{}/rest/v1/transactions", self.base_url),
                    &[("select", "*".to_owned())],
                )
                .await?
            }
            SourceFormat::Rest => self.fetch_rest_pages().await?,
        };

        tracing::debug!("Received {} {} records", records.len(), self.source);

        Ok(decode_batch(self.source, records))
    }

    /// Walk the REST API's pages until `total` records arrived or a page is empty.
    async fn fetch_rest_pages(&self) -> Result<Vec<Value>, FetchError> {
        let url = format!("{}/transactions", self.base_url);
        let mut records = Vec::new();
        let mut page = 1_u64;

        loop {
            let envelope: TransactionPage = self
                .get_json(
                    &url,
                    &[
                        ("page", page.to_string()),
                        ("per_page", Self::REST_PAGE_SIZE.to_string()),
                    ],
                )
                .await?;

            let received = envelope.transactions.len();
            records.extend(envelope.transactions);

            if received == 0 || records.len() as u64 >= envelope.total {
                break;
            }

            page += 1;
        }

        Ok(records)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let mut request = self.http_client.get(url).query(query);

        if let (SourceFormat::Hosted, Some(api_key)) = (self.source, &self.api_key) {
            request = request.header("apikey", api_key).bearer_auth(api_key);
        }

        let network_error = |source| FetchError::Network {
            url: url.to_owned(),
            source,
        };

        let response = request.send().await.map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status,
            });
        }

        let body = response.bytes().await.map_err(network_error)?;

        serde_json::from_slice(&body).map_err(|error| FetchError::Decode {
            url: url.to_owned(),
            message: error.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        Json, Router,
        extract::Query,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::get,
    };
    use serde::Deserialize;
    use serde_json::{Value, json};

    use crate::transaction::SourceFormat;

    use super::{FetchClient, FetchError};

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("could not bind test listener");
        let address = listener.local_addr().expect("listener has an address");

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("test server failed");
        });

        format!("http://{address}")
    }

    fn ledger_record(id: u32, amount: &str) -> Value {
        json!({
            "id": id,
            "amount": amount,
            "transaction_type": "Incoming Money",
            "date": "2024-05-10T16:30:51",
            "sender": "Jane Smith",
            "receiver": null,
            "message": "You have received 2000 RWF from Jane Smith."
        })
    }

    #[tokio::test]
    async fn fetches_sms_records_and_skips_malformed_ones() {
        let router = Router::new().route(
            "/sms",
            get(|| async {
                Json(json!([
                    {
                        "id": 1,
                        "amount": 2000,
                        "category": "Coming",
                        "message_type": "Incoming Money",
                        "date": "2024-05-10 16:30:51",
                        "message": "You have received 2000 RWF."
                    },
                    {
                        "id": 2,
                        "amount": "lots",
                        "category": "Going",
                        "date": "2024-05-11"
                    }
                ]))
            }),
        );
        let base_url = serve(router).await;
        let client = FetchClient::new(&base_url, SourceFormat::Sms, None, TIMEOUT)
            .expect("could not create client");

        let batch = client.fetch_all().await.expect("fetch failed");

        assert_eq!(batch.transactions.len(), 1);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.transactions[0].category, "Coming");
    }

    #[derive(Deserialize)]
    struct PageQuery {
        page: u64,
        per_page: u64,
    }

    #[tokio::test]
    async fn walks_rest_pages_until_total_is_reached() {
        // The server ignores the requested page size and sends two per page.
        let router = Router::new().route(
            "/transactions",
            get(|Query(query): Query<PageQuery>| async move {
                assert_eq!(query.per_page, FetchClient::REST_PAGE_SIZE);

                let transactions = match query.page {
                    1 => vec![ledger_record(1, "2,000 RWF"), ledger_record(2, "500 RWF")],
                    2 => vec![ledger_record(3, "40 RWF")],
                    _ => vec![],
                };

                Json(json!({
                    "transactions": transactions,
                    "total": 3,
                    "page": query.page,
                    "per_page": 2
                }))
            }),
        );
        let base_url = serve(router).await;
        let client = FetchClient::new(&base_url, SourceFormat::Rest, None, TIMEOUT)
            .expect("could not create client");

        let batch = client.fetch_all().await.expect("fetch failed");

        let amounts: Vec<f64> = batch.transactions.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, [2000.0, 500.0, 40.0]);
        assert_eq!(batch.transactions[0].sender.as_deref(), Some("Jane Smith"));
        assert_eq!(batch.transactions[0].receiver, None);
    }

    #[tokio::test]
    async fn rest_stops_at_an_empty_page() {
        let router = Router::new().route(
            "/transactions",
            get(|Query(query): Query<PageQuery>| async move {
                let transactions = match query.page {
                    1 => vec![ledger_record(1, "10")],
                    _ => vec![],
                };

                Json(json!({ "transactions": transactions, "total": 50 }))
            }),
        );
        let base_url = serve(router).await;
        let client = FetchClient::new(&base_url, SourceFormat::Rest, None, TIMEOUT)
            .expect("could not create client");

        let batch = client.fetch_all().await.expect("fetch failed");

        assert_eq!(batch.transactions.len(), 1);
    }

    #[tokio::test]
    async fn hosted_source_sends_api_key() {
        let router = Router::new().route(
            "/rest/v1/transactions",
            get(|headers: HeaderMap| async move {
                let api_key = headers.get("apikey").and_then(|value| value.to_str().ok());
                let authorization = headers
                    .get("authorization")
                    .and_then(|value| value.to_str().ok());

                if api_key != Some("secret") || authorization != Some("Bearer secret") {
                    return StatusCode::UNAUTHORIZED.into_response();
                }

                Json(json!([ledger_record(7, "1500")])).into_response()
            }),
        );
        let base_url = serve(router).await;
        let client = FetchClient::new(
            &base_url,
            SourceFormat::Hosted,
            Some("secret".to_owned()),
            TIMEOUT,
        )
        .expect("could not create client");

        let batch = client.fetch_all().await.expect("fetch failed");

        assert_eq!(batch.transactions.len(), 1);
        assert_eq!(batch.transactions[0].id.as_str(), "7");
    }

    #[test]
    fn hosted_source_requires_api_key() {
        let result = FetchClient::new("http://localhost", SourceFormat::Hosted, None, TIMEOUT);

        assert!(matches!(result, Err(FetchError::Config(_))));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let router = Router::new().route(
            "/sms",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let base_url = serve(router).await;
        let client = FetchClient::new(&base_url, SourceFormat::Sms, None, TIMEOUT)
            .expect("could not create client");

        let result = client.fetch_all().await;

        assert!(matches!(
            result,
            Err(FetchError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn unexpected_body_is_a_decode_error() {
        let router = Router::new().route("/sms", get(|| async { "<html>maintenance</html>" }));
        let base_url = serve(router).await;
        let client = FetchClient::new(&base_url, SourceFormat::Sms, None, TIMEOUT)
            .expect("could not create client");

        let result = client.fetch_all().await;

        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("could not bind test listener");
        let address = listener.local_addr().expect("listener has an address");
        drop(listener);
        let client = FetchClient::new(
            &format!("http://{address}/"),
            SourceFormat::Sms,
            None,
            TIMEOUT,
        )
        .expect("could not create client");

        let result = client.fetch_all().await;

        assert!(matches!(result, Err(FetchError::Network { .. })));
    }
}
