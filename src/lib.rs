//! MoMo Dashboard is a web app for exploring mobile money transactions.
//!
//! This library fetches the transactions from a source API once per session
//! and serves HTML pages with a filterable, paginated table, summary cards and
//! charts. A few JSON endpoints expose the same filtered data.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod alert;
mod api;
mod app_state;
mod config;
mod dashboard;
mod debounce;
mod endpoints;
mod fetch;
mod html;
mod internal_server_error;
mod logging;
mod not_found;
mod pagination;
mod refresh;
mod routing;
mod session;
#[cfg(test)]
mod test_utils;
mod transaction;

pub use app_state::AppState;
pub use config::DashboardConfig;
pub use fetch::FetchError;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::SourceFormat;

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response, transaction::TransactionId,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the path is
    /// correct.
    #[error("the requested resource could not be found")]
    NotFound,

    /// No transaction in the current data has the requested ID.
    ///
    /// This may happen after a refresh replaced the data the client was
    /// looking at.
    #[error("no transaction with the ID {0}")]
    TransactionNotFound(TransactionId),

    /// The transactions have not been loaded yet, or the last fetch failed.
    #[error("the transactions are not available")]
    TransactionsUnavailable,

    /// Could not acquire the session lock
    #[error("could not acquire the session lock")]
    SessionLockError,

    /// The summary endpoint was asked to group by an unknown field.
    #[error("cannot group transactions by \"{0}\"")]
    InvalidGroupBy(String),

    /// The fetch client could not be created or a fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::TransactionNotFound(_) | Error::TransactionsUnavailable => {
                self.into_alert_response()
            }
            Error::SessionLockError => InternalServerError::session_unavailable().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::TransactionNotFound(id) => Alert::error(
                "Transaction not found",
                &format!(
                    "Could not find a transaction with the ID {id}. \
                    The data may have been refreshed, try reloading the page."
                ),
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::TransactionsUnavailable => Alert::error(
                "Transactions not loaded",
                "The transactions are still loading or could not be fetched.",
            )
            .into_response_with_status(StatusCode::SERVICE_UNAVAILABLE),
            Error::SessionLockError => Alert::error(
                "Dashboard unavailable",
                "The dashboard session is unavailable. Restart the server to start a new session.",
            )
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
                .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// Render the error as a JSON object with an `error` message for the JSON endpoints.
    fn into_json_response(self) -> Response {
        let status = match &self {
            Error::NotFound | Error::TransactionNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidGroupBy(_) => StatusCode::BAD_REQUEST,
            Error::TransactionsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::SessionLockError | Error::Fetch(_) => {
                tracing::error!("An unexpected error occurred: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
