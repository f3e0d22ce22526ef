//! GoFinTech is a web app for keeping track of household income and expenses.
//!
//! This library provides a JSON REST API for managing transactions and
//! server-rendered HTML pages: a dashboard, a list of all transactions, and
//! forms for adding, editing and deleting a transaction.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod config;
mod cors;
mod dashboard;
mod database_id;
mod endpoints;
mod html;
mod logging;
mod navigation;
mod not_found;
mod routing;
mod store;
mod transaction;

pub use app_state::AppState;
pub use config::Config;
pub use cors::{ALLOWED_HEADERS, ALLOWED_METHODS, cors_middleware};
pub use database_id::{TransactionId, parse_transaction_id};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use store::{
    CONNECT_TIMEOUT, DEFAULT_DATABASE_NAME, Database, OPERATION_TIMEOUT, StoreError,
    TRANSACTION_COLLECTION, TransactionCollection, connect,
};
pub use transaction::{
    DATE_FORMAT, DeleteConfirmation, Transaction, TransactionFields, TransactionForm,
    TransactionInput, TransactionType, create_transaction, delete_transaction, get_transaction,
    list_transactions, parse_date, update_transaction,
};

use crate::{html::error_view, not_found::get_404_not_found_response};

/// How long in-flight requests get to finish once shutdown starts.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received ctrl+c signal, shutting down.");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down.");
        },
    }

    handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
}

/// The errors that may occur in the application.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Error {
    /// The path parameter is not a valid transaction ID.
    #[error("Invalid ID format")]
    InvalidId,

    /// The request body is missing a field, has a malformed field, or is not
    /// valid JSON.
    ///
    /// The string is shown to the client as is.
    #[error("{0}")]
    Validation(String),

    /// No transaction has the requested ID.
    #[error("Transaction not found")]
    NotFound,

    /// A store operation failed or timed out.
    ///
    /// The underlying error is logged where it happens; the message here
    /// only names the operation that failed and is safe to show to clients.
    #[error("{0}")]
    Storage(&'static str),

    /// The store could not be reached or prepared at start-up.
    #[error("could not connect to the store: {0}")]
    Connection(String),
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidId | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Storage(_) | Error::Connection(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the error as an HTML page for the server-rendered views.
    ///
    /// A malformed ID cannot name a transaction, so it gets the 404 page too.
    pub(crate) fn into_page_response(self) -> Response {
        match self {
            Error::NotFound | Error::InvalidId => get_404_not_found_response(),
            error => {
                tracing::error!("Could not render page: {error}");

                (
                    error.status_code(),
                    error_view(
                        "Internal Server Error",
                        "500",
                        "Something went wrong.",
                        "An unexpected error occurred, check the server logs for more details.",
                    ),
                )
                    .into_response()
            }
        }
    }
}

/// The JSON body sent to clients when a request fails.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::Error;

    async fn get_server(error: Error) -> axum_test::TestResponse {
        let app = Router::new().route("/", get(move || async move { error.into_response() }));
        let server = TestServer::new(app).expect("Could not create test server.");

        server.get("/").await
    }

    #[tokio::test]
    async fn invalid_id_is_bad_request() {
        let response = get_server(Error::InvalidId).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "Invalid ID format"}));
    }

    #[tokio::test]
    async fn validation_message_is_passed_through() {
        let response = get_server(Error::Validation("amount is required".to_owned())).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "amount is required"}));
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let response = get_server(Error::NotFound).await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({"error": "Transaction not found"}));
    }

    #[tokio::test]
    async fn storage_error_is_500_with_operation_message() {
        let response = get_server(Error::Storage("Error creating transaction")).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({"error": "Error creating transaction"}));
    }

    #[tokio::test]
    async fn page_response_is_html() {
        let app = Router::new().route(
            "/",
            get(|| async { Error::Storage("Error retrieving transactions").into_page_response() }),
        );
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server.get("/").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.text().contains("Something went wrong."));
        assert!(response.header("content-type").to_str().unwrap().starts_with("text/html"));
    }

    #[tokio::test]
    async fn page_response_for_missing_or_malformed_id_is_404() {
        for error in [Error::NotFound, Error::InvalidId] {
            let app = Router::new().route(
                "/",
                get(move || async move { error.into_page_response() }),
            );
            let server = TestServer::new(app).expect("Could not create test server.");

            let response = server.get("/").await;

            response.assert_status(StatusCode::NOT_FOUND);
            assert!(response.text().contains("Something's missing."));
        }
    }
}
