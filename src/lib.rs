//! Moneta is a web service for tracking personal income and expenses.
//!
//! This library provides the JSON API and the engine that turns recurring
//! transaction definitions (rent, wages, subscriptions) into concrete,
//! dated transactions. The expansion is deterministic and idempotent: a
//! definition visited twice for the same day produces its transactions
//! exactly once, whether the visit came from the daily sweep or from the
//! creation endpoint.

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

mod calendar;
mod category;
mod clock;
mod database_id;
mod db;
mod engine;
mod models;
mod routes;
mod scheduler;
mod state;
mod stores;

pub use calendar::next_occurrence;
pub use category::CategoryCatalog;
pub use clock::{Clock, FixedClock, SystemClock};
pub use database_id::{DatabaseId, UserId};
pub use db::initialize;
pub use engine::{MaterializeOutcome, SweepReport, materialize, materialize_on_create, run_sweep};
pub use models::{
    Frequency, NewRecurringDefinition, NewTransaction, RecurringDefinition, Transaction,
    TransactionKind, parse_date,
};
pub use routes::build_router;
pub use scheduler::{SchedulerHandle, SweepScheduler};
pub use state::AppState;
pub use stores::{
    RecurringStore, TransactionStore,
    sqlite::{SQLiteRecurringStore, SQLiteTransactionStore},
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
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A frequency string was not one of the supported recurrence
    /// frequencies (`weekly`, `bi-weekly`, `monthly`).
    #[error("{0} is not a valid frequency")]
    InvalidFrequency(String),

    /// A date string did not parse as a zero-padded `YYYY-MM-DD` date.
    ///
    /// Dates cross the API boundary as plain calendar-date strings with no
    /// time-of-day or timezone component, so that a transaction dated
    /// `2024-01-31` stays on the 31st no matter where the client is.
    #[error("{0} is not a valid YYYY-MM-DD date")]
    InvalidDateString(String),

    /// A transaction kind string was neither `Income` nor `Expense`.
    #[error("{0} is not a valid transaction kind")]
    InvalidTransactionKind(String),

    /// A recurring definition was given an amount of zero or less.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    /// A recurring definition was given an empty description.
    #[error("description must not be empty")]
    EmptyDescription,

    /// The category does not exist for the given transaction kind.
    #[error("{0} is not a known category for this transaction kind")]
    UnknownCategory(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the
    /// parameters (e.g., ID) are correct and that the resource has been
    /// created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A concurrent materialization pass advanced a definition's watermark
    /// first, so this pass's conditional update did not apply.
    #[error("the recurring definition was processed concurrently")]
    WatermarkConflict,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::InvalidFrequency(_)
            | Error::InvalidDateString(_)
            | Error::InvalidTransactionKind(_)
            | Error::NonPositiveAmount
            | Error::EmptyDescription
            | Error::UnknownCategory(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Error::WatermarkConflict => (StatusCode::CONFLICT, self.to_string()),
            // SQL errors are not intended to be shown to the client.
            Error::SqlError(error) => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an internal error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
