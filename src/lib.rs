//! Centsible is a self-hosted web app for tracking a household budget.
//!
//! Transactions are entered into five fixed categories (income, expenses,
//! bills, savings, debt). The app shows per-category totals, the derived
//! net cash flow and amount left to spend, and a pie chart of the budget
//! distribution. Entries are persisted to SQLite once a user has signed in;
//! before that, edits live only in memory.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod budget;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod log_in;
mod log_out;
mod logging;
mod navigation;
mod not_found;
mod password;
mod register_user;
mod routing;
mod session;
mod timezone;
mod user;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use session::SessionStore;
pub use user::{User, UserID, get_user_by_id};

pub use budget::spawn_session_sync;

use crate::{
    alert::alert_error, internal_server_error::get_internal_server_error_response,
    not_found::get_404_not_found_response,
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
    /// The user provided an invalid password.
    #[error("invalid password")]
    InvalidCredentials,

    /// The session token cookie is missing from the cookie jar in the request.
    #[error("no session token in the cookie jar")]
    CookieMissing,

    /// The session token could not be serialized to or parsed from JSON.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not read or write the session token: {0}")]
    InvalidToken(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A string did not name one of the five budget categories.
    #[error("\"{0}\" is not a budget category")]
    InvalidCategory(String),

    /// A string could not be parsed as a calendar date.
    #[error("\"{0}\" is not a valid date")]
    InvalidDate(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Loading budget entries from the store failed.
    ///
    /// Callers are expected to log this error and leave their prior state
    /// untouched. There are no retries.
    #[error("could not load budget entries from the store: {0}")]
    StoreQuery(rusqlite::Error),

    /// Writing budget entries to the store failed.
    ///
    /// The in-memory state is not rolled back when this happens; the store
    /// and the page may diverge until the next successful reconcile or
    /// reload.
    #[error("could not write budget entries to the store: {0}")]
    StoreWrite(rusqlite::Error),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
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
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => get_internal_server_error_response(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                ),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                get_internal_server_error_response(
                    "Sorry, something went wrong.",
                    "Try again later or check the server logs",
                )
            }
        }
    }
}

impl Error {
    /// Render the error as an htmx alert partial instead of a full page.
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidCategory(name) => (
                StatusCode::BAD_REQUEST,
                alert_error(
                    "Invalid category",
                    &format!("\"{name}\" is not one of the budget categories."),
                ),
            )
                .into_response(),
            Error::InvalidDate(date) => (
                StatusCode::BAD_REQUEST,
                alert_error(
                    "Invalid date",
                    &format!("\"{date}\" is not a valid calendar date."),
                ),
            )
                .into_response(),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                alert_error(
                    "Could not find entry",
                    "The entry could not be found. \
                    Try refreshing the page to see if it has already been deleted.",
                ),
            )
                .into_response(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    alert_error(
                        "Something went wrong",
                        "An unexpected error occurred. Try again later or check the logs on the server.",
                    ),
                )
                    .into_response()
            }
        }
    }
}
