//! Financas is a REST service for managing personal finances.
//!
//! It tracks expenses, income, credit cards and their monthly invoices,
//! budgets, goals, categories and reminders in a SQLite database and serves
//! them as JSON.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use time::Date;
use tokio::signal;

mod app_state;
mod budget;
mod card;
mod category;
mod config;
mod csv_import;
mod dashboard;
mod database_id;
mod date_range;
mod db;
mod endpoints;
mod expense;
mod extract;
mod goal;
mod history;
mod income;
mod invoice;
mod logging;
mod month;
mod password;
mod reminder;
mod routing;
#[cfg(test)]
mod test_utils;
mod timezone;
mod user;

pub use app_state::AppState;
pub use config::Settings;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;

use crate::card::CardId;

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
    /// The request body could not be parsed as the expected JSON document,
    /// e.g. a required field is missing or has the wrong type.
    #[error("invalid request body: {0}")]
    InvalidRequestBody(String),

    /// The query string could not be parsed.
    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    /// A required text field was empty.
    #[error("the field \"{0}\" must not be empty")]
    EmptyField(&'static str),

    /// A monetary amount was negative, zero where not allowed, or not finite.
    #[error("{0} is not a valid amount")]
    InvalidAmount(f64),

    /// The payment method string did not match a known payment method.
    #[error("\"{0}\" is not a valid payment method")]
    InvalidPaymentMethod(String),

    /// A credit card purchase was split into an unsupported number of installments.
    #[error("{0} is not a valid number of installments, expected 1 to 36")]
    InvalidInstallmentCount(u32),

    /// A credit card purchase was made without a card.
    #[error("credit card purchases must reference a card")]
    MissingCard,

    /// A closing or due day was outside 1 to 31.
    #[error("{0} is not a valid day of the month")]
    InvalidDayOfMonth(u8),

    /// A reference month string was not formatted as `YYYY-MM`.
    #[error("\"{0}\" is not a valid month, expected the format YYYY-MM")]
    InvalidMonth(String),

    /// The start of a date range was after its end.
    #[error("the start date {0} is after the end date {1}")]
    InvalidDateRange(Date, Date),

    /// A recurring income did not specify how often it recurs.
    #[error("recurring income must specify a recurrence interval")]
    MissingRecurrenceInterval,

    /// A category, status or interval string was not one of the accepted values.
    #[error("\"{0}\" is not a valid value for {1}")]
    InvalidVariant(String, &'static str),

    /// The card ID used to create an expense or invoice did not match a card.
    #[error("the card ID {0} does not refer to a valid card")]
    InvalidCard(CardId),

    /// A card cannot be deleted while expenses or invoices reference it.
    #[error("the card {0} still has expenses or invoices")]
    CardInUse(CardId),

    /// An invoice payment was larger than the outstanding balance.
    #[error("the payment {0:.2} is larger than the outstanding balance {1:.2}")]
    PaymentExceedsBalance(f64, f64),

    /// The invoice has already been paid in full.
    #[error("the invoice has already been paid")]
    InvoiceAlreadyPaid,

    /// The category name already exists for that category type.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategory(String),

    /// A budget already exists for the category and month.
    #[error("a budget for \"{0}\" in {1} already exists")]
    DuplicateBudget(String, String),

    /// The email address is already registered.
    #[error("the email \"{0}\" is already registered")]
    DuplicateEmail(String),

    /// The email address is not of the form `name@domain`.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The current password given when changing a password did not match.
    #[error("the current password is incorrect")]
    IncorrectPassword,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The multipart form could not be parsed as a list of CSV files.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// The multipart form did not contain a CSV file.
    #[error("file is not a CSV")]
    NotCSV,

    /// The CSV had issues that prevented it from being parsed.
    #[error("could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// The CSV header is missing columns needed to create rows.
    #[error("the CSV file is missing the required columns: {}", .0.join(", "))]
    MissingCSVColumns(Vec<String>),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The settings file could not be read or parsed.
    #[error("could not load settings: {0}")]
    SettingsError(String),
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

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequestBody(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidQuery(rejection.body_text())
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::HashingError(_)
            | Error::InvalidTimezoneError(_)
            | Error::SettingsError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server errors are logged in full but only described generically to the client.
        let message = if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
