//! Defines the monthly budget model and its database queries.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, database_id::DatabaseId, month::ReferenceMonth};

pub type BudgetId = DatabaseId;

/// A spending limit for an expense category in a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "mes")]
    pub month: ReferenceMonth,
    #[serde(rename = "limite")]
    pub limit: f64,
}

/// The request body for creating or updating a budget.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetForm {
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "mes")]
    pub month: String,
    #[serde(rename = "limite")]
    pub limit: f64,
}

impl BudgetForm {
    /// Check the form and parse its month.
    pub fn validate(&self) -> Result<ReferenceMonth, Error> {
        if self.category.trim().is_empty() {
            return Err(Error::EmptyField("categoria"));
        }

        if !self.limit.is_finite() || self.limit < 0.0 {
            return Err(Error::InvalidAmount(self.limit));
        }

        self.month.trim().parse()
    }
}

pub(super) const BUDGET_COLUMNS: &str = "id, category, month, limit_amount";

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            category TEXT NOT NULL,
            month TEXT NOT NULL,
            limit_amount REAL NOT NULL,
            UNIQUE(category, month)
        )",
        (),
    )?;

    Ok(())
}

pub(super) fn map_row_to_budget(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        category: row.get(1)?,
        month: row.get(2)?,
        limit: row.get(3)?,
    })
}

pub(super) fn map_duplicate_budget(
    category: &str,
    month: ReferenceMonth,
) -> impl Fn(rusqlite::Error) -> Error + '_ {
    move |error| match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateBudget(category.to_owned(), month.to_string()),
        error => error.into(),
    }
}

/// Insert a budget.
///
/// # Errors
/// Returns [Error::DuplicateBudget] if the category already has a budget for `month`.
pub fn create_budget(
    category: &str,
    month: ReferenceMonth,
    limit: f64,
    connection: &Connection,
) -> Result<Budget, Error> {
    let category = category.trim();

    connection
        .query_one(
            &format!(
                "INSERT INTO budget (category, month, limit_amount) VALUES (?1, ?2, ?3) \
                RETURNING {BUDGET_COLUMNS}"
            ),
            params![category, month, limit],
            map_row_to_budget,
        )
        .map_err(map_duplicate_budget(category, month))
}

pub fn get_budget(id: BudgetId, connection: &Connection) -> Result<Budget, Error> {
    connection
        .query_one(
            &format!("SELECT {BUDGET_COLUMNS} FROM budget WHERE id = ?1"),
            params![id],
            map_row_to_budget,
        )
        .map_err(Error::from)
}

/// Get the budgets, optionally only those for `month`, ordered by month then category.
pub fn get_budgets(
    month: Option<ReferenceMonth>,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budget \
            WHERE ?1 IS NULL OR month = ?1 \
            ORDER BY month, category"
        ))?
        .query_map(params![month], map_row_to_budget)?
        .map(|budget| budget.map_err(Error::from))
        .collect()
}

/// State needed for the budget endpoints.
#[derive(Debug, Clone)]
pub struct BudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// Decides the current month when no month is requested.
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.settings.timezone.clone(),
        }
    }
}
