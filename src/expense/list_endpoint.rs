//! Defines the endpoints for listing expenses and getting a single expense.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, params};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    card::CardId,
    date_range::DateRange,
    db::lock_connection,
    expense::core::{
        EXPENSE_COLUMNS, Expense, ExpenseId, ExpenseState, get_expense, map_row_to_expense,
    },
    extract::ApiQuery,
};

/// The optional filters for listing expenses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseQuery {
    /// Only include expenses on or after this date.
    #[serde(rename = "dataInicio")]
    pub start: Option<Date>,
    /// Only include expenses on or before this date.
    #[serde(rename = "dataFim")]
    pub end: Option<Date>,
    #[serde(rename = "categoria")]
    pub category: Option<String>,
    #[serde(rename = "cartao_id")]
    pub card_id: Option<CardId>,
}

/// A route handler for listing expenses, newest first.
pub async fn list_expenses_endpoint(
    State(state): State<ExpenseState>,
    ApiQuery(query): ApiQuery<ExpenseQuery>,
) -> Result<Json<Vec<Expense>>, Error> {
    let range = DateRange::new(query.start, query.end)?;
    let connection = lock_connection(&state.db_connection)?;

    query_expenses(range, &query, &connection).map(Json)
}

/// A route handler for getting an expense by its ID.
pub async fn get_expense_endpoint(
    State(state): State<ExpenseState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Json<Expense>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_expense(expense_id, &connection).map(Json)
}

fn query_expenses(
    range: DateRange,
    query: &ExpenseQuery,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|category| !category.is_empty());

    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense \
            WHERE {} \
            AND (?3 IS NULL OR category = ?3) \
            AND (?4 IS NULL OR card_id = ?4) \
            ORDER BY date DESC, id DESC",
            DateRange::sql_condition("date", 1)
        ))?
        .query_map(
            params![range.start, range.end, category, query.card_id],
            map_row_to_expense,
        )?
        .map(|expense| expense.map_err(Error::from))
        .collect()
}
