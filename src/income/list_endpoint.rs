//! Defines the endpoints for listing income and getting a single income.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, params};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    date_range::DateRange,
    db::lock_connection,
    extract::ApiQuery,
    income::core::{INCOME_COLUMNS, Income, IncomeId, IncomeState, get_income, map_row_to_income},
};

/// The optional filters for listing income.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncomeQuery {
    #[serde(rename = "dataInicio")]
    pub start: Option<Date>,
    #[serde(rename = "dataFim")]
    pub end: Option<Date>,
    #[serde(rename = "categoria")]
    pub category: Option<String>,
}

/// A route handler for listing income, newest first.
pub async fn list_incomes_endpoint(
    State(state): State<IncomeState>,
    ApiQuery(query): ApiQuery<IncomeQuery>,
) -> Result<Json<Vec<Income>>, Error> {
    let range = DateRange::new(query.start, query.end)?;
    let connection = lock_connection(&state.db_connection)?;

    query_incomes(range, query.category.as_deref(), &connection).map(Json)
}

/// A route handler for getting an income by its ID.
pub async fn get_income_endpoint(
    State(state): State<IncomeState>,
    Path(income_id): Path<IncomeId>,
) -> Result<Json<Income>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_income(income_id, &connection).map(Json)
}

fn query_incomes(
    range: DateRange,
    category: Option<&str>,
    connection: &Connection,
) -> Result<Vec<Income>, Error> {
    let category = category.map(str::trim).filter(|category| !category.is_empty());

    connection
        .prepare(&format!(
            "SELECT {INCOME_COLUMNS} FROM income \
            WHERE {} AND (?3 IS NULL OR category = ?3) \
            ORDER BY date DESC, id DESC",
            DateRange::sql_condition("date", 1)
        ))?
        .query_map(params![range.start, range.end, category], map_row_to_income)?
        .map(|income| income.map_err(Error::from))
        .collect()
}
