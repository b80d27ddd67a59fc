//! Defines the route handlers for the history reports.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    date_range::DateRange,
    db::lock_connection,
    extract::ApiQuery,
    history::core::{CategoryTotal, MonthlyTotals, get_category_totals, get_monthly_history},
};

/// State needed for the history endpoints.
#[derive(Debug, Clone)]
pub struct HistoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HistoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The optional inclusive date bounds of a report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(rename = "dataInicio")]
    pub start: Option<Date>,
    #[serde(rename = "dataFim")]
    pub end: Option<Date>,
}

pub async fn monthly_history_endpoint(
    State(state): State<HistoryState>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> Result<Json<Vec<MonthlyTotals>>, Error> {
    let range = DateRange::new(query.start, query.end)?;
    let connection = lock_connection(&state.db_connection)?;

    get_monthly_history(range, &connection).map(Json)
}

pub async fn category_history_endpoint(
    State(state): State<HistoryState>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> Result<Json<Vec<CategoryTotal>>, Error> {
    let range = DateRange::new(query.start, query.end)?;
    let connection = lock_connection(&state.db_connection)?;

    get_category_totals(range, &connection).map(Json)
}
