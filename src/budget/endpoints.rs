//! Defines the CRUD route handlers for budgets.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rusqlite::params;
use serde::Deserialize;

use crate::{
    Error,
    budget::core::{
        Budget, BudgetForm, BudgetId, BudgetState, create_budget, get_budget, get_budgets,
        map_duplicate_budget,
    },
    db::lock_connection,
    extract::{ApiJson, ApiQuery},
    month::ReferenceMonth,
};

/// The optional filter for listing budgets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetQuery {
    #[serde(rename = "mes")]
    pub month: Option<ReferenceMonth>,
}

pub async fn list_budgets_endpoint(
    State(state): State<BudgetState>,
    ApiQuery(query): ApiQuery<BudgetQuery>,
) -> Result<Json<Vec<Budget>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_budgets(query.month, &connection).map(Json)
}

pub async fn get_budget_endpoint(
    State(state): State<BudgetState>,
    Path(budget_id): Path<BudgetId>,
) -> Result<Json<Budget>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_budget(budget_id, &connection).map(Json)
}

pub async fn create_budget_endpoint(
    State(state): State<BudgetState>,
    ApiJson(form): ApiJson<BudgetForm>,
) -> Result<(StatusCode, Json<Budget>), Error> {
    let month = form.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let budget = create_budget(&form.category, month, form.limit, &connection)?;

    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn edit_budget_endpoint(
    State(state): State<BudgetState>,
    Path(budget_id): Path<BudgetId>,
    ApiJson(form): ApiJson<BudgetForm>,
) -> Result<Json<Budget>, Error> {
    let month = form.validate()?;
    let category = form.category.trim();

    let connection = lock_connection(&state.db_connection)?;
    let rows_affected = connection
        .execute(
            "UPDATE budget SET category = ?1, month = ?2, limit_amount = ?3 WHERE id = ?4",
            params![category, month, form.limit, budget_id],
        )
        .map_err(map_duplicate_budget(category, month))?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(Json(get_budget(budget_id, &connection)?)),
    }
}

pub async fn delete_budget_endpoint(
    State(state): State<BudgetState>,
    Path(budget_id): Path<BudgetId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    match connection.execute("DELETE FROM budget WHERE id = ?1", params![budget_id])? {
        0 => Err(Error::NotFound),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}
