//! Defines the endpoint for creating an income.

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    Error,
    db::lock_connection,
    extract::ApiJson,
    income::core::{Income, IncomeForm, IncomeState, create_income},
};

/// A route handler for creating an income, responds with the created income.
pub async fn create_income_endpoint(
    State(state): State<IncomeState>,
    ApiJson(form): ApiJson<IncomeForm>,
) -> Result<(StatusCode, Json<Income>), Error> {
    let income = form.into_new_income()?;

    let connection = lock_connection(&state.db_connection)?;
    let income = create_income(&income, &connection)?;

    Ok((StatusCode::CREATED, Json(income)))
}
