//! Defines the endpoint for deleting an income.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use rusqlite::params;

use crate::{
    Error,
    db::lock_connection,
    income::core::{IncomeId, IncomeState},
};

/// A route handler for deleting an income, responds with 204 No Content.
pub async fn delete_income_endpoint(
    State(state): State<IncomeState>,
    Path(income_id): Path<IncomeId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    match connection.execute("DELETE FROM income WHERE id = ?1", params![income_id])? {
        0 => Err(Error::NotFound),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        endpoints::{self, format_endpoint},
        income::Income,
        test_utils::must_create_test_server,
    };

    #[tokio::test]
    async fn delete_income() {
        let server = must_create_test_server();
        let income = server
            .post(endpoints::INCOMES)
            .json(&json!({
                "descricao": "Freela",
                "data": "2025-03-10",
                "valor": 800.0,
                "categoria": "Freelance",
            }))
            .await
            .json::<Income>();
        let path = format_endpoint(endpoints::INCOME, income.id);

        server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
        server.get(&path).await.assert_status_not_found();
        server.delete(&path).await.assert_status_not_found();
    }
}
