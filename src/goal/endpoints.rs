//! Defines the route handlers for goals.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rusqlite::params;
use serde::Deserialize;

use crate::{
    Error,
    db::lock_connection,
    extract::ApiJson,
    goal::core::{
        Goal, GoalForm, GoalId, GoalState, add_contribution, create_goal, get_goal, get_goals,
        update_goal,
    },
};

/// The request body for adding money to a goal.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributionForm {
    #[serde(rename = "valor")]
    pub amount: f64,
}

pub async fn list_goals_endpoint(State(state): State<GoalState>) -> Result<Json<Vec<Goal>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_goals(&connection).map(Json)
}

pub async fn get_goal_endpoint(
    State(state): State<GoalState>,
    Path(goal_id): Path<GoalId>,
) -> Result<Json<Goal>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_goal(goal_id, &connection).map(Json)
}

pub async fn create_goal_endpoint(
    State(state): State<GoalState>,
    ApiJson(form): ApiJson<GoalForm>,
) -> Result<(StatusCode, Json<Goal>), Error> {
    form.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let goal = create_goal(&form, &connection)?;

    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn edit_goal_endpoint(
    State(state): State<GoalState>,
    Path(goal_id): Path<GoalId>,
    ApiJson(form): ApiJson<GoalForm>,
) -> Result<Json<Goal>, Error> {
    form.validate()?;

    let connection = lock_connection(&state.db_connection)?;

    match update_goal(goal_id, &form, &connection)? {
        0 => Err(Error::NotFound),
        _ => Ok(Json(get_goal(goal_id, &connection)?)),
    }
}

pub async fn delete_goal_endpoint(
    State(state): State<GoalState>,
    Path(goal_id): Path<GoalId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    match connection.execute("DELETE FROM goal WHERE id = ?1", params![goal_id])? {
        0 => Err(Error::NotFound),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}

/// A route handler for adding money to a goal, responds with the updated goal.
pub async fn contribute_to_goal_endpoint(
    State(state): State<GoalState>,
    Path(goal_id): Path<GoalId>,
    ApiJson(form): ApiJson<ContributionForm>,
) -> Result<Json<Goal>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    add_contribution(goal_id, form.amount, &connection).map(Json)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        endpoints::{self, format_endpoint},
        goal::Goal,
        test_utils::must_create_test_server,
    };

    async fn create_goal(server: &axum_test::TestServer) -> Goal {
        server
            .post(endpoints::GOALS)
            .json(&json!({
                "nome": "Viagem",
                "valor_alvo": 6000.0,
                "data_inicio": "2025-01-01",
                "data_fim": "2025-12-01",
            }))
            .await
            .json::<Goal>()
    }

    #[tokio::test]
    async fn create_defaults_current_amount_to_zero() {
        let server = must_create_test_server();

        let goal = create_goal(&server).await;

        assert_eq!(goal.current_amount, 0.0);
        assert_eq!(goal.target_amount, 6000.0);
    }

    #[tokio::test]
    async fn contribution_endpoint_advances_goal() {
        let server = must_create_test_server();
        let goal = create_goal(&server).await;

        let response = server
            .post(&format_endpoint(endpoints::GOAL_CONTRIBUTIONS, goal.id))
            .json(&json!({ "valor": 300.0 }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Goal>().current_amount, 300.0);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let server = must_create_test_server();
        let goal = create_goal(&server).await;
        let path = format_endpoint(endpoints::GOAL, goal.id);

        let updated = server
            .put(&path)
            .json(&json!({
                "nome": "Viagem ao Japão",
                "valor_alvo": 15000.0,
                "valor_atual": 1000.0,
                "data_inicio": "2025-01-01",
                "data_fim": "2026-06-01",
            }))
            .await
            .json::<Goal>();
        assert_eq!(updated.name, "Viagem ao Japão");
        assert_eq!(updated.current_amount, 1000.0);

        server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
        server.get(&path).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn zero_target_is_bad_request() {
        let server = must_create_test_server();

        server
            .post(endpoints::GOALS)
            .json(&json!({
                "nome": "Nada",
                "valor_alvo": 0.0,
                "data_inicio": "2025-01-01",
                "data_fim": "2025-12-01",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
