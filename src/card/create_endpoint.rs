//! Defines the endpoint for creating a new card.

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    Error,
    card::core::{Card, CardForm, CardState, create_card},
    db::lock_connection,
    extract::ApiJson,
};

/// A route handler for creating a new card, responds with the created card.
pub async fn create_card_endpoint(
    State(state): State<CardState>,
    ApiJson(form): ApiJson<CardForm>,
) -> Result<(StatusCode, Json<Card>), Error> {
    form.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let card = create_card(&form, &connection).inspect_err(|error| {
        tracing::error!("Could not create card with {form:?}, got an unexpected error: {error}")
    })?;

    Ok((StatusCode::CREATED, Json(card)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{card::Card, endpoints, test_utils::must_create_test_server};

    #[tokio::test]
    async fn can_create_card() {
        let server = must_create_test_server();

        let response = server
            .post(endpoints::CARDS)
            .json(&json!({
                "nome": "Roxinho",
                "banco": "Nubank",
                "limite": 5000.0,
                "dia_fechamento": 3,
                "dia_vencimento": 10,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let card = response.json::<Card>();
        assert_eq!(card.name, "Roxinho");
        assert_eq!(card.bank, "Nubank");
        assert_eq!(card.credit_limit, 5000.0);
        assert_eq!(card.closing_day, 3);
        assert_eq!(card.due_day, 10);
    }

    #[tokio::test]
    async fn missing_field_is_bad_request() {
        let server = must_create_test_server();

        server
            .post(endpoints::CARDS)
            .json(&json!({ "nome": "Roxinho", "banco": "Nubank" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_day_is_bad_request() {
        let server = must_create_test_server();

        server
            .post(endpoints::CARDS)
            .json(&json!({
                "nome": "Roxinho",
                "banco": "Nubank",
                "limite": 5000.0,
                "dia_fechamento": 3,
                "dia_vencimento": 40,
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
