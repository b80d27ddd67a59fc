//! Defines the endpoints for listing cards and getting a single card.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    Error,
    card::core::{Card, CardId, CardState, get_all_cards, get_card},
    db::lock_connection,
};

/// A route handler for listing all cards ordered by name.
pub async fn list_cards_endpoint(State(state): State<CardState>) -> Result<Json<Vec<Card>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_cards(&connection).map(Json)
}

/// A route handler for getting a card by its ID.
pub async fn get_card_endpoint(
    State(state): State<CardState>,
    Path(card_id): Path<CardId>,
) -> Result<Json<Card>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_card(card_id, &connection).map(Json)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        card::Card,
        endpoints::{self, format_endpoint},
        test_utils::must_create_test_server,
    };

    #[tokio::test]
    async fn lists_cards_by_name() {
        let server = must_create_test_server();
        for name in ["Visa Infinite", "Amex Gold"] {
            server
                .post(endpoints::CARDS)
                .json(&json!({
                    "nome": name,
                    "banco": "Banco",
                    "limite": 1000.0,
                    "dia_fechamento": 1,
                    "dia_vencimento": 8,
                }))
                .await
                .assert_status_success();
        }

        let cards = server.get(endpoints::CARDS).await.json::<Vec<Card>>();

        let names: Vec<_> = cards.iter().map(|card| card.name.as_str()).collect();
        assert_eq!(names, ["Amex Gold", "Visa Infinite"]);
    }

    #[tokio::test]
    async fn get_missing_card_is_not_found() {
        let server = must_create_test_server();

        server
            .get(&format_endpoint(endpoints::CARD, 99))
            .await
            .assert_status_not_found();
    }
}
