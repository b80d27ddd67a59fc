//! Defines the endpoint for updating a card.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, params};

use crate::{
    Error,
    card::core::{Card, CardForm, CardId, CardState, get_card},
    db::{RowsAffected, lock_connection},
    extract::ApiJson,
};

/// A route handler for updating a card, responds with the updated card.
pub async fn edit_card_endpoint(
    State(state): State<CardState>,
    Path(card_id): Path<CardId>,
    ApiJson(form): ApiJson<CardForm>,
) -> Result<Json<Card>, Error> {
    form.validate()?;

    let connection = lock_connection(&state.db_connection)?;

    match update_card(card_id, &form, &connection)? {
        0 => Err(Error::NotFound),
        _ => Ok(Json(get_card(card_id, &connection)?)),
    }
}

fn update_card(
    id: CardId,
    form: &CardForm,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE card \
            SET name = ?1, bank = ?2, credit_limit = ?3, closing_day = ?4, due_day = ?5 \
            WHERE id = ?6",
            params![
                form.name.trim(),
                form.bank.trim(),
                form.credit_limit,
                form.closing_day,
                form.due_day,
                id
            ],
        )
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};

    use crate::{
        Error,
        card::{
            core::{CardState, create_card, get_card, test_card_form},
            edit_card_endpoint,
        },
        db::must_create_test_connection,
        extract::ApiJson,
    };

    #[tokio::test]
    async fn can_update_card() {
        let connection = must_create_test_connection();
        let card = create_card(&test_card_form(), &connection).unwrap();
        let state = CardState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let mut form = test_card_form();
        form.credit_limit = 8000.0;
        form.due_day = 15;

        let response = edit_card_endpoint(State(state.clone()), Path(card.id), ApiJson(form))
            .await
            .unwrap();

        assert_eq!(response.0.credit_limit, 8000.0);
        assert_eq!(response.0.due_day, 15);
        let got = get_card(card.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(got, response.0);
    }

    #[tokio::test]
    async fn updating_missing_card_is_not_found() {
        let state = CardState {
            db_connection: Arc::new(Mutex::new(must_create_test_connection())),
        };

        let result = edit_card_endpoint(State(state), Path(42), ApiJson(test_card_form())).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}
