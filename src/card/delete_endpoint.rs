//! Defines the endpoint for deleting a card.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use rusqlite::{Connection, params};

use crate::{
    Error,
    card::core::{CardId, CardState},
    db::{RowsAffected, lock_connection},
};

/// A route handler for deleting a card, responds with 204 No Content.
///
/// Cards with expenses or invoices cannot be deleted, the client must delete
/// those first.
pub async fn delete_card_endpoint(
    State(state): State<CardState>,
    Path(card_id): Path<CardId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    match delete_card(card_id, &connection)? {
        0 => Err(Error::NotFound),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}

fn delete_card(id: CardId, connection: &Connection) -> Result<RowsAffected, Error> {
    let dependents: i64 = connection.query_row(
        "SELECT (SELECT COUNT(*) FROM expense WHERE card_id = ?1) \
            + (SELECT COUNT(*) FROM invoice WHERE card_id = ?1)",
        params![id],
        |row| row.get(0),
    )?;

    if dependents > 0 {
        return Err(Error::CardInUse(id));
    }

    connection
        .execute("DELETE FROM card WHERE id = ?1", params![id])
        .map_err(Error::from)
}
