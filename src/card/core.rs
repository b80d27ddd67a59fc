use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, database_id::DatabaseId};

pub type CardId = DatabaseId;

/// A credit card that purchases can be charged to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// The id for the card.
    pub id: CardId,
    /// A name for the card, e.g. "Nubank Ultravioleta".
    #[serde(rename = "nome")]
    pub name: String,
    /// The bank that issued the card.
    #[serde(rename = "banco")]
    pub bank: String,
    /// The credit limit.
    #[serde(rename = "limite")]
    pub credit_limit: f64,
    /// The day of the month the invoice closes.
    #[serde(rename = "dia_fechamento")]
    pub closing_day: u8,
    /// The day of the month the invoice is due.
    #[serde(rename = "dia_vencimento")]
    pub due_day: u8,
}

/// The request body for creating or updating a card.
#[derive(Debug, Clone, Deserialize)]
pub struct CardForm {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "banco")]
    pub bank: String,
    #[serde(rename = "limite")]
    pub credit_limit: f64,
    #[serde(rename = "dia_fechamento")]
    pub closing_day: u8,
    #[serde(rename = "dia_vencimento")]
    pub due_day: u8,
}

impl CardForm {
    /// Check the presence and ranges of the form fields.
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::EmptyField("nome"));
        }

        if self.bank.trim().is_empty() {
            return Err(Error::EmptyField("banco"));
        }

        if !self.credit_limit.is_finite() || self.credit_limit < 0.0 {
            return Err(Error::InvalidAmount(self.credit_limit));
        }

        for day in [self.closing_day, self.due_day] {
            if !(1..=31).contains(&day) {
                return Err(Error::InvalidDayOfMonth(day));
            }
        }

        Ok(())
    }
}

/// The state needed to manage cards.
#[derive(Debug, Clone)]
pub struct CardState {
    /// The database connection for managing cards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub fn create_card_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS card (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            bank TEXT NOT NULL,
            credit_limit REAL NOT NULL,
            closing_day INTEGER NOT NULL,
            due_day INTEGER NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_card(row: &Row) -> Result<Card, rusqlite::Error> {
    Ok(Card {
        id: row.get(0)?,
        name: row.get(1)?,
        bank: row.get(2)?,
        credit_limit: row.get(3)?,
        closing_day: row.get(4)?,
        due_day: row.get(5)?,
    })
}

/// Insert a card. The caller should validate `form` first.
pub fn create_card(form: &CardForm, connection: &Connection) -> Result<Card, Error> {
    connection.execute(
        "INSERT INTO card (name, bank, credit_limit, closing_day, due_day) \
        VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            form.name.trim(),
            form.bank.trim(),
            form.credit_limit,
            form.closing_day,
            form.due_day
        ],
    )?;

    Ok(Card {
        id: connection.last_insert_rowid(),
        name: form.name.trim().to_owned(),
        bank: form.bank.trim().to_owned(),
        credit_limit: form.credit_limit,
        closing_day: form.closing_day,
        due_day: form.due_day,
    })
}

/// Get the card with `id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such card.
pub fn get_card(id: CardId, connection: &Connection) -> Result<Card, Error> {
    connection
        .query_one(
            "SELECT id, name, bank, credit_limit, closing_day, due_day FROM card WHERE id = ?1",
            params![id],
            map_row_to_card,
        )
        .map_err(Error::from)
}

pub fn get_all_cards(connection: &Connection) -> Result<Vec<Card>, Error> {
    connection
        .prepare(
            "SELECT id, name, bank, credit_limit, closing_day, due_day FROM card \
            ORDER BY name, id",
        )?
        .query_map([], map_row_to_card)?
        .map(|card| card.map_err(Error::from))
        .collect()
}

#[cfg(test)]
pub(crate) fn test_card_form() -> CardForm {
    CardForm {
        name: "Roxinho".to_owned(),
        bank: "Nubank".to_owned(),
        credit_limit: 5000.0,
        closing_day: 3,
        due_day: 10,
    }
}
