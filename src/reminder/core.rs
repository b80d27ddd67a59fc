//! Defines the reminder model and its database queries.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{AppState, Error, database_id::DatabaseId, db::RowsAffected};

pub type ReminderId = DatabaseId;

/// A note about something to do on a date, e.g. a bill to pay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "data")]
    pub date: Date,
    #[serde(rename = "valor")]
    pub amount: Option<f64>,
    #[serde(rename = "concluido")]
    pub done: bool,
}

/// The request body for creating or updating a reminder.
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderForm {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "data")]
    pub date: Date,
    #[serde(rename = "valor", default)]
    pub amount: Option<f64>,
    #[serde(rename = "concluido", default)]
    pub done: bool,
}

impl ReminderForm {
    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::EmptyField("titulo"));
        }

        if let Some(amount) = self.amount
            && (!amount.is_finite() || amount < 0.0)
        {
            return Err(Error::InvalidAmount(amount));
        }

        Ok(())
    }

    fn trimmed_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|description| !description.is_empty())
    }
}

const REMINDER_COLUMNS: &str = "id, title, description, date, amount, done";

pub fn create_reminder_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS reminder (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            date TEXT NOT NULL,
            amount REAL,
            done INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_reminder(row: &Row) -> Result<Reminder, rusqlite::Error> {
    Ok(Reminder {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        date: row.get(3)?,
        amount: row.get(4)?,
        done: row.get(5)?,
    })
}

pub fn create_reminder(form: &ReminderForm, connection: &Connection) -> Result<Reminder, Error> {
    connection
        .query_one(
            &format!(
                "INSERT INTO reminder (title, description, date, amount, done) \
                VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {REMINDER_COLUMNS}"
            ),
            params![
                form.title.trim(),
                form.trimmed_description(),
                form.date,
                form.amount,
                form.done
            ],
            map_row_to_reminder,
        )
        .map_err(Error::from)
}

pub fn get_reminder(id: ReminderId, connection: &Connection) -> Result<Reminder, Error> {
    connection
        .query_one(
            &format!("SELECT {REMINDER_COLUMNS} FROM reminder WHERE id = ?1"),
            params![id],
            map_row_to_reminder,
        )
        .map_err(Error::from)
}

/// Get the reminders ordered by date, optionally only those not done yet.
pub fn get_reminders(pending_only: bool, connection: &Connection) -> Result<Vec<Reminder>, Error> {
    connection
        .prepare(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminder \
            WHERE ?1 = 0 OR done = 0 \
            ORDER BY date, id"
        ))?
        .query_map(params![pending_only], map_row_to_reminder)?
        .map(|reminder| reminder.map_err(Error::from))
        .collect()
}

pub fn count_pending_reminders(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(*) FROM reminder WHERE done = 0", [], |row| {
            row.get(0)
        })
        .map_err(Error::from)
}

pub fn update_reminder(
    id: ReminderId,
    form: &ReminderForm,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE reminder \
            SET title = ?1, description = ?2, date = ?3, amount = ?4, done = ?5 \
            WHERE id = ?6",
            params![
                form.title.trim(),
                form.trimmed_description(),
                form.date,
                form.amount,
                form.done,
                id
            ],
        )
        .map_err(Error::from)
}

/// State needed for the reminder endpoints.
#[derive(Debug, Clone)]
pub struct ReminderState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReminderState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_reminder_form(title: &str, date: Date, done: bool) -> ReminderForm {
    ReminderForm {
        title: title.to_owned(),
        description: None,
        date,
        amount: Some(120.0),
        done,
    }
}
