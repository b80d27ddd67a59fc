//! Defines the savings goal model and its database queries.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{AppState, Error, database_id::DatabaseId, db::RowsAffected};

pub type GoalId = DatabaseId;

/// An amount of money to save between two dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "valor_alvo")]
    pub target_amount: f64,
    /// The amount saved so far.
    #[serde(rename = "valor_atual")]
    pub current_amount: f64,
    #[serde(rename = "data_inicio")]
    pub start_date: Date,
    #[serde(rename = "data_fim")]
    pub end_date: Date,
}

/// The request body for creating or updating a goal.
#[derive(Debug, Clone, Deserialize)]
pub struct GoalForm {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "valor_alvo")]
    pub target_amount: f64,
    #[serde(rename = "valor_atual", default)]
    pub current_amount: f64,
    #[serde(rename = "data_inicio")]
    pub start_date: Date,
    #[serde(rename = "data_fim")]
    pub end_date: Date,
}

impl GoalForm {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::EmptyField("nome"));
        }

        if !self.target_amount.is_finite() || self.target_amount <= 0.0 {
            return Err(Error::InvalidAmount(self.target_amount));
        }

        if !self.current_amount.is_finite() || self.current_amount < 0.0 {
            return Err(Error::InvalidAmount(self.current_amount));
        }

        if self.start_date > self.end_date {
            return Err(Error::InvalidDateRange(self.start_date, self.end_date));
        }

        Ok(())
    }
}

const GOAL_COLUMNS: &str = "id, name, target_amount, current_amount, start_date, end_date";

pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            target_amount REAL NOT NULL,
            current_amount REAL NOT NULL DEFAULT 0,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_goal(row: &Row) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        name: row.get(1)?,
        target_amount: row.get(2)?,
        current_amount: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
    })
}

pub fn create_goal(form: &GoalForm, connection: &Connection) -> Result<Goal, Error> {
    connection
        .query_one(
            &format!(
                "INSERT INTO goal (name, target_amount, current_amount, start_date, end_date) \
                VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {GOAL_COLUMNS}"
            ),
            params![
                form.name.trim(),
                form.target_amount,
                form.current_amount,
                form.start_date,
                form.end_date
            ],
            map_row_to_goal,
        )
        .map_err(Error::from)
}

pub fn get_goal(id: GoalId, connection: &Connection) -> Result<Goal, Error> {
    connection
        .query_one(
            &format!("SELECT {GOAL_COLUMNS} FROM goal WHERE id = ?1"),
            params![id],
            map_row_to_goal,
        )
        .map_err(Error::from)
}

/// Get all goals, those ending soonest first.
pub fn get_goals(connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(&format!("SELECT {GOAL_COLUMNS} FROM goal ORDER BY end_date, id"))?
        .query_map([], map_row_to_goal)?
        .map(|goal| goal.map_err(Error::from))
        .collect()
}

pub fn update_goal(
    id: GoalId,
    form: &GoalForm,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE goal \
            SET name = ?1, target_amount = ?2, current_amount = ?3, start_date = ?4, end_date = ?5 \
            WHERE id = ?6",
            params![
                form.name.trim(),
                form.target_amount,
                form.current_amount,
                form.start_date,
                form.end_date,
                id
            ],
        )
        .map_err(Error::from)
}

/// Add `amount` to the goal's saved amount.
///
/// # Errors
/// Returns [Error::InvalidAmount] if `amount` is not positive and
/// [Error::NotFound] if there is no such goal.
pub fn add_contribution(id: GoalId, amount: f64, connection: &Connection) -> Result<Goal, Error> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount(amount));
    }

    connection
        .query_one(
            &format!(
                "UPDATE goal SET current_amount = current_amount + ?1 WHERE id = ?2 \
                RETURNING {GOAL_COLUMNS}"
            ),
            params![amount, id],
            map_row_to_goal,
        )
        .map_err(Error::from)
}

/// State needed for the goal endpoints.
#[derive(Debug, Clone)]
pub struct GoalState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
