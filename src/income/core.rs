//! Defines the core data models and database queries for income.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{AppState, Error, database_id::DatabaseId, db::impl_sql_text};

pub type IncomeId = DatabaseId;

/// How often a recurring income is received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceInterval {
    Semanal,
    Mensal,
    Anual,
}

impl RecurrenceInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceInterval::Semanal => "semanal",
            RecurrenceInterval::Mensal => "mensal",
            RecurrenceInterval::Anual => "anual",
        }
    }
}

impl FromStr for RecurrenceInterval {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim().to_lowercase().as_str() {
            "semanal" => Ok(RecurrenceInterval::Semanal),
            "mensal" => Ok(RecurrenceInterval::Mensal),
            "anual" => Ok(RecurrenceInterval::Anual),
            _ => Err(Error::InvalidVariant(text.to_owned(), "intervalo_recorrencia")),
        }
    }
}

impl_sql_text!(RecurrenceInterval);

/// Money that was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: IncomeId,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "data")]
    pub date: Date,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "categoria")]
    pub category: String,
    /// Where the money came from, e.g. an employer.
    #[serde(rename = "fonte")]
    pub source: Option<String>,
    /// How the money was received, e.g. "pix".
    #[serde(rename = "forma_recebimento")]
    pub receipt_method: Option<String>,
    #[serde(rename = "recorrente")]
    pub recurring: bool,
    #[serde(rename = "intervalo_recorrencia")]
    pub recurrence_interval: Option<RecurrenceInterval>,
}

/// The request body for creating or updating an income.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomeForm {
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "data")]
    pub date: Date,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "fonte", default)]
    pub source: Option<String>,
    #[serde(rename = "forma_recebimento", default)]
    pub receipt_method: Option<String>,
    #[serde(rename = "recorrente", default)]
    pub recurring: bool,
    #[serde(rename = "intervalo_recorrencia", default)]
    pub recurrence_interval: Option<String>,
}

impl IncomeForm {
    /// Validate the form and convert it into a [NewIncome].
    ///
    /// # Errors
    /// Returns:
    /// - [Error::EmptyField] if the description or category is blank,
    /// - [Error::InvalidAmount] if the amount is not positive,
    /// - [Error::MissingRecurrenceInterval] if the income is recurring but has no interval,
    /// - [Error::InvalidVariant] if the interval is not one of the accepted values.
    pub fn into_new_income(self) -> Result<NewIncome, Error> {
        let recurrence_interval = match (self.recurring, self.recurrence_interval.as_deref()) {
            (false, _) => None,
            (true, None) => return Err(Error::MissingRecurrenceInterval),
            (true, Some(interval)) if interval.trim().is_empty() => {
                return Err(Error::MissingRecurrenceInterval);
            }
            (true, Some(interval)) => Some(interval.parse()?),
        };

        let income = NewIncome {
            description: self.description,
            date: self.date,
            amount: self.amount,
            category: self.category,
            source: non_blank(self.source),
            receipt_method: non_blank(self.receipt_method),
            recurrence_interval,
        };
        income.validate()?;

        Ok(income)
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// An income that has been validated and is ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncome {
    pub description: String,
    pub date: Date,
    pub amount: f64,
    pub category: String,
    pub source: Option<String>,
    pub receipt_method: Option<String>,
    /// The interval of a recurring income, `None` for a one-off income.
    pub recurrence_interval: Option<RecurrenceInterval>,
}

impl NewIncome {
    pub fn validate(&self) -> Result<(), Error> {
        if self.description.trim().is_empty() {
            return Err(Error::EmptyField("descricao"));
        }

        if self.category.trim().is_empty() {
            return Err(Error::EmptyField("categoria"));
        }

        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidAmount(self.amount));
        }

        Ok(())
    }
}

pub const INCOME_COLUMNS: &str = "id, description, date, amount, category, source, \
    receipt_method, recurring, recurrence_interval";

pub fn create_income_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS income (
            id INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            source TEXT,
            receipt_method TEXT,
            recurring INTEGER NOT NULL DEFAULT 0,
            recurrence_interval TEXT
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_income_date ON income(date)",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_income(row: &Row) -> Result<Income, rusqlite::Error> {
    Ok(Income {
        id: row.get(0)?,
        description: row.get(1)?,
        date: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        source: row.get(5)?,
        receipt_method: row.get(6)?,
        recurring: row.get(7)?,
        recurrence_interval: row.get(8)?,
    })
}

/// Insert an income. The caller should validate `income` first.
pub fn create_income(income: &NewIncome, connection: &Connection) -> Result<Income, Error> {
    connection
        .query_one(
            &format!(
                "INSERT INTO income (description, date, amount, category, source, receipt_method, \
                    recurring, recurrence_interval) \
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
                RETURNING {INCOME_COLUMNS}"
            ),
            params![
                income.description.trim(),
                income.date,
                income.amount,
                income.category.trim(),
                income.source,
                income.receipt_method,
                income.recurrence_interval.is_some(),
                income.recurrence_interval,
            ],
            map_row_to_income,
        )
        .map_err(Error::from)
}

/// Get the income with `id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such income.
pub fn get_income(id: IncomeId, connection: &Connection) -> Result<Income, Error> {
    connection
        .query_one(
            &format!("SELECT {INCOME_COLUMNS} FROM income WHERE id = ?1"),
            params![id],
            map_row_to_income,
        )
        .map_err(Error::from)
}

/// State needed for the income endpoints.
#[derive(Debug, Clone)]
pub struct IncomeState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for IncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_income(date: Date, amount: f64, category: &str) -> NewIncome {
    NewIncome {
        description: "Salário".to_owned(),
        date,
        amount,
        category: category.to_owned(),
        source: Some("Empresa".to_owned()),
        receipt_method: None,
        recurrence_interval: None,
    }
}
