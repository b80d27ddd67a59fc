//! Defines the category model and its database queries.
//!
//! Expense and income categories are separate lists, so the same name may
//! exist once for each kind.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, database_id::DatabaseId, db::impl_sql_text};

pub type CategoryId = DatabaseId;

/// Whether a category is used for expenses or income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Despesa,
    Receita,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Despesa => "despesa",
            CategoryKind::Receita => "receita",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "despesa" => Ok(CategoryKind::Despesa),
            "receita" => Ok(CategoryKind::Receita),
            _ => Err(Error::InvalidVariant(text.to_owned(), "tipo")),
        }
    }
}

impl_sql_text!(CategoryKind);

/// A name for grouping expenses or income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub kind: CategoryKind,
}

/// The request body for creating or renaming a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryForm {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub kind: CategoryKind,
}

impl CategoryForm {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::EmptyField("nome"));
        }

        Ok(())
    }
}

pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            UNIQUE(name, kind)
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_category(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
    })
}

/// Map a UNIQUE constraint violation to [Error::DuplicateCategory].
pub(super) fn map_duplicate_name(name: &str) -> impl Fn(rusqlite::Error) -> Error + '_ {
    move |error| match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateCategory(name.to_owned()),
        error => error.into(),
    }
}

/// Insert a category.
///
/// # Errors
/// Returns [Error::DuplicateCategory] if the name is taken for that kind.
pub fn create_category(form: &CategoryForm, connection: &Connection) -> Result<Category, Error> {
    let name = form.name.trim();

    connection
        .query_one(
            "INSERT INTO category (name, kind) VALUES (?1, ?2) RETURNING id, name, kind",
            params![name, form.kind],
            map_row_to_category,
        )
        .map_err(map_duplicate_name(name))
}

pub fn get_category(id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .query_one(
            "SELECT id, name, kind FROM category WHERE id = ?1",
            params![id],
            map_row_to_category,
        )
        .map_err(Error::from)
}

/// Get the categories, optionally of one kind, ordered by name.
pub fn get_categories(
    kind: Option<CategoryKind>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind FROM category \
            WHERE ?1 IS NULL OR kind = ?1 \
            ORDER BY name, kind",
        )?
        .query_map(params![kind], map_row_to_category)?
        .map(|category| category.map_err(Error::from))
        .collect()
}

/// State needed for the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
