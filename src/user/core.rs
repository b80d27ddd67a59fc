//! Code for creating the user table and fetching users from the database.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, PasswordHash, database_id::DatabaseId, db::RowsAffected};

pub type UserId = DatabaseId;

/// A user of the application.
///
/// The password hash is never sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: Option<PasswordHash>,
}

/// Check that `name` is present and that `email` looks like an address,
/// returning the trimmed values.
pub fn validate_profile<'a>(name: &'a str, email: &'a str) -> Result<(&'a str, String), Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyField("nome"));
    }

    let email = email.trim().to_lowercase();

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok((name, email)),
        _ => Err(Error::InvalidEmail(email)),
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_user(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: Some(PasswordHash::new_unchecked(&raw_password_hash)),
    })
}

pub(super) fn map_duplicate_email(email: &str) -> impl Fn(rusqlite::Error) -> Error + '_ {
    move |error| match error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 2067 => {
            Error::DuplicateEmail(email.to_owned())
        }
        error => error.into(),
    }
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns [Error::DuplicateEmail] if the email is already registered, or
/// [Error::SqlError] if another SQL related error occurred.
pub fn create_user(
    name: &str,
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .query_one(
            "INSERT INTO user (name, email, password) VALUES (?1, ?2, ?3) \
            RETURNING id, name, email, password",
            params![name, email, password_hash.as_ref()],
            map_row_to_user,
        )
        .map_err(map_duplicate_email(email))
}

/// Get the user with `id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `id` does not belong to a registered user.
pub fn get_user(id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .query_one(
            "SELECT id, name, email, password FROM user WHERE id = ?1",
            params![id],
            map_row_to_user,
        )
        .map_err(Error::from)
}

pub fn get_users(connection: &Connection) -> Result<Vec<User>, Error> {
    connection
        .prepare("SELECT id, name, email, password FROM user ORDER BY name, id")?
        .query_map([], map_row_to_user)?
        .map(|user| user.map_err(Error::from))
        .collect()
}

pub fn update_password(
    id: UserId,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE user SET password = ?1 WHERE id = ?2",
            params![password_hash.as_ref(), id],
        )
        .map_err(Error::from)
}

/// State needed for the user endpoints.
#[derive(Debug, Clone)]
pub struct UserState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost for new password hashes.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for UserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_hash_cost: state.password_hash_cost,
        }
    }
}
