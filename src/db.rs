//! Creates the application's database schema and provides shared helpers for
//! the per-resource queries.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, TransactionBehavior};

use crate::{
    Error, budget::create_budget_table, card::create_card_table,
    category::create_category_table, expense::create_expense_table,
    goal::create_goal_table, income::create_income_table, invoice::create_invoice_table,
    reminder::create_reminder_table, user::create_user_table,
};

/// The number of rows changed by an `UPDATE` or `DELETE` statement.
pub type RowsAffected = usize;

/// Create the tables for all of the domain models if they do not exist yet.
///
/// Also enables foreign key enforcement for `connection`.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction =
        rusqlite::Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_card_table(&transaction)?;
    create_invoice_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_income_table(&transaction)?;
    create_goal_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_reminder_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Acquire the database lock, logging and converting a poisoned lock into
/// [Error::DatabaseLockError].
pub fn lock_connection(
    db_connection: &Arc<Mutex<Connection>>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}

/// Implement [rusqlite::types::ToSql] and [rusqlite::types::FromSql] for a
/// type stored as text, using its `as_str` method and [std::str::FromStr]
/// implementation (with [Error] as the error type).
macro_rules! impl_sql_text {
    ($type:ty) => {
        impl rusqlite::types::ToSql for $type {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(self.as_str().into())
            }
        }

        impl rusqlite::types::FromSql for $type {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|error: crate::Error| {
                        rusqlite::types::FromSqlError::Other(Box::new(error))
                    })
            }
        }
    };
}

pub(crate) use impl_sql_text;

#[cfg(test)]
pub(crate) fn must_create_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("could not create in-memory SQLite database");
    initialize(&connection).expect("could not initialize test DB");

    connection
}
