//! Defines the core data models and database queries for expenses.

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    card::CardId,
    database_id::DatabaseId,
    db::impl_sql_text,
    invoice::InvoiceId,
};

pub type ExpenseId = DatabaseId;

/// How an expense was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Dinheiro,
    Debito,
    Credito,
    Pix,
    Boleto,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Dinheiro => "dinheiro",
            PaymentMethod::Debito => "debito",
            PaymentMethod::Credito => "credito",
            PaymentMethod::Pix => "pix",
            PaymentMethod::Boleto => "boleto",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim().to_lowercase().as_str() {
            "dinheiro" => Ok(PaymentMethod::Dinheiro),
            "debito" => Ok(PaymentMethod::Debito),
            "credito" => Ok(PaymentMethod::Credito),
            "pix" => Ok(PaymentMethod::Pix),
            "boleto" => Ok(PaymentMethod::Boleto),
            _ => Err(Error::InvalidPaymentMethod(text.to_owned())),
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl_sql_text!(PaymentMethod);

/// Whether an expense has been settled.
///
/// Card installments stay pending until their invoice is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    Pendente,
    Paga,
}

impl ExpenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseStatus::Pendente => "pendente",
            ExpenseStatus::Paga => "paga",
        }
    }
}

impl FromStr for ExpenseStatus {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "pendente" => Ok(ExpenseStatus::Pendente),
            "paga" => Ok(ExpenseStatus::Paga),
            _ => Err(Error::InvalidVariant(text.to_owned(), "status")),
        }
    }
}

impl_sql_text!(ExpenseStatus);

/// Money that was spent, or one installment of a card purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    #[serde(rename = "descricao")]
    pub description: String,
    /// When the expense happened. For installments, the purchase date moved
    /// forward by the installment's month offset.
    #[serde(rename = "data")]
    pub date: Date,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "forma_pagamento")]
    pub payment_method: PaymentMethod,
    /// The number of installments the original purchase was split into.
    #[serde(rename = "parcelas")]
    pub installments: u32,
    /// The number of installments left including this one.
    #[serde(rename = "parcelas_restantes")]
    pub installments_remaining: u32,
    #[serde(rename = "valor_parcela")]
    pub installment_amount: f64,
    #[serde(rename = "cartao_id")]
    pub card_id: Option<CardId>,
    #[serde(rename = "fatura_id")]
    pub invoice_id: Option<InvoiceId>,
    pub status: ExpenseStatus,
}

/// The columns of the expense table in the order [map_row_to_expense] expects.
pub const EXPENSE_COLUMNS: &str = "id, description, date, amount, category, payment_method, \
    installments, installments_remaining, installment_amount, card_id, invoice_id, status";

pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            payment_method TEXT NOT NULL,
            installments INTEGER NOT NULL DEFAULT 1,
            installments_remaining INTEGER NOT NULL DEFAULT 1,
            installment_amount REAL NOT NULL,
            card_id INTEGER REFERENCES card(id),
            invoice_id INTEGER REFERENCES invoice(id),
            status TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date)",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_expense(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        description: row.get(1)?,
        date: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        payment_method: row.get(5)?,
        installments: row.get(6)?,
        installments_remaining: row.get(7)?,
        installment_amount: row.get(8)?,
        card_id: row.get(9)?,
        invoice_id: row.get(10)?,
        status: row.get(11)?,
    })
}

/// A single expense that is not charged to a card invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub date: Date,
    pub amount: f64,
    pub category: String,
    pub payment_method: PaymentMethod,
}

impl NewExpense {
    /// Check the presence of the text fields and that the amount is positive.
    pub fn validate(&self) -> Result<(), Error> {
        validate_expense_fields(&self.description, self.amount, &self.category)
    }
}

pub(super) fn validate_expense_fields(
    description: &str,
    amount: f64,
    category: &str,
) -> Result<(), Error> {
    if description.trim().is_empty() {
        return Err(Error::EmptyField("descricao"));
    }

    if category.trim().is_empty() {
        return Err(Error::EmptyField("categoria"));
    }

    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount(amount));
    }

    Ok(())
}

/// Insert an expense that is paid in full.
///
/// The caller should validate `expense` first.
pub fn create_expense(expense: &NewExpense, connection: &Connection) -> Result<Expense, Error> {
    connection.execute(
        "INSERT INTO expense (description, date, amount, category, payment_method, \
            installments, installments_remaining, installment_amount, status) \
        VALUES (?1, ?2, ?3, ?4, ?5, 1, 1, ?3, ?6)",
        params![
            expense.description.trim(),
            expense.date,
            expense.amount,
            expense.category.trim(),
            expense.payment_method,
            ExpenseStatus::Paga,
        ],
    )?;

    get_expense(connection.last_insert_rowid(), connection)
}

/// Get the expense with `id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such expense.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .query_one(
            &format!("SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = ?1"),
            params![id],
            map_row_to_expense,
        )
        .map_err(Error::from)
}

/// State needed for the expense endpoints.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{Error, db::must_create_test_connection};

    use super::{
        ExpenseStatus, NewExpense, PaymentMethod, create_expense, get_expense,
    };

    #[test]
    fn parses_payment_methods() {
        assert_eq!("pix".parse(), Ok(PaymentMethod::Pix));
        assert_eq!(" Credito ".parse(), Ok(PaymentMethod::Credito));
        assert_eq!(
            "cheque".parse::<PaymentMethod>(),
            Err(Error::InvalidPaymentMethod("cheque".to_owned()))
        );
    }

    #[test]
    fn create_expense_is_paid_single_installment() {
        let connection = must_create_test_connection();

        let expense = create_expense(
            &NewExpense {
                description: "Mercado".to_owned(),
                date: date!(2025 - 04 - 02),
                amount: 152.3,
                category: "Alimentação".to_owned(),
                payment_method: PaymentMethod::Debito,
            },
            &connection,
        )
        .unwrap();

        assert_eq!(expense.installments, 1);
        assert_eq!(expense.installments_remaining, 1);
        assert_eq!(expense.installment_amount, 152.3);
        assert_eq!(expense.status, ExpenseStatus::Paga);
        assert_eq!(expense.card_id, None);
        assert_eq!(get_expense(expense.id, &connection), Ok(expense));
    }

    #[test]
    fn validate_rejects_non_positive_amounts() {
        let expense = NewExpense {
            description: "Mercado".to_owned(),
            date: date!(2025 - 04 - 02),
            amount: 0.0,
            category: "Alimentação".to_owned(),
            payment_method: PaymentMethod::Pix,
        };

        assert_eq!(expense.validate(), Err(Error::InvalidAmount(0.0)));
    }
}
