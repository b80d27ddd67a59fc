//! Defines the invoice model and the queries that keep invoice totals in step
//! with the installments posted to them.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error, card::CardId, database_id::DatabaseId, db::impl_sql_text,
    expense::ExpenseStatus, month::ReferenceMonth,
};

pub type InvoiceId = DatabaseId;

/// Outstanding totals at or below this are treated as settled.
pub const CENT_TOLERANCE: f64 = 0.005;

/// The payment status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Not paid in full and not yet due.
    Aberta,
    /// Paid in full.
    Paga,
    /// Not paid in full after the due date.
    Vencida,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Aberta => "aberta",
            InvoiceStatus::Paga => "paga",
            InvoiceStatus::Vencida => "vencida",
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "aberta" => Ok(InvoiceStatus::Aberta),
            "paga" => Ok(InvoiceStatus::Paga),
            "vencida" => Ok(InvoiceStatus::Vencida),
            _ => Err(Error::InvalidVariant(text.to_owned(), "status")),
        }
    }
}

impl_sql_text!(InvoiceStatus);

/// The monthly bill for a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    #[serde(rename = "cartao_id")]
    pub card_id: CardId,
    /// The reference month, 1 to 12.
    #[serde(rename = "mes")]
    pub month: u8,
    #[serde(rename = "ano")]
    pub year: i32,
    /// The outstanding amount: installments posted minus payments.
    #[serde(rename = "valor_total")]
    pub total: f64,
    /// The sum of the payments made against the invoice.
    #[serde(rename = "valor_pago")]
    pub paid: f64,
    pub status: InvoiceStatus,
}

pub const INVOICE_COLUMNS: &str = "id, card_id, month, year, total, paid, status";

pub fn create_invoice_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS invoice (
            id INTEGER PRIMARY KEY,
            card_id INTEGER NOT NULL REFERENCES card(id),
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            total REAL NOT NULL DEFAULT 0,
            paid REAL NOT NULL DEFAULT 0,
            status TEXT NOT NULL,
            UNIQUE(card_id, year, month)
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_invoice(row: &Row) -> Result<Invoice, rusqlite::Error> {
    Ok(Invoice {
        id: row.get(0)?,
        card_id: row.get(1)?,
        month: row.get(2)?,
        year: row.get(3)?,
        total: row.get(4)?,
        paid: row.get(5)?,
        status: row.get(6)?,
    })
}

/// Get the ID of the card's invoice for `month`, creating an empty open
/// invoice if the card has none for that month yet.
pub fn find_or_create_invoice(
    card_id: CardId,
    month: ReferenceMonth,
    connection: &Connection,
) -> Result<InvoiceId, Error> {
    let existing = connection
        .query_row(
            "SELECT id FROM invoice WHERE card_id = ?1 AND year = ?2 AND month = ?3",
            params![card_id, month.year(), month.month()],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    connection.execute(
        "INSERT INTO invoice (card_id, month, year, total, paid, status) \
        VALUES (?1, ?2, ?3, 0, 0, ?4)",
        params![card_id, month.month(), month.year(), InvoiceStatus::Aberta],
    )?;

    tracing::debug!("Created invoice {month} for card {card_id}");

    Ok(connection.last_insert_rowid())
}

/// Add `amount` to the invoice's outstanding total. `amount` may be negative,
/// e.g. when an installment is removed.
///
/// A paid invoice that becomes owing again is reopened. Removing more than
/// is outstanding leaves nothing owing and takes the surplus out of the
/// amount paid, which settles the invoice if anything was paid.
pub fn add_to_invoice_total(
    invoice_id: InvoiceId,
    amount: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let invoice = get_invoice(invoice_id, connection)?;
    let mut total = invoice.total + amount;
    let mut paid = invoice.paid;

    if total < 0.0 {
        paid = (paid + total).max(0.0);
        total = 0.0;
    }

    let status = if total > CENT_TOLERANCE {
        match invoice.status {
            InvoiceStatus::Paga => InvoiceStatus::Aberta,
            status => status,
        }
    } else if paid > CENT_TOLERANCE {
        InvoiceStatus::Paga
    } else {
        invoice.status
    };

    connection.execute(
        "UPDATE invoice SET total = ?1, paid = ?2, status = ?3 WHERE id = ?4",
        params![total, paid, status, invoice_id],
    )?;

    if status == InvoiceStatus::Paga && invoice.status != InvoiceStatus::Paga {
        connection.execute(
            "UPDATE expense SET status = ?1 WHERE invoice_id = ?2",
            params![ExpenseStatus::Paga, invoice_id],
        )?;
    }

    Ok(())
}

/// Get the invoice with `id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such invoice.
pub fn get_invoice(id: InvoiceId, connection: &Connection) -> Result<Invoice, Error> {
    connection
        .query_one(
            &format!("SELECT {INVOICE_COLUMNS} FROM invoice WHERE id = ?1"),
            params![id],
            map_row_to_invoice,
        )
        .map_err(Error::from)
}

/// Get all invoices, or only those for `card_id`, oldest first.
pub fn get_invoices(
    card_id: Option<CardId>,
    connection: &Connection,
) -> Result<Vec<Invoice>, Error> {
    connection
        .prepare(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoice \
            WHERE ?1 IS NULL OR card_id = ?1 \
            ORDER BY year, month, card_id"
        ))?
        .query_map(params![card_id], map_row_to_invoice)?
        .map(|invoice| invoice.map_err(Error::from))
        .collect()
}

/// Mark open invoices whose due date is before `today` as overdue.
///
/// The due date is the card's due day in the invoice's reference month,
/// clamped to the end of shorter months.
///
/// Returns the number of invoices that became overdue.
pub fn mark_overdue_invoices(today: Date, connection: &Connection) -> Result<usize, Error> {
    let open_invoices: Vec<(InvoiceId, i32, u8, u8)> = connection
        .prepare(
            "SELECT invoice.id, invoice.year, invoice.month, card.due_day FROM invoice \
            INNER JOIN card ON card.id = invoice.card_id \
            WHERE invoice.status = ?1",
        )?
        .query_map(params![InvoiceStatus::Aberta], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<Result<_, _>>()?;

    let mut overdue_count = 0;

    for (invoice_id, year, month, due_day) in open_invoices {
        let due_date = ReferenceMonth::new(year, month)?.day_clamped(due_day)?;

        if due_date < today {
            overdue_count += connection.execute(
                "UPDATE invoice SET status = ?1 WHERE id = ?2",
                params![InvoiceStatus::Vencida, invoice_id],
            )?;
        }
    }

    if overdue_count > 0 {
        tracing::info!("Marked {overdue_count} invoice(s) as overdue");
    }

    Ok(overdue_count)
}

/// State needed for the invoice endpoints.
#[derive(Debug, Clone)]
pub struct InvoiceState {
    /// The database connection for managing invoices.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone, used to decide which invoices are overdue.
    pub local_timezone: String,
}

impl FromRef<AppState> for InvoiceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.settings.timezone.clone(),
        }
    }
}
