//! Defines the endpoints for listing invoices and getting an invoice with its expenses.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    card::CardId,
    db::lock_connection,
    expense::{EXPENSE_COLUMNS, Expense, map_row_to_expense},
    extract::ApiQuery,
    invoice::core::{
        Invoice, InvoiceId, InvoiceState, get_invoice, get_invoices, mark_overdue_invoices,
    },
    timezone::local_today,
};

/// The optional filter for listing invoices.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceQuery {
    #[serde(rename = "cartao_id")]
    pub card_id: Option<CardId>,
}

/// An invoice together with the installments posted to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    #[serde(rename = "despesas")]
    pub expenses: Vec<Expense>,
}

/// A route handler for listing invoices, oldest first.
///
/// Open invoices that are past their due date are marked as overdue first.
pub async fn list_invoices_endpoint(
    State(state): State<InvoiceState>,
    ApiQuery(query): ApiQuery<InvoiceQuery>,
) -> Result<Json<Vec<Invoice>>, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    mark_overdue_invoices(today, &connection)?;

    get_invoices(query.card_id, &connection).map(Json)
}

/// A route handler for getting an invoice and its expenses.
pub async fn get_invoice_endpoint(
    State(state): State<InvoiceState>,
    Path(invoice_id): Path<InvoiceId>,
) -> Result<Json<InvoiceDetail>, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    mark_overdue_invoices(today, &connection)?;

    Ok(Json(InvoiceDetail {
        invoice: get_invoice(invoice_id, &connection)?,
        expenses: get_invoice_expenses(invoice_id, &connection)?,
    }))
}

fn get_invoice_expenses(
    invoice_id: InvoiceId,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense WHERE invoice_id = ?1 ORDER BY date, id"
        ))?
        .query_map(params![invoice_id], map_row_to_expense)?
        .map(|expense| expense.map_err(Error::from))
        .collect()
}
