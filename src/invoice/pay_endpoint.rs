//! Defines the endpoint for paying an invoice.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, params};
use serde::Deserialize;

use crate::{
    Error,
    db::lock_connection,
    expense::ExpenseStatus,
    extract::ApiJson,
    invoice::core::{CENT_TOLERANCE, Invoice, InvoiceId, InvoiceState, InvoiceStatus, get_invoice},
};

/// The request body for paying an invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentForm {
    #[serde(rename = "valor")]
    pub amount: f64,
}

/// A route handler for registering a full or partial payment of an invoice,
/// responds with the updated invoice.
pub async fn pay_invoice_endpoint(
    State(state): State<InvoiceState>,
    Path(invoice_id): Path<InvoiceId>,
    ApiJson(form): ApiJson<PaymentForm>,
) -> Result<Json<Invoice>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    pay_invoice(invoice_id, form.amount, &connection).map(Json)
}

/// Subtract `amount` from the invoice's outstanding total and add it to the
/// amount paid.
///
/// The invoice and its installments are marked as paid once nothing is
/// left to pay. Otherwise the invoice is left open.
///
/// # Errors
/// Returns:
/// - [Error::InvalidAmount] if `amount` is not positive,
/// - [Error::NotFound] if there is no such invoice,
/// - [Error::InvoiceAlreadyPaid] if the invoice is already paid,
/// - [Error::PaymentExceedsBalance] if `amount` is more than is owed.
fn pay_invoice(id: InvoiceId, amount: f64, connection: &Connection) -> Result<Invoice, Error> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount(amount));
    }

    let transaction = connection.unchecked_transaction()?;
    let invoice = get_invoice(id, &transaction)?;

    if invoice.status == InvoiceStatus::Paga {
        return Err(Error::InvoiceAlreadyPaid);
    }

    if amount > invoice.total + CENT_TOLERANCE {
        return Err(Error::PaymentExceedsBalance(amount, invoice.total));
    }

    let remaining = invoice.total - amount;
    let status = if remaining <= CENT_TOLERANCE {
        InvoiceStatus::Paga
    } else {
        InvoiceStatus::Aberta
    };

    transaction.execute(
        "UPDATE invoice SET total = total - ?1, paid = paid + ?1, status = ?2 WHERE id = ?3",
        params![amount, status, id],
    )?;

    if status == InvoiceStatus::Paga {
        transaction.execute(
            "UPDATE expense SET status = ?1 WHERE invoice_id = ?2",
            params![ExpenseStatus::Paga, id],
        )?;
    }

    let invoice = get_invoice(id, &transaction)?;
    transaction.commit()?;

    tracing::info!("Registered payment of {amount:.2} for invoice {id}");

    Ok(invoice)
}
