//! Posts credit card purchases to the card's monthly invoices.
//!
//! A purchase split into N installments becomes N expense rows, one per
//! month starting at the purchase month. Each row is attached to the card's
//! invoice for that month, which is created on demand, and the installment
//! amount is added to the invoice's running total.

use rusqlite::{Connection, params};
use time::Date;

use crate::{
    Error,
    card::{CardId, get_card},
    expense::core::{
        EXPENSE_COLUMNS, Expense, ExpenseStatus, PaymentMethod, map_row_to_expense,
        validate_expense_fields,
    },
    invoice::{add_to_invoice_total, find_or_create_invoice},
    month::{ReferenceMonth, add_months},
};

/// The largest number of installments a purchase can be split into.
pub const MAX_INSTALLMENTS: u32 = 36;

/// A purchase charged to a credit card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardPurchase {
    pub description: String,
    /// The full purchase amount.
    pub amount: f64,
    /// The purchase date, which also decides the first installment's invoice.
    pub date: Date,
    pub category: String,
    pub card_id: CardId,
    pub installments: u32,
}

impl CardPurchase {
    pub fn validate(&self) -> Result<(), Error> {
        validate_expense_fields(&self.description, self.amount, &self.category)?;

        if !(1..=MAX_INSTALLMENTS).contains(&self.installments) {
            return Err(Error::InvalidInstallmentCount(self.installments));
        }

        Ok(())
    }

    /// The amount charged each month.
    ///
    /// This is a plain division, so the installments may differ from the
    /// purchase amount by floating point error, and no installment absorbs a
    /// rounding remainder.
    pub fn installment_amount(&self) -> f64 {
        self.amount / self.installments as f64
    }

    fn installment_description(&self, index: u32) -> String {
        if self.installments > 1 {
            format!(
                "{} ({}/{})",
                self.description.trim(),
                index + 1,
                self.installments
            )
        } else {
            self.description.trim().to_owned()
        }
    }
}

/// Split `purchase` into its installments and post each one to the card's
/// invoice for the installment's month.
///
/// All rows are written in a single database transaction, so either every
/// installment is posted and every invoice total updated, or nothing is.
///
/// # Errors
/// Returns:
/// - a validation error if `purchase` has a blank field, a non-positive
///   amount or an installment count outside 1 to [MAX_INSTALLMENTS],
/// - [Error::InvalidCard] if the card does not exist,
/// - [Error::SqlError] if a query fails.
pub fn post_card_purchase(
    purchase: &CardPurchase,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    purchase.validate()?;

    get_card(purchase.card_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCard(purchase.card_id),
        error => error,
    })?;

    let transaction = connection.unchecked_transaction()?;
    let installment_amount = purchase.installment_amount();
    let mut expenses = Vec::with_capacity(purchase.installments as usize);

    for index in 0..purchase.installments {
        let installment_date = add_months(purchase.date, index as i32)?;
        let invoice_id = find_or_create_invoice(
            purchase.card_id,
            ReferenceMonth::of(installment_date),
            &transaction,
        )?;

        let expense = transaction.query_one(
            &format!(
                "INSERT INTO expense (description, date, amount, category, payment_method, \
                    installments, installments_remaining, installment_amount, card_id, \
                    invoice_id, status) \
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?3, ?8, ?9, ?10) \
                RETURNING {EXPENSE_COLUMNS}"
            ),
            params![
                purchase.installment_description(index),
                installment_date,
                installment_amount,
                purchase.category.trim(),
                PaymentMethod::Credito,
                purchase.installments,
                purchase.installments - index,
                purchase.card_id,
                invoice_id,
                ExpenseStatus::Pendente,
            ],
            map_row_to_expense,
        )?;

        add_to_invoice_total(invoice_id, installment_amount, &transaction)?;

        expenses.push(expense);
    }

    transaction.commit()?;

    tracing::debug!(
        "Posted {} installment(s) of {installment_amount} to card {}",
        purchase.installments,
        purchase.card_id
    );

    Ok(expenses)
}
