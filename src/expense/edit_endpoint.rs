//! Defines the endpoint for updating an expense.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, params};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    db::lock_connection,
    expense::core::{
        Expense, ExpenseId, ExpenseState, ExpenseStatus, get_expense, validate_expense_fields,
    },
    extract::ApiJson,
    invoice::{InvoiceStatus, add_to_invoice_total, find_or_create_invoice, get_invoice},
    month::ReferenceMonth,
};

/// The request body for updating an expense.
///
/// The payment method, card and installment split are fixed when the
/// expense is created.
#[derive(Debug, Clone, Deserialize)]
pub struct EditExpenseForm {
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "data")]
    pub date: Date,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "categoria")]
    pub category: String,
}

/// A route handler for updating an expense, responds with the updated expense.
///
/// If the expense is an installment, its invoice total is adjusted by the
/// change in amount. An installment whose date moves to another month is
/// moved to the card's invoice for that month.
pub async fn edit_expense_endpoint(
    State(state): State<ExpenseState>,
    Path(expense_id): Path<ExpenseId>,
    ApiJson(form): ApiJson<EditExpenseForm>,
) -> Result<Json<Expense>, Error> {
    validate_expense_fields(&form.description, form.amount, &form.category)?;

    let connection = lock_connection(&state.db_connection)?;

    update_expense(expense_id, &form, &connection).map(Json)
}

fn update_expense(
    id: ExpenseId,
    form: &EditExpenseForm,
    connection: &Connection,
) -> Result<Expense, Error> {
    let transaction = connection.unchecked_transaction()?;
    let previous = get_expense(id, &transaction)?;

    let invoice_id = match (previous.invoice_id, previous.card_id) {
        (Some(invoice_id), Some(card_id))
            if ReferenceMonth::of(form.date) != ReferenceMonth::of(previous.date) =>
        {
            add_to_invoice_total(invoice_id, -previous.amount, &transaction)?;
            let new_invoice_id =
                find_or_create_invoice(card_id, ReferenceMonth::of(form.date), &transaction)?;
            add_to_invoice_total(new_invoice_id, form.amount, &transaction)?;

            tracing::debug!("Moved installment {id} from invoice {invoice_id} to {new_invoice_id}");

            Some(new_invoice_id)
        }
        (Some(invoice_id), _) => {
            add_to_invoice_total(invoice_id, form.amount - previous.amount, &transaction)?;
            Some(invoice_id)
        }
        (None, _) => None,
    };

    let status = match invoice_id {
        Some(invoice_id) => match get_invoice(invoice_id, &transaction)?.status {
            InvoiceStatus::Paga => ExpenseStatus::Paga,
            _ => ExpenseStatus::Pendente,
        },
        None => previous.status,
    };

    transaction.execute(
        "UPDATE expense \
        SET description = ?1, date = ?2, amount = ?3, installment_amount = ?3, category = ?4, \
            invoice_id = ?5, status = ?6 \
        WHERE id = ?7",
        params![
            form.description.trim(),
            form.date,
            form.amount,
            form.category.trim(),
            invoice_id,
            status,
            id
        ],
    )?;

    let updated = get_expense(id, &transaction)?;
    transaction.commit()?;

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        card::{create_card, test_card_form},
        db::must_create_test_connection,
        expense::{
            CardPurchase, ExpenseStatus, NewExpense, PaymentMethod, create_expense,
            post_card_purchase,
        },
        invoice::{InvoiceStatus, get_invoice, get_invoices},
    };

    use super::{EditExpenseForm, update_expense};

    fn form(amount: f64) -> EditExpenseForm {
        EditExpenseForm {
            description: "Farmácia".to_owned(),
            date: date!(2025 - 06 - 01),
            amount,
            category: "Saúde".to_owned(),
        }
    }

    #[test]
    fn updates_plain_expense() {
        let connection = must_create_test_connection();
        let expense = create_expense(
            &NewExpense {
                description: "Remédio".to_owned(),
                date: date!(2025 - 05 - 30),
                amount: 30.0,
                category: "Outros".to_owned(),
                payment_method: PaymentMethod::Dinheiro,
            },
            &connection,
        )
        .unwrap();

        let updated = update_expense(expense.id, &form(45.5), &connection).unwrap();

        assert_eq!(updated.description, "Farmácia");
        assert_eq!(updated.date, date!(2025 - 06 - 01));
        assert_eq!(updated.amount, 45.5);
        assert_eq!(updated.category, "Saúde");
        assert_eq!(updated.payment_method, PaymentMethod::Dinheiro);
    }

    #[test]
    fn changing_installment_amount_adjusts_invoice() {
        let connection = must_create_test_connection();
        let card = create_card(&test_card_form(), &connection).unwrap();
        let expenses = post_card_purchase(
            &CardPurchase {
                description: "Fone".to_owned(),
                amount: 200.0,
                date: date!(2025 - 06 - 05),
                category: "Eletrônicos".to_owned(),
                card_id: card.id,
                installments: 2,
            },
            &connection,
        )
        .unwrap();
        let first = &expenses[0];

        update_expense(first.id, &form(80.0), &connection).unwrap();

        let invoice = get_invoice(first.invoice_id.unwrap(), &connection).unwrap();
        assert_eq!(invoice.total, 80.0);
    }

    #[test]
    fn shrinking_installment_on_paid_invoice_refunds_the_difference() {
        let connection = must_create_test_connection();
        let card = create_card(&test_card_form(), &connection).unwrap();
        let expenses = post_card_purchase(
            &CardPurchase {
                description: "Fone".to_owned(),
                amount: 200.0,
                date: date!(2025 - 06 - 05),
                category: "Eletrônicos".to_owned(),
                card_id: card.id,
                installments: 1,
            },
            &connection,
        )
        .unwrap();
        let expense = &expenses[0];
        let invoice_id = expense.invoice_id.unwrap();
        connection
            .execute(
                "UPDATE invoice SET total = 0, paid = 200, status = 'paga' WHERE id = ?1",
                [invoice_id],
            )
            .unwrap();

        let updated = update_expense(expense.id, &form(80.0), &connection).unwrap();

        let invoice = get_invoice(invoice_id, &connection).unwrap();
        assert_eq!(invoice.total, 0.0);
        assert_eq!(invoice.paid, 80.0);
        assert_eq!(invoice.status, InvoiceStatus::Paga);
        assert_eq!(updated.amount, 80.0);
        assert_eq!(updated.status, ExpenseStatus::Paga);
    }

    #[test]
    fn moving_installment_to_another_month_moves_it_between_invoices() {
        let connection = must_create_test_connection();
        let card = create_card(&test_card_form(), &connection).unwrap();
        let expenses = post_card_purchase(
            &CardPurchase {
                description: "Fone".to_owned(),
                amount: 90.0,
                date: date!(2025 - 05 - 20),
                category: "Eletrônicos".to_owned(),
                card_id: card.id,
                installments: 1,
            },
            &connection,
        )
        .unwrap();
        let may_invoice_id = expenses[0].invoice_id.unwrap();

        // The form dates the expense in June.
        let updated = update_expense(expenses[0].id, &form(90.0), &connection).unwrap();

        let may = get_invoice(may_invoice_id, &connection).unwrap();
        assert_eq!(may.total, 0.0);
        let june_invoice_id = updated.invoice_id.unwrap();
        assert_ne!(june_invoice_id, may_invoice_id);
        let june = get_invoice(june_invoice_id, &connection).unwrap();
        assert_eq!((june.year, june.month), (2025, 6));
        assert_eq!(june.total, 90.0);
        assert_eq!(june.status, InvoiceStatus::Aberta);
        assert_eq!(updated.status, ExpenseStatus::Pendente);
        assert_eq!(get_invoices(Some(card.id), &connection).unwrap().len(), 2);
    }

    #[test]
    fn updating_missing_expense_is_not_found() {
        let connection = must_create_test_connection();

        assert_eq!(
            update_expense(9, &form(1.0), &connection),
            Err(Error::NotFound)
        );
    }
}
