//! Defines the endpoint for deleting an expense.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use rusqlite::{Connection, params};

use crate::{
    Error,
    db::lock_connection,
    expense::core::{ExpenseId, ExpenseState, get_expense},
    invoice::add_to_invoice_total,
};

/// A route handler for deleting an expense, responds with 204 No Content.
///
/// Deleting an installment removes its amount from its invoice.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_expense(expense_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;
    let expense = get_expense(id, &transaction)?;

    transaction.execute("DELETE FROM expense WHERE id = ?1", params![id])?;

    if let Some(invoice_id) = expense.invoice_id {
        add_to_invoice_total(invoice_id, -expense.amount, &transaction)?;
    }

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        Error,
        card::{create_card, test_card_form},
        db::must_create_test_connection,
        endpoints::{self, format_endpoint},
        expense::{CardPurchase, Expense, ExpenseStatus, core::get_expense, post_card_purchase},
        invoice::{InvoiceStatus, get_invoice},
        test_utils::must_create_test_server,
    };

    use super::delete_expense;

    #[test]
    fn deleting_installment_reduces_invoice_total() {
        let connection = must_create_test_connection();
        let card = create_card(&test_card_form(), &connection).unwrap();
        post_card_purchase(
            &CardPurchase {
                description: "Livros".to_owned(),
                amount: 60.0,
                date: date!(2025 - 07 - 12),
                category: "Educação".to_owned(),
                card_id: card.id,
                installments: 1,
            },
            &connection,
        )
        .unwrap();
        let expenses = post_card_purchase(
            &CardPurchase {
                description: "Jantar".to_owned(),
                amount: 90.0,
                date: date!(2025 - 07 - 20),
                category: "Lazer".to_owned(),
                card_id: card.id,
                installments: 1,
            },
            &connection,
        )
        .unwrap();
        let dinner = &expenses[0];

        delete_expense(dinner.id, &connection).unwrap();

        assert_eq!(get_expense(dinner.id, &connection), Err(Error::NotFound));
        let invoice = get_invoice(dinner.invoice_id.unwrap(), &connection).unwrap();
        assert_eq!(invoice.total, 60.0);
    }

    #[test]
    fn deleting_installment_after_partial_payment_settles_invoice() {
        let connection = must_create_test_connection();
        let card = create_card(&test_card_form(), &connection).unwrap();
        let purchase = |description: &str, amount: f64| CardPurchase {
            description: description.to_owned(),
            amount,
            date: date!(2025 - 07 - 12),
            category: "Lazer".to_owned(),
            card_id: card.id,
            installments: 1,
        };
        let books = post_card_purchase(&purchase("Livros", 60.0), &connection).unwrap();
        let dinner = post_card_purchase(&purchase("Jantar", 90.0), &connection).unwrap();
        let invoice_id = dinner[0].invoice_id.unwrap();
        connection
            .execute(
                "UPDATE invoice SET total = 50, paid = 100 WHERE id = ?1",
                [invoice_id],
            )
            .unwrap();

        delete_expense(dinner[0].id, &connection).unwrap();

        let invoice = get_invoice(invoice_id, &connection).unwrap();
        assert_eq!(invoice.total, 0.0);
        assert_eq!(invoice.paid, 60.0);
        assert_eq!(invoice.status, InvoiceStatus::Paga);
        assert_eq!(
            get_expense(books[0].id, &connection).unwrap().status,
            ExpenseStatus::Paga
        );
    }

    #[tokio::test]
    async fn delete_endpoint_responds_no_content_then_not_found() {
        let server = must_create_test_server();
        let expenses = server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "descricao": "Padaria",
                "data": "2025-07-01",
                "valor": 12.5,
                "categoria": "Alimentação",
                "forma_pagamento": "dinheiro",
            }))
            .await
            .json::<Vec<Expense>>();
        let path = format_endpoint(endpoints::EXPENSE, expenses[0].id);

        server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
        server.delete(&path).await.assert_status_not_found();
    }
}
