//! Defines the endpoint for creating an expense or a credit card purchase.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    card::CardId,
    db::lock_connection,
    expense::{
        core::{Expense, ExpenseState, NewExpense, PaymentMethod, create_expense},
        installments::{CardPurchase, post_card_purchase},
    },
    extract::ApiJson,
};

/// The request body for creating an expense.
///
/// The payment method is kept as text so that unknown methods are reported
/// as [Error::InvalidPaymentMethod].
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseForm {
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "data")]
    pub date: Date,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "forma_pagamento")]
    pub payment_method: String,
    /// The number of installments, only meaningful for credit card purchases.
    #[serde(rename = "parcelas", default)]
    pub installments: Option<u32>,
    #[serde(rename = "cartao_id", default)]
    pub card_id: Option<CardId>,
}

/// A route handler for creating an expense.
///
/// A credit purchase is split into one expense per installment, each posted
/// to the card's invoice for its month. Any other expense creates a single
/// paid expense. Responds with 201 Created and the list of created expenses.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    ApiJson(form): ApiJson<ExpenseForm>,
) -> Result<(StatusCode, Json<Vec<Expense>>), Error> {
    let payment_method: PaymentMethod = form.payment_method.parse()?;
    let installments = form.installments.unwrap_or(1);

    if payment_method == PaymentMethod::Credito {
        let card_id = form.card_id.ok_or(Error::MissingCard)?;
        let purchase = CardPurchase {
            description: form.description,
            amount: form.amount,
            date: form.date,
            category: form.category,
            card_id,
            installments,
        };

        let connection = lock_connection(&state.db_connection)?;
        let expenses = post_card_purchase(&purchase, &connection)?;

        return Ok((StatusCode::CREATED, Json(expenses)));
    }

    if installments != 1 {
        return Err(Error::InvalidInstallmentCount(installments));
    }

    let expense = NewExpense {
        description: form.description,
        date: form.date,
        amount: form.amount,
        category: form.category,
        payment_method,
    };
    expense.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let expense = create_expense(&expense, &connection)?;

    Ok((StatusCode::CREATED, Json(vec![expense])))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        expense::{Expense, ExpenseStatus, PaymentMethod},
        invoice::Invoice,
        test_utils::must_create_test_server,
    };

    async fn create_card(server: &axum_test::TestServer) -> i64 {
        server
            .post(endpoints::CARDS)
            .json(&json!({
                "nome": "Roxinho",
                "banco": "Nubank",
                "limite": 5000.0,
                "dia_fechamento": 3,
                "dia_vencimento": 10,
            }))
            .await
            .json::<Value>()["id"]
            .as_i64()
            .unwrap()
    }

    #[tokio::test]
    async fn creates_single_paid_expense() {
        let server = must_create_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "descricao": "Mercado",
                "data": "2025-04-02",
                "valor": 152.3,
                "categoria": "Alimentação",
                "forma_pagamento": "pix",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let expenses = response.json::<Vec<Expense>>();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].payment_method, PaymentMethod::Pix);
        assert_eq!(expenses[0].status, ExpenseStatus::Paga);
        assert_eq!(expenses[0].invoice_id, None);
    }

    #[tokio::test]
    async fn credit_purchase_is_split_into_installments() {
        let server = must_create_test_server();
        let card_id = create_card(&server).await;

        let response = server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "descricao": "Notebook",
                "data": "2025-04-15",
                "valor": 299.99,
                "categoria": "Eletrônicos",
                "forma_pagamento": "credito",
                "parcelas": 3,
                "cartao_id": card_id,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let expenses = response.json::<Vec<Expense>>();
        assert_eq!(expenses.len(), 3);
        let total: f64 = expenses.iter().map(|expense| expense.amount).sum();
        assert!((total - 299.99).abs() < 1e-9);

        let invoices = server.get(endpoints::INVOICES).await.json::<Vec<Invoice>>();
        assert_eq!(invoices.len(), 3);
    }

    #[tokio::test]
    async fn unknown_payment_method_is_bad_request() {
        let server = must_create_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "descricao": "Mercado",
                "data": "2025-04-02",
                "valor": 10.0,
                "categoria": "Alimentação",
                "forma_pagamento": "cheque",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["error"],
            "\"cheque\" is not a valid payment method"
        );
    }

    #[tokio::test]
    async fn credit_without_card_is_bad_request() {
        let server = must_create_test_server();

        server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "descricao": "Tênis",
                "data": "2025-04-02",
                "valor": 400.0,
                "categoria": "Vestuário",
                "forma_pagamento": "credito",
                "parcelas": 2,
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_card_is_bad_request() {
        let server = must_create_test_server();

        server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "descricao": "Tênis",
                "data": "2025-04-02",
                "valor": 400.0,
                "categoria": "Vestuário",
                "forma_pagamento": "credito",
                "cartao_id": 99,
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn installments_without_credit_are_bad_request() {
        let server = must_create_test_server();

        server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "descricao": "Curso",
                "data": "2025-04-02",
                "valor": 900.0,
                "categoria": "Educação",
                "forma_pagamento": "boleto",
                "parcelas": 3,
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_date_is_bad_request() {
        let server = must_create_test_server();

        server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "descricao": "Mercado",
                "data": "02/04/2025",
                "valor": 10.0,
                "categoria": "Alimentação",
                "forma_pagamento": "pix",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
