//! Route handlers for importing expenses and income from CSV files.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Multipart, State, multipart::Field},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    csv_import::parse::{parse_expenses, parse_incomes},
    db::lock_connection,
    expense::{Expense, create_expense},
    income::{Income, create_income},
};

/// The state needed for importing CSV files.
#[derive(Debug, Clone)]
pub struct ImportState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for importing expenses from one or more CSV files.
///
/// Every file is parsed before anything is inserted, and all rows are
/// inserted in a single transaction.
pub async fn import_expenses_endpoint(
    State(state): State<ImportState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<Expense>>), Error> {
    let mut expenses = Vec::new();
    for file in read_csv_files(multipart).await? {
        expenses.extend(parse_expenses(&file)?);
    }

    let connection = lock_connection(&state.db_connection)?;
    let transaction = connection.unchecked_transaction()?;
    let imported = expenses
        .iter()
        .map(|expense| create_expense(expense, &transaction))
        .collect::<Result<Vec<_>, _>>()?;
    transaction.commit()?;

    tracing::info!("Imported {} expenses from CSV", imported.len());

    Ok((StatusCode::CREATED, Json(imported)))
}

/// Route handler for importing income from one or more CSV files.
pub async fn import_incomes_endpoint(
    State(state): State<ImportState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<Income>>), Error> {
    let mut incomes = Vec::new();
    for file in read_csv_files(multipart).await? {
        incomes.extend(parse_incomes(&file)?);
    }

    let connection = lock_connection(&state.db_connection)?;
    let transaction = connection.unchecked_transaction()?;
    let imported = incomes
        .iter()
        .map(|income| create_income(income, &transaction))
        .collect::<Result<Vec<_>, _>>()?;
    transaction.commit()?;

    tracing::info!("Imported {} incomes from CSV", imported.len());

    Ok((StatusCode::CREATED, Json(imported)))
}

/// Read the text of every file in `multipart`.
///
/// # Errors
/// Returns:
/// - [Error::NotCSV] if a file is not `text/csv` or the form has no files,
/// - [Error::MultipartError] if the form could not be read.
async fn read_csv_files(mut multipart: Multipart) -> Result<Vec<String>, Error> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|error| {
        tracing::error!("Could not read multipart form: {error}");
        Error::MultipartError(error.to_string())
    })? {
        files.push(read_csv_field(field).await?);
    }

    if files.is_empty() {
        return Err(Error::NotCSV);
    }

    Ok(files)
}

async fn read_csv_field(field: Field<'_>) -> Result<String, Error> {
    if field.content_type() != Some("text/csv") {
        return Err(Error::NotCSV);
    }

    let file_name = field.file_name().unwrap_or("<unnamed>").to_owned();
    let data = field.text().await.map_err(|error| {
        tracing::error!("Could not read data from multipart form field: {error}");
        Error::MultipartError("could not read data from multipart form field".to_owned())
    })?;

    tracing::debug!("Received file '{}' that is {} bytes", file_name, data.len());

    Ok(data)
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{FromRef, FromRequest, Multipart, State},
        http::{Request, StatusCode},
    };

    use crate::{
        Error, endpoints,
        test_utils::must_create_test_state,
    };

    use super::{ImportState, import_expenses_endpoint, import_incomes_endpoint};

    const EXPENSES_CSV: &str = "descricao,valor,data,categoria,forma_pagamento\n\
        Aluguel,1500.00,2025-05-05,Moradia,boleto\n\
        Feira,230.40,2025-05-10,Mercado,pix\n";

    async fn must_make_multipart(files: &[(&str, &str)]) -> Multipart {
        let boundary = "MY_BOUNDARY123456789";
        let boundary_start = format!("--{boundary}");
        let boundary_end = format!("--{boundary}--");

        let mut lines: Vec<String> = Vec::new();

        for (content_type, text) in files {
            lines.push(boundary_start.clone());
            lines.push(
                "Content-Disposition: form-data; name=\"files\"; filename=\"extrato.csv\";"
                    .to_owned(),
            );
            lines.push(format!("Content-Type: {content_type}"));
            lines.push("".to_owned());
            lines.push(text.to_string());
        }

        lines.push(boundary_end);

        let request = Request::builder()
            .method("POST")
            .uri(endpoints::IMPORT_EXPENSES)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(lines.join("\r\n").into())
            .unwrap();

        Multipart::from_request(request, &()).await.unwrap()
    }

    fn count_rows(table: &str, state: &ImportState) -> i64 {
        state
            .db_connection
            .lock()
            .unwrap()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    #[tokio::test]
    async fn imports_expenses() {
        let state = ImportState::from_ref(&must_create_test_state());

        let (status, expenses) = import_expenses_endpoint(
            State(state.clone()),
            must_make_multipart(&[("text/csv", EXPENSES_CSV)]).await,
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].description, "Aluguel");
        assert_eq!(count_rows("expense", &state), 2);
    }

    #[tokio::test]
    async fn imports_incomes() {
        let state = ImportState::from_ref(&must_create_test_state());
        let text =
            "descricao,valor,data,categoria,fonte\nSalário,5000,2025-05-05,Salário,Empresa\n";

        let (status, incomes) = import_incomes_endpoint(
            State(state.clone()),
            must_make_multipart(&[("text/csv", text)]).await,
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(incomes[0].source.as_deref(), Some("Empresa"));
        assert_eq!(count_rows("income", &state), 1);
    }

    #[tokio::test]
    async fn missing_columns_import_nothing() {
        let state = ImportState::from_ref(&must_create_test_state());

        let result = import_expenses_endpoint(
            State(state.clone()),
            must_make_multipart(&[
                ("text/csv", EXPENSES_CSV),
                ("text/csv", "descricao,valor\nCafé,5\n"),
            ])
            .await,
        )
        .await;

        assert_eq!(
            result.map(|(status, _)| status),
            Err(Error::MissingCSVColumns(vec![
                "data".to_owned(),
                "categoria".to_owned()
            ]))
        );
        assert_eq!(count_rows("expense", &state), 0);
    }

    #[tokio::test]
    async fn rejects_non_csv_files() {
        let state = ImportState::from_ref(&must_create_test_state());

        let result = import_incomes_endpoint(
            State(state.clone()),
            must_make_multipart(&[("text/plain", "olá")]).await,
        )
        .await;

        assert_eq!(result.map(|(status, _)| status), Err(Error::NotCSV));
    }
}
