//! Defines the endpoint for updating an income.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, params};

use crate::{
    Error,
    db::{RowsAffected, lock_connection},
    extract::ApiJson,
    income::core::{Income, IncomeForm, IncomeId, IncomeState, NewIncome, get_income},
};

/// A route handler for updating an income, responds with the updated income.
pub async fn edit_income_endpoint(
    State(state): State<IncomeState>,
    Path(income_id): Path<IncomeId>,
    ApiJson(form): ApiJson<IncomeForm>,
) -> Result<Json<Income>, Error> {
    let income = form.into_new_income()?;

    let connection = lock_connection(&state.db_connection)?;

    match update_income(income_id, &income, &connection)? {
        0 => Err(Error::NotFound),
        _ => Ok(Json(get_income(income_id, &connection)?)),
    }
}

fn update_income(
    id: IncomeId,
    income: &NewIncome,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE income \
            SET description = ?1, date = ?2, amount = ?3, category = ?4, source = ?5, \
                receipt_method = ?6, recurring = ?7, recurrence_interval = ?8 \
            WHERE id = ?9",
            params![
                income.description.trim(),
                income.date,
                income.amount,
                income.category.trim(),
                income.source,
                income.receipt_method,
                income.recurrence_interval.is_some(),
                income.recurrence_interval,
                id
            ],
        )
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        db::must_create_test_connection,
        income::{create_income, core::get_income, test_income},
    };

    use super::update_income;

    #[test]
    fn updates_income() {
        let connection = must_create_test_connection();
        let income =
            create_income(&test_income(date!(2025 - 03 - 05), 100.0, "Bônus"), &connection)
                .unwrap();
        let mut changed = test_income(date!(2025 - 03 - 06), 150.0, "Prêmio");
        changed.source = None;

        assert_eq!(update_income(income.id, &changed, &connection), Ok(1));

        let got = get_income(income.id, &connection).unwrap();
        assert_eq!(got.amount, 150.0);
        assert_eq!(got.category, "Prêmio");
        assert_eq!(got.date, date!(2025 - 03 - 06));
        assert_eq!(got.source, None);
    }

    #[test]
    fn updating_missing_income_affects_no_rows() {
        let connection = must_create_test_connection();

        assert_eq!(
            update_income(3, &test_income(date!(2025 - 03 - 05), 1.0, "X"), &connection),
            Ok(0)
        );
    }
}
